//! In-memory repositories and remote backends for service tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use mindforge_core::*;

#[derive(Default)]
pub struct FakeUsers {
    rows: Mutex<Vec<(User, String)>>,
}

#[async_trait]
impl UserRepository for FakeUsers {
    async fn insert(&self, email: &str, password_hash: &str) -> Result<i64> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64 + 1;
        rows.push((
            User {
                id,
                email: email.to_string(),
                avatar_url: None,
                created_at: Utc::now(),
            },
            password_hash.to_string(),
        ));
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|(u, _)| u.id == id).map(|(u, _)| u.clone()))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|(u, _)| u.email == email)
            .map(|(u, _)| u.clone()))
    }

    async fn credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|(u, _)| u.email == email)
            .map(|(u, h)| UserCredentials {
                id: u.id,
                email: u.email.clone(),
                password_hash: h.clone(),
            }))
    }

    async fn credentials_by_id(&self, id: i64) -> Result<Option<UserCredentials>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|(u, _)| u.id == id).map(|(u, h)| UserCredentials {
            id: u.id,
            email: u.email.clone(),
            password_hash: h.clone(),
        }))
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        Ok(match rows.iter_mut().find(|(u, _)| u.id == id) {
            Some(row) => {
                row.1 = password_hash.to_string();
                true
            }
            None => false,
        })
    }

    async fn update_password_by_email(&self, email: &str, password_hash: &str) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        Ok(match rows.iter_mut().find(|(u, _)| u.email == email) {
            Some(row) => {
                row.1 = password_hash.to_string();
                true
            }
            None => false,
        })
    }

    async fn update_avatar(&self, id: i64, avatar_url: &str) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        Ok(match rows.iter_mut().find(|(u, _)| u.id == id) {
            Some(row) => {
                row.0.avatar_url = Some(avatar_url.to_string());
                true
            }
            None => false,
        })
    }

    async fn update_email(&self, id: i64, email: &str) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        Ok(match rows.iter_mut().find(|(u, _)| u.id == id) {
            Some(row) => {
                row.0.email = email.to_string();
                true
            }
            None => false,
        })
    }

    async fn list_page(&self, req: PageRequest) -> Result<Page<User>> {
        let rows = self.rows.lock().unwrap();
        let data = rows
            .iter()
            .skip(req.offset() as usize)
            .take(req.limit() as usize)
            .map(|(u, _)| u.clone())
            .collect();
        Ok(Page::new(data, rows.len() as i64, req))
    }

    async fn delete_cascade(&self, id: i64) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(u, _)| u.id != id);
        Ok(rows.len() != before)
    }
}

/// Records every key written.
#[derive(Default)]
pub struct FakeStorage {
    pub keys: Mutex<Vec<String>>,
}

#[async_trait]
impl StorageBackend for FakeStorage {
    async fn put(&self, key: &str, _data: &[u8]) -> Result<String> {
        self.keys.lock().unwrap().push(key.to_string());
        Ok(format!("http://files.test/{key}"))
    }
}

/// Remote workspace service that logs calls and can be told to fail.
#[derive(Default)]
pub struct FakeWorkspace {
    pub calls: Mutex<Vec<String>>,
    pub fail_create: bool,
    pub fail_delete: bool,
    pub fail_rename: bool,
    pub reply: Option<String>,
    pub last_chat: Mutex<Option<WorkspaceChatRequest>>,
}

impl FakeWorkspace {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkspaceBackend for FakeWorkspace {
    async fn create_workspace(&self, name: &str) -> Result<Workspace> {
        self.record(format!("create:{name}"));
        if self.fail_create {
            return Err(Error::Upstream("create refused".to_string()));
        }
        Ok(Workspace {
            id: Some(1),
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
        })
    }

    async fn rename_workspace(&self, slug: &str, name: &str) -> Result<()> {
        self.record(format!("rename:{slug}:{name}"));
        if self.fail_rename {
            return Err(Error::Upstream("rename refused".to_string()));
        }
        Ok(())
    }

    async fn delete_workspace(&self, slug: &str) -> Result<()> {
        self.record(format!("delete:{slug}"));
        if self.fail_delete {
            return Err(Error::Upstream("delete refused".to_string()));
        }
        Ok(())
    }

    async fn upload_document(&self, file_name: &str, _data: Vec<u8>) -> Result<UploadedDocument> {
        self.record(format!("upload:{file_name}"));
        Ok(UploadedDocument {
            location: format!("custom-documents/{file_name}.json"),
            name: Some(file_name.to_string()),
            title: None,
        })
    }

    async fn upload_raw_text(&self, title: &str, _text: &str) -> Result<UploadedDocument> {
        self.record(format!("raw:{title}"));
        Ok(UploadedDocument {
            location: format!("custom-documents/{title}-raw.json"),
            name: None,
            title: Some(title.to_string()),
        })
    }

    async fn embed_documents(&self, slug: &str, locations: &[String]) -> Result<()> {
        self.record(format!("embed:{slug}:{}", locations.join(",")));
        Ok(())
    }

    async fn chat(&self, slug: &str, req: &WorkspaceChatRequest) -> Result<WorkspaceChatResponse> {
        self.record(format!("chat:{slug}"));
        *self.last_chat.lock().unwrap() = Some(req.clone());
        Ok(WorkspaceChatResponse {
            id: None,
            kind: Some("textResponse".to_string()),
            text_response: self.reply.clone(),
            sources: vec![],
            close: true,
            error: None,
            metrics: None,
        })
    }

    async fn chat_history(
        &self,
        slug: &str,
        _query: &ChatHistoryQuery,
    ) -> Result<serde_json::Value> {
        self.record(format!("history:{slug}"));
        Ok(serde_json::json!({ "history": [] }))
    }
}

#[derive(Default)]
pub struct FakeNotebooks {
    pub rows: Mutex<Vec<Notebook>>,
    pub fail_insert: bool,
}

#[async_trait]
impl NotebookRepository for FakeNotebooks {
    async fn insert(&self, user_id: i64, title: &str, slug: &str) -> Result<Notebook> {
        if self.fail_insert {
            return Err(Error::Database(sqlx::Error::PoolTimedOut));
        }
        let mut rows = self.rows.lock().unwrap();
        let notebook = Notebook {
            id: rows.len() as i64 + 1,
            user_id,
            title: title.to_string(),
            slug: Some(slug.to_string()),
            source_count: 0,
            created_at: Utc::now(),
        };
        rows.push(notebook.clone());
        Ok(notebook)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Notebook>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|n| n.user_id == user_id).cloned().collect())
    }

    async fn get_for_user(&self, user_id: i64, id: i64) -> Result<Option<Notebook>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|n| n.user_id == user_id && n.id == id)
            .cloned())
    }

    async fn get_by_slug_for_user(&self, user_id: i64, slug: &str) -> Result<Option<Notebook>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|n| n.user_id == user_id && n.slug.as_deref() == Some(slug))
            .cloned())
    }

    async fn rename(&self, user_id: i64, id: i64, title: &str) -> Result<Option<Notebook>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .iter_mut()
            .find(|n| n.user_id == user_id && n.id == id)
            .map(|n| {
                n.title = title.to_string();
                n.clone()
            }))
    }

    async fn delete_cascade(&self, user_id: i64, id: i64) -> Result<Option<Notebook>> {
        let mut rows = self.rows.lock().unwrap();
        let pos = rows.iter().position(|n| n.user_id == user_id && n.id == id);
        Ok(pos.map(|i| rows.remove(i)))
    }
}

#[derive(Default)]
pub struct FakeSources {
    pub rows: Mutex<Vec<Source>>,
}

#[async_trait]
impl SourceRepository for FakeSources {
    async fn insert(&self, req: CreateSourceRequest) -> Result<Source> {
        let mut rows = self.rows.lock().unwrap();
        let source = Source {
            id: rows.len() as i64 + 1,
            user_id: req.user_id,
            file_name: req.file_name,
            file_url: req.file_url,
            folder_name: req.folder_name,
            location: req.location,
            created_at: Utc::now(),
        };
        rows.push(source.clone());
        Ok(source)
    }

    async fn list_for_user(&self, user_id: i64, folder_name: Option<&str>) -> Result<Vec<Source>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|s| s.user_id == user_id)
            .filter(|s| folder_name.map_or(true, |f| s.folder_name == f))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct FakeNotes {
    pub rows: Mutex<Vec<Note>>,
}

#[async_trait]
impl NoteRepository for FakeNotes {
    async fn insert(&self, req: CreateNoteRequest) -> Result<Note> {
        let mut rows = self.rows.lock().unwrap();
        let note = Note {
            id: rows.len() as i64 + 1,
            user_id: req.user_id,
            title: req.title,
            content: req.content,
            folder_name: req.folder_name,
            created_at: Utc::now(),
        };
        rows.push(note.clone());
        Ok(note)
    }

    async fn list_for_user(&self, user_id: i64, folder_name: Option<&str>) -> Result<Vec<Note>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|n| n.user_id == user_id)
            .filter(|n| folder_name.map_or(true, |f| n.folder_name == f))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        user_id: i64,
        id: i64,
        title: &str,
        content: &str,
    ) -> Result<Option<Note>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .iter_mut()
            .find(|n| n.user_id == user_id && n.id == id)
            .map(|n| {
                n.title = title.to_string();
                n.content = content.to_string();
                n.clone()
            }))
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|n| !(n.user_id == user_id && n.id == id));
        Ok(rows.len() != before)
    }

    async fn import_bundle(
        &self,
        user_id: i64,
        folder_name: &str,
        notes: &[NoteDraft],
        sources: &[SourceDraft],
    ) -> Result<ImportedBundle> {
        let mut bundle = ImportedBundle::default();
        for draft in notes {
            bundle.notes.push(
                self.insert(CreateNoteRequest {
                    user_id,
                    title: draft.title.clone(),
                    content: draft.content.clone(),
                    folder_name: folder_name.to_string(),
                })
                .await?,
            );
        }
        for (i, draft) in sources.iter().enumerate() {
            bundle.sources.push(Source {
                id: i as i64 + 1,
                user_id,
                file_name: draft.file_name.clone(),
                file_url: draft.file_url.clone(),
                folder_name: folder_name.to_string(),
                location: draft.location.clone(),
                created_at: Utc::now(),
            });
        }
        Ok(bundle)
    }
}

/// Generator that echoes the prompt it was given.
#[derive(Default)]
pub struct EchoGenerator {
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl GenerationBackend for EchoGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("echo".to_string())
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}
