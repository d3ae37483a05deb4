//! Source uploads: blob storage, AnythingLLM ingestion, then the local row.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use mindforge_core::{
    defaults, CreateSourceRequest, Error, NotebookRepository, Result, Source, SourceRepository,
    StorageBackend, WorkspaceBackend,
};
use mindforge_db::storage_key;

use super::notebook_service::owned_slug;

/// A file to add to a notebook.
#[derive(Debug, Clone)]
pub struct SourceUpload {
    pub user_id: i64,
    pub file_name: String,
    pub folder_name: String,
    pub slug: Option<String>,
    pub data: Vec<u8>,
}

/// Result of an upload or a note conversion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCreated {
    pub source_id: i64,
    pub file_url: String,
    pub location: String,
}

/// Percent-decode a client-encoded file name, keeping the raw value when it
/// is not valid UTF-8 after decoding.
pub fn decode_file_name(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

#[derive(Clone)]
pub struct SourceService {
    sources: Arc<dyn SourceRepository>,
    notebooks: Arc<dyn NotebookRepository>,
    workspace: Arc<dyn WorkspaceBackend>,
    storage: Arc<dyn StorageBackend>,
}

impl SourceService {
    pub fn new(
        sources: Arc<dyn SourceRepository>,
        notebooks: Arc<dyn NotebookRepository>,
        workspace: Arc<dyn WorkspaceBackend>,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            sources,
            notebooks,
            workspace,
            storage,
        }
    }

    fn folder(folder_name: &str) -> &str {
        let folder = folder_name.trim();
        if folder.is_empty() {
            defaults::DEFAULT_FOLDER
        } else {
            folder
        }
    }

    /// A blank slug means "do not embed"; anything else must be the caller's.
    async fn embed_target<'a>(
        &self,
        user_id: i64,
        slug: Option<&'a str>,
    ) -> Result<Option<&'a str>> {
        match slug.map(str::trim).filter(|s| !s.is_empty()) {
            Some(slug) => Ok(Some(owned_slug(self.notebooks.as_ref(), user_id, slug).await?)),
            None => Ok(None),
        }
    }

    async fn embed_and_record(
        &self,
        user_id: i64,
        file_name: String,
        folder_name: &str,
        slug: Option<&str>,
        file_url: String,
        location: String,
    ) -> Result<SourceCreated> {
        if let Some(slug) = slug {
            self.workspace
                .embed_documents(slug, std::slice::from_ref(&location))
                .await?;
        }

        let source = self
            .sources
            .insert(CreateSourceRequest {
                user_id,
                file_name,
                file_url: file_url.clone(),
                folder_name: folder_name.to_string(),
                location: Some(location.clone()),
            })
            .await?;

        info!(
            subsystem = "api",
            component = "sources",
            user_id,
            source_id = source.id,
            folder = %folder_name,
            "Source recorded"
        );
        Ok(SourceCreated {
            source_id: source.id,
            file_url,
            location,
        })
    }

    pub async fn upload(&self, upload: SourceUpload) -> Result<SourceCreated> {
        if upload.data.is_empty() {
            return Err(Error::InvalidInput("file is empty".to_string()));
        }
        let file_name = decode_file_name(upload.file_name.trim());
        if file_name.is_empty() {
            return Err(Error::InvalidInput("fileName is required".to_string()));
        }
        let folder = Self::folder(&upload.folder_name);
        let slug = self
            .embed_target(upload.user_id, upload.slug.as_deref())
            .await?;

        let key = storage_key(&format!("{}/{}", defaults::SOURCES_PREFIX, folder), &file_name);
        let file_url = self.storage.put(&key, &upload.data).await?;
        let document = self
            .workspace
            .upload_document(&file_name, upload.data)
            .await?;

        self.embed_and_record(
            upload.user_id,
            file_name,
            folder,
            slug,
            file_url,
            document.location,
        )
        .await
    }

    /// Turn note text into a source of the notebook.
    pub async fn convert_note(
        &self,
        user_id: i64,
        file_name: &str,
        content: &str,
        folder_name: &str,
        slug: Option<&str>,
    ) -> Result<SourceCreated> {
        let file_name = file_name.trim();
        if file_name.is_empty() || content.trim().is_empty() {
            return Err(Error::InvalidInput(
                "fileName and fileContent are required".to_string(),
            ));
        }
        let folder = Self::folder(folder_name);
        let slug = self.embed_target(user_id, slug).await?;

        let key = storage_key(&format!("{}/{}", defaults::SOURCES_PREFIX, folder), file_name);
        let file_url = self.storage.put(&key, content.as_bytes()).await?;
        let document = self.workspace.upload_raw_text(file_name, content).await?;

        self.embed_and_record(
            user_id,
            file_name.to_string(),
            folder,
            slug,
            file_url,
            document.location,
        )
        .await
    }

    pub async fn list(&self, user_id: i64, folder_name: Option<&str>) -> Result<Vec<Source>> {
        let folder = folder_name.map(str::trim).filter(|f| !f.is_empty());
        self.sources.list_for_user(user_id, folder).await
    }
}
