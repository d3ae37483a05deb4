//! Notebooks and their AnythingLLM workspaces.
//!
//! The remote workspace is created before the local row so a notebook never
//! exists without a slug. Rename and delete commit locally first; the remote
//! call after that is best-effort.

use std::sync::Arc;

use tracing::{error, info, warn};

use mindforge_core::{Error, Notebook, NotebookRepository, Result, Workspace, WorkspaceBackend};

#[derive(Clone)]
pub struct NotebookService {
    notebooks: Arc<dyn NotebookRepository>,
    workspace: Arc<dyn WorkspaceBackend>,
}

fn required_title(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidInput("notebook title is required".to_string()));
    }
    Ok(title)
}

/// Resolve a client-supplied workspace slug to one of the caller's notebooks.
/// Malformed slugs are refused before the lookup; a slug the caller does not
/// own is reported as not found.
pub(crate) async fn owned_slug<'a>(
    notebooks: &dyn NotebookRepository,
    user_id: i64,
    slug: &'a str,
) -> Result<&'a str> {
    let slug = slug.trim();
    if slug.is_empty() {
        return Err(Error::InvalidInput("slug is required".to_string()));
    }
    if !Workspace::is_valid_slug(slug) {
        return Err(Error::InvalidInput(format!("invalid slug: {slug:?}")));
    }
    match notebooks.get_by_slug_for_user(user_id, slug).await? {
        Some(_) => Ok(slug),
        None => Err(Error::NotFound(format!("notebook {slug} not found"))),
    }
}

impl NotebookService {
    pub fn new(notebooks: Arc<dyn NotebookRepository>, workspace: Arc<dyn WorkspaceBackend>) -> Self {
        Self {
            notebooks,
            workspace,
        }
    }

    pub async fn create(&self, user_id: i64, title: &str) -> Result<Notebook> {
        let title = required_title(title)?;
        let workspace = self.workspace.create_workspace(title).await?;

        match self.notebooks.insert(user_id, title, &workspace.slug).await {
            Ok(notebook) => {
                info!(
                    subsystem = "api",
                    component = "notebooks",
                    user_id,
                    notebook_id = notebook.id,
                    slug = %workspace.slug,
                    "Notebook created"
                );
                Ok(notebook)
            }
            Err(e) => {
                warn!(
                    slug = %workspace.slug,
                    error = %e,
                    "Notebook insert failed, deleting remote workspace"
                );
                if let Err(cleanup) = self.workspace.delete_workspace(&workspace.slug).await {
                    error!(
                        slug = %workspace.slug,
                        error = %cleanup,
                        "Orphaned workspace left behind"
                    );
                }
                Err(e)
            }
        }
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<Notebook>> {
        self.notebooks.list_for_user(user_id).await
    }

    pub async fn get(&self, user_id: i64, id: i64) -> Result<Notebook> {
        self.notebooks
            .get_for_user(user_id, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("notebook {id} not found")))
    }

    pub async fn rename(&self, user_id: i64, id: i64, title: &str) -> Result<Notebook> {
        let title = required_title(title)?;
        let notebook = self
            .notebooks
            .rename(user_id, id, title)
            .await?
            .ok_or_else(|| Error::NotFound(format!("notebook {id} not found")))?;

        if let Some(slug) = notebook.slug.as_deref() {
            if let Err(e) = self.workspace.rename_workspace(slug, title).await {
                warn!(slug, error = %e, "Remote workspace rename failed");
            }
        }
        Ok(notebook)
    }

    /// Delete the notebook with its sources and notes. Returns the deleted row.
    pub async fn delete(&self, user_id: i64, id: i64) -> Result<Notebook> {
        let notebook = self
            .notebooks
            .delete_cascade(user_id, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("notebook {id} not found")))?;

        if let Some(slug) = notebook.slug.as_deref() {
            if let Err(e) = self.workspace.delete_workspace(slug).await {
                warn!(slug, error = %e, "Remote workspace delete failed");
            }
        }
        info!(
            subsystem = "api",
            component = "notebooks",
            user_id,
            notebook_id = id,
            "Notebook deleted"
        );
        Ok(notebook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{FakeNotebooks, FakeWorkspace};

    fn service(notebooks: FakeNotebooks, workspace: Arc<FakeWorkspace>) -> NotebookService {
        NotebookService::new(Arc::new(notebooks), workspace)
    }

    #[tokio::test]
    async fn test_create_stores_remote_slug() {
        let workspace = Arc::new(FakeWorkspace::default());
        let svc = service(FakeNotebooks::default(), workspace.clone());

        let notebook = svc.create(1, "Cell Biology").await.unwrap();
        assert_eq!(notebook.slug.as_deref(), Some("cell-biology"));
        assert_eq!(notebook.source_count, 0);
        assert_eq!(workspace.calls(), vec!["create:Cell Biology"]);
    }

    #[tokio::test]
    async fn test_blank_title_skips_remote() {
        let workspace = Arc::new(FakeWorkspace::default());
        let svc = service(FakeNotebooks::default(), workspace.clone());

        assert!(matches!(svc.create(1, "  ").await, Err(Error::InvalidInput(_))));
        assert!(workspace.calls().is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_writes_nothing() {
        let workspace = Arc::new(FakeWorkspace {
            fail_create: true,
            ..Default::default()
        });
        let notebooks = Arc::new(FakeNotebooks::default());
        let svc = NotebookService::new(notebooks.clone(), workspace);

        assert!(matches!(svc.create(1, "Bio").await, Err(Error::Upstream(_))));
        assert!(notebooks.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_failure_deletes_remote_workspace() {
        let workspace = Arc::new(FakeWorkspace::default());
        let svc = service(
            FakeNotebooks {
                fail_insert: true,
                ..Default::default()
            },
            workspace.clone(),
        );

        assert!(matches!(svc.create(1, "Bio").await, Err(Error::Database(_))));
        assert_eq!(workspace.calls(), vec!["create:Bio", "delete:bio"]);
    }

    #[tokio::test]
    async fn test_other_users_notebook_is_not_found() {
        let svc = service(FakeNotebooks::default(), Arc::new(FakeWorkspace::default()));
        let notebook = svc.create(1, "Bio").await.unwrap();

        assert!(matches!(svc.get(2, notebook.id).await, Err(Error::NotFound(_))));
        assert!(matches!(svc.delete(2, notebook.id).await, Err(Error::NotFound(_))));
        assert!(svc.list(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_owned_slug_checks_format_then_owner() {
        let notebooks = FakeNotebooks::default();
        notebooks.insert(1, "Bio", "bio").await.unwrap();

        assert_eq!(owned_slug(&notebooks, 1, " bio ").await.unwrap(), "bio");
        assert!(matches!(
            owned_slug(&notebooks, 2, "bio").await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            owned_slug(&notebooks, 1, "").await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            owned_slug(&notebooks, 1, "../admin/users?").await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_remote_delete_failure_is_not_surfaced() {
        let workspace = Arc::new(FakeWorkspace {
            fail_delete: true,
            ..Default::default()
        });
        let svc = service(FakeNotebooks::default(), workspace.clone());
        let notebook = svc.create(1, "Bio").await.unwrap();

        let deleted = svc.delete(1, notebook.id).await.unwrap();
        assert_eq!(deleted.id, notebook.id);
        assert_eq!(workspace.calls().last().unwrap(), "delete:bio");
    }

    #[tokio::test]
    async fn test_rename_updates_remote_best_effort() {
        let workspace = Arc::new(FakeWorkspace {
            fail_rename: true,
            ..Default::default()
        });
        let svc = service(FakeNotebooks::default(), workspace.clone());
        let notebook = svc.create(1, "Bio").await.unwrap();

        let renamed = svc.rename(1, notebook.id, "Biology").await.unwrap();
        assert_eq!(renamed.title, "Biology");
        assert_eq!(workspace.calls().last().unwrap(), "rename:bio:Biology");
    }
}
