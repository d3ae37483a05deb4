//! Blob storage for uploaded files.
//!
//! Files are written under a base directory and served by the HTTP layer
//! from a public base URL, so a stored key maps to
//! `{public_base_url}/{key}`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use mindforge_db::file_storage::{storage_key, FilesystemBackend};
//!
//! let backend = FilesystemBackend::new("/var/mindforge/files", "http://localhost:3001/files");
//! let key = storage_key("sources/Biology", "cells.pdf");
//! let url = backend.put(&key, &data).await?;
//! ```

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use mindforge_core::{Error, Result, StorageBackend};

/// Filesystem storage backend.
pub struct FilesystemBackend {
    base_path: PathBuf,
    public_base_url: String,
}

impl FilesystemBackend {
    pub fn new(base_path: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a key below the base directory, rejecting absolute paths and `..`.
    fn full_path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        if key.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(Error::Storage(format!("invalid storage key: {key}")));
        }
        Ok(self.base_path.join(relative))
    }

    /// Public URL for a stored key. Each path segment is percent-encoded.
    pub fn public_url(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", self.public_base_url, encoded.join("/"))
    }

    /// Round-trip a small file to catch permission problems at startup.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        let test_dir = self.base_path.join(".health-check");
        let test_file = test_dir.join("test.bin");

        fs::create_dir_all(&test_dir)
            .await
            .map_err(|e| format!("create_dir_all({:?}): {}", test_dir, e))?;

        let data = b"storage-health-check";
        fs::write(&test_file, data)
            .await
            .map_err(|e| format!("write({:?}): {}", test_file, e))?;

        let read_data = fs::read(&test_file)
            .await
            .map_err(|e| format!("read({:?}): {}", test_file, e))?;
        if read_data != data {
            return Err("read-back mismatch".to_string());
        }

        fs::remove_file(&test_file)
            .await
            .map_err(|e| format!("remove_file({:?}): {}", test_file, e))?;
        let _ = fs::remove_dir(&test_dir).await;

        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn put(&self, key: &str, data: &[u8]) -> Result<String> {
        let full_path = self.full_path(key)?;
        debug!(storage_key = %key, full_path = %full_path.display(), size = data.len(), "file_storage: put");

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                warn!(parent = %parent.display(), error = %e, "file_storage: create_dir_all failed");
                e
            })?;
        }

        // Atomic write: temp file + rename
        let temp_path = full_path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            warn!(temp_path = %temp_path.display(), error = %e, "file_storage: File::create failed");
            e
        })?;
        file.write_all(data).await.map_err(|e| {
            warn!(error = %e, "file_storage: write_all failed");
            e
        })?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &full_path).await.map_err(|e| {
            warn!(from = %temp_path.display(), to = %full_path.display(), error = %e, "file_storage: rename failed");
            e
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&full_path, std::fs::Permissions::from_mode(0o644)).await?;
        }

        Ok(self.public_url(key))
    }
}

/// Build a unique key `{prefix}/{uuid}-{name}` with a filesystem-safe name.
pub fn storage_key(prefix: &str, file_name: &str) -> String {
    let prefix: Vec<String> = prefix
        .split('/')
        .filter(|s| !s.is_empty())
        .map(sanitize_segment)
        .collect();
    let name = sanitize_segment(file_name);
    let leaf = format!("{}-{}", Uuid::now_v7(), name);
    if prefix.is_empty() {
        leaf
    } else {
        format!("{}/{}", prefix.join("/"), leaf)
    }
}

fn sanitize_segment(segment: &str) -> String {
    let cleaned: String = segment
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_matches('.').to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}
