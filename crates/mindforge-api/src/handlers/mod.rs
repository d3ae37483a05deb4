//! HTTP handlers, one module per resource.

pub mod admin;
pub mod announcements;
pub mod auth;
pub mod calendar;
pub mod chat;
pub mod feedback;
pub mod forum;
pub mod notebooks;
pub mod notes;
pub mod sources;
pub mod system;
pub mod users;

use axum::extract::multipart::{Field, Multipart};
use serde::Deserialize;

use mindforge_core::PageRequest;

use crate::ApiError;

/// Raw `page`/`pageSize` query values; parsed leniently by [`PageRequest`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        PageRequest::parse(self.page.as_deref(), self.page_size.as_deref())
    }
}

/// A multipart form read into memory.
#[derive(Debug, Default)]
pub struct FormParts {
    pub fields: Vec<(String, String)>,
    pub files: Vec<UploadedFile>,
}

#[derive(Debug)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub data: Vec<u8>,
}

impl FormParts {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut parts = FormParts::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let data = read_bytes(field).await?;
                    parts.files.push(UploadedFile {
                        field: name,
                        file_name,
                        data,
                    });
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("invalid form field: {e}")))?;
                    parts.fields.push((name, value));
                }
            }
        }
        Ok(parts)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        let pos = self.files.iter().position(|f| f.field == name)?;
        Some(self.files.remove(pos))
    }
}

async fn read_bytes(field: Field<'_>) -> Result<Vec<u8>, ApiError> {
    field
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults() {
        let query = PageQuery {
            page: Some("abc".to_string()),
            page_size: Some("-3".to_string()),
        };
        assert_eq!(query.request(), PageRequest::default());

        let query = PageQuery {
            page: Some("2".to_string()),
            page_size: Some("500".to_string()),
        };
        let req = query.request();
        assert_eq!((req.page, req.page_size), (2, 100));
    }
}
