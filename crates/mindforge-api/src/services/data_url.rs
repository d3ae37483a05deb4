//! `data:` URL decoding for base64 uploads.

use base64::Engine;

use mindforge_core::{Error, Result};

/// A decoded upload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBlob {
    pub mime: Option<String>,
    pub data: Vec<u8>,
}

impl DecodedBlob {
    /// File extension from the declared MIME type, else sniffed from the
    /// bytes, else `bin`.
    pub fn extension(&self) -> &'static str {
        let declared = self.mime.as_deref().and_then(|mime| match mime {
            "image/png" => Some("png"),
            "image/jpeg" | "image/jpg" => Some("jpg"),
            "image/gif" => Some("gif"),
            "image/webp" => Some("webp"),
            "application/pdf" => Some("pdf"),
            "text/plain" => Some("txt"),
            _ => None,
        });
        declared
            .or_else(|| infer::get(&self.data).map(|kind| kind.extension()))
            .unwrap_or("bin")
    }
}

/// Decode `data:<mime>;base64,<payload>`. A bare base64 string is accepted
/// too, matching clients that strip the header.
pub fn decode(input: &str) -> Result<DecodedBlob> {
    let input = input.trim();
    let (mime, payload) = match input.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| Error::InvalidInput("malformed data URL".to_string()))?;
            if !header.ends_with(";base64") {
                return Err(Error::InvalidInput(
                    "only base64 data URLs are supported".to_string(),
                ));
            }
            let mime = header.trim_end_matches(";base64");
            ((!mime.is_empty()).then(|| mime.to_string()), payload)
        }
        None => (None, input),
    };

    let data = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::InvalidInput(format!("invalid base64 payload: {e}")))?;
    if data.is_empty() {
        return Err(Error::InvalidInput("empty upload".to_string()));
    }
    Ok(DecodedBlob { mime, data })
}
