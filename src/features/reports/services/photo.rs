use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::{Digest, Sha256};

use crate::core::error::{AppError, Result};
use crate::shared::validation::DATA_URL_REGEX;

/// Which side of the fix a photo documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoKind {
    Before,
    After,
}

impl PhotoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoKind::Before => "before",
            PhotoKind::After => "after",
        }
    }
}

/// A decoded photo ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub extension: &'static str,
}

impl PhotoUpload {
    /// Object key: `<prefix>/<ticket>/<kind>-<first 16 hex of sha256>.<ext>`
    pub fn object_key(&self, prefix: &str, ticket_number: &str, kind: PhotoKind) -> String {
        let digest = hex::encode(Sha256::digest(&self.bytes));
        format!(
            "{}/{}/{}-{}.{}",
            prefix.trim_end_matches('/'),
            ticket_number,
            kind.as_str(),
            &digest[..16],
            self.extension
        )
    }
}

/// Where report photos end up
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Store the photo and return a URL clients can load it from
    async fn store(&self, ticket_number: &str, kind: PhotoKind, photo: PhotoUpload)
        -> Result<String>;

    /// Delete a photo previously returned by `store`
    async fn remove(&self, url: &str) -> Result<()>;
}

fn image_type_for_mime(mime: &str) -> Option<(&'static str, &'static str)> {
    match mime {
        "image/jpeg" | "image/jpg" => Some(("image/jpeg", "jpg")),
        "image/png" => Some(("image/png", "png")),
        "image/webp" => Some(("image/webp", "webp")),
        "image/gif" => Some(("image/gif", "gif")),
        _ => None,
    }
}

fn sniff_image_type(bytes: &[u8]) -> Option<(&'static str, &'static str)> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(("image/jpeg", "jpg"))
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some(("image/png", "png"))
    } else if bytes.starts_with(b"GIF8") {
        Some(("image/gif", "gif"))
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some(("image/webp", "webp"))
    } else {
        None
    }
}

/// Decode a photo sent either as a `data:` URL or as bare base64.
///
/// Data URLs must declare a supported image type; bare payloads are
/// identified from their magic bytes.
pub fn decode_photo(input: &str) -> Result<PhotoUpload> {
    let input = input.trim();

    let (declared, payload) = match DATA_URL_REGEX.captures(input) {
        Some(caps) => {
            let mime = caps.name("mime").map(|m| m.as_str()).unwrap_or_default();
            let declared = image_type_for_mime(mime).ok_or_else(|| {
                AppError::Validation(format!("Unsupported photo type: {}", mime))
            })?;
            let header_len = caps.get(0).map(|m| m.end()).unwrap_or(0);
            (Some(declared), &input[header_len..])
        }
        None => (None, input),
    };

    let bytes = STANDARD
        .decode(payload)
        .map_err(|_| AppError::Validation("Photo is not valid base64".to_string()))?;

    if bytes.is_empty() {
        return Err(AppError::Validation("Photo is empty".to_string()));
    }

    let (content_type, extension) = declared
        .or_else(|| sniff_image_type(&bytes))
        .ok_or_else(|| {
            AppError::Validation(
                "Photo must be a JPEG, PNG, WebP or GIF image".to_string(),
            )
        })?;

    Ok(PhotoUpload {
        bytes,
        content_type,
        extension,
    })
}
