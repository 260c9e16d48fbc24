//! Upload validation
//!
//! Checks an uploaded file against an [`UploadPolicy`] before anything is
//! written to disk. The declared content type, the file extension and the
//! magic bytes must all agree on one allowed image kind.

use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::crypto::sha256_hex;

/// Image formats accepted for product pictures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageKind {
    pub const ALL: [ImageKind; 4] = [
        ImageKind::Png,
        ImageKind::Jpeg,
        ImageKind::Gif,
        ImageKind::Webp,
    ];

    pub fn mime(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Gif => "image/gif",
            ImageKind::Webp => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpg",
            ImageKind::Gif => "gif",
            ImageKind::Webp => "webp",
        }
    }

    fn accepts_extension(&self, ext: &str) -> bool {
        match self {
            ImageKind::Jpeg => ext == "jpg" || ext == "jpeg",
            other => ext == other.extension(),
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.mime().eq_ignore_ascii_case(essence))
    }

    /// Identify the format from the leading bytes
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageKind::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageKind::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageKind::Gif)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageKind::Webp)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_bytes: usize,
    pub allowed: Vec<ImageKind>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 5 * 1024 * 1024,
            allowed: ImageKind::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("Uploaded file is empty")]
    Empty,

    #[error("Uploaded file is {actual} bytes, the limit is {max}")]
    TooLarge { max: usize, actual: usize },

    #[error("Content type {0} is not allowed")]
    UnsupportedType(String),

    #[error("File contents do not match the declared type")]
    ContentMismatch,

    #[error("File extension does not match the declared type")]
    ExtensionMismatch,
}

impl UploadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UploadError::Empty | UploadError::ExtensionMismatch => ErrorKind::BadRequest,
            UploadError::TooLarge { .. } => ErrorKind::PayloadTooLarge,
            UploadError::UnsupportedType(_) | UploadError::ContentMismatch => {
                ErrorKind::UnsupportedMediaType
            }
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        if err == UploadError::ContentMismatch {
            tracing::warn!("Upload rejected: magic bytes do not match declared type");
        }
        AppError::new(err.kind(), err.to_string()).with_param("image")
    }
}

/// An upload that passed every check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedImage {
    pub kind: ImageKind,
    /// Content-addressed name, `<sha256>.<ext>`
    pub file_name: String,
    pub size: usize,
}

/// Validate an uploaded image
///
/// `declared_type` is the part's `Content-Type`, `original_name` the client
/// supplied file name. The client name is only used for its extension and
/// never reaches the filesystem.
pub fn validate_image(
    policy: &UploadPolicy,
    declared_type: Option<&str>,
    original_name: Option<&str>,
    bytes: &[u8],
) -> Result<ValidatedImage, UploadError> {
    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    if bytes.len() > policy.max_bytes {
        return Err(UploadError::TooLarge {
            max: policy.max_bytes,
            actual: bytes.len(),
        });
    }

    let declared = declared_type.unwrap_or("application/octet-stream");
    let kind = ImageKind::from_mime(declared)
        .filter(|kind| policy.allowed.contains(kind))
        .ok_or_else(|| UploadError::UnsupportedType(declared.to_string()))?;

    if ImageKind::sniff(bytes) != Some(kind) {
        return Err(UploadError::ContentMismatch);
    }

    if let Some(name) = original_name {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !kind.accepts_extension(&ext) {
            return Err(UploadError::ExtensionMismatch);
        }
    }

    Ok(ValidatedImage {
        kind,
        file_name: format!("{}.{}", sha256_hex(bytes), kind.extension()),
        size: bytes.len(),
    })
}
