//! Client-side upload hint.
//!
//! Enforcement is server-side (magic-number and size checks); the client only
//! warns so the user can pick a supported document before submitting.

use std::path::Path;

/// Largest upload the backend accepts.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "pdf"];

/// Outcome of checking a local file against the upload hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadHint {
    Ok,
    UnsupportedType(String),
    TooLarge(u64),
}

impl UploadHint {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    pub fn message(&self) -> Option<String> {
        match self {
            Self::Ok => None,
            Self::UnsupportedType(ext) => Some(format!(
                "'{ext}' files are usually rejected; supported types are PNG, JPEG and PDF"
            )),
            Self::TooLarge(size) => Some(format!(
                "File is {:.1} MB; the limit is 5 MB",
                *size as f64 / (1024.0 * 1024.0)
            )),
        }
    }
}

/// Checks a path and size against the supported types and size limit.
pub fn upload_hint(path: &Path, size: u64) -> UploadHint {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return UploadHint::UnsupportedType(ext);
    }
    if size > MAX_UPLOAD_BYTES {
        return UploadHint::TooLarge(size);
    }
    UploadHint::Ok
}
