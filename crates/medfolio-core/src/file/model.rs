use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing status of an uploaded document.
///
/// The backend owns transitions; the observed order is
/// `uploaded -> awaiting_review -> accepted`, and a retry may move a
/// non-accepted file back to `awaiting_review`. Unrecognized values are kept
/// verbatim; a null status reads as `Pending`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum FileStatus {
    Pending,
    Uploaded,
    Processing,
    AwaitingReview,
    Accepted,
    Failed,
    Other(String),
}

impl FileStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::AwaitingReview => "awaiting_review",
            Self::Accepted => "accepted",
            Self::Failed => "failed",
            Self::Other(value) => value,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Review/accept is offered only until the extraction is accepted.
    pub fn allows_review(&self) -> bool {
        !self.is_accepted()
    }

    /// Retry is offered only until the extraction is accepted.
    pub fn allows_retry(&self) -> bool {
        !self.is_accepted()
    }

    /// Maps the status onto the fixed badge vocabulary.
    pub fn badge(&self) -> StatusBadge {
        let (label, style) = match self {
            Self::Pending => ("Pending", BadgeStyle::Neutral),
            Self::Uploaded => ("Uploaded", BadgeStyle::Info),
            Self::Processing => ("Processing", BadgeStyle::Info),
            Self::AwaitingReview => ("Awaiting review", BadgeStyle::Warning),
            Self::Accepted => ("Accepted", BadgeStyle::Success),
            Self::Failed => ("Failed", BadgeStyle::Danger),
            Self::Other(value) => {
                return StatusBadge {
                    label: value.clone(),
                    style: BadgeStyle::Neutral,
                };
            }
        };
        StatusBadge {
            label: label.to_string(),
            style,
        }
    }
}

impl From<String> for FileStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "uploaded" => Self::Uploaded,
            "processing" => Self::Processing,
            "awaiting_review" => Self::AwaitingReview,
            "accepted" => Self::Accepted,
            "failed" | "error" => Self::Failed,
            _ => Self::Other(value),
        }
    }
}

impl From<Option<String>> for FileStatus {
    fn from(value: Option<String>) -> Self {
        value.map(Self::from).unwrap_or_default()
    }
}

impl From<FileStatus> for String {
    fn from(status: FileStatus) -> Self {
        status.as_str().to_string()
    }
}

impl Default for FileStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual weight of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeStyle {
    Neutral,
    Info,
    Warning,
    Success,
    Danger,
}

/// Label/style pair rendered next to a file row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBadge {
    pub label: String,
    pub style: BadgeStyle,
}

/// A file record from `/files/*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub status: FileStatus,
    /// Storage reference. Not directly fetchable; use a presigned URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<String>,
}

impl UploadedFile {
    /// Name shown in lists: the display name, else the stored filename
    /// without its server-side unique prefix.
    pub fn label(&self) -> &str {
        if let Some(name) = self.display_name.as_deref() {
            if !name.trim().is_empty() {
                return name;
            }
        }
        original_filename(&self.filename)
    }
}

/// Strips a `<uuid>_` prefix the backend adds to stored object keys.
fn original_filename(stored: &str) -> &str {
    match stored.split_once('_') {
        Some((prefix, rest)) if prefix.len() == 36 && uuid::Uuid::parse_str(prefix).is_ok() => {
            rest
        }
        _ => stored,
    }
}

/// Response of `GET /files/{id}/presign`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresignedUrl {
    pub presigned_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}
