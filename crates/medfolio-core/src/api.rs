//! Backend API contract.
//!
//! [`BackendApi`] is the seam between the application layer and the HTTP
//! transport. Every method issues exactly one request. Authorized calls take
//! the bearer token explicitly; the client never stores it here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::chat::ChatReply;
use crate::file::{Extraction, PresignedUrl, UploadedFile};
use crate::profile::{MedicalProfile, MedicalProfileFields, MedicalProfilePatch};
use crate::schedule::ScheduleEntry;
use crate::user::{NewUser, TokenResponse, User};

/// How a backend call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "code", rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// The request never produced a response.
    Transport,
    /// The server answered with a non-2xx status.
    Status(u16),
    /// A 2xx response whose body could not be decoded.
    Decode,
}

/// A failed backend call with a best-effort human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    /// Seconds until the operation may be retried, when the server says so.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_seconds: Option<u64>,
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Transport,
            message: message.into(),
            cooldown_seconds: None,
        }
    }

    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Status(code),
            message: message.into(),
            cooldown_seconds: None,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Decode,
            message: message.into(),
            cooldown_seconds: None,
        }
    }

    pub fn with_cooldown(mut self, seconds: Option<u64>) -> Self {
        self.cooldown_seconds = seconds;
        self
    }

    /// HTTP status code, if the server responded.
    pub fn status_code(&self) -> Option<u16> {
        match self.kind {
            ApiErrorKind::Status(code) => Some(code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// A local document to send to `POST /files/upload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub path: PathBuf,
    /// Name sent as the multipart filename (defaults to the path's file name).
    pub filename: String,
    pub display_name: Option<String>,
}

impl UploadRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "uploaded_file".to_string());
        Self {
            path,
            filename,
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, display_name: Option<String>) -> Self {
        self.display_name = display_name.filter(|name| !name.trim().is_empty());
        self
    }
}

/// One method per backend operation.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// `POST /auth/register`
    async fn register(&self, user: &NewUser) -> ApiResult<User>;

    /// `POST /auth/login` with a form-urlencoded body.
    async fn login(&self, email: &str, password: &str) -> ApiResult<TokenResponse>;

    /// `GET /auth/me`
    async fn get_me(&self, token: &str) -> ApiResult<User>;

    /// `POST /files/upload` (multipart)
    async fn upload_document(&self, token: &str, upload: &UploadRequest)
    -> ApiResult<UploadedFile>;

    /// `GET /files/`
    async fn get_files(&self, token: &str) -> ApiResult<Vec<UploadedFile>>;

    /// `GET /files/{id}/presign`
    async fn presign_file(&self, token: &str, file_id: &str) -> ApiResult<PresignedUrl>;

    /// `GET /profile/medical-profile`. A 404 is `Ok(None)`.
    async fn get_medical_profile(&self, token: &str) -> ApiResult<Option<MedicalProfile>>;

    /// `POST /profile/medical-profile`
    async fn create_medical_profile(
        &self,
        token: &str,
        fields: &MedicalProfileFields,
    ) -> ApiResult<MedicalProfile>;

    /// `PUT /profile/medical-profile`
    async fn update_medical_profile(
        &self,
        token: &str,
        fields: &MedicalProfileFields,
    ) -> ApiResult<MedicalProfile>;

    /// `PATCH /profile/medical-profile`
    async fn patch_medical_profile(
        &self,
        token: &str,
        patch: &MedicalProfilePatch,
    ) -> ApiResult<MedicalProfile>;

    /// `GET /files/{id}/extraction`
    async fn get_extraction(&self, token: &str, file_id: &str) -> ApiResult<Extraction>;

    /// `POST /files/{id}/extraction/accept`
    async fn accept_extraction(
        &self,
        token: &str,
        file_id: &str,
        payload: Option<&Extraction>,
    ) -> ApiResult<UploadedFile>;

    /// `POST /files/{id}/retry`
    async fn retry_extraction(&self, token: &str, file_id: &str) -> ApiResult<UploadedFile>;

    /// `DELETE /files/{id}`
    async fn delete_file(&self, token: &str, file_id: &str) -> ApiResult<serde_json::Value>;

    /// `GET /files/schedule`
    async fn get_schedule(&self, token: &str) -> ApiResult<Vec<ScheduleEntry>>;

    /// `POST /chat/`
    async fn chat(&self, token: &str, message: &str) -> ApiResult<ChatReply>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_request_uses_file_name() {
        let req = UploadRequest::new("/tmp/docs/rx.pdf");
        assert_eq!(req.filename, "rx.pdf");
        assert!(req.display_name.is_none());
    }

    #[test]
    fn test_blank_display_name_is_dropped() {
        let req = UploadRequest::new("rx.pdf").with_display_name(Some("  ".into()));
        assert!(req.display_name.is_none());
        let req = UploadRequest::new("rx.pdf").with_display_name(Some("March Rx".into()));
        assert_eq!(req.display_name.as_deref(), Some("March Rx"));
    }

    #[test]
    fn test_status_helpers() {
        assert!(ApiError::status(404, "Medical profile not found").is_not_found());
        assert!(ApiError::status(401, "Not authenticated").is_unauthorized());
        assert_eq!(ApiError::transport("connection refused").status_code(), None);
    }
}
