//! Error types for the Medfolio client.

use thiserror::Error;

use crate::api::ApiError;

/// A shared error type for the entire Medfolio client.
///
/// Backend failures arrive as [`ApiError`] and keep their human-readable
/// message; everything else is local (storage, config, input validation).
#[derive(Error, Debug, Clone)]
pub enum MedfolioError {
    /// The backend rejected the request or could not be reached.
    #[error("{0}")]
    Api(ApiError),

    /// Credential exchange failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// No session is active.
    #[error("Not signed in")]
    Unauthenticated,

    /// A local lookup (row, schedule entry) found nothing.
    #[error("No {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Local file system failure (state file, selected document).
    #[error("IO error: {message}")]
    Io { message: String },

    /// A state or config file could not be encoded or decoded.
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Bad `config.toml`, environment value, or flag.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An action is already in flight for the same target.
    #[error("Already in progress: {0}")]
    Busy(String),

    /// The user supplied something the client will not send.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The user declined a confirmation prompt.
    #[error("Cancelled")]
    Cancelled,

    /// A broken client invariant.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MedfolioError {
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api(_))
    }

    /// Returns the retry cooldown carried by a backend error, if any.
    pub fn cooldown_seconds(&self) -> Option<u64> {
        match self {
            Self::Api(err) => err.cooldown_seconds,
            _ => None,
        }
    }

    /// Message suitable for a transient notification.
    ///
    /// Backend messages are shown verbatim; local errors use their display form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.message.clone(),
            Self::Auth(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<ApiError> for MedfolioError {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

impl From<std::io::Error> for MedfolioError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for MedfolioError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for MedfolioError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for MedfolioError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for MedfolioError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, MedfolioError>`.
pub type Result<T> = std::result::Result<T, MedfolioError>;
