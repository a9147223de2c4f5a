//! Client state that persists across restarts.

use serde::{Deserialize, Serialize};

use crate::view::View;

/// Durable key-value state.
///
/// `user` is the legacy shape: a JSON-encoded user object written by older
/// clients. Only its `email` is read back; new writes use `email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PersistedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<View>,
}

/// Token and email recovered from [`PersistedState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredCredentials {
    pub token: String,
    pub email: String,
}

#[derive(Deserialize)]
struct LegacyUser {
    #[serde(default)]
    email: Option<String>,
}

impl PersistedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a fresh token/email pair and drops the legacy user value.
    pub fn set_credentials(&mut self, token: impl Into<String>, email: impl Into<String>) {
        self.token = Some(token.into());
        self.email = Some(email.into());
        self.user = None;
    }

    /// Removes everything tied to the session, including the last view.
    pub fn clear_session(&mut self) {
        self.token = None;
        self.email = None;
        self.user = None;
        self.view = None;
    }

    /// Recovers the persisted credentials, if a token is present.
    ///
    /// The email comes from `email`, else from the legacy JSON `user` value;
    /// an unreadable legacy value yields an empty email.
    pub fn credentials(&self) -> Option<RestoredCredentials> {
        let token = self.token.as_deref().filter(|t| !t.trim().is_empty())?;
        let email = self
            .email
            .clone()
            .filter(|e| !e.is_empty())
            .or_else(|| self.legacy_email())
            .unwrap_or_default();
        Some(RestoredCredentials {
            token: token.to_string(),
            email,
        })
    }

    fn legacy_email(&self) -> Option<String> {
        let raw = self.user.as_deref()?;
        serde_json::from_str::<LegacyUser>(raw)
            .ok()
            .and_then(|legacy| legacy.email)
    }
}
