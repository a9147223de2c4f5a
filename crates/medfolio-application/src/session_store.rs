//! SessionStore - the authenticated identity and its persistence.
//!
//! The bearer token is persisted so that a restart resumes the session. There
//! is no expiry check; a token is used until the server rejects it.

use std::sync::Arc;

use medfolio_core::state::StateRepository;
use medfolio_core::user::{NewUser, Session, User};
use medfolio_core::{BackendApi, MedfolioError, Result};
use tokio::sync::RwLock;

pub struct SessionStore {
    api: Arc<dyn BackendApi>,
    repository: Arc<dyn StateRepository>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn new(api: Arc<dyn BackendApi>, repository: Arc<dyn StateRepository>) -> Self {
        Self {
            api,
            repository,
            current: RwLock::new(None),
        }
    }

    /// Loads a persisted session, if any.
    ///
    /// The stored token is trusted as-is; the user is rebuilt from the stored
    /// email (or the email inside a legacy serialized user).
    pub async fn restore(&self) -> Result<Option<Session>> {
        let state = self.repository.load().await?;
        let Some(credentials) = state.credentials() else {
            tracing::debug!("[SessionStore] No persisted session");
            return Ok(None);
        };

        let session = Session::new(credentials.token, User::from_email(credentials.email));
        tracing::info!(email = %session.user.email, "[SessionStore] Restored session");
        *self.current.write().await = Some(session.clone());
        Ok(Some(session))
    }

    /// Exchanges credentials for a token and fetches the profile.
    ///
    /// A failed profile fetch is not fatal: the session falls back to a user
    /// carrying only the email that was typed in.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let token = self
            .api
            .login(email, password)
            .await
            .map_err(|err| MedfolioError::Auth(err.message))?
            .access_token;

        let user = match self.api.get_me(&token).await {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!(error = %err, "[SessionStore] Profile fetch failed after login");
                User::from_email(email)
            }
        };

        self.repository.set_credentials(&token, &user.email).await?;
        let session = Session::new(token, user);
        tracing::info!(email = %session.user.email, "[SessionStore] Logged in");
        *self.current.write().await = Some(session.clone());
        Ok(session)
    }

    /// Creates an account. Does not log in.
    pub async fn register(&self, new_user: &NewUser) -> Result<User> {
        let user = self.api.register(new_user).await?;
        tracing::info!(email = %user.email, "[SessionStore] Registered");
        Ok(user)
    }

    /// Drops the session in memory and on disk.
    ///
    /// Always succeeds from the caller's point of view; a failure to clear
    /// the state file is logged.
    pub async fn logout(&self) {
        *self.current.write().await = None;
        if let Err(err) = self.repository.clear_session().await {
            tracing::warn!(error = %err, "[SessionStore] Failed to clear persisted session");
        }
        tracing::info!("[SessionStore] Logged out");
    }

    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|session| session.token.clone())
    }

    /// The token, or [`MedfolioError::Unauthenticated`].
    pub async fn require_token(&self) -> Result<String> {
        self.token().await.ok_or(MedfolioError::Unauthenticated)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }
}
