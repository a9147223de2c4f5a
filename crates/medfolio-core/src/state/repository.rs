//! State repository trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::state::model::PersistedState;
use crate::view::View;

/// Durable storage for [`PersistedState`].
///
/// The convenience methods are implemented on top of `load`/`save`; storage
/// backends only provide those two.
#[async_trait]
pub trait StateRepository: Send + Sync {
    async fn load(&self) -> Result<PersistedState>;

    async fn save(&self, state: &PersistedState) -> Result<()>;

    async fn set_credentials(&self, token: &str, email: &str) -> Result<()> {
        let mut state = self.load().await?;
        state.set_credentials(token, email);
        self.save(&state).await
    }

    async fn set_view(&self, view: View) -> Result<()> {
        let mut state = self.load().await?;
        state.view = Some(view);
        self.save(&state).await
    }

    async fn clear_session(&self) -> Result<()> {
        let mut state = self.load().await?;
        state.clear_session();
        self.save(&state).await
    }
}
