//! TOML-backed [`StateRepository`].

use async_trait::async_trait;
use medfolio_core::error::Result;
use medfolio_core::state::{PersistedState, StateRepository};
use medfolio_core::MedfolioError;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::paths::MedfolioPaths;
use crate::storage::AtomicTomlFile;

/// Persists client state to `state.toml` and caches it in memory.
///
/// The file holds the bearer token, so it is written owner-only.
#[derive(Clone)]
pub struct TomlStateRepository {
    file: Arc<AtomicTomlFile<PersistedState>>,
    cache: Arc<RwLock<Option<PersistedState>>>,
}

impl TomlStateRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicTomlFile::new(path).private()),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Uses the state file resolved by `paths`.
    pub fn from_paths(paths: &MedfolioPaths) -> Result<Self> {
        let path = paths
            .state_file()
            .map_err(|e| MedfolioError::config(e.to_string()))?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }
}

#[async_trait]
impl StateRepository for TomlStateRepository {
    async fn load(&self) -> Result<PersistedState> {
        {
            let cached = self.cache.read().await;
            if let Some(state) = cached.as_ref() {
                return Ok(state.clone());
            }
        }

        let file = Arc::clone(&self.file);
        let loaded = tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| MedfolioError::internal(format!("State load task failed: {e}")))??;

        *self.cache.write().await = Some(loaded.clone());
        Ok(loaded)
    }

    async fn save(&self, state: &PersistedState) -> Result<()> {
        let file = Arc::clone(&self.file);
        let next = state.clone();
        tokio::task::spawn_blocking(move || file.modify(|current| *current = next))
            .await
            .map_err(|e| MedfolioError::internal(format!("State save task failed: {e}")))??;

        *self.cache.write().await = Some(state.clone());
        tracing::debug!(path = %self.file.path().display(), "Saved client state");
        Ok(())
    }
}
