//! ScheduleView - medication schedule derived from accepted documents.

use std::sync::Arc;

use medfolio_core::file::PresignedUrl;
use medfolio_core::schedule::ScheduleEntry;
use medfolio_core::{BackendApi, MedfolioError, Result};
use tokio::sync::RwLock;

use crate::mount::MountGuard;

#[derive(Debug, Default)]
struct ScheduleState {
    loaded: bool,
    entries: Vec<ScheduleEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleView {
    state: Arc<RwLock<ScheduleState>>,
    mount: MountGuard,
}

impl ScheduleView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn refresh(&self, api: &dyn BackendApi, token: &str) -> Result<()> {
        let ticket = self.mount.ticket();
        let entries = api.get_schedule(token).await?;
        if !self.mount.is_current(ticket) {
            tracing::debug!("[ScheduleView] Discarding stale schedule");
            return Ok(());
        }
        *self.state.write().await = ScheduleState {
            loaded: true,
            entries,
        };
        Ok(())
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.loaded
    }

    pub async fn entries(&self) -> Vec<ScheduleEntry> {
        self.state.read().await.entries.clone()
    }

    /// Presigns the document a schedule row was extracted from.
    pub async fn open_source(
        &self,
        api: &dyn BackendApi,
        token: &str,
        index: usize,
    ) -> Result<PresignedUrl> {
        let entry = self
            .state
            .read()
            .await
            .entries
            .get(index)
            .cloned()
            .ok_or_else(|| MedfolioError::not_found("schedule entry", (index + 1).to_string()))?;
        let file_id = entry.file_id.as_deref().ok_or_else(|| {
            MedfolioError::invalid_input(format!("{} has no source document", entry.name))
        })?;
        Ok(api.presign_file(token, file_id).await?)
    }
}
