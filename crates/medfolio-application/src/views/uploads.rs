//! UploadsList - uploaded documents and their per-row actions.
//!
//! Row lifecycle:
//! - `pending -> reviewing -> accepted`, or back to `pending` when the
//!   review is closed
//! - `pending -> retrying -> pending`
//! - `pending -> deleting -> removed`
//!
//! Every action marks its row busy for the duration of the request. Rows are
//! independent, so actions on different files may be in flight together.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use medfolio_core::file::{Extraction, FileStatus, StatusBadge, UploadedFile};
use medfolio_core::{BackendApi, MedfolioError, Result};
use tokio::sync::RwLock;

use crate::busy::{BusyMap, BusyMapGuard};
use crate::mount::MountGuard;
use crate::views::ViewOutcome;

/// The action a row is busy with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowAction {
    Reviewing,
    Accepting,
    Retrying,
    Deleting,
}

impl fmt::Display for RowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Reviewing => "loading review",
            Self::Accepting => "accepting",
            Self::Retrying => "retrying",
            Self::Deleting => "deleting",
        };
        f.write_str(label)
    }
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRow {
    pub file: UploadedFile,
    pub badge: StatusBadge,
    pub busy: Option<RowAction>,
    pub review: Option<Extraction>,
}

impl UploadRow {
    pub fn label(&self) -> &str {
        self.file.label()
    }

    pub fn can_review(&self) -> bool {
        self.busy.is_none() && self.file.status.allows_review()
    }

    pub fn can_accept(&self) -> bool {
        self.can_review()
    }

    pub fn can_retry(&self) -> bool {
        self.busy.is_none() && self.file.status.allows_retry()
    }

    pub fn can_delete(&self) -> bool {
        self.busy.is_none()
    }

    pub fn is_reviewing(&self) -> bool {
        self.review.is_some()
    }
}

#[derive(Debug, Default)]
struct UploadsState {
    loaded: bool,
    files: Vec<UploadedFile>,
    reviews: HashMap<String, Extraction>,
    /// Ids deleted in this session. A refresh that started before the delete
    /// finished must not bring them back.
    removed: HashSet<String>,
}

impl UploadsState {
    fn replace(&mut self, updated: UploadedFile) {
        if let Some(slot) = self.files.iter_mut().find(|file| file.id == updated.id) {
            *slot = updated;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UploadsList {
    state: Arc<RwLock<UploadsState>>,
    busy: BusyMap<String, RowAction>,
    mount: MountGuard,
}

impl UploadsList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reloads the file list. A result that lands after [`Self::unmount`] is
    /// dropped.
    pub async fn refresh(&self, api: &dyn BackendApi, token: &str) -> Result<()> {
        let ticket = self.mount.ticket();
        let files = api.get_files(token).await?;
        if !self.mount.is_current(ticket) {
            tracing::debug!("[UploadsList] Discarding stale file list");
            return Ok(());
        }

        let mut state = self.state.write().await;
        let removed = &state.removed;
        let files: Vec<UploadedFile> = files
            .into_iter()
            .filter(|file| !removed.contains(&file.id))
            .collect();
        state.reviews.retain(|id, _| {
            files
                .iter()
                .any(|file| &file.id == id && !file.status.is_accepted())
        });
        state.files = files;
        state.loaded = true;
        Ok(())
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.loaded
    }

    pub async fn rows(&self) -> Vec<UploadRow> {
        let state = self.state.read().await;
        state
            .files
            .iter()
            .map(|file| UploadRow {
                file: file.clone(),
                badge: file.status.badge(),
                busy: self.busy.get(&file.id),
                review: state.reviews.get(&file.id).cloned(),
            })
            .collect()
    }

    pub async fn row(&self, file_id: &str) -> Option<UploadRow> {
        self.rows()
            .await
            .into_iter()
            .find(|row| row.file.id == file_id)
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.files.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Id of the file at a rendered row index.
    pub async fn id_at(&self, index: usize) -> Option<String> {
        self.state
            .read()
            .await
            .files
            .get(index)
            .map(|file| file.id.clone())
    }

    /// Checks that `action` is offered for the row and marks it busy.
    async fn begin(
        &self,
        file_id: &str,
        action: RowAction,
        allowed: fn(&FileStatus) -> bool,
    ) -> Result<BusyMapGuard<String, RowAction>> {
        let (label, status) = {
            let state = self.state.read().await;
            let file = state
                .files
                .iter()
                .find(|file| file.id == file_id)
                .ok_or_else(|| MedfolioError::not_found("file", file_id))?;
            (file.label().to_string(), file.status.clone())
        };

        if !allowed(&status) {
            return Err(MedfolioError::invalid_input(format!(
                "{label} is already {status}"
            )));
        }

        self.busy
            .try_begin(file_id.to_string(), action)
            .map_err(|current| MedfolioError::Busy(format!("{label} is {current}")))
    }

    /// Loads the extraction into the row's review slot.
    pub async fn review(
        &self,
        api: &dyn BackendApi,
        token: &str,
        file_id: &str,
    ) -> Result<Extraction> {
        let _guard = self
            .begin(file_id, RowAction::Reviewing, FileStatus::allows_review)
            .await?;
        let extraction = api.get_extraction(token, file_id).await?;
        self.state
            .write()
            .await
            .reviews
            .insert(file_id.to_string(), extraction.clone());
        Ok(extraction)
    }

    /// Replaces the reviewed payload with an edited one.
    pub async fn edit_review(&self, file_id: &str, extraction: Extraction) -> Result<()> {
        let mut state = self.state.write().await;
        match state.reviews.get_mut(file_id) {
            Some(slot) => {
                *slot = extraction;
                Ok(())
            }
            None => Err(MedfolioError::not_found("review", file_id)),
        }
    }

    /// Closes the review without accepting.
    pub async fn close_review(&self, file_id: &str) {
        self.state.write().await.reviews.remove(file_id);
    }

    /// Accepts the extraction, sending the reviewed payload if one is open.
    pub async fn accept(
        &self,
        api: &dyn BackendApi,
        token: &str,
        file_id: &str,
    ) -> Result<ViewOutcome> {
        let _guard = self
            .begin(file_id, RowAction::Accepting, FileStatus::allows_review)
            .await?;
        let payload = self.state.read().await.reviews.get(file_id).cloned();
        let updated = api
            .accept_extraction(token, file_id, payload.as_ref())
            .await?;

        tracing::info!(file_id, status = %updated.status, "[UploadsList] Extraction accepted");
        let mut state = self.state.write().await;
        state.reviews.remove(file_id);
        state.replace(updated);
        Ok(ViewOutcome::FilesChanged)
    }

    /// Re-runs extraction. A cooldown rejection comes back as the backend's
    /// message.
    pub async fn retry(
        &self,
        api: &dyn BackendApi,
        token: &str,
        file_id: &str,
    ) -> Result<UploadedFile> {
        let _guard = self
            .begin(file_id, RowAction::Retrying, FileStatus::allows_retry)
            .await?;
        let updated = match api.retry_extraction(token, file_id).await {
            Ok(updated) => updated,
            Err(err) => {
                if let Some(seconds) = err.cooldown_seconds {
                    tracing::info!(file_id, seconds, "[UploadsList] Retry on cooldown");
                }
                return Err(err.into());
            }
        };
        self.state.write().await.replace(updated.clone());
        Ok(updated)
    }

    /// Deletes the file. Nothing is sent unless `confirmed`.
    pub async fn delete(
        &self,
        api: &dyn BackendApi,
        token: &str,
        file_id: &str,
        confirmed: bool,
    ) -> Result<ViewOutcome> {
        if !confirmed {
            return Err(MedfolioError::Cancelled);
        }
        let _guard = self
            .begin(file_id, RowAction::Deleting, |_| true)
            .await?;
        api.delete_file(token, file_id).await?;

        tracing::info!(file_id, "[UploadsList] File deleted");
        let mut state = self.state.write().await;
        state.files.retain(|file| file.id != file_id);
        state.reviews.remove(file_id);
        state.removed.insert(file_id.to_string());
        Ok(ViewOutcome::FilesChanged)
    }
}
