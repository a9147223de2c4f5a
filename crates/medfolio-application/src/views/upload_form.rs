//! UploadForm - single-document upload.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use medfolio_core::file::{UploadHint, UploadedFile, upload_hint};
use medfolio_core::{BackendApi, MedfolioError, Result, UploadRequest};
use tokio::sync::RwLock;

use crate::busy::BusyFlag;
use crate::views::ViewOutcome;

/// The file picked for upload and what the client thinks of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub size: u64,
    pub hint: UploadHint,
}

#[derive(Debug, Default)]
struct FormState {
    selected: Option<SelectedFile>,
    display_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    state: Arc<RwLock<FormState>>,
    busy: BusyFlag,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks a local file, replacing any earlier choice.
    ///
    /// Unsupported types and oversized files are accepted with a warning
    /// hint; the server has the final say.
    pub async fn select(&self, path: impl AsRef<Path>) -> Result<SelectedFile> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await.map_err(|err| {
            MedfolioError::invalid_input(format!("Cannot open {}: {err}", path.display()))
        })?;
        if !metadata.is_file() {
            return Err(MedfolioError::invalid_input(format!(
                "{} is not a file",
                path.display()
            )));
        }

        let selected = SelectedFile {
            path: path.to_path_buf(),
            size: metadata.len(),
            hint: upload_hint(path, metadata.len()),
        };
        self.state.write().await.selected = Some(selected.clone());
        Ok(selected)
    }

    pub async fn set_display_name(&self, name: Option<String>) {
        self.state.write().await.display_name = name.filter(|n| !n.trim().is_empty());
    }

    pub async fn selected(&self) -> Option<SelectedFile> {
        self.state.read().await.selected.clone()
    }

    pub async fn display_name(&self) -> Option<String> {
        self.state.read().await.display_name.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub async fn can_submit(&self) -> bool {
        !self.busy.is_busy() && self.state.read().await.selected.is_some()
    }

    pub async fn reset(&self) {
        *self.state.write().await = FormState::default();
    }

    /// Uploads the selected file and clears the form.
    ///
    /// The form keeps its selection when the upload fails so the user can
    /// try again.
    pub async fn submit(
        &self,
        api: &dyn BackendApi,
        token: &str,
    ) -> Result<(UploadedFile, ViewOutcome)> {
        let _guard = self
            .busy
            .try_begin()
            .ok_or_else(|| MedfolioError::Busy("upload".into()))?;

        let request = {
            let state = self.state.read().await;
            let selected = state
                .selected
                .as_ref()
                .ok_or_else(|| MedfolioError::invalid_input("Choose a file to upload"))?;
            UploadRequest::new(&selected.path).with_display_name(state.display_name.clone())
        };

        tracing::info!(filename = %request.filename, "[UploadForm] Uploading");
        let file = api.upload_document(token, &request).await?;
        self.reset().await;
        Ok((file, ViewOutcome::FilesChanged))
    }
}
