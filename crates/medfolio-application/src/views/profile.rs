//! Medical profile summary and editor.

use std::sync::Arc;

use medfolio_core::profile::{MedicalProfile, MedicalProfileFields, ProfileField};
use medfolio_core::{BackendApi, MedfolioError, Result};
use tokio::sync::RwLock;

use crate::busy::BusyFlag;
use crate::mount::MountGuard;

/// Entries shown in the summary grid before it is expanded.
pub const SUMMARY_CAP: usize = 4;

/// Characters of each value shown in the summary grid.
pub const PREVIEW_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub field: ProfileField,
    pub label: &'static str,
    pub preview: String,
    pub truncated: bool,
}

/// What the profile view renders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileSummary {
    /// `false` until the first successful load.
    pub loaded: bool,
    /// `false` when the backend has no profile for this user.
    pub has_profile: bool,
    pub rows: Vec<SummaryRow>,
    /// Filled fields left out of `rows` because the grid is collapsed.
    pub hidden: usize,
}

fn preview(value: &str) -> (String, bool) {
    let value = value.trim();
    if value.chars().count() <= PREVIEW_CHARS {
        (value.to_string(), false)
    } else {
        let cut: String = value.chars().take(PREVIEW_CHARS).collect();
        (format!("{}…", cut.trim_end()), true)
    }
}

#[derive(Debug, Default)]
struct ProfileState {
    /// Outer `None`: never loaded. Inner `None`: loaded, no profile yet.
    profile: Option<Option<MedicalProfile>>,
    expanded: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileView {
    state: Arc<RwLock<ProfileState>>,
    mount: MountGuard,
}

impl ProfileView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the profile. A result that lands after [`Self::unmount`] is
    /// dropped.
    pub async fn refresh(&self, api: &dyn BackendApi, token: &str) -> Result<()> {
        let ticket = self.mount.ticket();
        let profile = api.get_medical_profile(token).await?;
        if !self.mount.is_current(ticket) {
            tracing::debug!("[ProfileView] Discarding stale profile");
            return Ok(());
        }
        self.state.write().await.profile = Some(profile);
        Ok(())
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    /// Replaces the cached profile, e.g. with the result of a save.
    pub async fn set_profile(&self, profile: Option<MedicalProfile>) {
        self.state.write().await.profile = Some(profile);
    }

    pub async fn profile(&self) -> Option<MedicalProfile> {
        self.state.read().await.profile.clone().flatten()
    }

    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.profile.is_some()
    }

    pub async fn expand(&self) {
        self.state.write().await.expanded = true;
    }

    pub async fn collapse(&self) {
        self.state.write().await.expanded = false;
    }

    pub async fn summary(&self) -> ProfileSummary {
        let state = self.state.read().await;
        let Some(loaded) = &state.profile else {
            return ProfileSummary::default();
        };
        let Some(profile) = loaded else {
            return ProfileSummary {
                loaded: true,
                ..ProfileSummary::default()
            };
        };

        let filled = profile.fields.filled();
        let shown = if state.expanded {
            filled.len()
        } else {
            filled.len().min(SUMMARY_CAP)
        };
        let rows = filled
            .iter()
            .take(shown)
            .map(|(field, value)| {
                let (preview, truncated) = preview(value);
                SummaryRow {
                    field: *field,
                    label: field.label(),
                    preview,
                    truncated,
                }
            })
            .collect();

        ProfileSummary {
            loaded: true,
            has_profile: true,
            rows,
            hidden: filled.len() - shown,
        }
    }
}

/// How a save went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(MedicalProfile),
    Patched(MedicalProfile),
    /// Nothing changed; no request was sent.
    Unchanged,
}

impl SaveOutcome {
    pub fn profile(&self) -> Option<&MedicalProfile> {
        match self {
            Self::Created(profile) | Self::Patched(profile) => Some(profile),
            Self::Unchanged => None,
        }
    }
}

#[derive(Debug, Default)]
struct EditorState {
    base: Option<MedicalProfile>,
    form: MedicalProfileFields,
}

/// Field-by-field form over the medical profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileEditor {
    state: Arc<RwLock<EditorState>>,
    saving: BusyFlag,
}

impl ProfileEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts editing from `base`, or from an empty form when there is no
    /// profile yet.
    pub async fn seed(&self, base: Option<MedicalProfile>) {
        let form = base
            .as_ref()
            .map(|profile| profile.fields.clone())
            .unwrap_or_default();
        *self.state.write().await = EditorState { base, form };
    }

    pub async fn set(&self, field: ProfileField, value: impl Into<String>) {
        self.state.write().await.form.set(field, value);
    }

    pub async fn clear(&self, field: ProfileField) {
        self.state.write().await.form.clear(field);
    }

    pub async fn form(&self) -> MedicalProfileFields {
        self.state.read().await.form.clone()
    }

    pub async fn is_creating(&self) -> bool {
        self.state.read().await.base.is_none()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_busy()
    }

    /// Creates the profile, or patches only the fields that changed.
    pub async fn save(&self, api: &dyn BackendApi, token: &str) -> Result<SaveOutcome> {
        let _guard = self
            .saving
            .try_begin()
            .ok_or_else(|| MedfolioError::Busy("profile save".into()))?;

        let (base, form) = {
            let state = self.state.read().await;
            (state.base.clone(), state.form.clone())
        };

        let outcome = match base {
            None => {
                tracing::info!("[ProfileEditor] Creating medical profile");
                SaveOutcome::Created(api.create_medical_profile(token, &form).await?)
            }
            Some(base) => {
                let patch = base.fields.diff(&form);
                if patch.is_empty() {
                    tracing::debug!("[ProfileEditor] No changes to save");
                    return Ok(SaveOutcome::Unchanged);
                }
                tracing::info!(fields = patch.len(), "[ProfileEditor] Patching medical profile");
                SaveOutcome::Patched(api.patch_medical_profile(token, &patch).await?)
            }
        };

        if let Some(saved) = outcome.profile() {
            self.seed(Some(saved.clone())).await;
        }
        Ok(outcome)
    }
}
