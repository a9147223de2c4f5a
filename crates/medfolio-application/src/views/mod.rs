//! Feature controllers.
//!
//! Each controller owns the state of one view and issues its backend calls.
//! Controllers never reach into each other or the router; cross-view effects
//! travel back up as a [`ViewOutcome`].

pub mod chat;
pub mod profile;
pub mod schedule;
pub mod upload_form;
pub mod uploads;

pub use chat::{CHAT_FALLBACK_REPLY, ChatPane};
pub use profile::{
    PREVIEW_CHARS, ProfileEditor, ProfileSummary, ProfileView, SUMMARY_CAP, SaveOutcome,
    SummaryRow,
};
pub use schedule::ScheduleView;
pub use upload_form::{SelectedFile, UploadForm};
pub use uploads::{RowAction, UploadRow, UploadsList};

/// Side effect a controller asks the router to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewOutcome {
    /// Nothing beyond the controller's own state changed.
    Unchanged,
    /// The server-side file list changed; dependent views should reload.
    FilesChanged,
}
