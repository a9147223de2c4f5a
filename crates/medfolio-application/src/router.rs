//! AppRouter - the client's single owner of navigation and session lifecycle.
//!
//! Restores the persisted session and view on start, runs each view's entry
//! effects on navigation, turns action errors into notifications and
//! applies the [`ViewOutcome`]s controllers hand back.

use std::path::Path;
use std::sync::Arc;

use medfolio_core::chat::ChatMessage;
use medfolio_core::file::{Extraction, PresignedUrl, UploadedFile};
use medfolio_core::profile::ProfileField;
use medfolio_core::state::StateRepository;
use medfolio_core::user::{NewUser, Session, User};
use medfolio_core::{BackendApi, MedfolioError, Result, View};

use crate::notification::{Notification, Notifications};
use crate::session_store::SessionStore;
use crate::views::{
    ChatPane, ProfileEditor, ProfileView, SaveOutcome, ScheduleView, SelectedFile, UploadForm,
    UploadsList, ViewOutcome,
};

pub struct AppRouter {
    api: Arc<dyn BackendApi>,
    repository: Arc<dyn StateRepository>,
    session: SessionStore,
    current: View,
    /// Where the chat toggle returns to.
    before_chat: View,
    notifications: Notifications,
    upload_form: UploadForm,
    profile: ProfileView,
    editor: ProfileEditor,
    uploads: UploadsList,
    schedule: ScheduleView,
    chat: ChatPane,
}

impl AppRouter {
    pub fn new(api: Arc<dyn BackendApi>, repository: Arc<dyn StateRepository>) -> Self {
        let session = SessionStore::new(Arc::clone(&api), Arc::clone(&repository));
        Self {
            api,
            repository,
            session,
            current: View::default(),
            before_chat: View::default(),
            notifications: Notifications::new(),
            upload_form: UploadForm::new(),
            profile: ProfileView::new(),
            editor: ProfileEditor::new(),
            uploads: UploadsList::new(),
            schedule: ScheduleView::new(),
            chat: ChatPane::new(),
        }
    }

    /// Restores the persisted session and reopens the persisted view.
    pub async fn start(&mut self) -> Result<Option<Session>> {
        let restored = self.session.restore().await?;
        if restored.is_some() {
            let view = self.repository.load().await?.view.unwrap_or_default();
            tracing::info!(view = %view, "[AppRouter] Resuming");
            self.navigate(view).await;
        }
        Ok(restored)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn current_view(&self) -> View {
        self.current
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn upload_form(&self) -> &UploadForm {
        &self.upload_form
    }

    pub fn profile(&self) -> &ProfileView {
        &self.profile
    }

    pub fn editor(&self) -> &ProfileEditor {
        &self.editor
    }

    pub fn uploads(&self) -> &UploadsList {
        &self.uploads
    }

    pub fn schedule(&self) -> &ScheduleView {
        &self.schedule
    }

    pub fn chat(&self) -> &ChatPane {
        &self.chat
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn drain_notifications(&self) -> Vec<Notification> {
        self.notifications.drain()
    }

    fn notify(&self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Queues an error notification; a declined confirmation is silent.
    fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if !matches!(err, MedfolioError::Cancelled) {
                tracing::debug!(error = %err, "[AppRouter] Action failed");
                self.notify(Notification::error(err.user_message()));
            }
        }
        result
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    pub async fn register(&mut self, new_user: &NewUser) -> Result<User> {
        let result = self.session.register(new_user).await;
        if let Ok(user) = &result {
            self.notify(Notification::success(format!(
                "Account created for {}. Log in to continue.",
                user.email
            )));
        }
        self.report(result)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<Session> {
        let result = self.session.login(email, password).await;
        let session = self.report(result)?;
        self.notify(Notification::success(format!(
            "Signed in as {}",
            session.user.display_name()
        )));
        self.navigate(View::Home).await;
        Ok(session)
    }

    /// Signs out, drops every view's state and returns to the home view.
    pub async fn logout(&mut self) {
        self.leave(self.current);
        self.session.logout().await;
        self.current = View::Home;
        self.before_chat = View::Home;
        self.upload_form = UploadForm::new();
        self.profile = ProfileView::new();
        self.editor = ProfileEditor::new();
        self.uploads = UploadsList::new();
        self.schedule = ScheduleView::new();
        self.chat = ChatPane::new();
        self.notify(Notification::info("Signed out"));
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub async fn navigate(&mut self, view: View) {
        let Some(token) = self.session.token().await else {
            if view != View::Home {
                self.notify(Notification::info("Log in to open that view"));
            }
            return;
        };

        if view == View::Chat && self.current != View::Chat {
            self.before_chat = self.current;
        }
        self.leave(self.current);
        self.current = view;
        if let Err(err) = self.repository.set_view(view).await {
            tracing::warn!(error = %err, "[AppRouter] Failed to persist view");
        }
        tracing::debug!(view = %view, "[AppRouter] Navigated");
        self.enter(view, &token).await;
    }

    /// Floating chat button: opens chat, or goes back to where it was opened.
    pub async fn toggle_chat(&mut self) {
        let target = if self.current == View::Chat {
            self.before_chat
        } else {
            View::Chat
        };
        self.navigate(target).await;
    }

    fn leave(&self, view: View) {
        match view {
            View::Home => self.uploads.unmount(),
            View::Uploads => {
                self.uploads.unmount();
                self.schedule.unmount();
            }
            View::Profile | View::EditProfile => self.profile.unmount(),
            View::Schedule => self.schedule.unmount(),
            View::Chat => {}
        }
    }

    async fn enter(&self, view: View, token: &str) {
        let api = self.api.as_ref();
        match view {
            View::Home => {
                let _ = self.report(self.uploads.refresh(api, token).await);
            }
            View::Uploads => {
                let _ = self.report(self.uploads.refresh(api, token).await);
                if let Err(err) = self.schedule.refresh(api, token).await {
                    tracing::debug!(error = %err, "[AppRouter] Schedule preview unavailable");
                }
            }
            View::Profile => {
                let _ = self.report(self.profile.refresh(api, token).await);
            }
            View::EditProfile => {
                if !self.profile.is_loaded().await {
                    let _ = self.report(self.profile.refresh(api, token).await);
                }
                self.editor.seed(self.profile.profile().await).await;
            }
            View::Schedule => {
                let _ = self.report(self.schedule.refresh(api, token).await);
            }
            View::Chat => {}
        }
    }

    /// Applies a controller's outcome. Follow-up refreshes are silent.
    async fn apply(&self, outcome: ViewOutcome, token: &str) {
        if outcome != ViewOutcome::FilesChanged {
            return;
        }
        let api = self.api.as_ref();
        if let Err(err) = self.uploads.refresh(api, token).await {
            tracing::debug!(error = %err, "[AppRouter] File list refresh failed");
        }
        if self.schedule.is_loaded().await {
            if let Err(err) = self.schedule.refresh(api, token).await {
                tracing::debug!(error = %err, "[AppRouter] Schedule refresh failed");
            }
        }
    }

    async fn token(&self) -> Result<String> {
        self.report(self.session.require_token().await)
    }

    // ------------------------------------------------------------------
    // Uploads
    // ------------------------------------------------------------------

    /// Picks a file for the upload form. Hint warnings become notifications.
    pub async fn select_upload(
        &self,
        path: impl AsRef<Path>,
        display_name: Option<String>,
    ) -> Result<SelectedFile> {
        let selected = self.report(self.upload_form.select(path).await)?;
        self.upload_form.set_display_name(display_name).await;
        if let Some(warning) = selected.hint.message() {
            self.notify(Notification::info(warning));
        }
        Ok(selected)
    }

    pub async fn submit_upload(&self) -> Result<UploadedFile> {
        let token = self.token().await?;
        let result = self.upload_form.submit(self.api.as_ref(), &token).await;
        let (file, outcome) = self.report(result)?;
        self.notify(Notification::success(format!("Uploaded {}", file.label())));
        self.apply(outcome, &token).await;
        Ok(file)
    }

    pub async fn review(&self, file_id: &str) -> Result<Extraction> {
        let token = self.token().await?;
        let result = self.uploads.review(self.api.as_ref(), &token, file_id).await;
        self.report(result)
    }

    pub async fn edit_review(&self, file_id: &str, extraction: Extraction) -> Result<()> {
        self.report(self.uploads.edit_review(file_id, extraction).await)
    }

    pub async fn close_review(&self, file_id: &str) {
        self.uploads.close_review(file_id).await;
    }

    pub async fn accept(&self, file_id: &str) -> Result<()> {
        let token = self.token().await?;
        let result = self.uploads.accept(self.api.as_ref(), &token, file_id).await;
        let outcome = self.report(result)?;
        self.notify(Notification::success("Extraction accepted"));
        self.apply(outcome, &token).await;
        Ok(())
    }

    pub async fn retry(&self, file_id: &str) -> Result<UploadedFile> {
        let token = self.token().await?;
        let result = self.uploads.retry(self.api.as_ref(), &token, file_id).await;
        let file = self.report(result)?;
        self.notify(Notification::info(format!(
            "Extraction restarted for {}",
            file.label()
        )));
        Ok(file)
    }

    pub async fn delete(&self, file_id: &str, confirmed: bool) -> Result<()> {
        let token = self.token().await?;
        let result = self
            .uploads
            .delete(self.api.as_ref(), &token, file_id, confirmed)
            .await;
        let outcome = self.report(result)?;
        self.notify(Notification::success("File deleted"));
        self.apply(outcome, &token).await;
        Ok(())
    }

    /// Short-lived link to an uploaded document.
    pub async fn open_file(&self, file_id: &str) -> Result<PresignedUrl> {
        let token = self.token().await?;
        let result = self.api.presign_file(&token, file_id).await;
        self.report(result.map_err(MedfolioError::from))
    }

    // ------------------------------------------------------------------
    // Profile
    // ------------------------------------------------------------------

    pub async fn start_edit(&mut self) {
        self.navigate(View::EditProfile).await;
    }

    pub async fn cancel_edit(&mut self) {
        self.navigate(View::Profile).await;
    }

    pub async fn set_profile_field(&self, field: ProfileField, value: &str) {
        self.editor.set(field, value).await;
    }

    /// Saves the edit form. Stays in the editor when the save fails.
    pub async fn save_profile(&mut self) -> Result<SaveOutcome> {
        let token = self.token().await?;
        let result = self.editor.save(self.api.as_ref(), &token).await;
        let outcome = self.report(result)?;
        match outcome.profile() {
            Some(saved) => {
                self.profile.set_profile(Some(saved.clone())).await;
                self.notify(Notification::success("Profile saved"));
            }
            None => self.notify(Notification::info("No changes to save")),
        }
        self.navigate(View::Profile).await;
        Ok(outcome)
    }

    pub async fn expand_profile(&self) {
        self.profile.expand().await;
    }

    // ------------------------------------------------------------------
    // Schedule
    // ------------------------------------------------------------------

    pub async fn open_schedule_source(&self, index: usize) -> Result<PresignedUrl> {
        let token = self.token().await?;
        let result = self
            .schedule
            .open_source(self.api.as_ref(), &token, index)
            .await;
        self.report(result)
    }

    // ------------------------------------------------------------------
    // Chat
    // ------------------------------------------------------------------

    pub async fn send_chat(&self, input: &str) -> Result<ChatMessage> {
        let token = self.token().await?;
        let result = self.chat.send(self.api.as_ref(), &token, input).await;
        self.report(result)
    }

    pub async fn clear_chat(&self, confirmed: bool) -> Result<()> {
        self.report(self.chat.clear(confirmed).await)
    }
}
