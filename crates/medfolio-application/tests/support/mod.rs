//! In-memory backend and state store for driving the application layer.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use medfolio_core::api::{ApiError, ApiResult, BackendApi, UploadRequest};
use medfolio_core::chat::ChatReply;
use medfolio_core::file::{Extraction, FileStatus, PresignedUrl, UploadedFile};
use medfolio_core::profile::{MedicalProfile, MedicalProfileFields, MedicalProfilePatch};
use medfolio_core::schedule::ScheduleEntry;
use medfolio_core::state::{PersistedState, StateRepository};
use medfolio_core::user::{NewUser, TokenResponse, User};
use medfolio_core::{MedfolioError, Result};
use tokio::sync::Semaphore;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: &'static str,
    pub token: Option<String>,
}

#[derive(Default)]
struct Server {
    users: HashMap<String, (String, User)>,
    tokens: HashMap<String, String>,
    files: Vec<UploadedFile>,
    extractions: HashMap<String, Extraction>,
    profile: Option<MedicalProfile>,
    schedule: Vec<ScheduleEntry>,
    accepted_payloads: Vec<(String, Option<Extraction>)>,
    patches: Vec<MedicalProfilePatch>,
    chat_reply: String,
    next_id: u32,
}

impl Server {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// Failure injection; each entry fails every matching call until cleared.
#[derive(Default)]
struct Faults {
    get_me: Option<ApiError>,
    files: Option<ApiError>,
    schedule: Option<ApiError>,
    profile: Option<ApiError>,
    save_profile: Option<ApiError>,
    retry: Option<ApiError>,
    chat: Option<ApiError>,
}

#[derive(Default)]
struct Gates {
    files: Option<Arc<Semaphore>>,
    profile: Option<Arc<Semaphore>>,
    retry: Option<Arc<Semaphore>>,
}

#[derive(Default)]
pub struct MockBackend {
    server: Mutex<Server>,
    faults: Mutex<Faults>,
    gates: Mutex<Gates>,
    calls: Mutex<Vec<Call>>,
    /// Deleted files keep showing up in listings, like a lagging replica.
    ghost_deletes: AtomicBool,
}

async fn pass(gate: Option<Arc<Semaphore>>) {
    if let Some(gate) = gate {
        if let Ok(permit) = gate.acquire().await {
            permit.forget();
        }
    }
}

fn unauthorized() -> ApiError {
    ApiError::status(401, "Could not validate credentials")
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        let backend = Self::default();
        backend.server.lock().unwrap().chat_reply = "Hi there".into();
        Arc::new(backend)
    }

    /// A backend with one registered user already logged in as `token`.
    pub fn with_user(email: &str, password: &str, token: &str) -> Arc<Self> {
        let backend = Self::new();
        {
            let mut server = backend.server.lock().unwrap();
            let user = User {
                id: Some("user-0".into()),
                name: Some("Asha".into()),
                ..User::from_email(email)
            };
            server
                .users
                .insert(email.to_string(), (password.to_string(), user));
            server.tokens.insert(token.to_string(), email.to_string());
        }
        backend
    }

    // -- recording --------------------------------------------------------

    fn record(&self, op: &'static str, token: Option<&str>) {
        self.calls.lock().unwrap().push(Call {
            op,
            token: token.map(str::to_string),
        });
    }

    fn authorize(&self, op: &'static str, token: &str) -> ApiResult<String> {
        self.record(op, Some(token));
        self.server
            .lock()
            .unwrap()
            .tokens
            .get(token)
            .cloned()
            .ok_or_else(unauthorized)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn ops(&self) -> Vec<&'static str> {
        self.calls().into_iter().map(|call| call.op).collect()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls().iter().filter(|call| call.op == op).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    // -- seeding ----------------------------------------------------------

    pub fn add_file(&self, id: &str, filename: &str, status: FileStatus) -> UploadedFile {
        let file = UploadedFile {
            id: id.to_string(),
            filename: filename.to_string(),
            display_name: None,
            file_type: None,
            upload_date: Some("2024-05-01T10:30:00".into()),
            status,
            s3_url: None,
            extracted_data: None,
        };
        self.server.lock().unwrap().files.push(file.clone());
        file
    }

    pub fn set_extraction(&self, file_id: &str, extraction: Extraction) {
        self.server
            .lock()
            .unwrap()
            .extractions
            .insert(file_id.to_string(), extraction);
    }

    pub fn set_profile(&self, fields: MedicalProfileFields) {
        self.server.lock().unwrap().profile = Some(MedicalProfile {
            id: "profile-1".into(),
            user_id: "user-0".into(),
            fields,
        });
    }

    pub fn set_schedule(&self, entries: Vec<ScheduleEntry>) {
        self.server.lock().unwrap().schedule = entries;
    }

    pub fn set_chat_reply(&self, reply: &str) {
        self.server.lock().unwrap().chat_reply = reply.to_string();
    }

    pub fn set_ghost_deletes(&self, enabled: bool) {
        self.ghost_deletes.store(enabled, Ordering::SeqCst);
    }

    // -- faults -----------------------------------------------------------

    pub fn fail_get_me(&self, err: ApiError) {
        self.faults.lock().unwrap().get_me = Some(err);
    }

    pub fn fail_files(&self, err: ApiError) {
        self.faults.lock().unwrap().files = Some(err);
    }

    pub fn fail_schedule(&self, err: ApiError) {
        self.faults.lock().unwrap().schedule = Some(err);
    }

    pub fn fail_profile(&self, err: ApiError) {
        self.faults.lock().unwrap().profile = Some(err);
    }

    pub fn fail_save_profile(&self, err: ApiError) {
        self.faults.lock().unwrap().save_profile = Some(err);
    }

    pub fn fail_retry(&self, err: ApiError) {
        self.faults.lock().unwrap().retry = Some(err);
    }

    pub fn fail_chat(&self, err: ApiError) {
        self.faults.lock().unwrap().chat = Some(err);
    }

    // -- gates ------------------------------------------------------------

    /// Holds `get_files` until permits are added to the returned semaphore.
    pub fn gate_files(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.lock().unwrap().files = Some(Arc::clone(&gate));
        gate
    }

    pub fn gate_profile(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.lock().unwrap().profile = Some(Arc::clone(&gate));
        gate
    }

    pub fn gate_retry(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.lock().unwrap().retry = Some(Arc::clone(&gate));
        gate
    }

    // -- inspection -------------------------------------------------------

    pub fn files(&self) -> Vec<UploadedFile> {
        self.server.lock().unwrap().files.clone()
    }

    pub fn profile(&self) -> Option<MedicalProfile> {
        self.server.lock().unwrap().profile.clone()
    }

    pub fn patches(&self) -> Vec<MedicalProfilePatch> {
        self.server.lock().unwrap().patches.clone()
    }

    pub fn accepted_payloads(&self) -> Vec<(String, Option<Extraction>)> {
        self.server.lock().unwrap().accepted_payloads.clone()
    }

    fn fault(&self, pick: impl FnOnce(&Faults) -> &Option<ApiError>) -> ApiResult<()> {
        match pick(&self.faults.lock().unwrap()) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn not_found(what: &str) -> ApiError {
        ApiError::status(404, format!("{what} not found"))
    }
}

#[async_trait]
impl BackendApi for MockBackend {
    async fn register(&self, new_user: &NewUser) -> ApiResult<User> {
        self.record("register", None);
        let mut server = self.server.lock().unwrap();
        if server.users.contains_key(&new_user.email) {
            return Err(ApiError::status(400, "Email already registered"));
        }
        let user = User {
            id: Some(server.next_id("user")),
            name: Some(new_user.name.clone()),
            age: new_user.age,
            is_active: Some(true),
            ..User::from_email(new_user.email.clone())
        };
        server.users.insert(
            new_user.email.clone(),
            (new_user.password.clone(), user.clone()),
        );
        Ok(user)
    }

    async fn login(&self, email: &str, password: &str) -> ApiResult<TokenResponse> {
        self.record("login", None);
        let mut server = self.server.lock().unwrap();
        match server.users.get(email) {
            Some((expected, _)) if expected == password => {}
            _ => return Err(ApiError::status(401, "Incorrect email or password")),
        }
        let token = server.next_id("token");
        server.tokens.insert(token.clone(), email.to_string());
        Ok(TokenResponse {
            access_token: token,
            token_type: "bearer".into(),
        })
    }

    async fn get_me(&self, token: &str) -> ApiResult<User> {
        let email = self.authorize("get_me", token)?;
        self.fault(|f| &f.get_me)?;
        let server = self.server.lock().unwrap();
        server
            .users
            .get(&email)
            .map(|(_, user)| user.clone())
            .ok_or_else(unauthorized)
    }

    async fn upload_document(
        &self,
        token: &str,
        upload: &UploadRequest,
    ) -> ApiResult<UploadedFile> {
        self.authorize("upload_document", token)?;
        let mut server = self.server.lock().unwrap();
        let file = UploadedFile {
            id: server.next_id("file"),
            filename: upload.filename.clone(),
            display_name: upload.display_name.clone(),
            file_type: Some("application/pdf".into()),
            upload_date: Some("2024-05-01T10:30:00".into()),
            status: FileStatus::Uploaded,
            s3_url: None,
            extracted_data: None,
        };
        server.files.push(file.clone());
        Ok(file)
    }

    async fn get_files(&self, token: &str) -> ApiResult<Vec<UploadedFile>> {
        self.authorize("get_files", token)?;
        self.fault(|f| &f.files)?;
        let gate = self.gates.lock().unwrap().files.clone();
        let snapshot = self.server.lock().unwrap().files.clone();
        pass(gate).await;
        Ok(snapshot)
    }

    async fn presign_file(&self, token: &str, file_id: &str) -> ApiResult<PresignedUrl> {
        self.authorize("presign_file", token)?;
        let server = self.server.lock().unwrap();
        if !server.files.iter().any(|file| file.id == file_id) {
            return Err(Self::not_found("File"));
        }
        Ok(PresignedUrl {
            presigned_url: format!("https://storage.test/{file_id}?signature=abc"),
            expires_in: Some(3600),
        })
    }

    async fn get_medical_profile(&self, token: &str) -> ApiResult<Option<MedicalProfile>> {
        self.authorize("get_medical_profile", token)?;
        self.fault(|f| &f.profile)?;
        let gate = self.gates.lock().unwrap().profile.clone();
        let snapshot = self.server.lock().unwrap().profile.clone();
        pass(gate).await;
        Ok(snapshot)
    }

    async fn create_medical_profile(
        &self,
        token: &str,
        fields: &MedicalProfileFields,
    ) -> ApiResult<MedicalProfile> {
        self.authorize("create_medical_profile", token)?;
        self.fault(|f| &f.save_profile)?;
        let mut server = self.server.lock().unwrap();
        if server.profile.is_some() {
            return Err(ApiError::status(400, "Medical profile already exists"));
        }
        let profile = MedicalProfile {
            id: server.next_id("profile"),
            user_id: "user-0".into(),
            fields: fields.clone(),
        };
        server.profile = Some(profile.clone());
        Ok(profile)
    }

    async fn update_medical_profile(
        &self,
        token: &str,
        fields: &MedicalProfileFields,
    ) -> ApiResult<MedicalProfile> {
        self.authorize("update_medical_profile", token)?;
        self.fault(|f| &f.save_profile)?;
        let mut server = self.server.lock().unwrap();
        let profile = server
            .profile
            .as_mut()
            .ok_or_else(|| Self::not_found("Medical profile"))?;
        profile.fields = fields.clone();
        Ok(profile.clone())
    }

    async fn patch_medical_profile(
        &self,
        token: &str,
        patch: &MedicalProfilePatch,
    ) -> ApiResult<MedicalProfile> {
        self.authorize("patch_medical_profile", token)?;
        self.fault(|f| &f.save_profile)?;
        let mut server = self.server.lock().unwrap();
        server.patches.push(patch.clone());
        let profile = server
            .profile
            .as_mut()
            .ok_or_else(|| Self::not_found("Medical profile"))?;
        for (field, value) in &patch.changes {
            match value {
                Some(value) => profile.fields.set(*field, value.clone()),
                None => profile.fields.clear(*field),
            }
        }
        Ok(profile.clone())
    }

    async fn get_extraction(&self, token: &str, file_id: &str) -> ApiResult<Extraction> {
        self.authorize("get_extraction", token)?;
        self.server
            .lock()
            .unwrap()
            .extractions
            .get(file_id)
            .cloned()
            .ok_or_else(|| Self::not_found("Extraction"))
    }

    async fn accept_extraction(
        &self,
        token: &str,
        file_id: &str,
        payload: Option<&Extraction>,
    ) -> ApiResult<UploadedFile> {
        self.authorize("accept_extraction", token)?;
        let mut server = self.server.lock().unwrap();
        server
            .accepted_payloads
            .push((file_id.to_string(), payload.cloned()));
        let file = server
            .files
            .iter_mut()
            .find(|file| file.id == file_id)
            .ok_or_else(|| Self::not_found("File"))?;
        file.status = FileStatus::Accepted;
        Ok(file.clone())
    }

    async fn retry_extraction(&self, token: &str, file_id: &str) -> ApiResult<UploadedFile> {
        self.authorize("retry_extraction", token)?;
        let gate = self.gates.lock().unwrap().retry.clone();
        pass(gate).await;
        self.fault(|f| &f.retry)?;
        let mut server = self.server.lock().unwrap();
        let file = server
            .files
            .iter_mut()
            .find(|file| file.id == file_id)
            .ok_or_else(|| Self::not_found("File"))?;
        file.status = FileStatus::Processing;
        Ok(file.clone())
    }

    async fn delete_file(&self, token: &str, file_id: &str) -> ApiResult<serde_json::Value> {
        self.authorize("delete_file", token)?;
        let mut server = self.server.lock().unwrap();
        if !server.files.iter().any(|file| file.id == file_id) {
            return Err(Self::not_found("File"));
        }
        if !self.ghost_deletes.load(Ordering::SeqCst) {
            server.files.retain(|file| file.id != file_id);
        }
        Ok(serde_json::json!({ "detail": "File deleted" }))
    }

    async fn get_schedule(&self, token: &str) -> ApiResult<Vec<ScheduleEntry>> {
        self.authorize("get_schedule", token)?;
        self.fault(|f| &f.schedule)?;
        Ok(self.server.lock().unwrap().schedule.clone())
    }

    async fn chat(&self, token: &str, _message: &str) -> ApiResult<ChatReply> {
        self.authorize("chat", token)?;
        self.fault(|f| &f.chat)?;
        Ok(ChatReply {
            reply: self.server.lock().unwrap().chat_reply.clone(),
            meta: None,
        })
    }
}

/// Persisted state kept in memory.
#[derive(Default)]
pub struct MemoryStateRepository {
    state: Mutex<PersistedState>,
    fail_saves: AtomicBool,
    saves: Mutex<usize>,
}

impl MemoryStateRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_state(state: PersistedState) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(state),
            ..Self::default()
        })
    }

    pub fn snapshot(&self) -> PersistedState {
        self.state.lock().unwrap().clone()
    }

    pub fn fail_saves(&self, enabled: bool) {
        self.fail_saves.store(enabled, Ordering::SeqCst);
    }
}

#[async_trait]
impl StateRepository for MemoryStateRepository {
    async fn load(&self) -> Result<PersistedState> {
        Ok(self.state.lock().unwrap().clone())
    }

    async fn save(&self, state: &PersistedState) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(MedfolioError::io("disk full"));
        }
        *self.saves.lock().unwrap() += 1;
        *self.state.lock().unwrap() = state.clone();
        Ok(())
    }
}
