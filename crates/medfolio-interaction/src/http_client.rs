//! HttpBackendClient - reqwest implementation of the backend API.

use async_trait::async_trait;
use medfolio_core::api::{ApiError, ApiResult, BackendApi, UploadRequest};
use medfolio_core::chat::{ChatReply, ChatRequest};
use medfolio_core::config::ClientConfig;
use medfolio_core::file::{Extraction, PresignedUrl, UploadedFile};
use medfolio_core::profile::{MedicalProfile, MedicalProfileFields, MedicalProfilePatch};
use medfolio_core::schedule::ScheduleEntry;
use medfolio_core::user::{NewUser, TokenResponse, User};
use reqwest::header::RETRY_AFTER;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error_body;

/// Talks to the backend over HTTP.
///
/// No client-side timeout is imposed; a request runs to completion or
/// transport failure.
#[derive(Clone)]
pub struct HttpBackendClient {
    client: Client,
    base_url: String,
}

impl HttpBackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Uses a preconfigured reqwest client (proxy, TLS roots, etc.).
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.resolve_base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        tracing::debug!(method = method.as_str(), path, "Backend request");
        let builder = self.client.request(method, self.url(path));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> ApiResult<Response> {
        let response = builder.send().await.map_err(|err| {
            tracing::warn!(path, error = %err, "Backend unreachable");
            ApiError::transport(format!("Could not reach the server: {err}"))
        })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::read_error(response, path).await)
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        path: &str,
    ) -> ApiResult<T> {
        let response = self.send(builder, path).await?;
        response.json::<T>().await.map_err(|err| {
            tracing::warn!(path, error = %err, "Unexpected response body");
            ApiError::decode(format!("Unexpected response from the server: {err}"))
        })
    }

    async fn read_error(response: Response, path: &str) -> ApiError {
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();

        let message = error_body::error_message(status.as_u16(), status.canonical_reason(), &body);
        let cooldown = error_body::cooldown_seconds(&body, retry_after.as_deref(), &message);
        tracing::warn!(path, status = status.as_u16(), %message, "Backend returned an error");

        ApiError::status(status.as_u16(), message).with_cooldown(cooldown)
    }

    async fn upload_form(upload: &UploadRequest) -> ApiResult<Form> {
        let bytes = tokio::fs::read(&upload.path).await.map_err(|err| {
            ApiError::transport(format!(
                "Could not read {}: {err}",
                upload.path.display()
            ))
        })?;
        let mime = mime_guess::from_path(&upload.path).first_or_octet_stream();
        let part = Part::bytes(bytes)
            .file_name(upload.filename.clone())
            .mime_str(mime.as_ref())
            .map_err(|err| ApiError::transport(format!("Invalid content type: {err}")))?;

        let mut form = Form::new().part("file", part);
        if let Some(display_name) = &upload.display_name {
            form = form.text("display_name", display_name.clone());
        }
        Ok(form)
    }
}

#[async_trait]
impl BackendApi for HttpBackendClient {
    async fn register(&self, user: &NewUser) -> ApiResult<User> {
        let path = "/auth/register";
        self.send_json(self.request(Method::POST, path, None).json(user), path)
            .await
    }

    async fn login(&self, email: &str, password: &str) -> ApiResult<TokenResponse> {
        let path = "/auth/login";
        let form = [("username", email), ("password", password)];
        self.send_json(self.request(Method::POST, path, None).form(&form), path)
            .await
    }

    async fn get_me(&self, token: &str) -> ApiResult<User> {
        let path = "/auth/me";
        self.send_json(self.request(Method::GET, path, Some(token)), path)
            .await
    }

    async fn upload_document(
        &self,
        token: &str,
        upload: &UploadRequest,
    ) -> ApiResult<UploadedFile> {
        let path = "/files/upload";
        let form = Self::upload_form(upload).await?;
        self.send_json(
            self.request(Method::POST, path, Some(token)).multipart(form),
            path,
        )
        .await
    }

    async fn get_files(&self, token: &str) -> ApiResult<Vec<UploadedFile>> {
        let path = "/files/";
        self.send_json(self.request(Method::GET, path, Some(token)), path)
            .await
    }

    async fn presign_file(&self, token: &str, file_id: &str) -> ApiResult<PresignedUrl> {
        let path = format!("/files/{file_id}/presign");
        self.send_json(self.request(Method::GET, &path, Some(token)), &path)
            .await
    }

    async fn get_medical_profile(&self, token: &str) -> ApiResult<Option<MedicalProfile>> {
        let path = "/profile/medical-profile";
        match self
            .send_json::<MedicalProfile>(self.request(Method::GET, path, Some(token)), path)
            .await
        {
            Ok(profile) => Ok(Some(profile)),
            Err(err) if err.status_code() == Some(StatusCode::NOT_FOUND.as_u16()) => {
                tracing::debug!("No medical profile yet");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn create_medical_profile(
        &self,
        token: &str,
        fields: &MedicalProfileFields,
    ) -> ApiResult<MedicalProfile> {
        let path = "/profile/medical-profile";
        self.send_json(
            self.request(Method::POST, path, Some(token)).json(fields),
            path,
        )
        .await
    }

    async fn update_medical_profile(
        &self,
        token: &str,
        fields: &MedicalProfileFields,
    ) -> ApiResult<MedicalProfile> {
        let path = "/profile/medical-profile";
        self.send_json(
            self.request(Method::PUT, path, Some(token)).json(fields),
            path,
        )
        .await
    }

    async fn patch_medical_profile(
        &self,
        token: &str,
        patch: &MedicalProfilePatch,
    ) -> ApiResult<MedicalProfile> {
        let path = "/profile/medical-profile";
        self.send_json(
            self.request(Method::PATCH, path, Some(token)).json(patch),
            path,
        )
        .await
    }

    async fn get_extraction(&self, token: &str, file_id: &str) -> ApiResult<Extraction> {
        let path = format!("/files/{file_id}/extraction");
        self.send_json(self.request(Method::GET, &path, Some(token)), &path)
            .await
    }

    async fn accept_extraction(
        &self,
        token: &str,
        file_id: &str,
        payload: Option<&Extraction>,
    ) -> ApiResult<UploadedFile> {
        let path = format!("/files/{file_id}/extraction/accept");
        let mut builder = self.request(Method::POST, &path, Some(token));
        if let Some(payload) = payload {
            builder = builder.json(payload);
        }
        self.send_json(builder, &path).await
    }

    async fn retry_extraction(&self, token: &str, file_id: &str) -> ApiResult<UploadedFile> {
        let path = format!("/files/{file_id}/retry");
        self.send_json(self.request(Method::POST, &path, Some(token)), &path)
            .await
    }

    async fn delete_file(&self, token: &str, file_id: &str) -> ApiResult<serde_json::Value> {
        let path = format!("/files/{file_id}");
        let response = self
            .send(self.request(Method::DELETE, &path, Some(token)), &path)
            .await?;
        // The confirmation body is informational and may be empty.
        let body = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::Null))
    }

    async fn get_schedule(&self, token: &str) -> ApiResult<Vec<ScheduleEntry>> {
        let path = "/files/schedule";
        self.send_json(self.request(Method::GET, path, Some(token)), path)
            .await
    }

    async fn chat(&self, token: &str, message: &str) -> ApiResult<ChatReply> {
        let path = "/chat/";
        self.send_json(
            self.request(Method::POST, path, Some(token))
                .json(&ChatRequest { message }),
            path,
        )
        .await
    }
}
