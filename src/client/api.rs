use reqwest::{multipart, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{error::ClientError, session::ClientSession};
use crate::ai::ChatResponse;
use crate::auth::{
    types::{LoginRequest, MessageResponse, SignupRequest, TokenResponse},
    AUTH_HEADER,
};
use crate::logs::types::{DeleteResponse, LogEnvelope, LogRequest, LogResponse};
use crate::user::types::{UpdateProfileRequest, UserProfile};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Optional text fields sent alongside an uploaded video
#[derive(Debug, Default, Clone)]
pub struct VideoFields {
    pub title: Option<String>,
    pub mood: Option<String>,
    pub notes: Option<String>,
    pub date: Option<String>,
}

pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attaches the token, or refuses locally when the session has run out
    fn authorized(
        &self,
        request: RequestBuilder,
        session: &ClientSession,
    ) -> Result<RequestBuilder, ClientError> {
        if session.is_expired() {
            warn!(user_id = %session.user_id, "Refusing request with expired session");
            return Err(ClientError::SessionExpired);
        }
        Ok(request.header(AUTH_HEADER, &session.token))
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<MessageResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/auth/signup"))
            .json(request)
            .send()
            .await?;
        read_json(response).await
    }

    /// Logs in and turns the returned token into a session
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<ClientSession, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&body)
            .send()
            .await?;
        let TokenResponse { token } = read_json(response).await?;
        ClientSession::from_token(token)
    }

    pub async fn profile(&self, session: &ClientSession) -> Result<UserProfile, ClientError> {
        let request = self.authorized(self.http.get(self.url("/user")), session)?;
        read_json(request.send().await?).await
    }

    pub async fn update_profile(
        &self,
        session: &ClientSession,
        update: &UpdateProfileRequest,
    ) -> Result<UserProfile, ClientError> {
        let request = self.authorized(self.http.put(self.url("/user")), session)?;
        read_json(request.json(update).send().await?).await
    }

    pub async fn list_logs(&self, session: &ClientSession) -> Result<Vec<LogResponse>, ClientError> {
        let request = self.authorized(self.http.get(self.url("/logs")), session)?;
        read_json(request.send().await?).await
    }

    pub async fn create_log(
        &self,
        session: &ClientSession,
        log: &LogRequest,
    ) -> Result<LogResponse, ClientError> {
        let request = self.authorized(self.http.post(self.url("/logs")), session)?;
        let envelope: LogEnvelope = read_json(request.json(log).send().await?).await?;
        Ok(envelope.log)
    }

    pub async fn update_log(
        &self,
        session: &ClientSession,
        log_id: &str,
        log: &LogRequest,
    ) -> Result<LogResponse, ClientError> {
        let url = self.url(&format!("/logs/{}", log_id));
        let request = self.authorized(self.http.put(url), session)?;
        let envelope: LogEnvelope = read_json(request.json(log).send().await?).await?;
        Ok(envelope.log)
    }

    pub async fn delete_log(&self, session: &ClientSession, log_id: &str) -> Result<(), ClientError> {
        let url = self.url(&format!("/logs/{}", log_id));
        let request = self.authorized(self.http.delete(url), session)?;
        let _: DeleteResponse = read_json(request.send().await?).await?;
        Ok(())
    }

    pub async fn upload_video(
        &self,
        session: &ClientSession,
        file_name: &str,
        bytes: Vec<u8>,
        fields: VideoFields,
    ) -> Result<LogResponse, ClientError> {
        let mut form = multipart::Form::new()
            .part("video", multipart::Part::bytes(bytes).file_name(file_name.to_string()));
        for (name, value) in [
            ("title", fields.title),
            ("mood", fields.mood),
            ("notes", fields.notes),
            ("date", fields.date),
        ] {
            if let Some(value) = value {
                form = form.text(name, value);
            }
        }

        let request = self.authorized(self.http.post(self.url("/logs/upload-video")), session)?;
        let envelope: LogEnvelope = read_json(request.multipart(form).send().await?).await?;
        Ok(envelope.log)
    }

    /// Chat with the assistant. With a session the reply is personalized from recent logs.
    pub async fn chat(
        &self,
        session: Option<&ClientSession>,
        message: &str,
    ) -> Result<String, ClientError> {
        let mut request = self
            .http
            .post(self.url("/ai/chat"))
            .json(&json!({ "message": message }));
        if let Some(session) = session {
            request = self.authorized(request, session)?;
        }

        let ChatResponse { reply } = read_json(request.send().await?).await?;
        Ok(reply)
    }
}

/// Decodes a success body, or turns the server's `{error}`/`{msg}` body into `ClientError::Api`
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let text = response.text().await?;
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| {
            body.get("error")
                .or_else(|| body.get("msg"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or(text);

    debug!(status = %status, message = %message, "API call failed");
    Err(ClientError::Api { status, message })
}
