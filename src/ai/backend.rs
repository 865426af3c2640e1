use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::config::GeminiConfig;
use crate::shared::AppError;

/// Upper bound for a single upstream generation call
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(20);

/// An upstream text-generation service
#[async_trait]
pub trait GenerativeBackend {
    /// Sends a generateContent-style payload and returns the raw JSON reply
    async fn generate(&self, payload: Value) -> Result<Value, AppError>;
}

/// REST client for the Gemini generateContent endpoint
pub struct GeminiBackend {
    http: reqwest::Client,
    endpoint: String,
}

impl GeminiBackend {
    pub fn new(config: &GeminiConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .map_err(|e| {
                warn!(error = %e, "Failed to build HTTP client for AI backend");
                AppError::Internal
            })?;

        Ok(Self {
            http,
            endpoint: config.endpoint(),
        })
    }
}

fn request_failed(details: Value) -> AppError {
    AppError::Upstream {
        message: "AI request failed".to_string(),
        details: Some(details),
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    #[instrument(skip(self, payload))]
    async fn generate(&self, payload: Value) -> Result<Value, AppError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "AI upstream request failed");
                request_failed(Value::String(e.to_string()))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!(error = %e, "Failed to read AI upstream response");
            request_failed(Value::String(e.to_string()))
        })?;
        let parsed = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));

        if !status.is_success() {
            warn!(status = %status, "AI upstream returned an error status");
            return Err(request_failed(parsed));
        }

        debug!(status = %status, "AI upstream replied");
        Ok(parsed)
    }
}
