use axum::{extract::State, http::HeaderMap, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use super::prompt::{build_payload, build_prompt, extract_reply, summarize_logs, SUMMARY_LOG_LIMIT};
use crate::auth::optional_identity;
use crate::logs::service::LogService;
use crate::shared::{AppError, AppJson, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub options: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// GET /ai
pub async fn ai_root() -> Json<Value> {
    Json(json!({ "ok": true, "msg": "AI route root - POST /chat to use the AI proxy" }))
}

/// GET /ai/ping
pub async fn ping() -> Json<Value> {
    Json(json!({ "ok": true, "time": Utc::now().to_rfc3339() }))
}

/// HTTP handler for the chat proxy
///
/// POST /ai/chat
/// The token is optional; when valid, recent logs are summarized into the prompt
#[instrument(name = "ai_chat", skip(state, headers, request))]
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(request): AppJson<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = match request.message {
        Some(Value::String(message)) if !message.is_empty() => message,
        _ => {
            return Err(AppError::BadRequest(
                "Missing required \"message\" string in request body.".to_string(),
            ))
        }
    };

    let backend = state.ai_backend.clone().ok_or_else(|| AppError::Upstream {
        message: "AI backend is not configured. Set GEMINI_API_KEY in .env".to_string(),
        details: None,
    })?;

    let summary = match optional_identity(&headers, &state.token_config) {
        Some(user_id) => {
            let service = LogService::new(state.log_repository.clone());
            match service.recent_logs(&user_id, SUMMARY_LOG_LIMIT).await {
                Ok(logs) => {
                    debug!(user_id = %user_id, count = logs.len(), "Personalizing prompt with recent logs");
                    summarize_logs(&logs)
                }
                Err(e) => {
                    warn!(error = %e, "Skipping personalization, could not load logs");
                    String::new()
                }
            }
        }
        None => String::new(),
    };

    let prompt = build_prompt(&message, &summary);
    let raw = backend.generate(build_payload(&prompt, request.options)).await?;

    match extract_reply(&raw) {
        Some(reply) => {
            info!(reply_len = reply.len(), "AI replied");
            Ok(Json(ChatResponse { reply }))
        }
        None => {
            let raw_text: String = raw.to_string().chars().take(500).collect();
            warn!(raw = %raw_text, "No textual reply from AI");
            Err(AppError::Upstream {
                message: "No textual reply from AI.".to_string(),
                details: None,
            })
        }
    }
}
