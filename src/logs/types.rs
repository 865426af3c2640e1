use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    content::LogContent,
    models::{parse_log_date, LogFields, LogModel},
};
use crate::shared::AppError;

/// Request payload for creating or replacing a log
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LogRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub log_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl TryFrom<LogRequest> for LogFields {
    type Error = AppError;

    fn try_from(request: LogRequest) -> Result<Self, Self::Error> {
        let log_type = request.log_type.unwrap_or_default();
        let content = LogContent::parse(&log_type, request.content.unwrap_or(Value::Null))?;
        let date = request
            .date
            .as_deref()
            .ok_or_else(|| AppError::Validation("Log date is required".to_string()))
            .and_then(parse_log_date)?;

        Ok(LogFields {
            title: request.title,
            mood: request.mood,
            content,
            date,
        })
    }
}

/// Log as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogResponse {
    pub id: String,
    pub user: String,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub log_type: String,
    pub mood: Option<String>,
    pub content: Value,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&LogModel> for LogResponse {
    fn from(log: &LogModel) -> Self {
        Self {
            id: log.id.clone(),
            user: log.user_id.clone(),
            title: log.title.clone(),
            log_type: log.log_type().to_string(),
            mood: log.mood.clone(),
            content: log.content.to_value(),
            date: log.date,
            created_at: log.created_at,
            updated_at: log.updated_at,
        }
    }
}

/// Response for create and update: a confirmation plus the stored log
#[derive(Debug, Serialize, Deserialize)]
pub struct LogEnvelope {
    pub message: String,
    pub log: LogResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}
