//! Typed log content.
//!
//! The `type` tag of a log selects the shape of its `content`:
//!
//! - built-in types ([`EntryKind`]) carry either non-blank text or their own
//!   object form (`fitness` → `{activity, duration}`, `sleep` → `{hours, notes}`, ...),
//! - `video` carries a [`VideoContent`] object,
//! - any other tag is a custom type whose content is free-form JSON (anything but `null`).
//!
//! [`LogContent::parse`] is the single validation point used before anything is written.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::shared::AppError;

pub const VIDEO_TYPE: &str = "video";

/// Built-in log types
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum EntryKind {
    Journal,
    Tasks,
    Fitness,
    Food,
    Sleep,
    Movies,
}

/// Form fields arrive as strings or numbers (`"30"` or `30`); both are kept as sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JournalEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct TaskEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FitnessEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    /// Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FoodEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SleepEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MovieEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of a built-in log: free text or the kind's object form
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntryBody {
    Text(String),
    Journal(JournalEntry),
    Tasks(TaskEntry),
    Fitness(FitnessEntry),
    Food(FoodEntry),
    Sleep(SleepEntry),
    Movies(MovieEntry),
}

impl EntryBody {
    fn from_object(kind: EntryKind, content: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            EntryKind::Journal => EntryBody::Journal(serde_json::from_value(content)?),
            EntryKind::Tasks => EntryBody::Tasks(serde_json::from_value(content)?),
            EntryKind::Fitness => EntryBody::Fitness(serde_json::from_value(content)?),
            EntryKind::Food => EntryBody::Food(serde_json::from_value(content)?),
            EntryKind::Sleep => EntryBody::Sleep(serde_json::from_value(content)?),
            EntryKind::Movies => EntryBody::Movies(serde_json::from_value(content)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VideoContent {
    /// Link to the video; uploaded files point at `/uploads/...`
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogContent {
    Entry { kind: EntryKind, body: EntryBody },
    Video(VideoContent),
    Custom { log_type: String, value: Value },
}

/// A field counts as filled when it is non-blank text or a number
fn is_filled(value: &Value) -> bool {
    match value {
        Value::String(text) => !text.trim().is_empty(),
        Value::Number(_) => true,
        _ => false,
    }
}

impl LogContent {
    /// Validates `content` against the schema selected by `log_type`
    pub fn parse(log_type: &str, content: Value) -> Result<Self, AppError> {
        let log_type = log_type.trim();
        if log_type.is_empty() {
            return Err(AppError::Validation("Log type is required".to_string()));
        }
        if content.is_null() {
            return Err(AppError::Validation("Log content is required".to_string()));
        }

        if log_type == VIDEO_TYPE {
            return serde_json::from_value::<VideoContent>(content)
                .map(LogContent::Video)
                .map_err(|e| AppError::Validation(format!("Invalid video content: {}", e)));
        }

        let kind = match log_type.parse::<EntryKind>() {
            Ok(kind) => kind,
            Err(_) => {
                return Ok(LogContent::Custom {
                    log_type: log_type.to_string(),
                    value: content,
                })
            }
        };

        let body = match content {
            Value::String(text) if !text.trim().is_empty() => EntryBody::Text(text),
            Value::Object(fields) if fields.values().any(is_filled) => {
                EntryBody::from_object(kind, Value::Object(fields)).map_err(|e| {
                    AppError::Validation(format!("Invalid {} content: {}", kind, e))
                })?
            }
            _ => {
                return Err(AppError::Validation(format!(
                    "Content for {} logs must be non-empty text or a {} object",
                    kind, kind
                )))
            }
        };

        Ok(LogContent::Entry { kind, body })
    }

    pub fn log_type(&self) -> &str {
        match self {
            LogContent::Entry { kind, .. } => kind.as_ref(),
            LogContent::Video(_) => VIDEO_TYPE,
            LogContent::Custom { log_type, .. } => log_type,
        }
    }

    /// JSON form as stored and returned to clients
    pub fn to_value(&self) -> Value {
        match self {
            LogContent::Entry { body, .. } => json!(body),
            LogContent::Video(video) => json!({
                "url": video.url,
                "notes": video.notes,
            }),
            LogContent::Custom { value, .. } => value.clone(),
        }
    }
}
