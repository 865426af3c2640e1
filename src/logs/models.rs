use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::content::LogContent;
use crate::shared::AppError;

/// Validated, owner-independent part of a log
#[derive(Debug, Clone, PartialEq)]
pub struct LogFields {
    pub title: Option<String>,
    pub mood: Option<String>,
    pub content: LogContent,
    pub date: DateTime<Utc>,
}

/// Domain model for the logs table
#[derive(Debug, Clone, PartialEq)]
pub struct LogModel {
    pub id: String,      // UUID v4 as string
    pub user_id: String, // Owner
    pub title: Option<String>,
    pub mood: Option<String>,
    pub content: LogContent,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LogModel {
    pub fn new(user_id: &str, fields: LogFields) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: fields.title,
            mood: fields.mood,
            content: fields.content,
            date: fields.date,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn log_type(&self) -> &str {
        self.content.log_type()
    }

    /// Overwrites every editable field and bumps `updated_at`
    pub fn apply(&mut self, fields: LogFields) {
        self.title = fields.title;
        self.mood = fields.mood;
        self.content = fields.content;
        self.date = fields.date;
        self.updated_at = Utc::now();
    }
}

/// Listing order: newest date first, then most recently created
pub fn sort_newest_first(logs: &mut [LogModel]) {
    logs.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC)
pub fn parse_log_date(input: &str) -> Result<DateTime<Utc>, AppError> {
    let input = input.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::Validation(format!("Invalid date: {}", input)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fields(date: &str) -> LogFields {
        LogFields {
            title: Some("t".to_string()),
            mood: None,
            content: LogContent::parse("journal", json!("text")).unwrap(),
            date: parse_log_date(date).unwrap(),
        }
    }

    #[test]
    fn test_parse_log_date_formats() {
        assert_eq!(
            parse_log_date("2024-03-05").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_log_date("2024-03-05T10:30:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 5, 8, 30, 0).unwrap()
        );
        assert!(matches!(
            parse_log_date("yesterday"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_sort_newest_first() {
        let older = LogModel::new("u", fields("2024-01-01"));
        let newer = LogModel::new("u", fields("2024-06-01"));
        let mut same_day_later = LogModel::new("u", fields("2024-06-01"));
        same_day_later.created_at = newer.created_at + chrono::Duration::seconds(1);

        let mut logs = vec![older.clone(), newer.clone(), same_day_later.clone()];
        sort_newest_first(&mut logs);

        let ids: Vec<&str> = logs.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec![&same_day_later.id, &newer.id, &older.id]);
    }

    #[test]
    fn test_apply_overwrites_fields() {
        let mut log = LogModel::new("u", fields("2024-01-01"));
        let created = log.created_at;

        log.apply(LogFields {
            title: None,
            mood: Some("happy".to_string()),
            content: LogContent::parse("reading", json!({"pages": 3})).unwrap(),
            date: parse_log_date("2024-02-02").unwrap(),
        });

        assert_eq!(log.title, None);
        assert_eq!(log.log_type(), "reading");
        assert_eq!(log.created_at, created);
        assert!(log.updated_at >= created);
    }
}
