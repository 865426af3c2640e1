use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{types::Json, FromRow, PgPool};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::{
    content::LogContent,
    models::{sort_newest_first, LogFields, LogModel},
};
use crate::shared::AppError;

/// Trait for log store operations. Every lookup is scoped to the owning user.
#[async_trait]
pub trait LogRepository {
    async fn create_log(&self, log: &LogModel) -> Result<(), AppError>;

    /// All logs of the owner, newest date first
    async fn list_logs(&self, user_id: &str) -> Result<Vec<LogModel>, AppError>;

    /// The `limit` newest logs of the owner
    async fn recent_logs(&self, user_id: &str, limit: usize) -> Result<Vec<LogModel>, AppError>;

    /// Returns None when the log does not exist or belongs to someone else
    async fn update_log(
        &self,
        user_id: &str,
        log_id: &str,
        fields: &LogFields,
    ) -> Result<Option<LogModel>, AppError>;

    /// Returns false when the log does not exist or belongs to someone else
    async fn delete_log(&self, user_id: &str, log_id: &str) -> Result<bool, AppError>;
}

/// In-memory implementation of LogRepository for development and testing
pub struct InMemoryLogRepository {
    logs: Mutex<Vec<LogModel>>,
}

impl Default for InMemoryLogRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLogRepository {
    pub fn new() -> Self {
        Self {
            logs: Mutex::new(Vec::new()),
        }
    }

    /// Total logs across all users
    pub fn log_count(&self) -> usize {
        self.logs.lock().unwrap().len()
    }
}

#[async_trait]
impl LogRepository for InMemoryLogRepository {
    #[instrument(skip(self, log))]
    async fn create_log(&self, log: &LogModel) -> Result<(), AppError> {
        debug!(log_id = %log.id, user_id = %log.user_id, "Creating log in memory");

        let mut logs = self.logs.lock().unwrap();
        if logs.iter().any(|existing| existing.id == log.id) {
            warn!(log_id = %log.id, "Log already exists in memory");
            return Err(AppError::DatabaseError("Log already exists".to_string()));
        }
        logs.push(log.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_logs(&self, user_id: &str) -> Result<Vec<LogModel>, AppError> {
        let mut owned: Vec<LogModel> = self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| log.user_id == user_id)
            .cloned()
            .collect();
        sort_newest_first(&mut owned);

        debug!(user_id = %user_id, count = owned.len(), "Logs listed from memory");
        Ok(owned)
    }

    #[instrument(skip(self))]
    async fn recent_logs(&self, user_id: &str, limit: usize) -> Result<Vec<LogModel>, AppError> {
        let mut logs = self.list_logs(user_id).await?;
        logs.truncate(limit);
        Ok(logs)
    }

    #[instrument(skip(self, fields))]
    async fn update_log(
        &self,
        user_id: &str,
        log_id: &str,
        fields: &LogFields,
    ) -> Result<Option<LogModel>, AppError> {
        let mut logs = self.logs.lock().unwrap();
        let Some(log) = logs
            .iter_mut()
            .find(|log| log.id == log_id && log.user_id == user_id)
        else {
            debug!(log_id = %log_id, "Owned log not found for update in memory");
            return Ok(None);
        };

        log.apply(fields.clone());
        Ok(Some(log.clone()))
    }

    #[instrument(skip(self))]
    async fn delete_log(&self, user_id: &str, log_id: &str) -> Result<bool, AppError> {
        let mut logs = self.logs.lock().unwrap();
        let before = logs.len();
        logs.retain(|log| !(log.id == log_id && log.user_id == user_id));

        let deleted = logs.len() < before;
        debug!(log_id = %log_id, deleted, "Delete attempted in memory");
        Ok(deleted)
    }
}

/// Row shape of the logs table; content is re-validated on the way out
#[derive(FromRow)]
struct LogRow {
    id: String,
    user_id: String,
    title: Option<String>,
    log_type: String,
    mood: Option<String>,
    content: Json<Value>,
    date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LogRow> for LogModel {
    type Error = AppError;

    fn try_from(row: LogRow) -> Result<Self, Self::Error> {
        let content = LogContent::parse(&row.log_type, row.content.0).map_err(|e| {
            warn!(log_id = %row.id, error = %e, "Stored log content does not match its type");
            AppError::DatabaseError(format!("Corrupt log {}", row.id))
        })?;

        Ok(LogModel {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            mood: row.mood,
            content,
            date: row.date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const LOG_COLUMNS: &str =
    "id, user_id, title, log_type, mood, content, date, created_at, updated_at";

/// PostgreSQL implementation of log repository
pub struct PostgresLogRepository {
    pool: PgPool,
}

impl PostgresLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn rows_to_models(rows: Vec<LogRow>) -> Result<Vec<LogModel>, AppError> {
        rows.into_iter().map(LogModel::try_from).collect()
    }
}

fn database_error(e: sqlx::Error) -> AppError {
    warn!(error = %e, "Log query failed");
    AppError::DatabaseError(e.to_string())
}

#[async_trait]
impl LogRepository for PostgresLogRepository {
    #[instrument(skip(self, log))]
    async fn create_log(&self, log: &LogModel) -> Result<(), AppError> {
        debug!(log_id = %log.id, user_id = %log.user_id, "Creating log in database");

        sqlx::query(
            "INSERT INTO logs (id, user_id, title, log_type, mood, content, date, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        )
        .bind(&log.id)
        .bind(&log.user_id)
        .bind(&log.title)
        .bind(log.log_type())
        .bind(&log.mood)
        .bind(Json(log.content.to_value()))
        .bind(log.date)
        .bind(log.created_at)
        .bind(log.updated_at)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_logs(&self, user_id: &str) -> Result<Vec<LogModel>, AppError> {
        let rows = sqlx::query_as::<_, LogRow>(&format!(
            "SELECT {} FROM logs WHERE user_id = $1 ORDER BY date DESC, created_at DESC",
            LOG_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        Self::rows_to_models(rows)
    }

    #[instrument(skip(self))]
    async fn recent_logs(&self, user_id: &str, limit: usize) -> Result<Vec<LogModel>, AppError> {
        let rows = sqlx::query_as::<_, LogRow>(&format!(
            "SELECT {} FROM logs WHERE user_id = $1 ORDER BY date DESC, created_at DESC LIMIT $2",
            LOG_COLUMNS
        ))
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        Self::rows_to_models(rows)
    }

    #[instrument(skip(self, fields))]
    async fn update_log(
        &self,
        user_id: &str,
        log_id: &str,
        fields: &LogFields,
    ) -> Result<Option<LogModel>, AppError> {
        let row = sqlx::query_as::<_, LogRow>(&format!(
            "UPDATE logs SET title = $3, log_type = $4, mood = $5, content = $6, date = $7, updated_at = $8 \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            LOG_COLUMNS
        ))
        .bind(log_id)
        .bind(user_id)
        .bind(&fields.title)
        .bind(fields.content.log_type())
        .bind(&fields.mood)
        .bind(Json(fields.content.to_value()))
        .bind(fields.date)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(LogModel::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn delete_log(&self, user_id: &str, log_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM logs WHERE id = $1 AND user_id = $2")
            .bind(log_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }
}
