use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    content::{LogContent, VideoContent},
    models::{parse_log_date, LogFields, LogModel},
    repository::LogRepository,
    types::{LogRequest, LogResponse},
    upload::{StoredVideo, UploadFields, UploadStore, VideoUpload},
};
use crate::shared::AppError;

const DEFAULT_VIDEO_TITLE: &str = "Video Log";

fn log_not_found() -> AppError {
    AppError::NotFound("Log not found".to_string())
}

/// Service for owner-scoped log operations
pub struct LogService {
    repository: Arc<dyn LogRepository + Send + Sync>,
}

impl LogService {
    pub fn new(repository: Arc<dyn LogRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, request))]
    pub async fn create_log(
        &self,
        owner_id: &str,
        request: LogRequest,
    ) -> Result<LogResponse, AppError> {
        let fields = LogFields::try_from(request)?;
        let log = LogModel::new(owner_id, fields);
        self.repository.create_log(&log).await?;

        info!(log_id = %log.id, log_type = %log.log_type(), "Log created");
        Ok(LogResponse::from(&log))
    }

    #[instrument(skip(self))]
    pub async fn list_logs(&self, owner_id: &str) -> Result<Vec<LogResponse>, AppError> {
        let logs = self.repository.list_logs(owner_id).await?;
        debug!(count = logs.len(), "Logs listed");
        Ok(logs.iter().map(LogResponse::from).collect())
    }

    /// The newest `limit` logs, as domain models
    #[instrument(skip(self))]
    pub async fn recent_logs(&self, owner_id: &str, limit: usize) -> Result<Vec<LogModel>, AppError> {
        self.repository.recent_logs(owner_id, limit).await
    }

    #[instrument(skip(self, request))]
    pub async fn update_log(
        &self,
        owner_id: &str,
        log_id: &str,
        request: LogRequest,
    ) -> Result<LogResponse, AppError> {
        let fields = LogFields::try_from(request)?;
        let log = self
            .repository
            .update_log(owner_id, log_id, &fields)
            .await?
            .ok_or_else(|| {
                warn!(log_id = %log_id, "Update of missing or foreign log");
                log_not_found()
            })?;

        info!(log_id = %log_id, "Log updated");
        Ok(LogResponse::from(&log))
    }

    #[instrument(skip(self))]
    pub async fn delete_log(&self, owner_id: &str, log_id: &str) -> Result<(), AppError> {
        if !self.repository.delete_log(owner_id, log_id).await? {
            warn!(log_id = %log_id, "Delete of missing or foreign log");
            return Err(log_not_found());
        }

        info!(log_id = %log_id, "Log deleted");
        Ok(())
    }

    /// Persists a `video` log pointing at an already stored file.
    /// The file is removed when the log cannot be created.
    #[instrument(skip(self, upload, store), fields(url = %upload.video.url))]
    pub async fn create_video_log(
        &self,
        owner_id: &str,
        upload: VideoUpload,
        store: &UploadStore,
    ) -> Result<LogResponse, AppError> {
        let VideoUpload { video, fields } = upload;
        let result = self.insert_video_log(owner_id, &video, fields).await;
        if result.is_err() {
            store.discard(&video).await;
        }
        result
    }

    async fn insert_video_log(
        &self,
        owner_id: &str,
        video: &StoredVideo,
        upload: UploadFields,
    ) -> Result<LogResponse, AppError> {
        let date = match upload.date.as_deref().map(str::trim) {
            Some(date) if !date.is_empty() => parse_log_date(date)?,
            _ => Utc::now(),
        };
        let title = upload
            .title
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VIDEO_TITLE.to_string());

        let fields = LogFields {
            title: Some(title),
            mood: Some(upload.mood.unwrap_or_default()),
            content: LogContent::Video(VideoContent {
                url: Some(video.url.clone()),
                notes: upload.notes.unwrap_or_default(),
            }),
            date,
        };
        let log = LogModel::new(owner_id, fields);
        self.repository.create_log(&log).await?;

        info!(log_id = %log.id, "Video log created");
        Ok(LogResponse::from(&log))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::repository::InMemoryLogRepository;
    use async_trait::async_trait;
    use serde_json::json;

    fn service() -> (LogService, Arc<InMemoryLogRepository>) {
        let repo = Arc::new(InMemoryLogRepository::new());
        (LogService::new(repo.clone()), repo)
    }

    fn journal(date: &str) -> LogRequest {
        LogRequest {
            title: Some("Day".to_string()),
            log_type: Some("journal".to_string()),
            mood: Some("normal".to_string()),
            content: Some(json!("Wrote some code")),
            date: Some(date.to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (service, _) = service();
        let created = service
            .create_log("alice", journal("2024-01-01"))
            .await
            .unwrap();

        let logs = service.list_logs("alice").await.unwrap();
        assert_eq!(logs, vec![created]);
        assert!(service.list_logs("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_content_not_stored() {
        let (service, repo) = service();
        let request = LogRequest {
            log_type: Some("video".to_string()),
            content: Some(json!(12)),
            date: Some("2024-01-01".to_string()),
            ..Default::default()
        };

        let result = service.create_log("alice", request).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(repo.log_count(), 0);
    }

    #[tokio::test]
    async fn test_foreign_update_and_delete_are_not_found() {
        let (service, _) = service();
        let created = service
            .create_log("alice", journal("2024-01-01"))
            .await
            .unwrap();

        let update = service
            .update_log("bob", &created.id, journal("2025-01-01"))
            .await;
        assert!(matches!(update, Err(AppError::NotFound(_))));

        let delete = service.delete_log("bob", &created.id).await;
        assert!(matches!(delete, Err(AppError::NotFound(_))));

        assert_eq!(service.list_logs("alice").await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_update_overwrites() {
        let (service, _) = service();
        let created = service
            .create_log("alice", journal("2024-01-01"))
            .await
            .unwrap();

        let replacement = LogRequest {
            title: None,
            log_type: Some("habits".to_string()),
            mood: None,
            content: Some(json!({"water": 8})),
            date: Some("2024-02-01".to_string()),
        };
        let updated = service
            .update_log("alice", &created.id, replacement)
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, None);
        assert_eq!(updated.log_type, "habits");
        assert_eq!(updated.content, json!({"water": 8}));
        assert_eq!(updated.created_at, created.created_at);
    }

    async fn stored_video(store: &UploadStore) -> StoredVideo {
        store.ensure_dir().await.unwrap();
        let video = store.reserve(".mp4");
        tokio::fs::write(&video.path, vec![0u8; 16]).await.unwrap();
        video
    }

    async fn file_count(store: &UploadStore) -> usize {
        let mut entries = tokio::fs::read_dir(store.dir()).await.unwrap();
        let mut count = 0;
        while entries.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        count
    }

    /// Accepts nothing, as if the database were down
    struct FailingLogRepository;

    #[async_trait]
    impl LogRepository for FailingLogRepository {
        async fn create_log(&self, _log: &LogModel) -> Result<(), AppError> {
            Err(AppError::DatabaseError("connection refused".to_string()))
        }

        async fn list_logs(&self, _user_id: &str) -> Result<Vec<LogModel>, AppError> {
            Ok(Vec::new())
        }

        async fn recent_logs(&self, _user_id: &str, _limit: usize) -> Result<Vec<LogModel>, AppError> {
            Ok(Vec::new())
        }

        async fn update_log(
            &self,
            _user_id: &str,
            _log_id: &str,
            _fields: &LogFields,
        ) -> Result<Option<LogModel>, AppError> {
            Ok(None)
        }

        async fn delete_log(&self, _user_id: &str, _log_id: &str) -> Result<bool, AppError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_create_video_log_defaults() {
        let (service, _) = service();
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let video = stored_video(&store).await;

        let upload = VideoUpload {
            video: video.clone(),
            fields: UploadFields {
                notes: Some("first try".to_string()),
                ..Default::default()
            },
        };
        let log = service
            .create_video_log("alice", upload, &store)
            .await
            .unwrap();

        assert_eq!(log.log_type, "video");
        assert_eq!(log.title.as_deref(), Some("Video Log"));
        assert_eq!(log.mood.as_deref(), Some(""));
        assert_eq!(log.content["notes"], "first try");
        assert_eq!(log.content["url"], video.url.as_str());
        assert!(video.path.exists());
    }

    #[tokio::test]
    async fn test_create_video_log_bad_date_removes_file() {
        let (service, repo) = service();
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("videos"));
        let video = stored_video(&store).await;

        let upload = VideoUpload {
            video,
            fields: UploadFields {
                date: Some("not a date".to_string()),
                ..Default::default()
            },
        };
        let result = service.create_video_log("alice", upload, &store).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(repo.log_count(), 0);
        assert_eq!(file_count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_create_video_log_failed_insert_removes_file() {
        let service = LogService::new(Arc::new(FailingLogRepository));
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let video = stored_video(&store).await;

        let upload = VideoUpload {
            video: video.clone(),
            fields: UploadFields::default(),
        };
        let result = service.create_video_log("alice", upload, &store).await;

        assert!(matches!(result, Err(AppError::DatabaseError(_))));
        assert!(!video.path.exists());
        assert_eq!(file_count(&store).await, 0);
    }
}
