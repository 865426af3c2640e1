use axum::{
    extract::{
        multipart::{Field, MultipartError},
        Multipart,
    },
    http::StatusCode,
};
use chrono::Utc;
use rand::{distr::Alphanumeric, Rng};
use std::path::{Path, PathBuf};
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

use crate::shared::AppError;

/// Extensions accepted for video uploads (compared lower-cased)
pub const ALLOWED_VIDEO_EXTENSIONS: [&str; 4] = [".mp4", ".webm", ".mov", ".mkv"];

/// 100 MiB
pub const MAX_VIDEO_BYTES: usize = 100 * 1024 * 1024;

/// Public path prefix the upload directory is served under
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Returns the lower-cased extension (with the dot) if it is an allowed video type
pub fn video_extension(file_name: &str) -> Result<String, AppError> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .filter(|ext| ALLOWED_VIDEO_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| AppError::BadRequest("Only video files are allowed".to_string()))
}

fn stored_file_name(extension: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect();
    format!(
        "{}-{}{}",
        Utc::now().timestamp_millis(),
        suffix.to_lowercase(),
        extension
    )
}

fn io_error(path: &Path, action: &str, e: std::io::Error) -> AppError {
    warn!(error = %e, path = %path.display(), "Failed to {}", action);
    AppError::Internal
}

/// A video file in the upload directory
#[derive(Debug, Clone, PartialEq)]
pub struct StoredVideo {
    pub path: PathBuf,
    /// Public URL, under `UPLOADS_ROUTE`
    pub url: String,
}

/// Local directory holding uploaded videos
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_bytes: MAX_VIDEO_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Picks a fresh location for a video. Nothing is written yet.
    pub fn reserve(&self, extension: &str) -> StoredVideo {
        let file_name = stored_file_name(extension);
        StoredVideo {
            path: self.dir.join(&file_name),
            url: format!("{}/{}", UPLOADS_ROUTE, file_name),
        }
    }

    /// Streams a multipart file field to disk under a fresh name.
    /// A partial file is removed when the field overflows `max_bytes` or fails mid-way.
    #[instrument(skip(self, field))]
    pub async fn stream_field(
        &self,
        field: &mut Field<'_>,
        extension: &str,
    ) -> Result<StoredVideo, AppError> {
        self.ensure_dir()
            .await
            .map_err(|e| io_error(&self.dir, "create upload directory", e))?;

        let video = self.reserve(extension);
        let mut file = File::create(&video.path)
            .await
            .map_err(|e| io_error(&video.path, "create upload file", e))?;

        match self.copy_chunks(field, &mut file, &video.path).await {
            Ok(size) => {
                info!(path = %video.path.display(), size, "Stored uploaded video");
                Ok(video)
            }
            Err(e) => {
                drop(file);
                self.discard(&video).await;
                Err(e)
            }
        }
    }

    async fn copy_chunks(
        &self,
        field: &mut Field<'_>,
        file: &mut File,
        path: &Path,
    ) -> Result<usize, AppError> {
        let mut written = 0usize;
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if written + chunk.len() > self.max_bytes {
                warn!(max_bytes = self.max_bytes, "Video upload exceeds size limit");
                return Err(AppError::PayloadTooLarge(format!(
                    "Video exceeds the maximum upload size of {} bytes",
                    self.max_bytes
                )));
            }
            file.write_all(&chunk)
                .await
                .map_err(|e| io_error(path, "write uploaded video", e))?;
            written += chunk.len();
        }
        file.flush()
            .await
            .map_err(|e| io_error(path, "flush uploaded video", e))?;
        Ok(written)
    }

    /// Deletes a stored video that no log will point at. A missing file is fine.
    pub async fn discard(&self, video: &StoredVideo) {
        match tokio::fs::remove_file(&video.path).await {
            Ok(()) => debug!(path = %video.path.display(), "Removed unused upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(error = %e, path = %video.path.display(), "Failed to remove unused upload"),
        }
    }
}

/// Optional text fields of a video upload
#[derive(Debug, Default, Clone)]
pub struct UploadFields {
    pub title: Option<String>,
    pub mood: Option<String>,
    pub notes: Option<String>,
    pub date: Option<String>,
}

/// Parsed multipart body of a video upload; the file is already on disk
#[derive(Debug)]
pub struct VideoUpload {
    pub video: StoredVideo,
    pub fields: UploadFields,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// Reads the `video` file field and the optional text fields.
/// The extension is checked before any file bytes are read. The file is streamed to
/// `store` and removed again if anything later in the body fails.
pub async fn read_video_upload(
    mut multipart: Multipart,
    store: &UploadStore,
) -> Result<VideoUpload, AppError> {
    let mut fields = UploadFields::default();
    let mut video: Option<StoredVideo> = None;

    let outcome = read_fields(&mut multipart, store, &mut fields, &mut video).await;
    match (outcome, video) {
        (Ok(()), Some(video)) => Ok(VideoUpload { video, fields }),
        (Ok(()), None) => Err(AppError::BadRequest("No video file uploaded".to_string())),
        (Err(e), stored) => {
            if let Some(stored) = stored {
                store.discard(&stored).await;
            }
            Err(e)
        }
    }
}

async fn read_fields(
    multipart: &mut Multipart,
    store: &UploadStore,
    fields: &mut UploadFields,
    video: &mut Option<StoredVideo>,
) -> Result<(), AppError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "video" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let extension = video_extension(&file_name)?;
                let stored = store.stream_field(&mut field, &extension).await?;
                // The last file wins
                if let Some(previous) = video.replace(stored) {
                    store.discard(&previous).await;
                }
            }
            "title" | "mood" | "notes" | "date" => {
                let value = field.text().await.map_err(multipart_error)?;
                let slot = match name.as_str() {
                    "title" => &mut fields.title,
                    "mood" => &mut fields.mood,
                    "notes" => &mut fields.notes,
                    _ => &mut fields.date,
                };
                *slot = Some(value);
            }
            other => debug!(field = %other, "Ignoring unknown multipart field"),
        }
    }
    Ok(())
}
