use std::sync::Arc;

use attache_core::{
    AppError, CreateMediaRequest, CreatedMedia, ErrorMetadata, LogLevel, MediaCategory,
    MediaRecord, MediaResponse, MediaUpdate, NewMediaRecord, UpdateMediaRequest,
};
use attache_db::MediaStore;
use attache_processing::{
    check_display_name, file_extension, sanitize_filename, validate_content_type,
};
use attache_storage::{MediaStorage, Removed, StoredFile};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use serde_json::Value as JsonValue;

const NO_MEDIA_FOUND: &str = "No media found.";

fn not_found() -> AppError {
    AppError::NotFound(NO_MEDIA_FOUND.to_string())
}

fn log_error(operation: &'static str, error: &AppError) {
    let error_code = error.error_code();
    let details = error.detailed_message();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(operation, error_code, error = %details, "Media operation rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(operation, error_code, error = %details, "Media operation rejected");
        }
        LogLevel::Error => {
            tracing::error!(operation, error_code, error = %details, "Media operation failed");
        }
    }
}

/// Fold a result into the envelope, logging the full error before it is reduced
/// to its client message.
fn respond<T>(
    operation: &'static str,
    result: Result<MediaResponse<T>, AppError>,
) -> MediaResponse<T> {
    match result {
        Ok(response) => response,
        Err(e) => {
            log_error(operation, &e);
            MediaResponse::from_error(&e)
        }
    }
}

fn decode_payload(encoded: &str) -> Result<Vec<u8>, AppError> {
    STANDARD
        .decode(encoded)
        .map_err(|e| AppError::InvalidArgument(format!("base64 payload is invalid: {}", e)))
}

/// Media record manager.
///
/// Validation runs before any I/O. Bytes are written before the row; if the row
/// cannot be inserted the written file is removed again.
#[derive(Clone)]
pub struct MediaService {
    store: Arc<dyn MediaStore>,
    storage: Arc<dyn MediaStorage>,
    max_filename_length: usize,
}

impl MediaService {
    pub fn new(
        store: Arc<dyn MediaStore>,
        storage: Arc<dyn MediaStorage>,
        max_filename_length: usize,
    ) -> Self {
        Self {
            store,
            storage,
            max_filename_length,
        }
    }

    fn check_payload_size(&self, payload: &[u8]) -> Result<(), AppError> {
        let max = self.storage.max_upload_bytes();
        if payload.len() > max {
            tracing::warn!(size_bytes = payload.len(), max_bytes = max, "Rejected oversized payload");
            return Err(AppError::PayloadTooLarge(format!(
                "Payload of {} bytes exceeds the {} byte limit",
                payload.len(),
                max
            )));
        }
        Ok(())
    }

    /// Remove a file written for a create that did not commit.
    async fn roll_back(&self, stored: &StoredFile, primary: AppError) -> AppError {
        if !stored.written {
            return primary;
        }

        match self.storage.remove(&stored.logical_path).await {
            Ok(Removed::Deleted) | Ok(Removed::AlreadyAbsent) => {
                tracing::warn!(
                    key = %stored.logical_path,
                    error = %primary,
                    "Rolled back stored file after failed insert"
                );
                primary
            }
            Err(cleanup) => {
                tracing::error!(
                    key = %stored.logical_path,
                    error = %primary,
                    cleanup_error = %cleanup,
                    "Rollback of stored file failed, file is orphaned"
                );
                primary.with_cleanup_failure(cleanup.to_string())
            }
        }
    }

    async fn try_create(&self, request: CreateMediaRequest) -> Result<CreatedMedia, AppError> {
        request.validate()?;

        let extension = check_display_name(&request.filename)?;
        let filename = sanitize_filename(&request.filename, self.max_filename_length)?;
        let category = MediaCategory::from_extension(&extension);

        let payload = request.payload().map(decode_payload).transpose()?;
        if let Some(bytes) = payload.as_deref() {
            self.check_payload_size(bytes)?;
            validate_content_type(bytes, &extension)?;
        }

        let file_size = match (request.file_size, payload.as_deref()) {
            (Some(size), _) => size,
            (None, Some(bytes)) => bytes.len() as i64,
            (None, None) => 0,
        };

        let stored = self
            .storage
            .store(category, &extension, payload.as_deref())
            .await?;

        let record = NewMediaRecord {
            container_id: request.container_id,
            filename,
            filepath: stored.logical_path.clone(),
            file_size,
            video_length: request.video_length,
            create_date_utc: request.create_date_utc.unwrap_or_else(Utc::now),
        };

        match self.store.insert(record).await {
            Ok(Some(id)) => Ok(CreatedMedia {
                id,
                filepath: stored.logical_path,
            }),
            Ok(None) => Err(self
                .roll_back(&stored, AppError::Internal("Media did not insert".to_string()))
                .await),
            Err(e) => Err(self.roll_back(&stored, e).await),
        }
    }

    /// Create a media record, writing the payload first when one is given.
    #[tracing::instrument(skip(self, request), fields(
        db.table = "media",
        db.operation = "insert",
        container_id = request.container_id
    ))]
    pub async fn create_media(&self, request: CreateMediaRequest) -> MediaResponse<CreatedMedia> {
        let result = self.try_create(request).await.map(|created| {
            tracing::info!(media_id = created.id, key = %created.filepath, "Media created");
            MediaResponse::ok_with_message(
                format!("Created media {} successfully", created.id),
                Some(created),
            )
        });
        respond("create_media", result)
    }

    /// Create from an untyped request body. `null` is rejected before anything runs.
    pub async fn create_media_from_json(&self, body: &JsonValue) -> MediaResponse<CreatedMedia> {
        match CreateMediaRequest::from_json(body) {
            Ok(request) => self.create_media(request).await,
            Err(e) => respond("create_media", Err(e)),
        }
    }

    async fn try_update(&self, id: i64, request: UpdateMediaRequest) -> Result<(), AppError> {
        request.validate()?;

        let current = self.store.find_live(id).await?.ok_or_else(not_found)?;

        // (sanitized name, extension, category) when the name actually changes
        let rename = match request.filename.as_deref() {
            Some(raw) => {
                let extension = check_display_name(raw)?;
                let sanitized = sanitize_filename(raw, self.max_filename_length)?;
                if sanitized != current.filename {
                    let category = MediaCategory::from_extension(&extension);
                    Some((sanitized, extension, category))
                } else {
                    None
                }
            }
            None => None,
        };

        let extension = match &rename {
            Some((_, extension, _)) => extension.clone(),
            None => file_extension(&current.filepath)
                .or_else(|| file_extension(&current.filename))
                .unwrap_or_default(),
        };

        let payload = request.payload().map(decode_payload).transpose()?;
        if let Some(bytes) = payload.as_deref() {
            self.check_payload_size(bytes)?;
            validate_content_type(bytes, &extension)?;
        }

        let (filename, filepath) = match rename {
            Some((sanitized, extension, category)) => {
                let moved = self
                    .storage
                    .relocate(&current.filepath, category, &extension)
                    .await?;
                (sanitized, moved)
            }
            None => (current.filename.clone(), current.filepath.clone()),
        };

        if let Some(bytes) = payload.as_deref() {
            self.storage.overwrite(&filepath, bytes).await?;
        }

        let file_size = match (request.file_size, payload.as_deref()) {
            (Some(size), _) => size,
            (None, Some(bytes)) => bytes.len() as i64,
            (None, None) => current.file_size,
        };

        let changes = MediaUpdate {
            filename,
            filepath,
            file_size,
            video_length: request.video_length.or(current.video_length),
            update_date_utc: Utc::now(),
        };

        if !self.store.update(id, &changes).await? {
            return Err(not_found());
        }
        Ok(())
    }

    /// Update a live record. Absent request fields keep their stored value.
    #[tracing::instrument(skip(self, request), fields(db.table = "media", db.operation = "update", db.record_id = %id))]
    pub async fn update_media(&self, id: i64, request: UpdateMediaRequest) -> MediaResponse<()> {
        let result = self.try_update(id, request).await.map(|()| {
            tracing::info!(media_id = id, "Media updated");
            MediaResponse::ok_with_message(format!("Updated media {} successfully", id), None)
        });
        respond("update_media", result)
    }

    pub async fn update_media_from_json(&self, id: i64, body: &JsonValue) -> MediaResponse<()> {
        match UpdateMediaRequest::from_json(body) {
            Ok(request) => self.update_media(id, request).await,
            Err(e) => respond("update_media", Err(e)),
        }
    }

    async fn try_delete(&self, id: i64) -> Result<(), AppError> {
        let current = self.store.find_live(id).await?.ok_or_else(not_found)?;

        if self.storage.remove(&current.filepath).await? == Removed::AlreadyAbsent {
            tracing::debug!(media_id = id, key = %current.filepath, "No file to remove for media");
        }

        if !self.store.soft_delete(id, Utc::now()).await? {
            return Err(not_found());
        }
        Ok(())
    }

    /// Unlink the file, then flag the row deleted. The row is untouched if the unlink fails.
    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "soft_delete", db.record_id = %id))]
    pub async fn delete_media(&self, id: i64) -> MediaResponse<()> {
        let result = self.try_delete(id).await.map(|()| {
            MediaResponse::ok_with_message(format!("Deleted media {} successfully", id), None)
        });
        respond("delete_media", result)
    }

    fn listing(records: Vec<MediaRecord>) -> Result<MediaResponse<Vec<MediaRecord>>, AppError> {
        if records.is_empty() {
            return Err(not_found());
        }
        Ok(MediaResponse::ok(records))
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select"))]
    pub async fn get_media_by_owner(&self, user_id: i64) -> MediaResponse<Vec<MediaRecord>> {
        let result = match self.store.list_by_owner(user_id).await {
            Ok(records) => Self::listing(records),
            Err(e) => Err(e),
        };
        respond("get_media_by_owner", result)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select", db.record_id = %id))]
    pub async fn get_media_by_id(&self, id: i64) -> MediaResponse<Vec<MediaRecord>> {
        let result = match self.store.find_live(id).await {
            Ok(record) => Self::listing(record.into_iter().collect()),
            Err(e) => Err(e),
        };
        respond("get_media_by_id", result)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select"))]
    pub async fn get_media_by_container(
        &self,
        container_id: i64,
    ) -> MediaResponse<Vec<MediaRecord>> {
        let result = match self.store.list_by_container(container_id).await {
            Ok(records) => Self::listing(records),
            Err(e) => Err(e),
        };
        respond("get_media_by_container", result)
    }

    async fn try_read_content(&self, id: i64) -> Result<Vec<u8>, AppError> {
        let current = self.store.find_live(id).await?.ok_or_else(not_found)?;
        Ok(self.storage.read(&current.filepath).await?)
    }

    /// Bytes stored for a live record.
    #[tracing::instrument(skip(self), fields(db.record_id = %id))]
    pub async fn get_media_content(&self, id: i64) -> MediaResponse<Vec<u8>> {
        let result = self.try_read_content(id).await.map(MediaResponse::ok);
        respond("get_media_content", result)
    }
}
