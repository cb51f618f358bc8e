use attache_core::constants::{LIVE, SOFT_DELETED};
use attache_core::{AppError, MediaRecord, MediaUpdate, NewMediaRecord};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};

pub(crate) const INSERT_MEDIA: &str = r#"
    INSERT INTO media (
        container_id, filename, filepath, file_size, video_length,
        create_date_utc, deleted
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING id
"#;

pub(crate) const SELECT_LIVE_BY_ID: &str =
    "SELECT * FROM media WHERE id = $1 AND deleted = 0";

pub(crate) const SELECT_LIVE_BY_OWNER: &str = r#"
    SELECT m.* FROM media m
    JOIN containers c ON m.container_id = c.id
    WHERE c.created_by_user_id = $1 AND m.deleted = 0
    ORDER BY m.create_date_utc DESC
"#;

pub(crate) const SELECT_LIVE_BY_CONTAINER: &str = r#"
    SELECT * FROM media
    WHERE container_id = $1 AND deleted = 0
    ORDER BY create_date_utc DESC
"#;

pub(crate) const UPDATE_MEDIA: &str = r#"
    UPDATE media SET
        filename = $1,
        filepath = $2,
        file_size = $3,
        video_length = $4,
        update_date_utc = $5
    WHERE id = $6 AND deleted = 0
    RETURNING id
"#;

pub(crate) const SOFT_DELETE_MEDIA: &str = r#"
    UPDATE media SET deleted = $1, delete_date_utc = $2
    WHERE id = $3 AND deleted = 0
    RETURNING id
"#;

/// Durable side of the media lifecycle.
///
/// Every read and write is restricted to live rows (`deleted = 0`). Implementations
/// must only use positional parameters; caller input never reaches SQL text.
#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    /// Insert a row. `Ok(None)` means the store reported no affected row.
    async fn insert(&self, record: NewMediaRecord) -> Result<Option<i64>, AppError>;

    async fn find_live(&self, id: i64) -> Result<Option<MediaRecord>, AppError>;

    /// Live media in containers created by `user_id`, newest first.
    async fn list_by_owner(&self, user_id: i64) -> Result<Vec<MediaRecord>, AppError>;

    /// Live media of one container, newest first.
    async fn list_by_container(&self, container_id: i64) -> Result<Vec<MediaRecord>, AppError>;

    /// Returns false when no live row with `id` exists.
    async fn update(&self, id: i64, changes: &MediaUpdate) -> Result<bool, AppError>;

    /// Raise the deleted flag. Returns false when no live row with `id` exists.
    async fn soft_delete(&self, id: i64, at: DateTime<Utc>) -> Result<bool, AppError>;
}

/// PostgreSQL media store
#[derive(Clone)]
pub struct PgMediaStore {
    pool: PgPool,
}

impl PgMediaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn log_db_error(operation: &'static str, e: sqlx::Error) -> AppError {
    tracing::error!(error = ?e, operation = operation, "Media query failed");
    AppError::Database(e)
}

#[async_trait::async_trait]
impl MediaStore for PgMediaStore {
    #[tracing::instrument(skip(self, record), fields(
        db.system = "postgresql",
        db.table = "media",
        db.operation = "insert",
        container_id = record.container_id
    ))]
    async fn insert(&self, record: NewMediaRecord) -> Result<Option<i64>, AppError> {
        let row: Option<(i64,)> = sqlx::query_as::<Postgres, (i64,)>(INSERT_MEDIA)
            .bind(record.container_id)
            .bind(&record.filename)
            .bind(&record.filepath)
            .bind(record.file_size)
            .bind(record.video_length)
            .bind(record.create_date_utc)
            .bind(LIVE)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| log_db_error("insert", e))?;

        Ok(row.map(|(id,)| id))
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select", db.record_id = %id))]
    async fn find_live(&self, id: i64) -> Result<Option<MediaRecord>, AppError> {
        let row = sqlx::query_as::<Postgres, MediaRecord>(SELECT_LIVE_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| log_db_error("find_live", e))?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select"))]
    async fn list_by_owner(&self, user_id: i64) -> Result<Vec<MediaRecord>, AppError> {
        let rows = sqlx::query_as::<Postgres, MediaRecord>(SELECT_LIVE_BY_OWNER)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| log_db_error("list_by_owner", e))?;

        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select"))]
    async fn list_by_container(&self, container_id: i64) -> Result<Vec<MediaRecord>, AppError> {
        let rows = sqlx::query_as::<Postgres, MediaRecord>(SELECT_LIVE_BY_CONTAINER)
            .bind(container_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| log_db_error("list_by_container", e))?;

        Ok(rows)
    }

    #[tracing::instrument(skip(self, changes), fields(db.table = "media", db.operation = "update", db.record_id = %id))]
    async fn update(&self, id: i64, changes: &MediaUpdate) -> Result<bool, AppError> {
        let row: Option<(i64,)> = sqlx::query_as::<Postgres, (i64,)>(UPDATE_MEDIA)
            .bind(&changes.filename)
            .bind(&changes.filepath)
            .bind(changes.file_size)
            .bind(changes.video_length)
            .bind(changes.update_date_utc)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| log_db_error("update", e))?;

        Ok(row.is_some())
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "soft_delete", db.record_id = %id))]
    async fn soft_delete(&self, id: i64, at: DateTime<Utc>) -> Result<bool, AppError> {
        let row: Option<(i64,)> = sqlx::query_as::<Postgres, (i64,)>(SOFT_DELETE_MEDIA)
            .bind(SOFT_DELETED)
            .bind(at)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| log_db_error("soft_delete", e))?;

        if row.is_some() {
            tracing::info!(media_id = id, "Media soft deleted");
        }
        Ok(row.is_some())
    }
}
