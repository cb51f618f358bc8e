//! Mock media store for testing without database

use async_trait::async_trait;
use attache_core::constants::{LIVE, SOFT_DELETED};
use attache_core::{AppError, MediaRecord, MediaUpdate, NewMediaRecord};
use attache_db::MediaStore;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// How the next insert should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertFailure {
    /// Statement succeeds but reports no row.
    NoRow,
    /// Statement fails with a database error.
    Error,
}

#[derive(Clone, Default)]
pub struct MockMediaStore {
    rows: Arc<Mutex<HashMap<i64, MediaRecord>>>,
    /// container id -> creating user id
    containers: Arc<Mutex<HashMap<i64, i64>>>,
    next_id: Arc<Mutex<i64>>,
    insert_failure: Arc<Mutex<Option<InsertFailure>>>,
}

impl MockMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_container(&self, container_id: i64, created_by_user_id: i64) {
        self.containers
            .lock()
            .unwrap()
            .insert(container_id, created_by_user_id);
    }

    pub fn fail_next_insert(&self, failure: InsertFailure) {
        *self.insert_failure.lock().unwrap() = Some(failure);
    }

    /// Row by id, including soft-deleted rows.
    pub fn get(&self, id: i64) -> Option<MediaRecord> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn live_where<F>(&self, predicate: F) -> Vec<MediaRecord>
    where
        F: Fn(&MediaRecord) -> bool,
    {
        let mut rows: Vec<MediaRecord> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.is_live() && predicate(r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.create_date_utc
                .cmp(&a.create_date_utc)
                .then(b.id.cmp(&a.id))
        });
        rows
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn insert(&self, record: NewMediaRecord) -> Result<Option<i64>, AppError> {
        match self.insert_failure.lock().unwrap().take() {
            Some(InsertFailure::NoRow) => return Ok(None),
            Some(InsertFailure::Error) => return Err(AppError::Database(sqlx::Error::PoolTimedOut)),
            None => {}
        }

        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };

        self.rows.lock().unwrap().insert(
            id,
            MediaRecord {
                id,
                container_id: record.container_id,
                filename: record.filename,
                filepath: record.filepath,
                file_size: record.file_size,
                video_length: record.video_length,
                create_date_utc: record.create_date_utc,
                update_date_utc: None,
                delete_date_utc: None,
                deleted: LIVE,
            },
        );
        Ok(Some(id))
    }

    async fn find_live(&self, id: i64) -> Result<Option<MediaRecord>, AppError> {
        Ok(self.get(id).filter(MediaRecord::is_live))
    }

    async fn list_by_owner(&self, user_id: i64) -> Result<Vec<MediaRecord>, AppError> {
        let containers = self.containers.lock().unwrap().clone();
        Ok(self.live_where(|r| containers.get(&r.container_id) == Some(&user_id)))
    }

    async fn list_by_container(&self, container_id: i64) -> Result<Vec<MediaRecord>, AppError> {
        Ok(self.live_where(|r| r.container_id == container_id))
    }

    async fn update(&self, id: i64, changes: &MediaUpdate) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&id).filter(|r| r.is_live()) {
            Some(row) => {
                row.filename = changes.filename.clone();
                row.filepath = changes.filepath.clone();
                row.file_size = changes.file_size;
                row.video_length = changes.video_length;
                row.update_date_utc = Some(changes.update_date_utc);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn soft_delete(&self, id: i64, at: DateTime<Utc>) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&id).filter(|r| r.is_live()) {
            Some(row) => {
                row.deleted = SOFT_DELETED;
                row.delete_date_utc = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
