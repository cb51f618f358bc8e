//! Storage abstraction trait
//!
//! The media service talks to disk only through [`MediaStorage`]. Paths crossing
//! this boundary are always logical (`/uploads/<category>/<name>`); the absolute
//! location under the uploads root never leaves the backend.

use async_trait::async_trait;
use attache_core::constants::RANDOM_NAME_BYTES;
use attache_core::MediaCategory;
use std::path::PathBuf;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Path escapes the uploads root: {0}")]
    PathTraversal(String),

    #[error("Invalid logical path: {0}")]
    InvalidKey(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File not readable: {0}")]
    NotReadable(String),

    #[error("Payload of {size} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("No free file name after {0} attempts")]
    NameGenerationExhausted(usize),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Outcome of a successful [`MediaStorage::store`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Logical path to persist in the `filepath` column.
    pub logical_path: String,
    /// Whether bytes actually hit the disk. Rollback only applies when true.
    pub written: bool,
    pub size_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removed {
    Deleted,
    AlreadyAbsent,
}

/// Source of on-disk filename stems.
pub trait NameGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// 16 random bytes, hex encoded.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomHexNames;

impl NameGenerator for RandomHexNames {
    fn generate(&self) -> String {
        hex::encode(rand::random::<[u8; RANDOM_NAME_BYTES]>())
    }
}

/// Disk-side operations the media service needs.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Write `payload` under a fresh random name in the category folder.
    ///
    /// Never overwrites an existing file. With no payload a path of the same shape
    /// is returned and nothing is written.
    async fn store(
        &self,
        category: MediaCategory,
        extension: &str,
        payload: Option<&[u8]>,
    ) -> StorageResult<StoredFile>;

    /// Move a stored file to a fresh random name in `category`.
    ///
    /// A missing source is not an error; the new logical path is returned either way.
    async fn relocate(
        &self,
        logical_path: &str,
        category: MediaCategory,
        extension: &str,
    ) -> StorageResult<String>;

    /// Replace the bytes at an existing logical path, creating the folder if needed.
    async fn overwrite(&self, logical_path: &str, data: &[u8]) -> StorageResult<()>;

    /// Unlink a stored file. A file that is already gone is reported, not failed.
    async fn remove(&self, logical_path: &str) -> StorageResult<Removed>;

    async fn read(&self, logical_path: &str) -> StorageResult<Vec<u8>>;

    /// Absolute filesystem location of a logical path.
    fn resolve(&self, logical_path: &str) -> StorageResult<PathBuf>;

    fn max_upload_bytes(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_hex_names() {
        let names = RandomHexNames;
        let a = names.generate();
        let b = names.generate();

        assert_eq!(a.len(), RANDOM_NAME_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
