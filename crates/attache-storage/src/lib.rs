//! Attache Storage Library
//!
//! Disk side of media ingestion: confinement of paths to the uploads root,
//! exclusive-create writes under random names, rename, overwrite, unlink and read.
//!
//! # Logical path format
//!
//! Every stored file is addressed by `/uploads/<category>/<stem><ext>` where
//! `<category>` is one of `images`, `text`, `json`, `others` and `<stem>` is 16
//! random bytes in hex. Only this logical form is handed back to callers; the
//! absolute location is computed at the moment of I/O.

pub mod keys;
pub mod local;
pub mod paths;
pub mod traits;

use attache_core::AppError;

// Re-export commonly used types
pub use local::LocalMediaStorage;
pub use paths::{exists_under_root, readable_under_root, resolve_safe_path};
pub use traits::{
    MediaStorage, NameGenerator, RandomHexNames, Removed, StorageError, StorageResult, StoredFile,
};

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidArgument(msg) => AppError::InvalidArgument(msg),
            StorageError::PathTraversal(msg) => AppError::PathTraversal(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidArgument(msg),
            StorageError::NotFound(path) => AppError::NotFound(format!("File not found: {}", path)),
            err @ StorageError::PayloadTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            err @ StorageError::NameGenerationExhausted(_) => {
                AppError::NameGenerationExhausted(err.to_string())
            }
            err @ (StorageError::NotReadable(_)
            | StorageError::WriteFailed(_)
            | StorageError::DeleteFailed(_)
            | StorageError::IoError(_)
            | StorageError::ConfigError(_)) => AppError::Io(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attache_core::ErrorMetadata;

    #[test]
    fn test_storage_errors_map_to_app_errors() {
        let err: AppError = StorageError::PayloadTooLarge { size: 11, max: 10 }.into();
        assert_eq!(err.http_status_code(), 413);

        let err: AppError = StorageError::NameGenerationExhausted(5).into();
        assert_eq!(err.http_status_code(), 503);

        let err: AppError = StorageError::PathTraversal("../x".into()).into();
        assert!(matches!(err, AppError::PathTraversal(_)));

        let err: AppError =
            StorageError::DeleteFailed("Failed to delete file /srv/uploads/text/a.txt".into())
                .into();
        assert_eq!(err.client_message(), "Server Error");
    }
}
