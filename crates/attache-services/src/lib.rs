//! Attache Services Layer
//!
//! Hosts the media record manager, which ties filename policy, content
//! validation, disk storage and the durable media store into create, update,
//! delete and read operations that always answer with a `MediaResponse` envelope.

pub mod services;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use attache_db::{MediaStore, PgMediaStore};
pub use attache_storage::{LocalMediaStorage, MediaStorage, StorageError, StorageResult};
pub use services::media::MediaService;
