//! Test helpers for service unit tests
//!
//! In-memory stand-ins for the media store and storage backend so the record
//! manager can be exercised without a database.

pub mod mock_storage;
pub mod mock_store;

pub use mock_storage::{FailingRemoveStorage, FailingWriteStorage, SequenceNames};
pub use mock_store::{InsertFailure, MockMediaStore};
