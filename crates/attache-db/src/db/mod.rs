//! Database repositories for the data access layer
//
// Media repository (record lifecycle: insert, read, update, soft delete)
pub mod media;

pub use media::{MediaStore, PgMediaStore};
