//! Attache Database Library
//!
//! PostgreSQL persistence for media records: the `MediaStore` repository trait,
//! its `PgMediaStore` implementation, pool construction and embedded migrations.

pub mod db;
pub mod pool;

pub use db::{MediaStore, PgMediaStore};
pub use pool::{connect, run_migrations};
