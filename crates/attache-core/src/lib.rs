//! Attache Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! every Attache component: the media record shape, the caller-facing request and
//! response types, the unified `AppError` and the environment-driven configuration.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::AttacheConfig;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    CreateMediaRequest, CreatedMedia, MediaCategory, MediaRecord, MediaResponse, MediaUpdate,
    NewMediaRecord, UpdateMediaRequest,
};
