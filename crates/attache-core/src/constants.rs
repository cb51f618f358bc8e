//! Constants shared across crates.

/// Prefix of every logical path persisted in the `filepath` column.
pub const LOGICAL_UPLOADS_PREFIX: &str = "/uploads";

/// Default upper bound for a decoded payload (20 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Default maximum length of a sanitized display filename.
pub const DEFAULT_MAX_FILENAME_LENGTH: usize = 255;

/// Number of random bytes in a generated on-disk filename stem.
pub const RANDOM_NAME_BYTES: usize = 16;

/// Total attempts the storage writer makes before giving up on a free name.
pub const MAX_NAME_ATTEMPTS: usize = 5;

/// Value of the `deleted` column for live rows.
pub const LIVE: i16 = 0;

/// Value of the `deleted` column for soft-deleted rows.
pub const SOFT_DELETED: i16 = 1;
