//! Configuration module
//!
//! Attache is configured from the environment. The uploads root is an explicit,
//! absolute value injected into storage at construction time; nothing is resolved
//! against the process working directory.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{DEFAULT_MAX_FILENAME_LENGTH, DEFAULT_MAX_UPLOAD_BYTES};

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Parse an optional numeric setting; a present but malformed value is an error.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got {:?}", key, raw)),
        None => Ok(default),
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct AttacheConfig {
    pub database_url: String,
    pub uploads_root: PathBuf,
    pub max_upload_bytes: usize,
    pub max_filename_length: usize,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

impl AttacheConfig {
    /// Load `.env` (if present) and read configuration from the process environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let uploads_root = lookup("UPLOADS_ROOT")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow::anyhow!("UPLOADS_ROOT must be set"))?;

        let max_upload_bytes = parse_or(
            &lookup,
            "MAX_UPLOAD_SIZE_MB",
            DEFAULT_MAX_UPLOAD_BYTES / (1024 * 1024),
        )?
        .saturating_mul(1024 * 1024);

        let config = AttacheConfig {
            database_url,
            uploads_root,
            max_upload_bytes,
            max_filename_length: parse_or(
                &lookup,
                "MAX_FILENAME_LENGTH",
                DEFAULT_MAX_FILENAME_LENGTH,
            )?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", MAX_CONNECTIONS)?,
            db_timeout_seconds: parse_or(&lookup, "DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS)?,
            environment: lookup("ENVIRONMENT")
                .or_else(|| lookup("APP_ENV"))
                .unwrap_or_else(|| "development".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.database_url.starts_with("postgresql://")
            || self.database_url.starts_with("postgres://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if !self.uploads_root.is_absolute() {
            return Err(anyhow::anyhow!(
                "UPLOADS_ROOT must be an absolute path, got {}",
                self.uploads_root.display()
            ));
        }

        if self.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if self.max_filename_length == 0 {
            return Err(anyhow::anyhow!("MAX_FILENAME_LENGTH must be greater than 0"));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
