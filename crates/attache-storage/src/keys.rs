//! Logical path layout: `/uploads/<category>/<stem><ext>`.

use attache_core::constants::LOGICAL_UPLOADS_PREFIX;
use attache_core::MediaCategory;

use crate::traits::{StorageError, StorageResult};

/// Build the logical path persisted for a stored file.
pub fn logical_path(category: MediaCategory, file_name: &str) -> String {
    format!("{}/{}/{}", LOGICAL_UPLOADS_PREFIX, category.folder(), file_name)
}

/// Portion of a logical path below the uploads root, e.g. `text/ab12.txt`.
pub fn relative_part(logical: &str) -> StorageResult<&str> {
    logical
        .strip_prefix(LOGICAL_UPLOADS_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|rest| !rest.is_empty())
        .ok_or_else(|| StorageError::InvalidKey(logical.to_string()))
}

/// Split a logical path into its category and file name.
pub fn parse_logical_path(logical: &str) -> StorageResult<(MediaCategory, &str)> {
    let rest = relative_part(logical)?;
    let (folder, name) = rest
        .split_once('/')
        .ok_or_else(|| StorageError::InvalidKey(logical.to_string()))?;

    let category = MediaCategory::from_folder(folder)
        .ok_or_else(|| StorageError::InvalidKey(logical.to_string()))?;

    if name.is_empty() || name.contains('/') || name.contains('\\') {
        return Err(StorageError::InvalidKey(logical.to_string()));
    }

    Ok((category, name))
}

/// Extensions are appended verbatim to a generated stem, so only `.` plus
/// ASCII alphanumerics are accepted.
pub fn check_extension(extension: &str) -> StorageResult<()> {
    let valid = extension
        .strip_prefix('.')
        .map(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(format!(
            "invalid extension: {}",
            extension
        )))
    }
}
