//! Confinement of candidate paths to a trusted root.
//!
//! Resolution is purely lexical: `.` and `..` are folded without touching the
//! filesystem, so the result does not depend on what currently exists on disk.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::traits::{StorageError, StorageResult};

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                out.push(component.as_os_str())
            }
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
        }
    }
    out
}

/// Resolve `candidate` against `root`, failing unless the result lies strictly below it.
///
/// The check is component-wise, so `/srv/uploads-backup` is not under `/srv/uploads`,
/// and the root itself is rejected. On success the result is exactly
/// `root/normalize(candidate)`.
pub fn resolve_safe_path(root: &Path, candidate: &str) -> StorageResult<PathBuf> {
    if root.as_os_str().is_empty() {
        return Err(StorageError::InvalidArgument(
            "root directory is required".to_string(),
        ));
    }
    if !root.is_absolute() {
        return Err(StorageError::InvalidArgument(format!(
            "root directory must be absolute: {}",
            root.display()
        )));
    }
    if candidate.is_empty() {
        return Err(StorageError::InvalidArgument(
            "candidate path is required".to_string(),
        ));
    }
    if candidate.contains('\0') {
        return Err(StorageError::PathTraversal(
            "candidate contains a NUL byte".to_string(),
        ));
    }

    let root = normalize(root);
    let resolved = normalize(&root.join(candidate));

    if resolved == root || !resolved.starts_with(&root) {
        tracing::warn!(
            root = %root.display(),
            candidate = %candidate,
            "Rejected path outside uploads root"
        );
        return Err(StorageError::PathTraversal(candidate.to_string()));
    }

    Ok(resolved)
}

/// Resolve and confirm the target exists.
pub async fn exists_under_root(root: &Path, candidate: &str) -> StorageResult<PathBuf> {
    let path = resolve_safe_path(root, candidate)?;
    match tokio::fs::metadata(&path).await {
        Ok(_) => Ok(path),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(StorageError::NotFound(candidate.to_string()))
        }
        Err(e) => Err(StorageError::IoError(e)),
    }
}

/// Resolve and confirm the target can be opened for reading.
pub async fn readable_under_root(root: &Path, candidate: &str) -> StorageResult<PathBuf> {
    let path = resolve_safe_path(root, candidate)?;
    match tokio::fs::File::open(&path).await {
        Ok(_) => Ok(path),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(StorageError::NotFound(candidate.to_string()))
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            Err(StorageError::NotReadable(candidate.to_string()))
        }
        Err(e) => Err(StorageError::IoError(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "/srv/attache/uploads";

    fn resolve(candidate: &str) -> StorageResult<PathBuf> {
        resolve_safe_path(Path::new(ROOT), candidate)
    }

    #[test]
    fn test_resolves_under_root() {
        assert_eq!(
            resolve("text/a.txt").unwrap(),
            PathBuf::from("/srv/attache/uploads/text/a.txt")
        );
        assert_eq!(
            resolve("./file.txt").unwrap(),
            PathBuf::from("/srv/attache/uploads/file.txt")
        );
        assert_eq!(
            resolve("images/../text/./b.txt").unwrap(),
            PathBuf::from("/srv/attache/uploads/text/b.txt")
        );
    }

    #[test]
    fn test_trailing_separator_on_root() {
        let resolved = resolve_safe_path(Path::new("/srv/attache/uploads/"), "json/x.json").unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/attache/uploads/json/x.json"));
    }

    #[test]
    fn test_escapes_rejected() {
        for candidate in [
            "../secret.txt",
            "../../etc/passwd",
            "text/../../outside.txt",
            "/etc/passwd",
        ] {
            assert!(
                matches!(resolve(candidate), Err(StorageError::PathTraversal(_))),
                "{candidate}"
            );
        }
    }

    #[test]
    fn test_sibling_with_shared_prefix_rejected() {
        assert!(matches!(
            resolve("../uploads-backup/file.txt"),
            Err(StorageError::PathTraversal(_))
        ));
    }

    #[test]
    fn test_root_itself_rejected() {
        assert!(matches!(resolve("."), Err(StorageError::PathTraversal(_))));
        assert!(matches!(
            resolve("text/.."),
            Err(StorageError::PathTraversal(_))
        ));
    }

    #[test]
    fn test_absolute_candidate_inside_root_allowed() {
        assert_eq!(
            resolve("/srv/attache/uploads/text/c.txt").unwrap(),
            PathBuf::from("/srv/attache/uploads/text/c.txt")
        );
    }

    #[test]
    fn test_missing_arguments() {
        assert!(matches!(resolve(""), Err(StorageError::InvalidArgument(_))));
        assert!(matches!(
            resolve_safe_path(Path::new(""), "a.txt"),
            Err(StorageError::InvalidArgument(_))
        ));
        assert!(matches!(
            resolve_safe_path(Path::new("relative/uploads"), "a.txt"),
            Err(StorageError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_exists_and_readable_helpers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("present.txt"), b"x").unwrap();

        assert!(exists_under_root(dir.path(), "present.txt").await.is_ok());
        assert!(readable_under_root(dir.path(), "present.txt").await.is_ok());

        assert!(matches!(
            exists_under_root(dir.path(), "absent.txt").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            readable_under_root(dir.path(), "absent.txt").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            exists_under_root(dir.path(), "../present.txt").await,
            Err(StorageError::PathTraversal(_))
        ));
    }
}
