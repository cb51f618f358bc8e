use crate::keys::{check_extension, logical_path, parse_logical_path};
use crate::paths::resolve_safe_path;
use crate::traits::{
    MediaStorage, NameGenerator, RandomHexNames, Removed, StorageError, StorageResult, StoredFile,
};
use async_trait::async_trait;
use attache_core::constants::MAX_NAME_ATTEMPTS;
use attache_core::MediaCategory;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage rooted at an explicit uploads directory.
#[derive(Clone)]
pub struct LocalMediaStorage {
    uploads_root: PathBuf,
    max_upload_bytes: usize,
    names: Arc<dyn NameGenerator>,
}

impl LocalMediaStorage {
    /// Create a new LocalMediaStorage
    ///
    /// # Arguments
    /// * `uploads_root` - Absolute directory holding the category folders (e.g. "/var/lib/attache/uploads")
    /// * `max_upload_bytes` - Largest payload accepted by `store` and `overwrite`
    pub fn new(uploads_root: impl Into<PathBuf>, max_upload_bytes: usize) -> StorageResult<Self> {
        let uploads_root = uploads_root.into();
        if !uploads_root.is_absolute() {
            return Err(StorageError::ConfigError(format!(
                "Uploads root must be absolute: {}",
                uploads_root.display()
            )));
        }

        Ok(LocalMediaStorage {
            uploads_root,
            max_upload_bytes,
            names: Arc::new(RandomHexNames),
        })
    }

    /// Replace the random name source.
    pub fn with_name_generator(mut self, names: Arc<dyn NameGenerator>) -> Self {
        self.names = names;
        self
    }

    pub fn uploads_root(&self) -> &Path {
        &self.uploads_root
    }

    fn check_size(&self, size: usize) -> StorageResult<()> {
        if size > self.max_upload_bytes {
            return Err(StorageError::PayloadTooLarge {
                size,
                max: self.max_upload_bytes,
            });
        }
        Ok(())
    }

    fn next_file_name(&self, extension: &str) -> String {
        format!("{}{}", self.names.generate(), extension)
    }

    /// Category folder on disk, created if missing.
    async fn ensure_category_dir(&self, category: MediaCategory) -> StorageResult<PathBuf> {
        let dir = resolve_safe_path(&self.uploads_root, category.folder())?;
        fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to create directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        Ok(dir)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn write_new(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await?;

        let written = async {
            file.write_all(data).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            if let Err(cleanup) = fs::remove_file(path).await {
                tracing::error!(
                    path = %path.display(),
                    error = %cleanup,
                    "Failed to remove partially written file"
                );
            }
            return Err(StorageError::WriteFailed(format!(
                "Failed to write file {}: {}",
                path.display(),
                e
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn store(
        &self,
        category: MediaCategory,
        extension: &str,
        payload: Option<&[u8]>,
    ) -> StorageResult<StoredFile> {
        check_extension(extension)?;

        let data = match payload {
            Some(data) => data,
            None => {
                let file_name = self.next_file_name(extension);
                return Ok(StoredFile {
                    logical_path: logical_path(category, &file_name),
                    written: false,
                    size_bytes: 0,
                });
            }
        };

        self.check_size(data.len())?;
        self.ensure_category_dir(category).await?;

        let start = std::time::Instant::now();

        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let file_name = self.next_file_name(extension);
            let relative = format!("{}/{}", category.folder(), file_name);
            let path = resolve_safe_path(&self.uploads_root, &relative)?;

            match self.write_new(&path, data).await {
                Ok(()) => {
                    let logical = logical_path(category, &file_name);
                    tracing::info!(
                        path = %path.display(),
                        key = %logical,
                        size_bytes = data.len(),
                        attempt = attempt,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "Local storage write successful"
                    );
                    return Ok(StoredFile {
                        logical_path: logical,
                        written: true,
                        size_bytes: data.len(),
                    });
                }
                Err(StorageError::IoError(e)) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!(
                        path = %path.display(),
                        attempt = attempt,
                        "Generated file name already taken, retrying"
                    );
                }
                Err(StorageError::IoError(e)) => {
                    return Err(StorageError::WriteFailed(format!(
                        "Failed to create file {}: {}",
                        path.display(),
                        e
                    )));
                }
                Err(e) => return Err(e),
            }
        }

        tracing::warn!(
            category = %category,
            attempts = MAX_NAME_ATTEMPTS,
            "Could not find a free file name"
        );
        Err(StorageError::NameGenerationExhausted(MAX_NAME_ATTEMPTS))
    }

    async fn relocate(
        &self,
        logical: &str,
        category: MediaCategory,
        extension: &str,
    ) -> StorageResult<String> {
        check_extension(extension)?;
        let source = self.resolve(logical)?;
        self.ensure_category_dir(category).await?;

        // Link then unlink: unlike rename, linking never replaces an existing target.
        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let file_name = self.next_file_name(extension);
            let relative = format!("{}/{}", category.folder(), file_name);
            let target = resolve_safe_path(&self.uploads_root, &relative)?;
            let new_logical = logical_path(category, &file_name);

            match fs::hard_link(&source, &target).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!(
                        path = %target.display(),
                        attempt = attempt,
                        "Generated file name already taken, retrying"
                    );
                    continue;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::warn!(
                        from = %logical,
                        to = %new_logical,
                        "Rename source missing, keeping new path"
                    );
                    return Ok(new_logical);
                }
                Err(e) => {
                    return Err(StorageError::WriteFailed(format!(
                        "Failed to rename {} to {}: {}",
                        source.display(),
                        target.display(),
                        e
                    )));
                }
            }

            match fs::remove_file(&source).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    if let Err(cleanup) = fs::remove_file(&target).await {
                        tracing::error!(
                            path = %target.display(),
                            error = %cleanup,
                            "Failed to remove rename target"
                        );
                    }
                    return Err(StorageError::WriteFailed(format!(
                        "Failed to rename {} to {}: {}",
                        source.display(),
                        target.display(),
                        e
                    )));
                }
            }

            tracing::info!(
                from = %logical,
                to = %new_logical,
                attempt = attempt,
                "Local storage rename successful"
            );
            return Ok(new_logical);
        }

        tracing::warn!(
            category = %category,
            attempts = MAX_NAME_ATTEMPTS,
            "Could not find a free file name"
        );
        Err(StorageError::NameGenerationExhausted(MAX_NAME_ATTEMPTS))
    }

    async fn overwrite(&self, logical: &str, data: &[u8]) -> StorageResult<()> {
        self.check_size(data.len())?;
        let path = self.resolve(logical)?;
        self.ensure_parent_dir(&path).await?;

        fs::write(&path, data).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %logical,
            size_bytes = data.len(),
            "Local storage overwrite successful"
        );
        Ok(())
    }

    async fn remove(&self, logical: &str) -> StorageResult<Removed> {
        let path = self.resolve(logical)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), key = %logical, "Local storage delete successful");
                Ok(Removed::Deleted)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "File already deleted or never existed");
                Ok(Removed::AlreadyAbsent)
            }
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn read(&self, logical: &str) -> StorageResult<Vec<u8>> {
        let path = self.resolve(logical)?;

        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(logical.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                Err(StorageError::NotReadable(logical.to_string()))
            }
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    fn resolve(&self, logical: &str) -> StorageResult<PathBuf> {
        let (category, name) = parse_logical_path(logical)?;
        resolve_safe_path(
            &self.uploads_root,
            &format!("{}/{}", category.folder(), name),
        )
    }

    fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}
