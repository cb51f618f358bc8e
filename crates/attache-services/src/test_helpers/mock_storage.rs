//! Storage doubles for testing

use async_trait::async_trait;
use attache_core::MediaCategory;
use attache_storage::{
    LocalMediaStorage, MediaStorage, NameGenerator, Removed, StorageError, StorageResult,
    StoredFile,
};
use std::path::PathBuf;
use std::sync::Mutex;

/// Deterministic names: hands out the given stems in order, then repeats the last.
pub struct SequenceNames {
    names: Mutex<Vec<String>>,
}

impl SequenceNames {
    pub fn new(names: &[&str]) -> Self {
        let mut names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        names.reverse();
        Self {
            names: Mutex::new(names),
        }
    }

    pub fn repeating(name: &str) -> Self {
        Self::new(&[name])
    }
}

impl NameGenerator for SequenceNames {
    fn generate(&self) -> String {
        let mut names = self.names.lock().unwrap();
        if names.len() > 1 {
            names.pop().unwrap()
        } else {
            names.first().cloned().unwrap_or_default()
        }
    }
}

/// Local storage whose unlink always fails.
pub struct FailingRemoveStorage {
    inner: LocalMediaStorage,
}

impl FailingRemoveStorage {
    pub fn new(inner: LocalMediaStorage) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl MediaStorage for FailingRemoveStorage {
    async fn store(
        &self,
        category: MediaCategory,
        extension: &str,
        payload: Option<&[u8]>,
    ) -> StorageResult<StoredFile> {
        self.inner.store(category, extension, payload).await
    }

    async fn relocate(
        &self,
        logical_path: &str,
        category: MediaCategory,
        extension: &str,
    ) -> StorageResult<String> {
        self.inner.relocate(logical_path, category, extension).await
    }

    async fn overwrite(&self, logical_path: &str, data: &[u8]) -> StorageResult<()> {
        self.inner.overwrite(logical_path, data).await
    }

    async fn remove(&self, logical_path: &str) -> StorageResult<Removed> {
        Err(StorageError::DeleteFailed(format!(
            "simulated failure removing {}",
            logical_path
        )))
    }

    async fn read(&self, logical_path: &str) -> StorageResult<Vec<u8>> {
        self.inner.read(logical_path).await
    }

    fn resolve(&self, logical_path: &str) -> StorageResult<PathBuf> {
        self.inner.resolve(logical_path)
    }

    fn max_upload_bytes(&self) -> usize {
        self.inner.max_upload_bytes()
    }
}

/// Local storage whose rename and in-place write always fail.
pub struct FailingWriteStorage {
    inner: LocalMediaStorage,
}

impl FailingWriteStorage {
    pub fn new(inner: LocalMediaStorage) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl MediaStorage for FailingWriteStorage {
    async fn store(
        &self,
        category: MediaCategory,
        extension: &str,
        payload: Option<&[u8]>,
    ) -> StorageResult<StoredFile> {
        self.inner.store(category, extension, payload).await
    }

    async fn relocate(
        &self,
        logical_path: &str,
        _category: MediaCategory,
        _extension: &str,
    ) -> StorageResult<String> {
        Err(StorageError::WriteFailed(format!(
            "simulated failure moving {}",
            logical_path
        )))
    }

    async fn overwrite(&self, logical_path: &str, _data: &[u8]) -> StorageResult<()> {
        Err(StorageError::WriteFailed(format!(
            "simulated failure writing {}",
            logical_path
        )))
    }

    async fn remove(&self, logical_path: &str) -> StorageResult<Removed> {
        self.inner.remove(logical_path).await
    }

    async fn read(&self, logical_path: &str) -> StorageResult<Vec<u8>> {
        self.inner.read(logical_path).await
    }

    fn resolve(&self, logical_path: &str) -> StorageResult<PathBuf> {
        self.inner.resolve(logical_path)
    }

    fn max_upload_bytes(&self) -> usize {
        self.inner.max_upload_bytes()
    }
}
