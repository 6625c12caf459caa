//! In-memory object store for tests.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{ObjectStore, StoredObject};
use crate::error::StorageError;
use crate::media::MediaKind;

/// An upload recorded by [`FakeObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeUpload {
    pub kind: MediaKind,
    pub public_id: String,
    pub data: Vec<u8>,
}

/// Records uploads in memory and can be told to fail for a given kind.
#[derive(Debug, Default)]
pub struct FakeObjectStore {
    failing: Mutex<HashSet<MediaKind>>,
    uploads: Mutex<Vec<FakeUpload>>,
    deleted: Mutex<Vec<String>>,
    next_id: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl FakeObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose uploads of `kind` always fail.
    pub fn failing_on(kind: MediaKind) -> Self {
        let store = Self::new();
        store.fail_on(kind);
        store
    }

    pub fn fail_on(&self, kind: MediaKind) {
        lock(&self.failing).insert(kind);
    }

    /// Uploads still held by the store (deleted ones excluded).
    pub fn uploads(&self) -> Vec<FakeUpload> {
        let deleted = lock(&self.deleted);
        lock(&self.uploads)
            .iter()
            .filter(|u| !deleted.contains(&u.public_id))
            .cloned()
            .collect()
    }

    pub fn deleted(&self) -> Vec<String> {
        lock(&self.deleted).clone()
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn upload(
        &self,
        kind: MediaKind,
        path: &Path,
        len: u64,
    ) -> Result<StoredObject, StorageError> {
        if lock(&self.failing).contains(&kind) {
            return Err(StorageError::Provider {
                status: 500,
                message: format!("simulated {} upload failure", kind),
            });
        }

        let data = tokio::fs::read(path).await?;
        if data.len() as u64 != len {
            return Err(StorageError::InvalidResponse(format!(
                "expected {} bytes, read {}",
                len,
                data.len()
            )));
        }

        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        let public_id = format!("recipes/{}/fake-{}", kind.folder(), n);
        let url = format!("https://fake.storage.test/{}", public_id);

        lock(&self.uploads).push(FakeUpload {
            kind,
            public_id: public_id.clone(),
            data,
        });

        Ok(StoredObject { url, public_id })
    }

    async fn delete(&self, _kind: MediaKind, public_id: &str) -> Result<(), StorageError> {
        lock(&self.deleted).push(public_id.to_string());
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
