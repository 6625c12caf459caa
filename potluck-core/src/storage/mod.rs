//! Storage backends for recipe media.

mod cloudinary;
mod fake;
mod local;

pub use cloudinary::{CloudinaryCredentials, CloudinaryStore, CHUNK_SIZE};
pub use fake::{FakeObjectStore, FakeUpload};
pub use local::LocalDiskStore;

use async_trait::async_trait;
use std::fmt;
use std::path::Path;

use crate::error::StorageError;
use crate::media::MediaKind;

/// An object stored with a remote provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Public HTTPS URL of the object.
    pub url: String,
    /// Provider-assigned identifier, needed to delete the object.
    pub public_id: String,
}

/// Remote object storage, abstracted so tests can run without network access.
#[async_trait]
pub trait ObjectStore: Send + Sync + fmt::Debug {
    /// Upload the file at `path` (of `len` bytes) as media of `kind`.
    async fn upload(
        &self,
        kind: MediaKind,
        path: &Path,
        len: u64,
    ) -> Result<StoredObject, StorageError>;

    /// Delete a previously uploaded object.
    async fn delete(&self, kind: MediaKind, public_id: &str) -> Result<(), StorageError>;

    /// Provider name for logs (e.g. "cloudinary", "fake").
    fn provider_name(&self) -> &'static str;
}
