//! Turning uploaded media into durable references on a recipe.
//!
//! The backend is chosen once, at construction, from deployment
//! configuration: either a remote [`ObjectStore`] or the local disk. A failed
//! upload is never retried against the other backend.

use std::sync::Arc;

use crate::error::{MediaError, StorageError};
use crate::media::{MediaKind, MediaRef, RecipeMedia};
use crate::staging::{MediaUploads, StagedUpload, StagingArea};
use crate::storage::{LocalDiskStore, ObjectStore};

#[derive(Debug, Clone)]
pub enum MediaBackend {
    Remote(Arc<dyn ObjectStore>),
    Local(LocalDiskStore),
}

impl MediaBackend {
    /// Whether a remote provider is configured for this deployment.
    pub fn provider_configured(&self) -> bool {
        matches!(self, MediaBackend::Remote(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            MediaBackend::Remote(store) => store.provider_name(),
            MediaBackend::Local(_) => "local",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaResolver {
    backend: MediaBackend,
    staging: StagingArea,
}

impl MediaResolver {
    pub fn new(backend: MediaBackend, staging: StagingArea) -> Self {
        Self { backend, staging }
    }

    pub fn backend(&self) -> &MediaBackend {
        &self.backend
    }

    /// Where incoming uploads should be spooled before calling [`resolve`](Self::resolve).
    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    pub fn provider_configured(&self) -> bool {
        self.backend.provider_configured()
    }

    /// Stores every present upload and returns the recipe's resulting media.
    ///
    /// Slots without an upload keep their value from `existing` (or stay
    /// empty when creating). If any upload fails, artifacts already stored
    /// for this call are released and the error is returned; `existing` is
    /// never modified. Staged files are consumed either way.
    ///
    /// Every call stores new artifacts, even for identical input.
    pub async fn resolve(
        &self,
        existing: Option<&RecipeMedia>,
        uploads: MediaUploads,
    ) -> Result<RecipeMedia, MediaError> {
        let mut media = existing.cloned().unwrap_or_default();
        let mut stored: Vec<(MediaKind, MediaRef)> = Vec::new();

        // Remaining uploads are dropped (and their staged files removed) on early return.
        for upload in uploads.into_vec() {
            let kind = upload.kind();
            match self.store(upload).await {
                Ok(media_ref) => stored.push((kind, media_ref)),
                Err(source) => {
                    tracing::warn!(
                        %kind,
                        backend = self.backend.name(),
                        error = %source,
                        "media upload failed"
                    );
                    let refs: Vec<(MediaKind, &MediaRef)> =
                        stored.iter().map(|(k, r)| (*k, r)).collect();
                    self.release(refs).await;
                    return Err(MediaError::Storage { kind, source });
                }
            }
        }

        for (kind, media_ref) in stored {
            media.set(kind, media_ref);
        }

        Ok(media)
    }

    async fn store(&self, upload: StagedUpload) -> Result<MediaRef, StorageError> {
        match &self.backend {
            MediaBackend::Remote(store) => {
                let result = store
                    .upload(upload.kind(), upload.path(), upload.len())
                    .await;
                upload.discard();

                let object = result?;
                Ok(MediaRef {
                    url: object.url,
                    public_id: Some(object.public_id),
                })
            }
            MediaBackend::Local(store) => store.persist(upload).await,
        }
    }

    /// Best-effort removal of stored artifacts that will not be referenced,
    /// e.g. because the database write that should have recorded them failed.
    pub async fn release<'a, I>(&self, refs: I)
    where
        I: IntoIterator<Item = (MediaKind, &'a MediaRef)>,
    {
        for (kind, media_ref) in refs {
            let result = match &self.backend {
                MediaBackend::Remote(store) => match &media_ref.public_id {
                    Some(public_id) => store.delete(kind, public_id).await,
                    None => Ok(()),
                },
                MediaBackend::Local(store) => store.remove(media_ref).await,
            };

            if let Err(e) = result {
                tracing::warn!(
                    %kind,
                    url = %media_ref.url,
                    error = %e,
                    "failed to release stored media"
                );
            }
        }
    }
}
