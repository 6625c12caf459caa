use chrono::Utc;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::StorageError;
use crate::media::{random_suffix, unique_file_name, MediaKind, MediaRef};
use crate::staging::StagedUpload;

/// Name collisions are already unlikely; this only bounds the retry loop.
const MAX_NAME_ATTEMPTS: usize = 5;

/// Stores media under `<root>/<images|videos>/` and serves it from `<url_prefix>/...`.
#[derive(Debug, Clone)]
pub struct LocalDiskStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalDiskStore {
    pub const DEFAULT_URL_PREFIX: &'static str = "/uploads";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            url_prefix: Self::DEFAULT_URL_PREFIX.to_string(),
        }
    }

    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into().trim_end_matches('/').to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    pub fn folder_path(&self, kind: MediaKind) -> PathBuf {
        self.root.join(kind.folder())
    }

    /// Moves a staged upload into its kind's folder under a fresh unique name.
    pub async fn persist(&self, upload: StagedUpload) -> Result<MediaRef, StorageError> {
        let kind = upload.kind();
        let dir = self.folder_path(kind);
        tokio::fs::create_dir_all(&dir).await?;

        let mut upload = upload;
        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = unique_file_name(
                kind,
                upload.original_name(),
                Utc::now().timestamp_millis(),
                random_suffix(),
            );
            let dest = dir.join(&name);

            match upload.persist_noclobber(&dest) {
                Ok(()) => {
                    tracing::debug!(path = %dest.display(), "stored {} locally", kind);
                    return Ok(MediaRef::local(format!(
                        "{}/{}/{}",
                        self.url_prefix,
                        kind.folder(),
                        name
                    )));
                }
                Err((e, returned)) if e.kind() == io::ErrorKind::AlreadyExists => {
                    upload = returned;
                }
                Err((e, _)) => return Err(e.into()),
            }
        }

        Err(StorageError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "could not find a free file name",
        )))
    }

    /// Maps a URL produced by [`persist`](Self::persist) back to its file.
    ///
    /// Returns `None` for URLs outside this store (e.g. remote URLs) and for
    /// anything that would escape the root.
    pub fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let relative = url.strip_prefix(&self.url_prefix)?.strip_prefix('/')?;
        let relative = Path::new(relative);

        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || relative.components().count() != 2 {
            return None;
        }

        Some(self.root.join(relative))
    }

    /// Deletes a locally stored file. Missing files are not an error.
    pub async fn remove(&self, media: &MediaRef) -> Result<(), StorageError> {
        let Some(path) = self.path_for_url(&media.url) else {
            return Ok(());
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::StagingArea;

    #[tokio::test]
    async fn test_persist_moves_into_kind_folder() {
        let tmp = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(tmp.path().join("staging"));
        let store = LocalDiskStore::new(tmp.path().join("uploads"));

        let upload = staging
            .stage_bytes(MediaKind::Video, "clip.mp4", b"video")
            .await
            .unwrap();
        let staged_path = upload.path().to_path_buf();

        let media = store.persist(upload).await.unwrap();

        assert!(media.url.starts_with("/uploads/videos/video-"));
        assert!(media.url.ends_with(".mp4"));
        assert!(media.public_id.is_none());
        assert!(!staged_path.exists());

        let stored = store.path_for_url(&media.url).unwrap();
        assert_eq!(std::fs::read(stored).unwrap(), b"video");
    }

    #[test]
    fn test_path_for_url_rejects_foreign_urls() {
        let store = LocalDiskStore::new("/srv/uploads");
        assert_eq!(
            store.path_for_url("/uploads/images/a.png"),
            Some(PathBuf::from("/srv/uploads/images/a.png"))
        );
        assert_eq!(store.path_for_url("https://cdn.example.com/a.png"), None);
        assert_eq!(store.path_for_url("/uploads/../etc/passwd"), None);
        assert_eq!(store.path_for_url("/uploads/images/../../x"), None);
        assert_eq!(store.path_for_url("/uploadsimages/a.png"), None);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(tmp.path().join("staging"));
        let store = LocalDiskStore::new(tmp.path().join("uploads"));

        let upload = staging
            .stage_bytes(MediaKind::Image, "a.png", b"img")
            .await
            .unwrap();
        let media = store.persist(upload).await.unwrap();
        let path = store.path_for_url(&media.url).unwrap();

        store.remove(&media).await.unwrap();
        assert!(!path.exists());
        store.remove(&media).await.unwrap();
    }

    #[test]
    fn test_custom_url_prefix() {
        let store = LocalDiskStore::new("/data").with_url_prefix("/media/");
        assert_eq!(store.url_prefix(), "/media");
        assert_eq!(
            store.path_for_url("/media/videos/v.mp4"),
            Some(PathBuf::from("/data/videos/v.mp4"))
        );
    }
}
