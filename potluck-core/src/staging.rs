//! Spooling of incoming uploads to a scratch directory.
//!
//! Every upload is written to a temporary file before a storage backend sees
//! it. A staged file is deleted when its [`StagedUpload`] (or the
//! [`StagingWriter`] still filling it) is dropped, unless it was moved into
//! place with [`StagedUpload::persist_noclobber`].

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::{PathPersistError, TempPath};
use tokio::io::AsyncWriteExt;

use crate::media::MediaKind;

#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Opens a new staged file for an upload of `kind`.
    pub async fn begin(
        &self,
        kind: MediaKind,
        original_name: impl Into<String>,
    ) -> io::Result<StagingWriter> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let named = tempfile::Builder::new()
            .prefix(&format!("{}-", kind.field_name()))
            .suffix(".part")
            .tempfile_in(&self.dir)?;
        let (file, path) = named.into_parts();

        Ok(StagingWriter {
            file: tokio::fs::File::from_std(file),
            path,
            kind,
            original_name: original_name.into(),
            len: 0,
        })
    }

    /// Stages an in-memory buffer in one step.
    pub async fn stage_bytes(
        &self,
        kind: MediaKind,
        original_name: impl Into<String>,
        data: &[u8],
    ) -> io::Result<StagedUpload> {
        let mut writer = self.begin(kind, original_name).await?;
        writer.write_chunk(data).await?;
        writer.finish().await
    }
}

/// An upload being streamed to disk.
pub struct StagingWriter {
    file: tokio::fs::File,
    path: TempPath,
    kind: MediaKind,
    original_name: String,
    len: u64,
}

impl StagingWriter {
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk).await?;
        self.len += chunk.len() as u64;
        Ok(())
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn finish(mut self) -> io::Result<StagedUpload> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        drop(self.file);

        Ok(StagedUpload {
            kind: self.kind,
            original_name: self.original_name,
            path: self.path,
            len: self.len,
        })
    }
}

/// A fully received upload waiting to be stored.
#[derive(Debug)]
pub struct StagedUpload {
    kind: MediaKind,
    original_name: String,
    path: TempPath,
    len: u64,
}

impl StagedUpload {
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Moves the staged file to `dest`.
    ///
    /// Never replaces an existing file: if `dest` exists the error has kind
    /// `AlreadyExists` and the upload is handed back so the caller can pick
    /// another name. Falls back to copying when a rename is not possible
    /// (e.g. staging and destination on different filesystems).
    pub fn persist_noclobber(self, dest: &Path) -> Result<(), (io::Error, StagedUpload)> {
        let StagedUpload {
            kind,
            original_name,
            path,
            len,
        } = self;

        let rebuild = |path: TempPath| StagedUpload {
            kind,
            original_name,
            path,
            len,
        };

        match path.persist_noclobber(dest) {
            Ok(()) => Ok(()),
            Err(PathPersistError { error, path }) if error.kind() == io::ErrorKind::AlreadyExists => {
                Err((error, rebuild(path)))
            }
            Err(PathPersistError { error, path }) => {
                tracing::debug!(error = %error, dest = %dest.display(), "rename failed, copying staged upload");
                match copy_noclobber(&path, dest) {
                    // Dropping `path` here removes the staged copy.
                    Ok(()) => Ok(()),
                    Err(e) => Err((e, rebuild(path))),
                }
            }
        }
    }

    /// Deletes the staged file now, logging rather than failing on error.
    pub fn discard(self) {
        let path = self.path.to_path_buf();
        if let Err(e) = self.path.close() {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove staged upload");
        }
    }
}

fn copy_noclobber(src: &Path, dest: &Path) -> io::Result<()> {
    let mut target = OpenOptions::new().write(true).create_new(true).open(dest)?;
    let result = File::open(src).and_then(|mut source| io::copy(&mut source, &mut target));
    match result.and_then(|_| target.sync_all()) {
        Ok(()) => Ok(()),
        Err(e) => {
            drop(target);
            let _ = std::fs::remove_file(dest);
            Err(e)
        }
    }
}

/// The uploads received for one recipe submission, at most one per kind.
#[derive(Debug, Default)]
pub struct MediaUploads {
    pub image: Option<StagedUpload>,
    pub video: Option<StagedUpload>,
}

impl MediaUploads {
    /// Places `upload` in its slot, returning whatever it replaced.
    pub fn insert(&mut self, upload: StagedUpload) -> Option<StagedUpload> {
        let slot = match upload.kind() {
            MediaKind::Image => &mut self.image,
            MediaKind::Video => &mut self.video,
        };
        slot.replace(upload)
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.video.is_none()
    }

    /// Present uploads, image first.
    pub fn into_vec(self) -> Vec<StagedUpload> {
        self.image.into_iter().chain(self.video).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_stage_bytes_writes_file() {
        let tmp = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(tmp.path().join("staging"));

        let upload = staging
            .stage_bytes(MediaKind::Image, "a.png", b"png-bytes")
            .await
            .unwrap();

        assert_eq!(upload.len(), 9);
        assert_eq!(upload.original_name(), "a.png");
        assert_eq!(std::fs::read(upload.path()).unwrap(), b"png-bytes");
    }

    #[tokio::test]
    async fn test_dropped_upload_is_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(tmp.path());

        let upload = staging
            .stage_bytes(MediaKind::Video, "a.mp4", b"data")
            .await
            .unwrap();
        let path = upload.path().to_path_buf();
        assert!(path.exists());

        drop(upload);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_abandoned_writer_leaves_nothing_behind() {
        let tmp = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(tmp.path());

        let mut writer = staging.begin(MediaKind::Video, "big.mp4").await.unwrap();
        writer.write_chunk(b"partial").await.unwrap();
        assert_eq!(file_count(tmp.path()), 1);

        drop(writer);
        assert_eq!(file_count(tmp.path()), 0);
    }

    #[tokio::test]
    async fn test_persist_noclobber_refuses_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(tmp.path().join("staging"));
        let dest = tmp.path().join("taken.png");
        std::fs::write(&dest, b"original").unwrap();

        let upload = staging
            .stage_bytes(MediaKind::Image, "a.png", b"new")
            .await
            .unwrap();
        let (error, upload) = upload.persist_noclobber(&dest).unwrap_err();

        assert_eq!(error.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(std::fs::read(&dest).unwrap(), b"original");
        assert!(upload.path().exists());
    }

    #[tokio::test]
    async fn test_insert_replaces_same_kind() {
        let tmp = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(tmp.path());
        let mut uploads = MediaUploads::default();

        let first = staging.stage_bytes(MediaKind::Image, "1.png", b"1").await.unwrap();
        let second = staging.stage_bytes(MediaKind::Image, "2.png", b"2").await.unwrap();

        assert!(uploads.insert(first).is_none());
        let replaced = uploads.insert(second).unwrap();
        assert_eq!(replaced.original_name(), "1.png");
        assert_eq!(uploads.into_vec().len(), 1);
    }
}
