//! Media kinds, references and file naming.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use utoipa::ToSchema;

/// The two media slots a recipe has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub const ALL: [MediaKind; 2] = [MediaKind::Image, MediaKind::Video];

    /// Multipart field name, also used as the stored file name prefix.
    pub fn field_name(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    /// Subdirectory / storage folder for this kind.
    pub fn folder(self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
        }
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        MediaKind::ALL.into_iter().find(|k| k.field_name() == name)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// A durable reference to stored media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: String,
    /// Identifier assigned by a remote provider; `None` for local files.
    pub public_id: Option<String>,
}

impl MediaRef {
    pub fn local(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            public_id: None,
        }
    }
}

/// The media slots of a recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeMedia {
    pub image: Option<MediaRef>,
    pub video: Option<MediaRef>,
}

impl RecipeMedia {
    pub fn get(&self, kind: MediaKind) -> Option<&MediaRef> {
        match kind {
            MediaKind::Image => self.image.as_ref(),
            MediaKind::Video => self.video.as_ref(),
        }
    }

    pub fn set(&mut self, kind: MediaKind, media: MediaRef) {
        match kind {
            MediaKind::Image => self.image = Some(media),
            MediaKind::Video => self.video = Some(media),
        }
    }
}

/// Builds a stored file name: `<field>-<unix millis>-<suffix><.ext>`.
///
/// The extension is taken from the client-supplied name, lower-cased, and
/// dropped entirely if it contains anything but ASCII alphanumerics.
pub fn unique_file_name(kind: MediaKind, original_name: &str, millis: i64, suffix: u32) -> String {
    format!(
        "{}-{}-{}{}",
        kind.field_name(),
        millis,
        suffix,
        file_extension(original_name)
    )
}

/// Random component of stored file names.
pub fn random_suffix() -> u32 {
    rand::rng().random_range(0..1_000_000_000)
}

fn file_extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Content type for a video file, derived from its extension.
pub fn video_content_type(path: &str) -> Option<&'static str> {
    let ext = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "mp4" => Some("video/mp4"),
        "webm" => Some("video/webm"),
        "ogg" => Some("video/ogg"),
        "avi" => Some("video/x-msvideo"),
        "mov" => Some("video/quicktime"),
        _ => None,
    }
}
