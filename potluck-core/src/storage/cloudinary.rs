//! Cloudinary upload API client.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncReadExt;

use super::{ObjectStore, StoredObject};
use crate::error::StorageError;
use crate::media::MediaKind;

/// Files larger than this are sent with the chunked upload protocol.
pub const CHUNK_SIZE: u64 = 6_000_000;

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";
const DEFAULT_FOLDER_ROOT: &str = "recipes";

/// Values shipped in sample `.env` files; treated as "not configured".
const PLACEHOLDERS: [(&str, &str); 3] = [
    ("CLOUDINARY_CLOUD_NAME", "your_cloud_name"),
    ("CLOUDINARY_API_KEY", "your_api_key"),
    ("CLOUDINARY_API_SECRET", "your_api_secret"),
];

#[derive(Clone, PartialEq, Eq)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl fmt::Debug for CloudinaryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl CloudinaryCredentials {
    /// Reads `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY` and `CLOUDINARY_API_SECRET`.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds credentials from a variable lookup. Returns `None` unless all
    /// three values are set, non-empty and not the sample placeholders.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = PLACEHOLDERS.iter().map(|(key, placeholder)| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty() && v != placeholder)
        });

        Some(Self {
            cloud_name: values.next()??,
            api_key: values.next()??,
            api_secret: values.next()??,
        })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    public_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Remote media storage on Cloudinary, using signed uploads.
#[derive(Debug, Clone)]
pub struct CloudinaryStore {
    client: reqwest::Client,
    credentials: CloudinaryCredentials,
    api_base: String,
    folder_root: String,
}

impl CloudinaryStore {
    pub fn new(credentials: CloudinaryCredentials) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()?;

        Ok(Self {
            client,
            credentials,
            api_base: DEFAULT_API_BASE.to_string(),
            folder_root: DEFAULT_FOLDER_ROOT.to_string(),
        })
    }

    /// Override the API base URL (for proxies or a local stand-in).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_folder_root(mut self, root: impl Into<String>) -> Self {
        self.folder_root = root.into();
        self
    }

    fn endpoint(&self, kind: MediaKind, action: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.api_base,
            self.credentials.cloud_name,
            resource_type(kind),
            action
        )
    }

    fn folder(&self, kind: MediaKind) -> String {
        format!("{}/{}", self.folder_root, kind.folder())
    }

    fn upload_form(&self, folder: &str, timestamp: &str, file_name: &str, bytes: Vec<u8>) -> Form {
        let signature = sign_params(
            &[("folder", folder), ("timestamp", timestamp)],
            &self.credentials.api_secret,
        );

        Form::new()
            .text("api_key", self.credentials.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("folder", folder.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()))
    }

    async fn send<T>(&self, request: reqwest::RequestBuilder) -> Result<T, StorageError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(StorageError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))
    }

    async fn upload_chunked(
        &self,
        url: &str,
        path: &Path,
        len: u64,
        folder: &str,
        file_name: &str,
    ) -> Result<UploadResponse, StorageError> {
        let upload_id = uuid::Uuid::new_v4().simple().to_string();
        let mut file = tokio::fs::File::open(path).await?;
        let mut offset = 0u64;
        let mut last = None;

        while offset < len {
            let size = CHUNK_SIZE.min(len - offset);
            let mut chunk = vec![0u8; size as usize];
            file.read_exact(&mut chunk).await?;

            let end = offset + size - 1;
            let timestamp = Utc::now().timestamp().to_string();
            let request = self
                .client
                .post(url)
                .header("X-Unique-Upload-Id", &upload_id)
                .header("Content-Range", format!("bytes {}-{}/{}", offset, end, len))
                .multipart(self.upload_form(folder, &timestamp, file_name, chunk));

            tracing::debug!(offset, end, len, "uploading chunk");
            last = Some(self.send::<UploadResponse>(request).await?);
            offset += size;
        }

        last.ok_or_else(|| StorageError::InvalidResponse("empty upload".to_string()))
    }
}

#[async_trait]
impl ObjectStore for CloudinaryStore {
    async fn upload(
        &self,
        kind: MediaKind,
        path: &Path,
        len: u64,
    ) -> Result<StoredObject, StorageError> {
        let url = self.endpoint(kind, "upload");
        let folder = self.folder(kind);
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let response = if kind == MediaKind::Video && len > CHUNK_SIZE {
            self.upload_chunked(&url, path, len, &folder, &file_name)
                .await?
        } else {
            let bytes = tokio::fs::read(path).await?;
            let timestamp = Utc::now().timestamp().to_string();
            let request = self
                .client
                .post(&url)
                .multipart(self.upload_form(&folder, &timestamp, &file_name, bytes));
            self.send::<UploadResponse>(request).await?
        };

        match (response.secure_url, response.public_id) {
            (Some(url), Some(public_id)) => {
                tracing::info!(%kind, %public_id, "uploaded to cloudinary");
                Ok(StoredObject { url, public_id })
            }
            _ => Err(StorageError::InvalidResponse(
                "missing secure_url or public_id".to_string(),
            )),
        }
    }

    async fn delete(&self, kind: MediaKind, public_id: &str) -> Result<(), StorageError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("public_id", public_id), ("timestamp", &timestamp)],
            &self.credentials.api_secret,
        );

        let form = Form::new()
            .text("api_key", self.credentials.api_key.clone())
            .text("public_id", public_id.to_string())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let request = self
            .client
            .post(self.endpoint(kind, "destroy"))
            .multipart(form);
        let response: DestroyResponse = self.send(request).await?;

        match response.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(StorageError::InvalidResponse(format!(
                "unexpected destroy result: {}",
                other
            ))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "cloudinary"
    }
}

fn resource_type(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "image",
        MediaKind::Video => "video",
    }
}

/// Request signature: SHA-256 hex of `k1=v1&k2=v2...` (keys sorted) followed by the secret.
fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}
