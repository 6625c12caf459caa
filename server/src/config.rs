use potluck_core::{
    CloudinaryCredentials, CloudinaryStore, LocalDiskStore, MediaBackend, StorageError,
};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";
pub const DEFAULT_STAGING_DIR: &str = ".staging";
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid {key} value {value:?}: {message}")]
    Invalid {
        key: &'static str,
        value: String,
        message: String,
    },
}

/// Deployment settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub uploads_dir: PathBuf,
    pub staging_dir: PathBuf,
    /// Allowed CORS origin; any origin when unset.
    pub frontend_url: Option<String>,
    pub max_upload_bytes: usize,
    pub cloudinary: Option<CloudinaryCredentials>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = present("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = match present("PORT") {
            Some(value) => value.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    key: "PORT",
                    value: value.clone(),
                    message: e.to_string(),
                }
            })?,
            None => {
                tracing::info!("PORT not set, using default: {}", DEFAULT_PORT);
                DEFAULT_PORT
            }
        };

        let path_or = |key: &str, default: &str| {
            PathBuf::from(present(key).unwrap_or_else(|| default.to_string()))
        };

        Ok(Self {
            database_url,
            port,
            uploads_dir: path_or("UPLOADS_DIR", DEFAULT_UPLOADS_DIR),
            staging_dir: path_or("STAGING_DIR", DEFAULT_STAGING_DIR),
            frontend_url: present("FRONTEND_URL").map(|u| u.trim().trim_end_matches('/').to_string()),
            max_upload_bytes: MAX_UPLOAD_BYTES,
            cloudinary: CloudinaryCredentials::from_lookup(&lookup),
        })
    }

    /// The storage backend for uploaded media: Cloudinary when fully
    /// configured, otherwise the local uploads directory.
    pub fn media_backend(&self) -> Result<MediaBackend, StorageError> {
        match &self.cloudinary {
            Some(credentials) => {
                let store = CloudinaryStore::new(credentials.clone())?;
                Ok(MediaBackend::Remote(Arc::new(store)))
            }
            None => Ok(MediaBackend::Local(LocalDiskStore::new(&self.uploads_dir))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("DATABASE_URL", "postgres://localhost/potluck")]).unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.uploads_dir, PathBuf::from("uploads"));
        assert_eq!(config.staging_dir, PathBuf::from(".staging"));
        assert_eq!(config.frontend_url, None);
        assert_eq!(config.max_upload_bytes, 100 * 1024 * 1024);
        assert!(config.cloudinary.is_none());
        assert!(!config.media_backend().unwrap().provider_configured());
    }

    #[test]
    fn test_database_url_required() {
        assert_eq!(
            config(&[("PORT", "8080")]).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );
    }

    #[test]
    fn test_invalid_port() {
        let err = config(&[("DATABASE_URL", "postgres://x"), ("PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("DATABASE_URL", "postgres://x"),
            ("PORT", "8080"),
            ("UPLOADS_DIR", "/srv/media"),
            ("FRONTEND_URL", "https://potluck.example/"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.uploads_dir, PathBuf::from("/srv/media"));
        assert_eq!(config.frontend_url.as_deref(), Some("https://potluck.example"));
    }

    #[test]
    fn test_cloudinary_selected_when_configured() {
        let config = config(&[
            ("DATABASE_URL", "postgres://x"),
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "1234"),
            ("CLOUDINARY_API_SECRET", "s3cret"),
        ])
        .unwrap();

        let backend = config.media_backend().unwrap();
        assert!(backend.provider_configured());
        assert_eq!(backend.name(), "cloudinary");
    }

    #[test]
    fn test_placeholder_cloudinary_falls_back_to_local() {
        let config = config(&[
            ("DATABASE_URL", "postgres://x"),
            ("CLOUDINARY_CLOUD_NAME", "your_cloud_name"),
            ("CLOUDINARY_API_KEY", "1234"),
            ("CLOUDINARY_API_SECRET", "s3cret"),
        ])
        .unwrap();

        assert!(!config.media_backend().unwrap().provider_configured());
    }
}
