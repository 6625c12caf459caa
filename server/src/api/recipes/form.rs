//! Reading the multipart body shared by recipe create and update.

use crate::api::ApiError;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use potluck_core::{normalize_title, MediaKind, MediaUploads, StagingArea};
use utoipa::ToSchema;

/// Multipart schema for documentation only; bodies are read by [`RecipeForm::read`].
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct RecipeFormSchema {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Comma-separated.
    pub ingredients: Option<String>,
    /// One step per line.
    pub steps: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub video: Option<Vec<u8>>,
}

/// A received recipe form. Text fields are `None` when absent from the body.
#[derive(Debug, Default)]
pub struct RecipeForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    pub steps: Option<String>,
    pub uploads: MediaUploads,
}

fn multipart_error(e: MultipartError) -> ApiError {
    let message = format!("Failed to read multipart data: {}", e.body_text());
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(message)
    } else {
        ApiError::BadRequest(message)
    }
}

fn staging_error(e: std::io::Error) -> ApiError {
    ApiError::internal("Failed to stage upload", e)
}

impl RecipeForm {
    /// Reads every field, spooling `image` and `video` parts to `staging`.
    ///
    /// If this returns early, whatever was already staged is removed when
    /// the partially built form is dropped.
    pub async fn read(mut multipart: Multipart, staging: &StagingArea) -> Result<Self, ApiError> {
        let mut form = RecipeForm::default();

        while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            let Some(kind) = MediaKind::from_field_name(&name) else {
                let text = field.text().await.map_err(multipart_error)?;
                match name.as_str() {
                    "title" => form.title = Some(text),
                    "description" => form.description = Some(text),
                    "ingredients" => form.ingredients = Some(text),
                    "steps" => form.steps = Some(text),
                    _ => tracing::debug!(field = %name, "ignoring unknown form field"),
                }
                continue;
            };

            let file_name = field.file_name().unwrap_or_default().to_string();
            let mut writer = staging
                .begin(kind, file_name.as_str())
                .await
                .map_err(staging_error)?;
            while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                writer.write_chunk(&chunk).await.map_err(staging_error)?;
            }

            // Browsers submit an empty part for a file input left blank.
            if file_name.is_empty() && writer.is_empty() {
                continue;
            }

            let upload = writer.finish().await.map_err(staging_error)?;
            tracing::debug!(%kind, bytes = upload.len(), "staged upload");
            if form.uploads.insert(upload).is_some() {
                return Err(ApiError::BadRequest(format!(
                    "Only one {} may be uploaded",
                    kind
                )));
            }
        }

        Ok(form)
    }

    /// The trimmed title, required when creating a recipe.
    pub fn required_title(&self) -> Result<String, ApiError> {
        let title = self
            .title
            .as_deref()
            .ok_or_else(|| ApiError::BadRequest("Title is required".to_string()))?;
        Ok(normalize_title(title)?)
    }

    /// The trimmed title if one was submitted; an empty one is rejected.
    pub fn updated_title(&self) -> Result<Option<String>, ApiError> {
        self.title
            .as_deref()
            .map(normalize_title)
            .transpose()
            .map_err(ApiError::from)
    }
}

/// Blank descriptions are stored as no description.
pub fn normalize_description(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header, Request};

    const BOUNDARY: &str = "potluck-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    async fn multipart(parts: &[Part<'_>]) -> Multipart {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File(name, file_name, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n",
                            name, file_name
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri("/api/recipes")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();

        Multipart::from_request(request, &()).await.unwrap()
    }

    fn staged_count(staging: &StagingArea) -> usize {
        std::fs::read_dir(staging.dir()).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_reads_text_fields_and_stages_files() {
        let tmp = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(tmp.path());

        let form = RecipeForm::read(
            multipart(&[
                Part::Text("title", "  Pancakes "),
                Part::Text("ingredients", "flour, eggs"),
                Part::Text("steps", "mix\nfry"),
                Part::Text("color", "blue"),
                Part::File("image", "stack.JPG", b"jpeg-bytes"),
            ])
            .await,
            &staging,
        )
        .await
        .unwrap();

        assert_eq!(form.required_title().unwrap(), "Pancakes");
        assert_eq!(form.ingredients.as_deref(), Some("flour, eggs"));
        assert_eq!(form.steps.as_deref(), Some("mix\nfry"));
        assert!(form.description.is_none());

        let image = form.uploads.image.as_ref().unwrap();
        assert_eq!(image.original_name(), "stack.JPG");
        assert_eq!(std::fs::read(image.path()).unwrap(), b"jpeg-bytes");
        assert!(form.uploads.video.is_none());

        drop(form);
        assert_eq!(staged_count(&staging), 0);
    }

    #[tokio::test]
    async fn test_blank_file_input_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(tmp.path());

        let form = RecipeForm::read(
            multipart(&[Part::Text("title", "Soup"), Part::File("video", "", b"")]).await,
            &staging,
        )
        .await
        .unwrap();

        assert!(form.uploads.is_empty());
        assert_eq!(staged_count(&staging), 0);
    }

    #[tokio::test]
    async fn test_second_file_of_same_kind_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(tmp.path());

        let err = RecipeForm::read(
            multipart(&[
                Part::File("image", "a.png", b"a"),
                Part::File("image", "b.png", b"b"),
            ])
            .await,
            &staging,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(staged_count(&staging), 0);
    }

    #[test]
    fn test_title_rules() {
        let mut form = RecipeForm::default();
        assert!(form.required_title().is_err());
        assert_eq!(form.updated_title().unwrap(), None);

        form.title = Some("   ".to_string());
        assert!(form.required_title().is_err());
        assert!(form.updated_title().is_err());

        form.title = Some(" Stew ".to_string());
        assert_eq!(form.updated_title().unwrap().as_deref(), Some("Stew"));
    }

    #[test]
    fn test_overlong_title_is_a_bad_request() {
        let form = RecipeForm {
            title: Some("x".repeat(300)),
            ..Default::default()
        };

        for err in [
            form.required_title().unwrap_err(),
            form.updated_title().unwrap_err(),
        ] {
            assert!(matches!(err, ApiError::BadRequest(_)));
            assert_eq!(err.to_string(), "Title must be at most 255 characters");
        }
    }

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description("  "), None);
        assert_eq!(normalize_description(" Hearty. ").as_deref(), Some("Hearty."));
    }
}
