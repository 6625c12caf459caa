use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use potluck_core::{MediaError, RatingError, TitleError};
use std::error::Error as StdError;
use thiserror::Error;

use super::ErrorResponse;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Error type returned by every handler. Rendered as `ErrorResponse`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("Failed to store uploaded {}", .0.kind())]
    Storage(#[from] MediaError),
    #[error("{context}")]
    Internal {
        context: String,
        #[source]
        source: BoxError,
    },
}

impl ApiError {
    pub fn internal(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ApiError::Internal {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Storage(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RatingError> for ApiError {
    fn from(e: RatingError) -> Self {
        match e {
            RatingError::Unauthenticated => ApiError::Unauthorized(e.to_string()),
            RatingError::OutOfRange(_) => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl From<TitleError> for ApiError {
    fn from(e: TitleError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<diesel::result::Error> for ApiError {
    fn from(e: diesel::result::Error) -> Self {
        ApiError::internal("Database error", e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal { context, source } => {
                tracing::error!(error = %source, "{}", context);
            }
            ApiError::Storage(e) => {
                tracing::error!(kind = %e.kind(), "{}", e);
            }
            _ => {}
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use potluck_core::{MediaKind, StorageError};

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(RatingError::OutOfRange(9)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(RatingError::Unauthenticated).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(diesel::result::Error::NotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_storage_failure_hides_provider_detail() {
        let err = ApiError::from(MediaError::Storage {
            kind: MediaKind::Video,
            source: StorageError::Provider {
                status: 401,
                message: "Invalid api_key abc".to_string(),
            },
        });

        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "Failed to store uploaded video");
    }

    #[test]
    fn test_internal_error_message_is_context_only() {
        let err = ApiError::internal("Failed to create recipe", "connection reset");
        assert_eq!(err.to_string(), "Failed to create recipe");
    }
}
