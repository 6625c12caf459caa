use super::validate_password;
use crate::api::{ApiError, ApiJson, ErrorResponse};
use crate::auth::{hash_password, reset_password as store_new_password};
use crate::db::DbPool;
use crate::get_conn;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResetPasswordResponse {
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    tag = "auth",
    request_body(content = ResetPasswordRequest, example = json!({"token": "3f2a...", "password": "new-password"})),
    responses(
        (status = 200, description = "Password changed; existing sessions ended", body = ResetPasswordResponse),
        (status = 400, description = "Invalid token or password", body = ErrorResponse)
    )
)]
pub async fn reset_password(
    State(pool): State<Arc<DbPool>>,
    ApiJson(req): ApiJson<ResetPasswordRequest>,
) -> Result<Json<ResetPasswordResponse>, ApiError> {
    let token = req.token.trim();
    if token.is_empty() {
        return Err(invalid_token());
    }
    validate_password(&req.password)?;

    let password_hash = hash_password(&req.password)
        .map_err(|e| ApiError::internal("Failed to hash password", e.to_string()))?;

    let mut conn = get_conn!(pool);
    let user_id = store_new_password(&mut conn, token, &password_hash)
        .map_err(|e| ApiError::internal("Failed to reset password", e))?
        .ok_or_else(invalid_token)?;

    tracing::info!(%user_id, "password reset");

    Ok(Json(ResetPasswordResponse {
        message: "Password has been reset".to_string(),
    }))
}

fn invalid_token() -> ApiError {
    ApiError::BadRequest("Invalid or expired reset token".to_string())
}
