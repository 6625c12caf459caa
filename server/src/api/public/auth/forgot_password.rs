use crate::api::{ApiError, ApiJson, ErrorResponse};
use crate::auth::{create_reset_token, RESET_TOKEN_LIFETIME_MINUTES};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::User;
use crate::schema::users;
use axum::{extract::State, Json};
use diesel::prelude::*;
use potluck_core::{normalize_email, AuthProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ForgotPasswordResponse {
    pub message: String,
}

/// Same answer whether or not the account exists.
const RESET_REQUESTED: &str = "If an account exists for that email, a reset link has been issued";

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "auth",
    request_body(content = ForgotPasswordRequest, example = json!({"email": "ada@example.com"})),
    responses(
        (status = 200, description = "Reset requested", body = ForgotPasswordResponse),
        (status = 400, description = "Malformed request", body = ErrorResponse)
    )
)]
pub async fn forgot_password(
    State(pool): State<Arc<DbPool>>,
    ApiJson(req): ApiJson<ForgotPasswordRequest>,
) -> Result<Json<ForgotPasswordResponse>, ApiError> {
    let mut conn = get_conn!(pool);

    let user: Option<User> = users::table
        .filter(users::email.eq(normalize_email(&req.email)))
        .filter(users::provider.eq(AuthProvider::Local.as_str()))
        .select(User::as_select())
        .first(&mut conn)
        .optional()
        .map_err(|e| ApiError::internal("Failed to look up user", e))?;

    match user {
        Some(user) => {
            let token = create_reset_token(&mut conn, user.id)
                .map_err(|e| ApiError::internal("Failed to issue reset token", e))?;
            // Mail delivery is handled outside this service; the link is logged for it.
            tracing::info!(
                user_id = %user.id,
                reset_path = %format!("/reset-password/{}", token),
                expires_in_minutes = RESET_TOKEN_LIFETIME_MINUTES,
                "password reset token issued"
            );
        }
        None => tracing::debug!("password reset requested for unknown email"),
    }

    Ok(Json(ForgotPasswordResponse {
        message: RESET_REQUESTED.to_string(),
    }))
}
