use crate::api::account::UserResponse;
use crate::api::{ApiError, ApiJson, ErrorResponse};
use crate::auth::{create_session, record_login, verify_password};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::User;
use crate::schema::users;
use axum::{extract::State, response::IntoResponse, Json};
use diesel::prelude::*;
use potluck_core::normalize_email;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials".to_string())
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body(content = LoginRequest, example = json!({"email": "ada@example.com", "password": "password"})),
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(pool): State<Arc<DbPool>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn!(pool);

    let user: User = users::table
        .filter(users::email.eq(normalize_email(&req.email)))
        .select(User::as_select())
        .first(&mut conn)
        .optional()
        .map_err(|e| ApiError::internal("Failed to look up user", e))?
        .ok_or_else(invalid_credentials)?;

    // Accounts provisioned through an external provider have no password.
    let verified = user
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_password(&req.password, hash));
    if !verified {
        return Err(invalid_credentials());
    }

    let token = create_session(&mut conn, user.id)
        .map_err(|e| ApiError::internal("Failed to create session", e))?;
    let user = record_login(&mut conn, user.id)
        .map_err(|e| ApiError::internal("Failed to record login", e))?;

    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}
