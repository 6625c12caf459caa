use super::{validate_password, MAX_FIELD_CHARS};
use crate::api::{ApiError, ApiJson, ErrorResponse};
use crate::auth::{create_session, hash_password};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewUser, User};
use crate::schema::users;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use potluck_core::{normalize_email, AuthProvider, Role};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub user_id: Uuid,
    pub token: String,
}

impl SignupRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ApiError::BadRequest("Name is required".to_string()));
        }
        if name.chars().count() > MAX_FIELD_CHARS {
            return Err(ApiError::BadRequest(format!(
                "Name must be at most {} characters",
                MAX_FIELD_CHARS
            )));
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(ApiError::BadRequest("A valid email is required".to_string()));
        }
        if email.chars().count() > MAX_FIELD_CHARS {
            return Err(ApiError::BadRequest(format!(
                "Email must be at most {} characters",
                MAX_FIELD_CHARS
            )));
        }
        validate_password(&self.password)
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "auth",
    request_body(content = SignupRequest, example = json!({"name": "Ada", "email": "ada@example.com", "password": "password"})),
    responses(
        (status = 201, description = "User created successfully", body = SignupResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(pool): State<Arc<DbPool>>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let password_hash =
        hash_password(&req.password).map_err(|e| ApiError::internal("Failed to hash password", e.to_string()))?;
    let email = normalize_email(&req.email);

    let mut conn = get_conn!(pool);

    let new_user = NewUser {
        name: req.name.trim(),
        email: &email,
        password_hash: Some(&password_hash),
        role: Role::User.as_str(),
        provider: AuthProvider::Local.as_str(),
    };

    let user: User = match diesel::insert_into(users::table)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(&mut conn)
    {
        Ok(u) => u,
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => {
            return Err(ApiError::Conflict(
                "Email already registered".to_string(),
            ))
        }
        Err(e) => return Err(ApiError::internal("Failed to create user", e)),
    };

    let token = create_session(&mut conn, user.id)
        .map_err(|e| ApiError::internal("Failed to create session", e))?;

    tracing::info!(user_id = %user.id, "user signed up");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user_id: user.id,
            token,
        }),
    ))
}
