use crate::api::account::UserResponse;
use crate::api::{ApiError, ErrorResponse};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::User;
use crate::schema::users;
use axum::{extract::State, Json};
use diesel::prelude::*;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "admin",
    responses(
        (status = 200, description = "All registered users, newest first", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_users(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let mut conn = get_conn!(pool);

    let users: Vec<User> = users::table
        .order(users::created_at.desc())
        .select(User::as_select())
        .load(&mut conn)
        .map_err(|e| ApiError::internal("Failed to list users", e))?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
