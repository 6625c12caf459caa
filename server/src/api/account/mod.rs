pub mod logout;
pub mod me;

use crate::models::User;
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use potluck_core::{AuthProvider, Role};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

/// Public view of a user account. Never includes credentials.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub provider: AuthProvider,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            role: user.role(),
            provider: user.provider(),
            id: user.id,
            name: user.name,
            email: user.email,
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

/// Returns the router for the caller's own session (bearer auth required)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(me::me))
        .route("/api/auth/logout", post(logout::logout))
}

#[derive(OpenApi)]
#[openapi(
    paths(me::me, logout::logout),
    components(schemas(UserResponse, Role, AuthProvider))
)]
pub struct ApiDoc;
