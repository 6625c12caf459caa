pub mod users;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/admin endpoints (mounted at /api/admin).
/// Callers must wrap it in `auth::require_admin`.
pub fn router() -> Router<AppState> {
    Router::new().route("/users", get(users::list_users))
}

#[derive(OpenApi)]
#[openapi(paths(users::list_users))]
pub struct ApiDoc;
