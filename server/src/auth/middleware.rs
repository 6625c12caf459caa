use crate::api::ErrorResponse;
use crate::db::DbPool;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::extractor::{authenticate, bearer_token};

/// Middleware that admits only authenticated admins.
///
/// The resolved user is stored in the request extensions so handlers using
/// [`AuthUser`](super::AuthUser) do not look the session up twice.
pub async fn require_admin(
    State(pool): State<Arc<DbPool>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let user = match bearer_token(request.headers()).and_then(|token| authenticate(&pool, token)) {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    if !user.is_admin() {
        tracing::warn!(user_id = %user.id, "non-admin attempted admin access");
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Admin access required".to_string(),
            }),
        )
            .into_response();
    }

    request.extensions_mut().insert(user);
    next.run(request).await
}
