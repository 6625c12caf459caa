use super::view::{fetch_all, RecipeResponse};
use crate::api::{ApiError, ErrorResponse};
use crate::db::DbPool;
use crate::get_conn;
use axum::{extract::State, Json};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    responses(
        (status = 200, description = "All recipes, newest first", body = Vec<RecipeResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_recipes(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Vec<RecipeResponse>>, ApiError> {
    let mut conn = get_conn!(pool);
    Ok(Json(fetch_all(&mut conn)?))
}
