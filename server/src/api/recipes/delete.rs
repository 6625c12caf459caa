use super::stored_slots;
use super::view::{find_recipe, not_found};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::recipes;
use axum::{
    extract::{Path, State},
    Json,
};
use diesel::prelude::*;
use potluck_core::MediaResolver;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteRecipeResponse {
    pub message: String,
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe deleted successfully", body = DeleteRecipeResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(resolver): State<Arc<MediaResolver>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteRecipeResponse>, ApiError> {
    let recipe = {
        let mut conn = get_conn!(pool);
        let recipe = find_recipe(&mut conn, id)?;
        if !user.can_modify(&recipe) {
            return Err(ApiError::Forbidden(
                "Only the author or an admin can delete this recipe".to_string(),
            ));
        }

        let deleted = diesel::delete(recipes::table.find(id))
            .execute(&mut conn)
            .map_err(|e| ApiError::internal("Failed to delete recipe", e))?;
        if deleted == 0 {
            return Err(not_found());
        }
        recipe
    };

    // The row is gone, so its media is no longer referenced.
    let media = recipe.media();
    resolver.release(stored_slots(&media)).await;

    tracing::info!(recipe_id = %id, user_id = %user.id, "recipe deleted");

    Ok(Json(DeleteRecipeResponse {
        message: "Recipe deleted successfully".to_string(),
    }))
}
