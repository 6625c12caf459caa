use super::form::{normalize_description, RecipeForm, RecipeFormSchema};
use super::record_media;
use super::view::{fetch_existing, RecipeResponse};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{MediaColumns, NewRecipe};
use crate::schema::recipes;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use potluck_core::{parse_ingredients, parse_steps, MediaResolver};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body(content = RecipeFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Recipe created successfully", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 502, description = "Media storage failed", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(resolver): State<Arc<MediaResolver>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = RecipeForm::read(multipart, resolver.staging()).await?;

    let title = form.required_title()?;
    let description = form.description.as_deref().and_then(normalize_description);
    let ingredients = form
        .ingredients
        .as_deref()
        .map(parse_ingredients)
        .unwrap_or_default();
    let steps = form.steps.as_deref().map(parse_steps).unwrap_or_default();

    let media = resolver.resolve(None, form.uploads).await?;

    let columns = MediaColumns::from(&media);
    let (mut conn, recipe_id) = record_media(&resolver, &media, || {
        let mut conn = get_conn!(pool);
        let recipe_id: Uuid = diesel::insert_into(recipes::table)
            .values(&NewRecipe {
                author_id: user.id,
                title: &title,
                description: description.as_deref(),
                ingredients: &ingredients,
                steps: &steps,
                image_url: columns.image_url,
                image_public_id: columns.image_public_id,
                video_url: columns.video_url,
                video_public_id: columns.video_public_id,
            })
            .returning(recipes::id)
            .get_result(&mut conn)
            .map_err(|e| ApiError::internal("Failed to create recipe", e))?;
        Ok((conn, recipe_id))
    })
    .await?;

    tracing::info!(%recipe_id, author_id = %user.id, "recipe created");

    let response = fetch_existing(&mut conn, recipe_id)?;
    Ok((StatusCode::CREATED, Json(response)))
}
