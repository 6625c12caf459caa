pub mod create;
pub mod delete;
pub mod form;
pub mod get;
pub mod list;
pub mod rate;
pub mod update;
pub mod view;

use crate::api::ApiError;
use crate::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use potluck_core::{MediaKind, MediaRef, MediaResolver, RecipeMedia};
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route(
            "/{id}",
            get(get::get_recipe)
                .put(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route("/{id}/rate", post(rate::rate_recipe))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// Slots of `media` that were newly stored for this request.
pub(crate) fn stored_slots(media: &RecipeMedia) -> Vec<(MediaKind, &MediaRef)> {
    MediaKind::ALL
        .into_iter()
        .filter_map(|kind| media.get(kind).map(|r| (kind, r)))
        .collect()
}

/// Runs a database write that records freshly stored media. `write` does its
/// own connection checkout; if either fails the media is released so nothing
/// is left unreferenced.
pub(crate) async fn record_media<T>(
    resolver: &MediaResolver,
    fresh: &RecipeMedia,
    write: impl FnOnce() -> Result<T, ApiError>,
) -> Result<T, ApiError> {
    match write() {
        Ok(value) => Ok(value),
        Err(e) => {
            resolver.release(stored_slots(fresh)).await;
            Err(e)
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        list::list_recipes,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
        rate::rate_recipe,
    ),
    components(schemas(
        form::RecipeFormSchema,
        view::RecipeResponse,
        view::AuthorSummary,
        delete::DeleteRecipeResponse,
        rate::RateRecipeRequest,
        potluck_core::Rating,
    ))
)]
pub struct ApiDoc;
