use crate::api::ApiError;
use crate::models::Recipe;
use crate::schema::{recipes, users};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use potluck_core::Rating;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// The author as embedded in recipe responses.
#[derive(Debug, Clone, Queryable, Serialize, ToSchema)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

const AUTHOR_COLUMNS: (users::id, users::name, users::email) =
    (users::id, users::name, users::email);

/// A recipe aggregate with its ratings and expanded author.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub author: AuthorSummary,
    pub ratings: Vec<Rating>,
    pub average_rating: f64,
    pub total_ratings: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecipeResponse {
    pub fn new(recipe: Recipe, author: AuthorSummary) -> Result<Self, ApiError> {
        let ratings = recipe
            .ratings()
            .map_err(|e| ApiError::internal("Stored ratings are malformed", e))?;

        Ok(Self {
            id: recipe.id,
            title: recipe.title,
            description: recipe.description,
            ingredients: recipe.ingredients,
            steps: recipe.steps,
            image_url: recipe.image_url,
            video_url: recipe.video_url,
            author,
            ratings: ratings.into_entries(),
            average_rating: recipe.average_rating,
            total_ratings: recipe.total_ratings,
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
        })
    }
}

pub fn not_found() -> ApiError {
    ApiError::NotFound("Recipe not found".to_string())
}

pub fn fetch_recipe(conn: &mut PgConnection, id: Uuid) -> Result<Option<RecipeResponse>, ApiError> {
    let row: Option<(Recipe, AuthorSummary)> = recipes::table
        .inner_join(users::table)
        .filter(recipes::id.eq(id))
        .select((Recipe::as_select(), AUTHOR_COLUMNS))
        .first(conn)
        .optional()
        .map_err(|e| ApiError::internal("Failed to fetch recipe", e))?;

    row.map(|(recipe, author)| RecipeResponse::new(recipe, author))
        .transpose()
}

/// Like [`fetch_recipe`], for handlers that just wrote the row.
pub fn fetch_existing(conn: &mut PgConnection, id: Uuid) -> Result<RecipeResponse, ApiError> {
    fetch_recipe(conn, id)?.ok_or_else(not_found)
}

pub fn fetch_all(conn: &mut PgConnection) -> Result<Vec<RecipeResponse>, ApiError> {
    let rows: Vec<(Recipe, AuthorSummary)> = recipes::table
        .inner_join(users::table)
        .order((recipes::created_at.desc(), recipes::id))
        .select((Recipe::as_select(), AUTHOR_COLUMNS))
        .load(conn)
        .map_err(|e| ApiError::internal("Failed to fetch recipes", e))?;

    rows.into_iter()
        .map(|(recipe, author)| RecipeResponse::new(recipe, author))
        .collect()
}

/// Loads a recipe row, locking it until the surrounding transaction ends.
pub fn lock_recipe(conn: &mut PgConnection, id: Uuid) -> Result<Recipe, ApiError> {
    recipes::table
        .find(id)
        .select(Recipe::as_select())
        .for_update()
        .first(conn)
        .optional()?
        .ok_or_else(not_found)
}

pub fn find_recipe(conn: &mut PgConnection, id: Uuid) -> Result<Recipe, ApiError> {
    recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(not_found)
}
