use super::view::{fetch_existing, lock_recipe, RecipeResponse};
use crate::api::{ApiError, ApiJson, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Recipe;
use crate::schema::recipes;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use potluck_core::{RatingSummary, RatingValue};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RateRecipeRequest {
    /// Whole stars, 1 to 5.
    pub rating: i64,
}

/// Rating columns of a recipe row after a submission.
#[derive(Debug)]
pub(crate) struct RatingColumns {
    pub ratings: serde_json::Value,
    pub summary: RatingSummary,
}

/// Applies `user_id`'s rating to the recipe's stored ratings.
pub(crate) fn apply_rating(
    recipe: &Recipe,
    user_id: Uuid,
    rating: i64,
    now: DateTime<Utc>,
) -> Result<RatingColumns, ApiError> {
    let mut ratings = recipe
        .ratings()
        .map_err(|e| ApiError::internal("Stored ratings are malformed", e))?;

    let summary = ratings.submit(Some(user_id), rating, now)?;
    let ratings = serde_json::to_value(&ratings)
        .map_err(|e| ApiError::internal("Failed to encode ratings", e))?;

    Ok(RatingColumns { ratings, summary })
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/rate",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body(content = RateRecipeRequest, example = json!({"rating": 4})),
    responses(
        (status = 200, description = "Rating recorded", body = RecipeResponse),
        (status = 400, description = "Rating out of range", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn rate_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<RateRecipeRequest>,
) -> Result<Json<RecipeResponse>, ApiError> {
    // Reject bad values before taking the row lock.
    RatingValue::new(req.rating)?;

    let mut conn = get_conn!(pool);

    let summary = conn.transaction::<_, ApiError, _>(|conn| {
        let recipe = lock_recipe(conn, id)?;
        let now = Utc::now();
        let columns = apply_rating(&recipe, user.id, req.rating, now)?;

        diesel::update(recipes::table.find(id))
            .set((
                recipes::ratings.eq(columns.ratings),
                recipes::average_rating.eq(columns.summary.average_rating),
                recipes::total_ratings.eq(columns.summary.total_ratings as i32),
                recipes::updated_at.eq(now),
            ))
            .execute(conn)?;
        Ok(columns.summary)
    })?;

    tracing::info!(
        recipe_id = %id,
        user_id = %user.id,
        average = summary.average_rating,
        total = summary.total_ratings,
        "rating recorded"
    );

    Ok(Json(fetch_existing(&mut conn, id)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_recipe;

    fn rate(recipe: &mut Recipe, user: Uuid, value: i64) -> Result<RatingSummary, ApiError> {
        let columns = apply_rating(recipe, user, value, Utc::now())?;
        recipe.ratings = columns.ratings;
        recipe.average_rating = columns.summary.average_rating;
        recipe.total_ratings = columns.summary.total_ratings as i32;
        Ok(columns.summary)
    }

    #[test]
    fn test_columns_stay_consistent_across_submissions() {
        let mut recipe = sample_recipe(Uuid::new_v4());
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        rate(&mut recipe, a, 3).unwrap();
        rate(&mut recipe, b, 5).unwrap();
        let summary = rate(&mut recipe, c, 4).unwrap();
        assert_eq!(summary.total_ratings, 3);
        assert_eq!(summary.average_rating, 4.0);

        let summary = rate(&mut recipe, a, 1).unwrap();
        assert_eq!(summary.total_ratings, 3);
        assert_eq!(summary.average_rating, 3.3);

        // The stored array is what `total_ratings` is checked against.
        let stored = recipe.ratings().unwrap();
        assert_eq!(stored.len(), recipe.total_ratings as usize);
        assert_eq!(stored.find(a).unwrap().rating.get(), 1);
        assert_eq!(stored.entries()[0].user, a);
    }

    #[test]
    fn test_out_of_range_leaves_columns_alone() {
        let mut recipe = sample_recipe(Uuid::new_v4());
        rate(&mut recipe, Uuid::new_v4(), 2).unwrap();
        let before = recipe.ratings.clone();

        let err = rate(&mut recipe, Uuid::new_v4(), 6).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(recipe.ratings, before);
        assert_eq!(recipe.total_ratings, 1);
    }

    #[test]
    fn test_malformed_stored_ratings_are_internal_errors() {
        let mut recipe = sample_recipe(Uuid::new_v4());
        recipe.ratings = serde_json::json!({ "not": "a list" });

        let err = apply_rating(&recipe, Uuid::new_v4(), 4, Utc::now()).unwrap_err();
        assert!(matches!(err, ApiError::Internal { .. }));
    }
}
