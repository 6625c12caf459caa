use super::form::{normalize_description, RecipeForm, RecipeFormSchema};
use super::view::{fetch_existing, find_recipe, lock_recipe, RecipeResponse};
use super::record_media;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{MediaColumns, Recipe, RecipeChanges};
use crate::schema::recipes;
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use potluck_core::{parse_ingredients, parse_steps, MediaKind, MediaResolver, RecipeMedia};
use std::sync::Arc;
use uuid::Uuid;

fn forbidden() -> ApiError {
    ApiError::Forbidden("Only the author or an admin can modify this recipe".to_string())
}

/// Slots of `resolved` that were newly stored, i.e. differ from `existing`.
pub(crate) fn fresh_media(existing: &RecipeMedia, resolved: &RecipeMedia) -> RecipeMedia {
    let mut fresh = RecipeMedia::default();
    for kind in MediaKind::ALL {
        if let Some(media) = resolved.get(kind).filter(|m| existing.get(kind) != Some(*m)) {
            fresh.set(kind, media.clone());
        }
    }
    fresh
}

/// Overlays newly stored slots onto `current`; other slots are kept.
pub(crate) fn merge_media(mut current: RecipeMedia, fresh: &RecipeMedia) -> RecipeMedia {
    for kind in MediaKind::ALL {
        if let Some(new) = fresh.get(kind) {
            current.set(kind, new.clone());
        }
    }
    current
}

/// The fields submitted with an edit. `None` keeps the stored value.
#[derive(Debug, Default)]
pub(crate) struct RecipeEdit {
    pub title: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub ingredients: Option<Vec<String>>,
    pub steps: Option<Vec<String>>,
}

impl RecipeEdit {
    /// Column values for `current` with this edit applied. `media` is the
    /// already merged media of the row.
    pub fn changes<'a>(
        &'a self,
        current: &'a Recipe,
        media: &'a RecipeMedia,
        now: DateTime<Utc>,
    ) -> RecipeChanges<'a> {
        let columns = MediaColumns::from(media);
        RecipeChanges {
            title: self.title.as_deref().unwrap_or(&current.title),
            description: match &self.description {
                Some(submitted) => submitted.as_deref(),
                None => current.description.as_deref(),
            },
            ingredients: self.ingredients.as_deref().unwrap_or(&current.ingredients),
            steps: self.steps.as_deref().unwrap_or(&current.steps),
            image_url: columns.image_url,
            image_public_id: columns.image_public_id,
            video_url: columns.video_url,
            video_public_id: columns.video_public_id,
            updated_at: now,
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body(content = RecipeFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Recipe updated successfully", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 502, description = "Media storage failed", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(resolver): State<Arc<MediaResolver>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<RecipeResponse>, ApiError> {
    // Checked before reading the body so rejected callers never stage files.
    let snapshot = {
        let mut conn = get_conn!(pool);
        find_recipe(&mut conn, id)?
    };
    if !user.can_modify(&snapshot) {
        return Err(forbidden());
    }

    let form = RecipeForm::read(multipart, resolver.staging()).await?;
    let edit = RecipeEdit {
        title: form.updated_title()?,
        description: form.description.as_deref().map(normalize_description),
        ingredients: form.ingredients.as_deref().map(parse_ingredients),
        steps: form.steps.as_deref().map(parse_steps),
    };

    let existing = snapshot.media();
    let resolved = resolver.resolve(Some(&existing), form.uploads).await?;
    let fresh = fresh_media(&existing, &resolved);

    let mut conn = record_media(&resolver, &fresh, || {
        let mut conn = get_conn!(pool);
        conn.transaction::<_, ApiError, _>(|conn| {
            // Re-read under lock: fields not in this form keep their latest values.
            let current = lock_recipe(conn, id)?;
            if !user.can_modify(&current) {
                return Err(forbidden());
            }

            let media = merge_media(current.media(), &fresh);
            diesel::update(recipes::table.find(id))
                .set(&edit.changes(&current, &media, Utc::now()))
                .execute(conn)?;
            Ok(())
        })?;
        Ok(conn)
    })
    .await?;

    tracing::info!(recipe_id = %id, user_id = %user.id, "recipe updated");

    Ok(Json(fetch_existing(&mut conn, id)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_recipe;
    use potluck_core::MediaRef;

    fn stored(url: &str) -> MediaRef {
        MediaRef::local(url)
    }

    #[test]
    fn test_fresh_media_is_only_changed_slots() {
        let existing = RecipeMedia {
            image: Some(stored("/uploads/images/old.png")),
            video: Some(stored("/uploads/videos/old.mp4")),
        };
        let resolved = RecipeMedia {
            image: Some(stored("/uploads/images/new.png")),
            ..existing.clone()
        };

        let fresh = fresh_media(&existing, &resolved);
        assert_eq!(fresh.image, Some(stored("/uploads/images/new.png")));
        assert_eq!(fresh.video, None);
        assert_eq!(fresh_media(&existing, &existing), RecipeMedia::default());
    }

    #[test]
    fn test_merge_keeps_slots_without_uploads() {
        // A concurrent edit replaced the video after this request's snapshot.
        let current = RecipeMedia {
            image: Some(stored("/uploads/images/old.png")),
            video: Some(stored("/uploads/videos/concurrent.mp4")),
        };
        let fresh = RecipeMedia {
            image: Some(stored("/uploads/images/new.png")),
            video: None,
        };

        let merged = merge_media(current, &fresh);
        assert_eq!(merged.image, Some(stored("/uploads/images/new.png")));
        assert_eq!(merged.video, Some(stored("/uploads/videos/concurrent.mp4")));
    }

    #[test]
    fn test_title_only_edit_keeps_everything_else() {
        let mut current = sample_recipe(Uuid::new_v4());
        current.description = Some("Hearty.".to_string());
        current.ingredients = vec!["leek".to_string()];
        current.steps = vec!["simmer".to_string()];

        let edit = RecipeEdit {
            title: Some("Leek Soup".to_string()),
            ..Default::default()
        };
        let media = merge_media(current.media(), &RecipeMedia::default());
        let changes = edit.changes(&current, &media, Utc::now());

        assert_eq!(changes.title, "Leek Soup");
        assert_eq!(changes.description, Some("Hearty."));
        assert_eq!(changes.ingredients, ["leek".to_string()]);
        assert_eq!(changes.steps, ["simmer".to_string()]);
        assert_eq!(changes.image_url, current.image_url.as_deref());
        assert_eq!(changes.video_url, current.video_url.as_deref());
        assert_eq!(changes.video_public_id, current.video_public_id.as_deref());
    }

    #[test]
    fn test_submitted_fields_replace_or_clear() {
        let mut current = sample_recipe(Uuid::new_v4());
        current.description = Some("Hearty.".to_string());

        let edit = RecipeEdit {
            description: Some(None),
            ingredients: Some(vec![]),
            steps: Some(vec!["stir".to_string()]),
            ..Default::default()
        };
        let fresh = RecipeMedia {
            image: Some(MediaRef {
                url: "https://cdn.test/i".to_string(),
                public_id: Some("recipes/images/i".to_string()),
            }),
            video: None,
        };
        let media = merge_media(current.media(), &fresh);
        let changes = edit.changes(&current, &media, Utc::now());

        assert_eq!(changes.title, "Soup");
        assert_eq!(changes.description, None);
        assert!(changes.ingredients.is_empty());
        assert_eq!(changes.steps, ["stir".to_string()]);
        assert_eq!(changes.image_url, Some("https://cdn.test/i"));
        assert_eq!(changes.image_public_id, Some("recipes/images/i"));
        assert_eq!(changes.video_url, Some("https://cdn.test/v"));
    }
}
