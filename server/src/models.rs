use chrono::{DateTime, Utc};
use diesel::prelude::*;
use potluck_core::{AuthProvider, MediaKind, MediaRef, Ratings, RecipeMedia, Role};
use uuid::Uuid;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: String,
    pub provider: String,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Unknown values (which the table's CHECK constraint rules out) fall back
    /// to the least privileged role.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::User)
    }

    pub fn provider(&self) -> AuthProvider {
        self.provider.parse().unwrap_or(AuthProvider::Local)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }

    /// Authors may modify their own recipes; admins may modify any.
    pub fn can_modify(&self, recipe: &Recipe) -> bool {
        recipe.author_id == self.id || self.is_admin()
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: Option<&'a str>,
    pub role: &'a str,
    pub provider: &'a str,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::sessions)]
pub struct NewSession<'a> {
    pub user_id: Uuid,
    pub token_hash: &'a str,
    pub expires_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::reset_tokens)]
pub struct NewResetToken<'a> {
    pub user_id: Uuid,
    pub token_hash: &'a str,
    pub expires_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Recipe {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    pub video_url: Option<String>,
    pub video_public_id: Option<String>,
    pub ratings: serde_json::Value,
    pub average_rating: f64,
    pub total_ratings: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    pub fn media(&self) -> RecipeMedia {
        let slot = |url: &Option<String>, public_id: &Option<String>| {
            url.as_ref().map(|url| MediaRef {
                url: url.clone(),
                public_id: public_id.clone(),
            })
        };

        RecipeMedia {
            image: slot(&self.image_url, &self.image_public_id),
            video: slot(&self.video_url, &self.video_public_id),
        }
    }

    pub fn ratings(&self) -> Result<Ratings, serde_json::Error> {
        serde_json::from_value(self.ratings.clone())
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipes)]
pub struct NewRecipe<'a> {
    pub author_id: Uuid,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub ingredients: &'a [String],
    pub steps: &'a [String],
    pub image_url: Option<&'a str>,
    pub image_public_id: Option<&'a str>,
    pub video_url: Option<&'a str>,
    pub video_public_id: Option<&'a str>,
}

/// Full replacement of a recipe's editable columns. `None` clears a column.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::recipes, treat_none_as_null = true)]
pub struct RecipeChanges<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub ingredients: &'a [String],
    pub steps: &'a [String],
    pub image_url: Option<&'a str>,
    pub image_public_id: Option<&'a str>,
    pub video_url: Option<&'a str>,
    pub video_public_id: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// Splits media into the per-slot column values used by inserts and updates.
pub struct MediaColumns<'a> {
    pub image_url: Option<&'a str>,
    pub image_public_id: Option<&'a str>,
    pub video_url: Option<&'a str>,
    pub video_public_id: Option<&'a str>,
}

impl<'a> From<&'a RecipeMedia> for MediaColumns<'a> {
    fn from(media: &'a RecipeMedia) -> Self {
        let url = |kind| media.get(kind).map(|m| m.url.as_str());
        let public_id = |kind| media.get(kind).and_then(|m| m.public_id.as_deref());

        Self {
            image_url: url(MediaKind::Image),
            image_public_id: public_id(MediaKind::Image),
            video_url: url(MediaKind::Video),
            video_public_id: public_id(MediaKind::Video),
        }
    }
}

/// A recipe row as the database would return it, for handler tests.
#[cfg(test)]
pub(crate) fn sample_recipe(author_id: Uuid) -> Recipe {
    let now = Utc::now();
    Recipe {
        id: Uuid::new_v4(),
        author_id,
        title: "Soup".to_string(),
        description: None,
        ingredients: vec![],
        steps: vec![],
        image_url: Some("/uploads/images/image-1-2.png".to_string()),
        image_public_id: None,
        video_url: Some("https://cdn.test/v".to_string()),
        video_public_id: Some("recipes/videos/v".to_string()),
        ratings: serde_json::json!([]),
        average_rating: 0.0,
        total_ratings: 0,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe() -> Recipe {
        sample_recipe(Uuid::new_v4())
    }

    fn user(id: Uuid, role: &str) -> User {
        let now = Utc::now();
        User {
            id,
            name: "Cook".to_string(),
            email: "cook@example.com".to_string(),
            password_hash: None,
            role: role.to_string(),
            provider: "local".to_string(),
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_media_round_trips_through_columns() {
        let recipe = recipe();
        let media = recipe.media();

        assert_eq!(
            media.image,
            Some(MediaRef::local("/uploads/images/image-1-2.png"))
        );
        let columns = MediaColumns::from(&media);
        assert_eq!(columns.video_url, Some("https://cdn.test/v"));
        assert_eq!(columns.video_public_id, Some("recipes/videos/v"));
        assert_eq!(columns.image_public_id, None);
    }

    #[test]
    fn test_can_modify() {
        let recipe = recipe();
        assert!(user(recipe.author_id, "user").can_modify(&recipe));
        assert!(user(Uuid::new_v4(), "admin").can_modify(&recipe));
        assert!(!user(Uuid::new_v4(), "user").can_modify(&recipe));
    }

    #[test]
    fn test_empty_ratings_column() {
        assert!(recipe().ratings().unwrap().is_empty());
    }
}
