pub mod error;
pub mod media;
pub mod rating;
pub mod recipe;
pub mod resolver;
pub mod staging;
pub mod storage;
pub mod user;

pub use error::{MediaError, RatingError, StorageError, TitleError};
pub use media::{video_content_type, MediaKind, MediaRef, RecipeMedia};
pub use rating::{Rating, RatingSummary, RatingValue, Ratings, MAX_RATING, MIN_RATING};
pub use recipe::{normalize_title, parse_ingredients, parse_steps, MAX_TITLE_CHARS};
pub use resolver::{MediaBackend, MediaResolver};
pub use staging::{MediaUploads, StagedUpload, StagingArea, StagingWriter};
pub use storage::{
    CloudinaryCredentials, CloudinaryStore, FakeObjectStore, LocalDiskStore, ObjectStore,
    StoredObject,
};
pub use user::{normalize_email, AuthProvider, Role};
