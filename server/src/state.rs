use crate::db::DbPool;
use axum::extract::FromRef;
use potluck_core::MediaResolver;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<DbPool>,
    pub media: Arc<MediaResolver>,
}

impl FromRef<AppState> for Arc<DbPool> {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<MediaResolver> {
    fn from_ref(state: &AppState) -> Self {
        state.media.clone()
    }
}

#[cfg(test)]
impl AppState {
    /// State backed by an unreachable database.
    pub(crate) fn without_database(media: MediaResolver) -> Self {
        Self {
            pool: Arc::new(crate::db::unreachable_pool()),
            media: Arc::new(media),
        }
    }
}
