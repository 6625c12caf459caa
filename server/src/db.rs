use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub fn create_pool(database_url: &str) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .build(manager)
        .expect("Failed to create database pool");

    let mut conn = pool
        .get()
        .expect("Failed to get DB connection for migrations");
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
    if !applied.is_empty() {
        tracing::info!("Applied {} database migration(s)", applied.len());
    }

    pool
}

/// Checks out a pooled connection, returning `ApiError` from the enclosing
/// handler if the pool is exhausted or the database is unreachable.
#[macro_export]
macro_rules! get_conn {
    ($pool:expr) => {
        $pool
            .get()
            .map_err(|e| $crate::api::ApiError::internal("Database connection failed", e))?
    };
}

/// A pool whose checkouts always fail, for exercising handlers without a database.
#[cfg(test)]
pub(crate) fn unreachable_pool() -> DbPool {
    r2d2::Pool::builder()
        .min_idle(Some(0))
        .connection_timeout(std::time::Duration::from_millis(250))
        .build_unchecked(ConnectionManager::new(
            "postgres://potluck@127.0.0.1:9/potluck",
        ))
}
