use crate::db::DbPool;
use crate::models::User;
use potluck_core::normalize_email;
use thiserror::Error;

use super::crypto::hash_password;
use super::db::upsert_admin;

pub const DEFAULT_ADMIN_NAME: &str = "Super Admin";

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Failed to hash password: {0}")]
    Hash(String),
    #[error("Failed to get database connection: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("Failed to save admin: {0}")]
    Database(#[from] diesel::result::Error),
}

/// Creates (or promotes) the admin account named by `ADMIN_EMAIL`,
/// `ADMIN_PASSWORD` and optionally `ADMIN_NAME`.
pub fn seed_admin_from_env(pool: &DbPool) -> Result<User, SeedError> {
    seed_admin(pool, |key| std::env::var(key).ok())
}

pub fn seed_admin(
    pool: &DbPool,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<User, SeedError> {
    let present = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());

    let email = present("ADMIN_EMAIL").ok_or(SeedError::Missing("ADMIN_EMAIL"))?;
    let password = present("ADMIN_PASSWORD").ok_or(SeedError::Missing("ADMIN_PASSWORD"))?;
    let name = present("ADMIN_NAME").unwrap_or_else(|| DEFAULT_ADMIN_NAME.to_string());

    let password_hash = hash_password(&password).map_err(|e| SeedError::Hash(e.to_string()))?;

    let mut conn = pool.get()?;
    let user = upsert_admin(&mut conn, name.trim(), &normalize_email(&email), &password_hash)?;
    Ok(user)
}
