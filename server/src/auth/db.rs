use crate::models::{NewResetToken, NewSession, NewUser, User};
use crate::schema::{reset_tokens, sessions, users};
use chrono::{Duration, Utc};
use diesel::prelude::*;
use potluck_core::{AuthProvider, Role};
use uuid::Uuid;

use super::crypto::{generate_token, hash_token};

pub const SESSION_LIFETIME_DAYS: i64 = 30;
pub const RESET_TOKEN_LIFETIME_MINUTES: i64 = 60;

/// Starts a new session for `user_id` and returns its bearer token.
/// Expired sessions belonging to the same user are purged along the way.
pub fn create_session(conn: &mut PgConnection, user_id: Uuid) -> QueryResult<String> {
    let token = generate_token();
    let token_hash = hash_token(&token);
    let now = Utc::now();

    diesel::delete(
        sessions::table
            .filter(sessions::user_id.eq(user_id))
            .filter(sessions::expires_at.le(now)),
    )
    .execute(conn)?;

    diesel::insert_into(sessions::table)
        .values(&NewSession {
            user_id,
            token_hash: &token_hash,
            expires_at: now + Duration::days(SESSION_LIFETIME_DAYS),
        })
        .execute(conn)?;

    Ok(token)
}

pub fn user_for_token(conn: &mut PgConnection, token: &str) -> QueryResult<Option<User>> {
    sessions::table
        .inner_join(users::table)
        .filter(sessions::token_hash.eq(hash_token(token)))
        .filter(sessions::expires_at.gt(Utc::now()))
        .select(User::as_select())
        .first(conn)
        .optional()
}

/// Ends the session identified by `token`. Returns whether one existed.
pub fn delete_session(conn: &mut PgConnection, token: &str) -> QueryResult<bool> {
    let deleted = diesel::delete(sessions::table.filter(sessions::token_hash.eq(hash_token(token))))
        .execute(conn)?;
    Ok(deleted > 0)
}

pub fn record_login(conn: &mut PgConnection, user_id: Uuid) -> QueryResult<User> {
    let now = Utc::now();
    diesel::update(users::table.find(user_id))
        .set((users::last_login.eq(Some(now)), users::updated_at.eq(now)))
        .returning(User::as_returning())
        .get_result(conn)
}

/// Issues a password reset token for `user_id`. Earlier tokens for the same
/// user stop working.
pub fn create_reset_token(conn: &mut PgConnection, user_id: Uuid) -> QueryResult<String> {
    let token = generate_token();
    let token_hash = hash_token(&token);
    let now = Utc::now();

    conn.transaction(|conn| {
        diesel::delete(reset_tokens::table.filter(reset_tokens::user_id.eq(user_id)))
            .execute(conn)?;
        diesel::insert_into(reset_tokens::table)
            .values(&NewResetToken {
                user_id,
                token_hash: &token_hash,
                expires_at: now + Duration::minutes(RESET_TOKEN_LIFETIME_MINUTES),
            })
            .execute(conn)
    })?;

    Ok(token)
}

/// Consumes a reset token and stores the new password hash. Every session of
/// the user is ended. Returns `None` if the token is unknown or expired.
pub fn reset_password(
    conn: &mut PgConnection,
    token: &str,
    password_hash: &str,
) -> QueryResult<Option<Uuid>> {
    let now = Utc::now();

    conn.transaction(|conn| {
        let user_id: Option<Uuid> = diesel::delete(
            reset_tokens::table
                .filter(reset_tokens::token_hash.eq(hash_token(token)))
                .filter(reset_tokens::expires_at.gt(now)),
        )
        .returning(reset_tokens::user_id)
        .get_result(conn)
        .optional()?;

        let Some(user_id) = user_id else {
            return Ok(None);
        };

        diesel::update(users::table.find(user_id))
            .set((
                users::password_hash.eq(Some(password_hash)),
                users::updated_at.eq(now),
            ))
            .execute(conn)?;
        diesel::delete(reset_tokens::table.filter(reset_tokens::user_id.eq(user_id)))
            .execute(conn)?;
        diesel::delete(sessions::table.filter(sessions::user_id.eq(user_id))).execute(conn)?;

        Ok(Some(user_id))
    })
}

/// Creates a local admin account, or promotes and re-keys an existing
/// account with the same email.
pub fn upsert_admin(
    conn: &mut PgConnection,
    name: &str,
    email: &str,
    password_hash: &str,
) -> QueryResult<User> {
    diesel::insert_into(users::table)
        .values(&NewUser {
            name,
            email,
            password_hash: Some(password_hash),
            role: Role::Admin.as_str(),
            provider: AuthProvider::Local.as_str(),
        })
        .on_conflict(users::email)
        .do_update()
        .set((
            users::role.eq(Role::Admin.as_str()),
            users::password_hash.eq(Some(password_hash)),
            users::updated_at.eq(Utc::now()),
        ))
        .returning(User::as_returning())
        .get_result(conn)
}
