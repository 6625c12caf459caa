pub mod forgot_password;
pub mod login;
pub mod reset_password;
pub mod signup;

use crate::api::ApiError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Longest name or email the `users` columns hold, in characters.
pub const MAX_FIELD_CHARS: usize = 255;

pub(crate) fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}
