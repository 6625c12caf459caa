mod crypto;
mod db;
mod extractor;
mod middleware;
mod seed;

pub use crypto::{hash_password, verify_password};
pub use db::{
    create_reset_token, create_session, delete_session, record_login, reset_password,
    RESET_TOKEN_LIFETIME_MINUTES,
};
pub use extractor::{bearer_token, AuthUser};
pub use middleware::require_admin;
pub use seed::seed_admin_from_env;
