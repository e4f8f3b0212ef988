pub mod admin;
pub mod auth;
pub mod cashout;
pub mod wallet;

pub use admin::admin_config;
pub use auth::auth_config;
pub use cashout::cashout_config;
pub use wallet::wallet_config;

use crate::error::AppError;
use crate::middlewares::AuthUser;
use actix_web::{HttpMessage, HttpRequest};

/// Identity placed in request extensions by the auth middleware.
pub(crate) fn current_user(req: &HttpRequest) -> Result<AuthUser, AppError> {
    req.extensions()
        .get::<AuthUser>()
        .copied()
        .ok_or_else(|| AppError::AuthError("Missing authenticated user".to_string()))
}

/// Capability check for the finance endpoints; the services themselves
/// accept an already-authorized admin id.
pub(crate) fn require_admin(req: &HttpRequest) -> Result<AuthUser, AppError> {
    let user = current_user(req)?;
    if !user.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(user)
}
