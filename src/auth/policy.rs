//! Permission checks applied by handlers before touching the store

use tracing::warn;

use super::AuthedUser;
use crate::common::ApiError;

pub const SUPERUSER: &str = "superuser";
pub const COMPANIES_VIEW: &str = "companies.view";

/// Fails with `Forbidden` unless the user holds `permission`
pub fn authorize(user: &AuthedUser, permission: &str) -> Result<(), ApiError> {
    if user.can(permission) {
        return Ok(());
    }

    warn!(user_id = %user.id, permission = %permission, "Authorization denied");
    Err(ApiError::Forbidden(format!(
        "Missing permission: {}",
        permission
    )))
}

/// Fails with `Forbidden` unless the user is a superuser
pub fn require_superuser(user: &AuthedUser) -> Result<(), ApiError> {
    if user.is_admin {
        return Ok(());
    }

    warn!(user_id = %user.id, "Superuser access denied");
    Err(ApiError::Forbidden("Admin access required".to_string()))
}
