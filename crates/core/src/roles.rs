//! Well-known role name constants.
//!
//! These must match the `CHECK` constraint on `users.role`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_ENTREPRENEUR: &str = "entrepreneur";
pub const ROLE_INVESTOR: &str = "investor";

/// Every role stored in `users.role`.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_ENTREPRENEUR, ROLE_INVESTOR];

/// Roles a visitor may pick at signup. Admins are only created by bootstrap.
pub const SIGNUP_ROLES: &[&str] = &[ROLE_ENTREPRENEUR, ROLE_INVESTOR];

/// Validate that `role` is a known role (used by list filters).
pub fn validate_role(role: &str) -> Result<(), crate::error::CoreError> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(crate::error::CoreError::Validation(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        )))
    }
}

/// Validate that `role` is one a visitor may register with.
pub fn validate_signup_role(role: &str) -> Result<(), crate::error::CoreError> {
    if SIGNUP_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(crate::error::CoreError::Validation(format!(
            "Invalid role '{role}'. Must be one of: {}",
            SIGNUP_ROLES.join(", ")
        )))
    }
}
