//! User account status rules: vetting, re-registration, and login lockout.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Newly registered; awaiting admin vetting.
pub const STATUS_PENDING: &str = "pending";
/// Vetted and allowed to use the marketplace.
pub const STATUS_APPROVED: &str = "approved";
/// Refused by an admin. The email may be re-registered.
pub const STATUS_REJECTED: &str = "rejected";

/// All valid user statuses.
pub const VALID_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_APPROVED, STATUS_REJECTED];

/// Investor categories accepted at signup.
pub const VALID_INVESTOR_TYPES: &[&str] = &[
    "angel",
    "venture_capital",
    "private_equity",
    "family_office",
    "corporate",
];

/// Maximum consecutive failed login attempts before locking the account.
pub const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
pub const LOCK_DURATION_MINS: i64 = 15;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that a status string is one of the known statuses.
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid user status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        )))
    }
}

/// Validate an investor type.
pub fn validate_investor_type(investor_type: &str) -> Result<(), CoreError> {
    if VALID_INVESTOR_TYPES.contains(&investor_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid investor type '{investor_type}'. Must be one of: {}",
            VALID_INVESTOR_TYPES.join(", ")
        )))
    }
}

/// Validate an investor's declared ticket range.
pub fn validate_investment_range(min: Option<i64>, max: Option<i64>) -> Result<(), CoreError> {
    if min.is_some_and(|m| m < 0) || max.is_some_and(|m| m < 0) {
        return Err(CoreError::Validation(
            "Investment range must not be negative".to_string(),
        ));
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(CoreError::Validation(
                "Minimum investment cannot exceed maximum investment".to_string(),
            ));
        }
    }
    Ok(())
}

/// Normalize an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Check that an admin may approve a user in `current`.
pub fn validate_approve(current: &str) -> Result<(), CoreError> {
    match current {
        STATUS_PENDING => Ok(()),
        STATUS_APPROVED => Err(CoreError::Conflict("User is already approved".to_string())),
        _ => Err(CoreError::Conflict(
            "Rejected users must re-register before they can be approved".to_string(),
        )),
    }
}

/// Check that an admin may reject a user in `current`.
///
/// Approved users can be rejected too, which revokes their access.
pub fn validate_reject(current: &str) -> Result<(), CoreError> {
    match current {
        STATUS_PENDING | STATUS_APPROVED => Ok(()),
        _ => Err(CoreError::Conflict("User is already rejected".to_string())),
    }
}

/// What signup should do given the status of an existing user with the same email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// No user holds the email; insert a new record.
    New,
    /// The email belongs to a rejected user; overwrite that record.
    ReplaceRejected,
}

/// Decide how a signup for an email is handled.
///
/// `existing_status` is the status of the user currently holding the email,
/// if any. Only rejected users can be replaced.
pub fn registration_for(existing_status: Option<&str>) -> Result<Registration, CoreError> {
    match existing_status {
        None => Ok(Registration::New),
        Some(STATUS_REJECTED) => Ok(Registration::ReplaceRejected),
        Some(_) => Err(CoreError::Conflict(
            "An account with this email already exists".to_string(),
        )),
    }
}

/// Check that a user in `status` may log in.
pub fn validate_can_login(status: &str) -> Result<(), CoreError> {
    if status == STATUS_REJECTED {
        return Err(CoreError::Forbidden(
            "Your application was rejected. You may register again with this email.".to_string(),
        ));
    }
    Ok(())
}

/// Check that a user is approved before using vetted features.
pub fn require_approved(status: &str) -> Result<(), CoreError> {
    if status == STATUS_APPROVED {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Your account is awaiting approval".to_string(),
        ))
    }
}

/// Whether the next failed attempt (after `failed_login_count` failures) locks the account.
pub fn should_lock(failed_login_count: i32) -> bool {
    failed_login_count + 1 >= MAX_FAILED_ATTEMPTS
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn pending_user_can_be_approved_or_rejected() {
        assert!(validate_approve(STATUS_PENDING).is_ok());
        assert!(validate_reject(STATUS_PENDING).is_ok());
    }

    #[test]
    fn approved_user_can_be_revoked_but_not_reapproved() {
        assert_matches!(validate_approve(STATUS_APPROVED), Err(CoreError::Conflict(_)));
        assert!(validate_reject(STATUS_APPROVED).is_ok());
    }

    #[test]
    fn rejected_user_cannot_be_reviewed_again() {
        assert_matches!(validate_approve(STATUS_REJECTED), Err(CoreError::Conflict(_)));
        assert_matches!(validate_reject(STATUS_REJECTED), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn registration_replaces_only_rejected_users() {
        assert_eq!(registration_for(None).unwrap(), Registration::New);
        assert_eq!(
            registration_for(Some(STATUS_REJECTED)).unwrap(),
            Registration::ReplaceRejected
        );
        assert_matches!(
            registration_for(Some(STATUS_PENDING)),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            registration_for(Some(STATUS_APPROVED)),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn rejected_users_cannot_log_in() {
        assert!(validate_can_login(STATUS_PENDING).is_ok());
        assert!(validate_can_login(STATUS_APPROVED).is_ok());
        assert_matches!(validate_can_login(STATUS_REJECTED), Err(CoreError::Forbidden(_)));
    }

    #[test]
    fn only_approved_users_pass_vetting_gate() {
        assert!(require_approved(STATUS_APPROVED).is_ok());
        assert!(require_approved(STATUS_PENDING).is_err());
        assert!(require_approved(STATUS_REJECTED).is_err());
    }

    #[test]
    fn lock_triggers_on_fifth_failure() {
        assert!(!should_lock(0));
        assert!(!should_lock(3));
        assert!(should_lock(4));
    }

    #[test]
    fn investment_range_rules() {
        assert!(validate_investment_range(None, None).is_ok());
        assert!(validate_investment_range(Some(1_000), Some(50_000)).is_ok());
        assert!(validate_investment_range(Some(50_000), Some(1_000)).is_err());
        assert!(validate_investment_range(Some(-1), None).is_err());
    }

    #[test]
    fn investor_types() {
        assert!(validate_investor_type("angel").is_ok());
        assert!(validate_investor_type("crowd").is_err());
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Founder@Example.COM "), "founder@example.com");
    }

    #[test]
    fn status_validation() {
        for s in VALID_STATUSES {
            assert!(validate_status(s).is_ok());
        }
        assert!(validate_status("banned").is_err());
    }
}
