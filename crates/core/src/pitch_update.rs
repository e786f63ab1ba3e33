//! Review statuses for staged pitch updates.
//!
//! An approved pitch is never edited directly. Its owner stages a pitch
//! update instead; an admin merges it (`approved`) or discards it
//! (`rejected`). A pitch has at most one `pending` update at a time.

use crate::error::CoreError;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

/// All valid pitch update statuses.
pub const VALID_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_APPROVED, STATUS_REJECTED];

/// Validate that a status string is one of the known statuses.
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid pitch update status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        )))
    }
}

/// Check that an update in `current` can still be reviewed.
pub fn validate_reviewable(current: &str) -> Result<(), CoreError> {
    if current == STATUS_PENDING {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Pitch update has already been {current}"
        )))
    }
}
