//! Pitch review state machine.
//!
//! ```text
//! draft ──submit──▶ pending ──approve──▶ approved
//!                     │  ▲
//!                reject  submit (while rejection_count < 3)
//!                     ▼  │
//!                   rejected ──(3rd reject)──▶ permanently_rejected
//! ```
//!
//! Transition checks live here so both the HTTP handlers and the repository
//! agree on what is allowed. The repository additionally filters its
//! `UPDATE` on the expected current status.

use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Saved by the entrepreneur but not yet sent for review.
pub const STATUS_DRAFT: &str = "draft";
/// Awaiting an admin decision.
pub const STATUS_PENDING: &str = "pending";
/// Visible to investors on the marketplace.
pub const STATUS_APPROVED: &str = "approved";
/// Rejected by an admin; may be edited and resubmitted.
pub const STATUS_REJECTED: &str = "rejected";
/// Terminal. Reached on the third rejection.
pub const STATUS_PERMANENTLY_REJECTED: &str = "permanently_rejected";

/// All valid pitch statuses.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_DRAFT,
    STATUS_PENDING,
    STATUS_APPROVED,
    STATUS_REJECTED,
    STATUS_PERMANENTLY_REJECTED,
];

/// Number of rejections after which a pitch is permanently rejected.
pub const MAX_REJECTIONS: i32 = 3;

/// Maximum length of an admin's rejection reason.
pub const MAX_REASON_LENGTH: usize = 2_000;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that a status string is one of the known statuses.
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid pitch status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        )))
    }
}

/// Validate a rejection reason: required, non-blank, bounded.
pub fn validate_rejection_reason(reason: &str) -> Result<(), CoreError> {
    if reason.trim().is_empty() {
        return Err(CoreError::Validation(
            "A rejection reason is required".to_string(),
        ));
    }
    if reason.len() > MAX_REASON_LENGTH {
        return Err(CoreError::Validation(format!(
            "Rejection reason exceeds maximum length of {MAX_REASON_LENGTH} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Check that a pitch in `current` may be submitted for review.
///
/// Drafts and rejected pitches can be (re)submitted. A rejected pitch that
/// has somehow reached the cap is refused even if its status was not moved.
pub fn validate_submit(current: &str, rejection_count: i32) -> Result<(), CoreError> {
    match current {
        STATUS_DRAFT => Ok(()),
        STATUS_REJECTED if rejection_count < MAX_REJECTIONS => Ok(()),
        STATUS_REJECTED | STATUS_PERMANENTLY_REJECTED => Err(CoreError::Conflict(format!(
            "Pitch has been rejected {MAX_REJECTIONS} times and can no longer be resubmitted"
        ))),
        STATUS_PENDING => Err(CoreError::Conflict(
            "Pitch is already awaiting review".to_string(),
        )),
        other => Err(CoreError::Conflict(format!(
            "Cannot submit a pitch in status '{other}'"
        ))),
    }
}

/// Check that a pitch in `current` may be approved.
pub fn validate_approve(current: &str) -> Result<(), CoreError> {
    if current == STATUS_PENDING {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Only pending pitches can be approved (current status: '{current}')"
        )))
    }
}

/// Result of rejecting a pending pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RejectionOutcome {
    /// Either [`STATUS_REJECTED`] or [`STATUS_PERMANENTLY_REJECTED`].
    pub status: &'static str,
    /// The incremented rejection count, never above [`MAX_REJECTIONS`].
    pub rejection_count: i32,
}

impl RejectionOutcome {
    pub fn is_permanent(&self) -> bool {
        self.status == STATUS_PERMANENTLY_REJECTED
    }
}

/// Compute the outcome of rejecting a pitch.
///
/// Only pending pitches can be rejected. The counter is incremented and
/// the pitch becomes permanently rejected once it reaches [`MAX_REJECTIONS`].
pub fn reject(current: &str, rejection_count: i32) -> Result<RejectionOutcome, CoreError> {
    if current != STATUS_PENDING {
        return Err(CoreError::Conflict(format!(
            "Only pending pitches can be rejected (current status: '{current}')"
        )));
    }

    let rejection_count = (rejection_count + 1).min(MAX_REJECTIONS);
    let status = if rejection_count >= MAX_REJECTIONS {
        STATUS_PERMANENTLY_REJECTED
    } else {
        STATUS_REJECTED
    };

    Ok(RejectionOutcome {
        status,
        rejection_count,
    })
}

/// How an owner's edit to a pitch is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    /// Fields are written directly to the pitch row.
    InPlace,
    /// Fields are staged as a pending pitch update for admin review.
    Staged,
}

/// Decide how an edit to a pitch in `current` is applied.
pub fn edit_mode(current: &str) -> Result<EditMode, CoreError> {
    match current {
        STATUS_DRAFT | STATUS_REJECTED => Ok(EditMode::InPlace),
        STATUS_APPROVED => Ok(EditMode::Staged),
        STATUS_PENDING => Err(CoreError::Conflict(
            "Pitch is under review and cannot be edited until a decision is made".to_string(),
        )),
        STATUS_PERMANENTLY_REJECTED => Err(CoreError::Conflict(
            "Pitch has been permanently rejected and cannot be edited".to_string(),
        )),
        other => Err(CoreError::Conflict(format!(
            "Cannot edit a pitch in status '{other}'"
        ))),
    }
}

/// Check that an owner may delete a pitch in `current`.
pub fn validate_delete(current: &str) -> Result<(), CoreError> {
    if current == STATUS_PENDING {
        return Err(CoreError::Conflict(
            "Pitch is under review and cannot be deleted".to_string(),
        ));
    }
    Ok(())
}

/// Post-money valuation implied by asking `funding_goal` for `equity_offered` percent.
///
/// Returns `None` for a non-positive equity share.
pub fn implied_valuation(funding_goal: i64, equity_offered: f64) -> Option<i64> {
    if equity_offered <= 0.0 {
        return None;
    }
    Some((funding_goal as f64 * 100.0 / equity_offered).round() as i64)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
