//! Pending email verification codes.

use pitchwise_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `email_verifications` table.
#[derive(Debug, Clone, FromRow)]
pub struct EmailVerification {
    pub id: DbId,
    pub email: String,
    pub code_hash: String,
    pub expires_at: Timestamp,
    pub attempts: i32,
    pub verified_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl EmailVerification {
    pub fn is_verified(&self) -> bool {
        self.verified_at.is_some()
    }
}
