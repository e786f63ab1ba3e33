//! Email verification codes.
//!
//! A six-digit numeric code is emailed to the address being registered.
//! Only its salted SHA-256 digest is stored, together with an expiry and a
//! wrong-guess counter.

use rand::Rng;

use crate::error::CoreError;
use crate::hashing::sha256_hex;
use crate::types::Timestamp;

/// Number of digits in a verification code.
pub const CODE_LENGTH: usize = 6;

/// Default lifetime of a code in minutes.
pub const DEFAULT_CODE_TTL_MINS: i64 = 10;

/// Wrong guesses allowed before a code is burned.
pub const MAX_VERIFY_ATTEMPTS: i32 = 5;

/// Generate a random zero-padded six-digit code.
pub fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{n:0width$}", width = CODE_LENGTH)
}

/// Digest of `code` salted with the (normalized) email it was issued to.
pub fn hash_code(email: &str, code: &str) -> String {
    sha256_hex(format!("{email}:{code}").as_bytes())
}

/// Why a submitted code was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeRejection {
    Expired,
    TooManyAttempts,
    Mismatch,
}

impl CodeRejection {
    pub fn message(self) -> &'static str {
        match self {
            CodeRejection::Expired => "Verification code has expired. Request a new one.",
            CodeRejection::TooManyAttempts => {
                "Too many incorrect attempts. Request a new verification code."
            }
            CodeRejection::Mismatch => "Invalid verification code",
        }
    }
}

impl From<CodeRejection> for CoreError {
    fn from(rejection: CodeRejection) -> Self {
        CoreError::Validation(rejection.message().to_string())
    }
}

/// Check a submitted code against the stored digest.
///
/// Expiry and the attempt cap are checked before the digest so a burned
/// code cannot be brute-forced further.
pub fn check_code(
    email: &str,
    submitted: &str,
    stored_hash: &str,
    expires_at: Timestamp,
    attempts: i32,
    now: Timestamp,
) -> Result<(), CodeRejection> {
    if now >= expires_at {
        return Err(CodeRejection::Expired);
    }
    if attempts >= MAX_VERIFY_ATTEMPTS {
        return Err(CodeRejection::TooManyAttempts);
    }
    if hash_code(email, submitted.trim()) != stored_hash {
        return Err(CodeRejection::Mismatch);
    }
    Ok(())
}
