//! Repository for the `email_verifications` table.

use pitchwise_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::email_verification::EmailVerification;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, code_hash, expires_at, attempts, verified_at, created_at, updated_at";

/// Provides storage for email verification codes, one row per email.
pub struct EmailVerificationRepo;

impl EmailVerificationRepo {
    /// Store a fresh code for `email`, replacing any previous code and
    /// resetting its attempt counter and verification state.
    pub async fn upsert(
        pool: &PgPool,
        email: &str,
        code_hash: &str,
        expires_at: Timestamp,
    ) -> Result<EmailVerification, sqlx::Error> {
        let query = format!(
            "INSERT INTO email_verifications (email, code_hash, expires_at)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_email_verifications_email DO UPDATE SET
                code_hash = EXCLUDED.code_hash,
                expires_at = EXCLUDED.expires_at,
                attempts = 0,
                verified_at = NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmailVerification>(&query)
            .bind(email)
            .bind(code_hash)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find the verification row for `email`.
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<EmailVerification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM email_verifications WHERE email = $1");
        sqlx::query_as::<_, EmailVerification>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Spend one guess against the unverified code for `email`.
    ///
    /// The counter is bumped before the code is compared, and only while it
    /// is below `max_attempts`. Returns the updated row, or `None` once the
    /// budget is spent (or the row is verified or gone). Concurrent guesses
    /// cannot exceed the budget.
    pub async fn consume_attempt(
        pool: &PgPool,
        email: &str,
        max_attempts: i32,
    ) -> Result<Option<EmailVerification>, sqlx::Error> {
        let query = format!(
            "UPDATE email_verifications SET attempts = attempts + 1
             WHERE email = $1 AND attempts < $2 AND verified_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmailVerification>(&query)
            .bind(email)
            .bind(max_attempts)
            .fetch_optional(pool)
            .await
    }

    /// Mark the code for `email` as successfully verified.
    pub async fn mark_verified(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE email_verifications SET verified_at = NOW()
             WHERE email = $1 AND verified_at IS NULL",
        )
        .bind(email)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove the row for `email` once it has been used for signup.
    pub async fn delete(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM email_verifications WHERE email = $1")
            .bind(email)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete rows last touched before `cutoff`. Returns the count removed.
    pub async fn delete_stale(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM email_verifications WHERE updated_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
