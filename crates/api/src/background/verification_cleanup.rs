//! Periodic cleanup of verification state.
//!
//! Drops replenished keys from the in-memory send limiter and deletes
//! `email_verifications` rows that have not been touched for a day (codes
//! that were never used, or verified emails that never completed signup).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use pitchwise_db::repositories::EmailVerificationRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::rate_limit::VerificationLimiter;

/// How long an untouched verification row is kept.
const STALE_AFTER_HOURS: i64 = 24;

/// How often the cleanup job runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(600); // 10 minutes

/// Run the cleanup loop until `cancel` is triggered.
pub async fn run(pool: PgPool, limiter: Arc<VerificationLimiter>, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Verification cleanup job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Verification cleanup job stopping");
                break;
            }
            _ = interval.tick() => {
                limiter.retain_recent();
                tracing::debug!(tracked = limiter.len(), "Verification limiter pruned");

                let cutoff = Utc::now() - chrono::Duration::hours(STALE_AFTER_HOURS);
                match EmailVerificationRepo::delete_stale(&pool, cutoff).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Verification cleanup: purged stale codes");
                    }
                    Ok(_) => tracing::debug!("Verification cleanup: nothing to purge"),
                    Err(e) => {
                        tracing::error!(error = %e, "Verification cleanup: purge failed");
                    }
                }
            }
        }
    }
}
