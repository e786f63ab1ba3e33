use std::sync::Arc;

use pitchwise_events::{EventBus, Mailer};

use crate::config::ServerConfig;
use crate::rate_limit::VerificationLimiter;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: pitchwise_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Event bus for review decisions; the notifier emails users from it.
    pub event_bus: Arc<EventBus>,
    /// Direct mail delivery, used for verification codes.
    pub mailer: Arc<dyn Mailer>,
    /// Per-email limiter for verification sends.
    pub verification_limiter: Arc<VerificationLimiter>,
}
