use serde::Serialize;
use sqlx::FromRow;

/// Row count for one status value, as returned by `GROUP BY status` queries.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}
