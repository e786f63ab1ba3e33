//! Route definitions for the `/marketplace` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::marketplace;
use crate::state::AppState;

/// Routes mounted at `/marketplace`.
///
/// ```text
/// GET /pitches  -> list_pitches (?industry, stage, min/max_funding_goal, q)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/pitches", get(marketplace::list_pitches))
}
