//! Route definitions for the `/admin` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET  /stats                         -> stats
/// GET  /users                         -> list_users
/// GET  /users/{id}                    -> get_user
/// POST /users/{id}/approve            -> approve_user
/// POST /users/{id}/reject             -> reject_user
/// GET  /pitches                       -> list_pitches
/// POST /pitches/{id}/approve          -> approve_pitch
/// POST /pitches/{id}/reject           -> reject_pitch
/// GET  /pitch-updates                 -> list_pitch_updates
/// POST /pitch-updates/{id}/approve    -> approve_pitch_update
/// POST /pitch-updates/{id}/reject     -> reject_pitch_update
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(admin::stats))
        .route("/users", get(admin::list_users))
        .route("/users/{id}", get(admin::get_user))
        .route("/users/{id}/approve", post(admin::approve_user))
        .route("/users/{id}/reject", post(admin::reject_user))
        .route("/pitches", get(admin::list_pitches))
        .route("/pitches/{id}/approve", post(admin::approve_pitch))
        .route("/pitches/{id}/reject", post(admin::reject_pitch))
        .route("/pitch-updates", get(admin::list_pitch_updates))
        .route(
            "/pitch-updates/{id}/approve",
            post(admin::approve_pitch_update),
        )
        .route(
            "/pitch-updates/{id}/reject",
            post(admin::reject_pitch_update),
        )
}
