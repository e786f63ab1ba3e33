//! Route definitions for the `/pitches` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::pitch;
use crate::state::AppState;

/// Routes mounted at `/pitches`.
///
/// ```text
/// POST   /                      -> create_pitch
/// GET    /mine                  -> list_my_pitches
/// GET    /{id}                  -> get_pitch
/// PUT    /{id}                  -> update_pitch
/// DELETE /{id}                  -> delete_pitch
/// POST   /{id}/submit           -> submit_pitch
/// GET    /{id}/update-request   -> get_update_request
/// DELETE /{id}/update-request   -> withdraw_update_request
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(pitch::create_pitch))
        .route("/mine", get(pitch::list_my_pitches))
        .route(
            "/{id}",
            get(pitch::get_pitch)
                .put(pitch::update_pitch)
                .delete(pitch::delete_pitch),
        )
        .route("/{id}/submit", post(pitch::submit_pitch))
        .route(
            "/{id}/update-request",
            get(pitch::get_update_request).delete(pitch::withdraw_update_request),
        )
}
