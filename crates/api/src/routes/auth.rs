//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{auth, verification};
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /send-verification  -> send_verification
/// POST /verify-email       -> verify_email
/// POST /signup             -> signup
/// POST /login              -> login
/// POST /logout             -> logout
/// GET  /me                 -> me (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/send-verification", post(verification::send_verification))
        .route("/verify-email", post(verification::verify_email))
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}
