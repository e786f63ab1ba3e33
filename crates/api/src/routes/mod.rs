pub mod admin;
pub mod auth;
pub mod health;
pub mod marketplace;
pub mod pitch;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/send-verification                          email a verification code (public)
/// /auth/verify-email                               confirm a code (public)
/// /auth/signup                                     register (public, verified email)
/// /auth/login                                      login (public)
/// /auth/logout                                     clear session cookie
/// /auth/me                                         current user (requires auth)
///
/// /pitches                                         create (approved entrepreneur)
/// /pitches/mine                                    list own pitches
/// /pitches/{id}                                    get, update, delete
/// /pitches/{id}/submit                             submit for review (POST)
/// /pitches/{id}/update-request                     get, withdraw pending update
///
/// /marketplace/pitches                             browse approved pitches (investor)
///
/// /admin/stats                                     review queue counts
/// /admin/users                                     list (?status, role)
/// /admin/users/{id}                                get
/// /admin/users/{id}/approve                        approve (POST)
/// /admin/users/{id}/reject                         reject with reason (POST)
/// /admin/pitches                                   list (?status)
/// /admin/pitches/{id}/approve                      approve (POST)
/// /admin/pitches/{id}/reject                       reject with reason (POST)
/// /admin/pitch-updates                             list (?status, default pending)
/// /admin/pitch-updates/{id}/approve                merge into pitch (POST)
/// /admin/pitch-updates/{id}/reject                 reject with reason (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/pitches", pitch::router())
        .nest("/marketplace", marketplace::router())
        .nest("/admin", admin::router())
}
