//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from the session cookie or a Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireEntrepreneur`] -- Requires the `entrepreneur` role.
//! - [`rbac::RequireInvestor`] -- Requires `investor` or `admin` role.

pub mod auth;
pub mod rbac;
