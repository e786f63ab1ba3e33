//! User entity model and DTOs.

use pitchwise_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub linkedin_url: Option<String>,
    pub investor_type: Option<String>,
    pub investment_min: Option<i64>,
    pub investment_max: Option<i64>,
    pub verification_documents: Vec<String>,
    pub rejection_reason: Option<String>,
    pub reviewed_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash, no lockout state).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub role: String,
    pub status: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub linkedin_url: Option<String>,
    pub investor_type: Option<String>,
    pub investment_min: Option<i64>,
    pub investment_max: Option<i64>,
    pub verification_documents: Vec<String>,
    pub rejection_reason: Option<String>,
    pub reviewed_at: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            status: user.status,
            full_name: user.full_name,
            phone: user.phone,
            company_name: user.company_name,
            linkedin_url: user.linkedin_url,
            investor_type: user.investor_type,
            investment_min: user.investment_min,
            investment_max: user.investment_max,
            verification_documents: user.verification_documents,
            rejection_reason: user.rejection_reason,
            reviewed_at: user.reviewed_at,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// DTO for inserting (or replacing) a user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub role: String,
    /// Initial status. Signups start `pending`; bootstrapped admins start `approved`.
    pub status: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub linkedin_url: Option<String>,
    pub investor_type: Option<String>,
    pub investment_min: Option<i64>,
    pub investment_max: Option<i64>,
    pub verification_documents: Vec<String>,
}

/// Query parameters for the admin user list.
#[derive(Debug, Default, Deserialize)]
pub struct UserListParams {
    pub status: Option<String>,
    pub role: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
