//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement. Roles live in the token; account status does not,
//! so handlers that need a vetted account also call [`require_approved_account`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use pitchwise_core::accounts;
use pitchwise_core::error::CoreError;
use pitchwise_core::roles::{ROLE_ADMIN, ROLE_ENTREPRENEUR, ROLE_INVESTOR};
use pitchwise_db::models::user::User;
use pitchwise_db::repositories::UserRepo;

use super::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires the `entrepreneur` role. Rejects with 403 Forbidden otherwise.
pub struct RequireEntrepreneur(pub AuthUser);

impl FromRequestParts<AppState> for RequireEntrepreneur {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ENTREPRENEUR {
            return Err(AppError::Core(CoreError::Forbidden(
                "Entrepreneur role required".into(),
            )));
        }
        Ok(RequireEntrepreneur(user))
    }
}

/// Requires `investor` or `admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireInvestor(pub AuthUser);

impl FromRequestParts<AppState> for RequireInvestor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_INVESTOR && user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Investor or Admin role required".into(),
            )));
        }
        Ok(RequireInvestor(user))
    }
}

/// Load the caller's account and check it has been approved.
///
/// A token can outlive its account (a rejected user who re-registers gets a
/// new id), so a missing row is 401 rather than 404.
pub async fn require_approved_account(state: &AppState, user: &AuthUser) -> AppResult<User> {
    let account = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Account no longer exists".into())))?;
    accounts::require_approved(&account.status)?;
    Ok(account)
}
