//! Handlers for the `/auth` resource (signup, login, logout, me).

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use chrono::Utc;
use pitchwise_core::accounts::{self, normalize_email, Registration};
use pitchwise_core::error::CoreError;
use pitchwise_core::pitch_fields::trim_optional;
use pitchwise_core::roles::{self, ROLE_ENTREPRENEUR, ROLE_INVESTOR};
use pitchwise_db::models::user::{CreateUser, UserResponse};
use pitchwise_db::repositories::{EmailVerificationRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateUrl};

use crate::auth::cookie::{clear_session_cookie, session_cookie};
use crate::auth::jwt::generate_session_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// Maximum number of verification documents attached to a signup.
const MAX_VERIFICATION_DOCUMENTS: usize = 10;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
///
/// Entrepreneurs must supply `company_name`; investors must supply
/// `investor_type`. Investor-only fields are ignored for entrepreneurs.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub password: String,
    pub role: String,
    #[validate(length(min = 1, max = 150))]
    pub full_name: String,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub company_name: Option<String>,
    #[validate(url)]
    pub linkedin_url: Option<String>,
    pub investor_type: Option<String>,
    #[validate(range(min = 0))]
    pub investment_min: Option<i64>,
    #[validate(range(min = 0))]
    pub investment_max: Option<i64>,
    /// URLs of already-uploaded identity or proof documents.
    #[serde(default)]
    pub verification_documents: Vec<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response. The token is also set as the session cookie.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    /// Session lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Register an entrepreneur or investor in `pending` status. The email must
/// have been verified first. Signing up with the email of a rejected user
/// replaces that record.
pub async fn signup(
    State(state): State<AppState>,
    Json(mut input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    input.email = normalize_email(&input.email);
    input.full_name = input.full_name.trim().to_string();
    input.phone = trim_optional(input.phone.take());
    input.company_name = trim_optional(input.company_name.take());
    input.linkedin_url = trim_optional(input.linkedin_url.take());
    input.validate()?;
    roles::validate_signup_role(&input.role)?;
    validate_password_strength(&input.password, state.config.min_password_length)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    validate_documents(&input.verification_documents)?;
    validate_role_profile(&input)?;

    let verified = EmailVerificationRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some_and(|v| v.is_verified());
    if !verified {
        return Err(AppError::Core(CoreError::Validation(
            "Email address has not been verified".into(),
        )));
    }

    let existing = UserRepo::find_by_email(&state.pool, &input.email).await?;
    let registration = accounts::registration_for(existing.as_ref().map(|u| u.status.as_str()))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let create = build_create_user(input, password_hash);

    let user = match (registration, existing) {
        (Registration::ReplaceRejected, Some(previous)) => {
            let replaced = UserRepo::replace_rejected(&state.pool, previous.id, &create)
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::Conflict(
                        "An account with this email already exists".into(),
                    ))
                })?;
            tracing::info!(
                user_id = replaced.id,
                previous_id = previous.id,
                role = %replaced.role,
                "Rejected user re-registered"
            );
            replaced
        }
        _ => {
            let created = UserRepo::create(&state.pool, &create).await?;
            tracing::info!(user_id = created.id, role = %created.role, "User signed up");
            created
        }
    };

    // The account exists now; a leftover row is swept by the cleanup task.
    if let Err(e) = EmailVerificationRepo::delete(&state.pool, &user.email).await {
        tracing::warn!(user_id = user.id, error = %e, "Failed to clear verification after signup");
    }

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(user),
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Sets the session cookie and returns
/// the token for non-browser clients.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    // 1. Find user by email.
    let user = UserRepo::find_by_email(&state.pool, &normalize_email(&input.email))
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    // 2. Check if the account is temporarily locked.
    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    // 3. Verify password.
    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        // 4. On failure: increment counter, lock if threshold reached.
        UserRepo::increment_failed_login(&state.pool, user.id).await?;

        if accounts::should_lock(user.failed_login_count) {
            let lock_until =
                Utc::now() + chrono::Duration::minutes(accounts::LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, "Account locked after repeated failed logins");
        }

        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    // 5. Rejected applicants cannot sign in.
    accounts::validate_can_login(&user.status)?;

    // 6. On success: reset failed count, set last_login_at.
    UserRepo::record_successful_login(&state.pool, user.id).await?;

    // 7. Issue the session.
    let jwt = &state.config.jwt;
    let token = generate_session_token(user.id, &user.role, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let cookie = session_cookie(&token, jwt.session_expiry_secs(), state.config.cookie_secure);

    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(DataResponse {
            data: SessionResponse {
                token,
                expires_in: jwt.session_expiry_secs(),
                user: UserResponse::from(user),
            },
        }),
    ))
}

/// POST /api/v1/auth/logout
///
/// Clear the session cookie. Tokens are stateless, so there is nothing to
/// revoke server-side.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, clear_session_cookie(state.config.cookie_secure))]),
        Json(MessageResponse::new("Logged out")),
    )
}

/// GET /api/v1/auth/me
///
/// Return the current user's profile, including their vetting status.
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Account no longer exists".into())))?;

    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_documents(documents: &[String]) -> AppResult<()> {
    if documents.len() > MAX_VERIFICATION_DOCUMENTS {
        return Err(AppError::Core(CoreError::Validation(format!(
            "At most {MAX_VERIFICATION_DOCUMENTS} verification documents may be attached"
        ))));
    }
    if let Some(bad) = documents.iter().find(|url| !url.validate_url()) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Invalid verification document URL '{bad}'"
        ))));
    }
    Ok(())
}

/// Check the fields each signup role must provide.
fn validate_role_profile(input: &SignupRequest) -> AppResult<()> {
    match input.role.as_str() {
        ROLE_ENTREPRENEUR if input.company_name.is_none() => Err(AppError::Core(
            CoreError::Validation("company_name is required for entrepreneurs".into()),
        )),
        ROLE_INVESTOR => {
            let investor_type = input.investor_type.as_deref().ok_or_else(|| {
                AppError::Core(CoreError::Validation(
                    "investor_type is required for investors".into(),
                ))
            })?;
            accounts::validate_investor_type(investor_type)?;
            accounts::validate_investment_range(input.investment_min, input.investment_max)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Build the insert DTO. Investor-only fields are dropped for entrepreneurs.
fn build_create_user(input: SignupRequest, password_hash: String) -> CreateUser {
    let is_investor = input.role == ROLE_INVESTOR;
    CreateUser {
        email: input.email,
        password_hash,
        role: input.role,
        status: accounts::STATUS_PENDING.to_string(),
        full_name: input.full_name,
        phone: input.phone,
        company_name: input.company_name,
        linkedin_url: input.linkedin_url,
        investor_type: input.investor_type.filter(|_| is_investor),
        investment_min: input.investment_min.filter(|_| is_investor),
        investment_max: input.investment_max.filter(|_| is_investor),
        verification_documents: input.verification_documents,
    }
}
