//! Handlers for email verification (`/auth/send-verification`, `/auth/verify-email`).
//!
//! A signup must be preceded by a verified email. Codes are rate limited per
//! address and only their digest is stored.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use pitchwise_core::accounts::{self, normalize_email};
use pitchwise_core::error::CoreError;
use pitchwise_core::verification::{self, CodeRejection};
use pitchwise_db::repositories::{EmailVerificationRepo, UserRepo};
use pitchwise_events::OutgoingEmail;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/send-verification`.
#[derive(Debug, Deserialize, Validate)]
pub struct SendVerificationRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Request body for `POST /auth/verify-email`.
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyEmailRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 16, message = "Verification code is required"))]
    pub code: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/send-verification
///
/// Email a fresh six-digit code to the address. Any earlier code for the
/// same address is replaced. Refuses addresses held by a pending or
/// approved account.
pub async fn send_verification(
    State(state): State<AppState>,
    Json(mut input): Json<SendVerificationRequest>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    input.email = normalize_email(&input.email);
    input.validate()?;
    let email = input.email;

    if !state.verification_limiter.check(&email) {
        tracing::warn!(email = %email, "Verification send rate limited");
        return Err(AppError::RateLimited(
            "Too many verification requests. Please try again later.".into(),
        ));
    }

    let existing = UserRepo::find_by_email(&state.pool, &email).await?;
    accounts::registration_for(existing.as_ref().map(|u| u.status.as_str()))?;

    let ttl_mins = state.config.verification.code_ttl_mins;
    let code = verification::generate_code();
    let expires_at = Utc::now() + chrono::Duration::minutes(ttl_mins);
    EmailVerificationRepo::upsert(
        &state.pool,
        &email,
        &verification::hash_code(&email, &code),
        expires_at,
    )
    .await?;

    let message = OutgoingEmail {
        to: email.clone(),
        subject: "Your PitchWise verification code".to_string(),
        body: format!(
            "Your verification code is {code}.\n\n\
             It expires in {ttl_mins} minutes. If you did not request it, you can ignore this email."
        ),
    };
    state
        .mailer
        .send(&message)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to send verification email: {e}")))?;

    tracing::info!(email = %email, "Verification code sent");
    Ok(Json(MessageResponse::new("Verification code sent")))
}

/// POST /api/v1/auth/verify-email
///
/// Check a submitted code. A wrong guess counts against the code's attempt
/// limit; a correct one marks the address verified for signup.
pub async fn verify_email(
    State(state): State<AppState>,
    Json(mut input): Json<VerifyEmailRequest>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    input.email = normalize_email(&input.email);
    input.validate()?;

    let record = EmailVerificationRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "No verification code was requested for this email".into(),
            ))
        })?;

    if record.is_verified() {
        return Ok(Json(MessageResponse::new("Email already verified")));
    }

    // The guess is spent before the code is compared.
    let Some(claimed) = EmailVerificationRepo::consume_attempt(
        &state.pool,
        &input.email,
        verification::MAX_VERIFY_ATTEMPTS,
    )
    .await?
    else {
        tracing::info!(email = %input.email, "Verification attempt budget spent");
        return Err(AppError::Core(CodeRejection::TooManyAttempts.into()));
    };

    if let Err(rejection) = verification::check_code(
        &input.email,
        &input.code,
        &claimed.code_hash,
        claimed.expires_at,
        claimed.attempts - 1,
        Utc::now(),
    ) {
        tracing::info!(email = %input.email, ?rejection, "Verification code refused");
        return Err(AppError::Core(rejection.into()));
    }

    EmailVerificationRepo::mark_verified(&state.pool, &input.email).await?;

    tracing::info!(email = %input.email, "Email verified");
    Ok(Json(MessageResponse::new("Email verified")))
}
