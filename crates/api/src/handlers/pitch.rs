//! Handlers for the `/pitches` resource (entrepreneur-facing).
//!
//! Owners create, edit, submit, and delete their pitches here. Edits to an
//! approved pitch are staged as a pending update instead of being applied.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pitchwise_core::error::CoreError;
use pitchwise_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use pitchwise_core::pitch::{self, EditMode};
use pitchwise_core::pitch_fields::PitchFields;
use pitchwise_core::roles::{ROLE_ADMIN, ROLE_INVESTOR};
use pitchwise_core::types::DbId;
use pitchwise_db::models::pitch::{Pitch, PitchListParams, PitchResponse};
use pitchwise_db::models::pitch_update::PitchUpdate;
use pitchwise_db::repositories::{PitchRepo, PitchUpdateRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{require_approved_account, RequireEntrepreneur};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /pitches`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePitchRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub fields: PitchFields,
    /// Submit for review immediately instead of saving a draft.
    #[serde(default)]
    pub submit: bool,
}

/// Result of `PUT /pitches/{id}`.
///
/// For drafts and rejected pitches `pitch` carries the edit and
/// `pending_update` is `None`. For approved pitches `pitch` is the
/// unchanged live listing and `pending_update` holds the staged revision.
#[derive(Debug, Serialize)]
pub struct EditPitchResponse {
    pub pitch: PitchResponse,
    pub pending_update: Option<PitchUpdate>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/pitches
///
/// Create a pitch as a draft, or submit it straight away with `"submit": true`.
pub async fn create_pitch(
    State(state): State<AppState>,
    RequireEntrepreneur(user): RequireEntrepreneur,
    Json(mut input): Json<CreatePitchRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<PitchResponse>>)> {
    require_approved_account(&state, &user).await?;
    input.fields.normalize();
    input.validate()?;

    let status = if input.submit {
        pitch::STATUS_PENDING
    } else {
        pitch::STATUS_DRAFT
    };
    let created = PitchRepo::create(&state.pool, user.user_id, &input.fields, status).await?;

    tracing::info!(
        pitch_id = created.id,
        entrepreneur_id = user.user_id,
        status = %created.status,
        "Pitch created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: created.into(),
        }),
    ))
}

/// GET /api/v1/pitches/mine
///
/// List the caller's pitches, optionally filtered by `status`.
pub async fn list_my_pitches(
    State(state): State<AppState>,
    RequireEntrepreneur(user): RequireEntrepreneur,
    Query(params): Query<PitchListParams>,
) -> AppResult<Json<DataResponse<Vec<PitchResponse>>>> {
    if let Some(status) = params.status.as_deref() {
        pitch::validate_status(status)?;
    }

    let pitches = PitchRepo::list_for_owner(
        &state.pool,
        user.user_id,
        params.status.as_deref(),
        clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
        clamp_offset(params.offset),
    )
    .await?;

    Ok(Json(DataResponse {
        data: pitches.into_iter().map(PitchResponse::from).collect(),
    }))
}

/// GET /api/v1/pitches/{id}
///
/// Owners and admins see any pitch. Approved investors see approved
/// pitches. Everyone else gets 404, so pitch ids are not probeable.
pub async fn get_pitch(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PitchResponse>>> {
    let found = PitchRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Pitch", id }))?;

    let visible = if found.entrepreneur_id == user.user_id || user.role == ROLE_ADMIN {
        true
    } else if user.role == ROLE_INVESTOR && found.status == pitch::STATUS_APPROVED {
        require_approved_account(&state, &user).await?;
        true
    } else {
        false
    };

    if !visible {
        return Err(AppError::Core(CoreError::NotFound { entity: "Pitch", id }));
    }

    Ok(Json(DataResponse { data: found.into() }))
}

/// PUT /api/v1/pitches/{id}
///
/// Drafts and rejected pitches are edited in place (200). Approved pitches
/// stage the edit as the pitch's single pending update (202), replacing
/// any update already pending. Pending and permanently rejected pitches
/// cannot be edited.
pub async fn update_pitch(
    State(state): State<AppState>,
    RequireEntrepreneur(user): RequireEntrepreneur,
    Path(id): Path<DbId>,
    Json(mut fields): Json<PitchFields>,
) -> AppResult<(StatusCode, Json<DataResponse<EditPitchResponse>>)> {
    require_approved_account(&state, &user).await?;
    fields.normalize();
    fields.validate()?;

    let current = find_owned_pitch(&state, user.user_id, id).await?;

    match pitch::edit_mode(&current.status)? {
        EditMode::InPlace => {
            let edited = PitchRepo::update_fields(&state.pool, id, &fields)
                .await?
                .ok_or_else(status_changed)?;

            tracing::info!(pitch_id = id, entrepreneur_id = user.user_id, "Pitch edited");

            Ok((
                StatusCode::OK,
                Json(DataResponse {
                    data: EditPitchResponse {
                        pitch: edited.into(),
                        pending_update: None,
                    },
                }),
            ))
        }
        EditMode::Staged => {
            let staged =
                PitchUpdateRepo::upsert_pending(&state.pool, id, user.user_id, &fields).await?;

            tracing::info!(
                pitch_id = id,
                pitch_update_id = staged.id,
                entrepreneur_id = user.user_id,
                "Pitch update staged for review"
            );

            Ok((
                StatusCode::ACCEPTED,
                Json(DataResponse {
                    data: EditPitchResponse {
                        pitch: current.into(),
                        pending_update: Some(staged),
                    },
                }),
            ))
        }
    }
}

/// POST /api/v1/pitches/{id}/submit
///
/// Submit a draft, or resubmit a rejected pitch that is under the rejection cap.
pub async fn submit_pitch(
    State(state): State<AppState>,
    RequireEntrepreneur(user): RequireEntrepreneur,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PitchResponse>>> {
    require_approved_account(&state, &user).await?;
    let current = find_owned_pitch(&state, user.user_id, id).await?;

    pitch::validate_submit(&current.status, current.rejection_count)?;

    let submitted = PitchRepo::submit(&state.pool, id, &current.status)
        .await?
        .ok_or_else(status_changed)?;

    tracing::info!(
        pitch_id = id,
        entrepreneur_id = user.user_id,
        rejection_count = submitted.rejection_count,
        "Pitch submitted for review"
    );

    Ok(Json(DataResponse {
        data: submitted.into(),
    }))
}

/// DELETE /api/v1/pitches/{id}
///
/// Delete a pitch that is not currently under review. Returns 204.
pub async fn delete_pitch(
    State(state): State<AppState>,
    RequireEntrepreneur(user): RequireEntrepreneur,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let current = find_owned_pitch(&state, user.user_id, id).await?;
    pitch::validate_delete(&current.status)?;

    if !PitchRepo::delete(&state.pool, id).await? {
        return Err(status_changed());
    }

    tracing::info!(pitch_id = id, entrepreneur_id = user.user_id, "Pitch deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/pitches/{id}/update-request
///
/// The pitch's pending update, or `null` when there is none.
pub async fn get_update_request(
    State(state): State<AppState>,
    RequireEntrepreneur(user): RequireEntrepreneur,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Option<PitchUpdate>>>> {
    find_owned_pitch(&state, user.user_id, id).await?;
    let pending = PitchUpdateRepo::find_pending_for_pitch(&state.pool, id).await?;
    Ok(Json(DataResponse { data: pending }))
}

/// DELETE /api/v1/pitches/{id}/update-request
///
/// Withdraw the pitch's pending update. Returns 204.
pub async fn withdraw_update_request(
    State(state): State<AppState>,
    RequireEntrepreneur(user): RequireEntrepreneur,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_owned_pitch(&state, user.user_id, id).await?;

    if !PitchUpdateRepo::withdraw(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Pending update for pitch",
            id,
        }));
    }

    tracing::info!(pitch_id = id, entrepreneur_id = user.user_id, "Pitch update withdrawn");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a pitch owned by `owner_id`. Someone else's pitch is reported as missing.
async fn find_owned_pitch(state: &AppState, owner_id: DbId, id: DbId) -> AppResult<Pitch> {
    PitchRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|p| p.entrepreneur_id == owner_id)
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Pitch", id }))
}

/// The guarded update matched no row: the status moved since it was read.
fn status_changed() -> AppError {
    AppError::Core(CoreError::Conflict(
        "Pitch status changed while the request was processed. Reload and try again.".into(),
    ))
}
