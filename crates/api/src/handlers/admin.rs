//! Handlers for the `/admin` resource (vetting users, pitches, and pitch updates).
//!
//! All handlers require the `admin` role via [`RequireAdmin`]. Review
//! decisions are published on the event bus; the owner is emailed from there.

use axum::extract::{Path, Query, State};
use axum::Json;
use pitchwise_core::accounts;
use pitchwise_core::error::CoreError;
use pitchwise_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use pitchwise_core::pitch::{self, MAX_REJECTIONS};
use pitchwise_core::pitch_update;
use pitchwise_core::roles::{self, ROLE_ADMIN};
use pitchwise_core::types::DbId;
use pitchwise_db::models::pitch::{Pitch, PitchListParams, PitchResponse};
use pitchwise_db::models::pitch_update::{PitchUpdate, PitchUpdateListParams};
use pitchwise_db::models::stats::StatusCount;
use pitchwise_db::models::user::{User, UserListParams, UserResponse};
use pitchwise_db::repositories::{PitchRepo, PitchUpdateRepo, UserRepo};
use pitchwise_events::bus::{
    PITCH_APPROVED, PITCH_PERMANENTLY_REJECTED, PITCH_REJECTED, PITCH_UPDATE_APPROVED,
    PITCH_UPDATE_REJECTED, USER_APPROVED, USER_REJECTED,
};
use pitchwise_events::PlatformEvent;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for every `/reject` endpoint.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

/// Response for `GET /admin/stats`.
#[derive(Debug, Serialize)]
pub struct AdminStats {
    /// Non-admin users per status.
    pub users: Vec<StatusCount>,
    pub pitches: Vec<StatusCount>,
    pub pending_pitch_updates: i64,
}

/// Response for an approved pitch update: the update and the merged pitch.
#[derive(Debug, Serialize)]
pub struct MergedPitchUpdate {
    pub update: PitchUpdate,
    pub pitch: PitchResponse,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/stats
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<AdminStats>>> {
    let users = UserRepo::count_by_status(&state.pool).await?;
    let pitches = PitchRepo::count_by_status(&state.pool).await?;
    let pending_pitch_updates = PitchUpdateRepo::count_pending(&state.pool).await?;

    Ok(Json(DataResponse {
        data: AdminStats {
            users,
            pitches,
            pending_pitch_updates,
        },
    }))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
///
/// List users, optionally filtered by `status` and `role`.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    if let Some(status) = params.status.as_deref() {
        accounts::validate_status(status)?;
    }
    if let Some(role) = params.role.as_deref() {
        roles::validate_role(role)?;
    }

    let users = UserRepo::list(
        &state.pool,
        params.status.as_deref(),
        params.role.as_deref(),
        clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
        clamp_offset(params.offset),
    )
    .await?;

    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = find_user(&state, id).await?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// POST /api/v1/admin/users/{id}/approve
///
/// `pending -> approved`.
pub async fn approve_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = find_reviewable_user(&state, id).await?;
    accounts::validate_approve(&user.status)?;

    let approved = UserRepo::approve(&state.pool, id)
        .await?
        .ok_or_else(|| status_changed("User"))?;

    tracing::info!(user_id = id, admin_id = admin.user_id, "User approved");

    state.event_bus.publish(
        PlatformEvent::new(USER_APPROVED)
            .with_source("user", id)
            .with_actor(admin.user_id)
            .with_recipient(&approved.email, &approved.full_name),
    );

    Ok(Json(DataResponse {
        data: approved.into(),
    }))
}

/// POST /api/v1/admin/users/{id}/reject
///
/// `pending -> rejected`, or revoke an approved user. A reason is required.
pub async fn reject_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<RejectRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let reason = input.reason.trim();
    pitch::validate_rejection_reason(reason)?;

    let user = find_reviewable_user(&state, id).await?;
    accounts::validate_reject(&user.status)?;

    let rejected = UserRepo::reject(&state.pool, id, reason)
        .await?
        .ok_or_else(|| status_changed("User"))?;

    tracing::info!(
        user_id = id,
        admin_id = admin.user_id,
        previous_status = %user.status,
        "User rejected"
    );

    state.event_bus.publish(
        PlatformEvent::new(USER_REJECTED)
            .with_source("user", id)
            .with_actor(admin.user_id)
            .with_recipient(&rejected.email, &rejected.full_name)
            .with_payload(serde_json::json!({ "reason": reason })),
    );

    Ok(Json(DataResponse {
        data: rejected.into(),
    }))
}

// ---------------------------------------------------------------------------
// Pitches
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/pitches
///
/// List pitches, optionally filtered by `status`, oldest submission first.
pub async fn list_pitches(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PitchListParams>,
) -> AppResult<Json<DataResponse<Vec<PitchResponse>>>> {
    if let Some(status) = params.status.as_deref() {
        pitch::validate_status(status)?;
    }

    let pitches = PitchRepo::list_by_status(
        &state.pool,
        params.status.as_deref(),
        clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
        clamp_offset(params.offset),
    )
    .await?;

    Ok(Json(DataResponse {
        data: pitches.into_iter().map(PitchResponse::from).collect(),
    }))
}

/// POST /api/v1/admin/pitches/{id}/approve
///
/// `pending -> approved`. The pitch becomes visible in the marketplace.
pub async fn approve_pitch(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PitchResponse>>> {
    let current = find_pitch(&state, id).await?;
    pitch::validate_approve(&current.status)?;

    let approved = PitchRepo::approve(&state.pool, id)
        .await?
        .ok_or_else(|| status_changed("Pitch"))?;

    tracing::info!(pitch_id = id, admin_id = admin.user_id, "Pitch approved");

    notify_owner(
        &state,
        approved.entrepreneur_id,
        PlatformEvent::new(PITCH_APPROVED)
            .with_source("pitch", id)
            .with_actor(admin.user_id)
            .with_payload(serde_json::json!({ "pitch_title": approved.title })),
    )
    .await;

    Ok(Json(DataResponse {
        data: approved.into(),
    }))
}

/// POST /api/v1/admin/pitches/{id}/reject
///
/// `pending -> rejected`, or `permanently_rejected` on the third rejection.
pub async fn reject_pitch(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<RejectRequest>,
) -> AppResult<Json<DataResponse<PitchResponse>>> {
    let reason = input.reason.trim();
    pitch::validate_rejection_reason(reason)?;

    let current = find_pitch(&state, id).await?;
    let outcome = pitch::reject(&current.status, current.rejection_count)?;

    let rejected = PitchRepo::reject(&state.pool, id, current.rejection_count, outcome, reason)
        .await?
        .ok_or_else(|| status_changed("Pitch"))?;

    tracing::info!(
        pitch_id = id,
        admin_id = admin.user_id,
        rejection_count = rejected.rejection_count,
        permanent = outcome.is_permanent(),
        "Pitch rejected"
    );

    let event_type = if outcome.is_permanent() {
        PITCH_PERMANENTLY_REJECTED
    } else {
        PITCH_REJECTED
    };
    notify_owner(
        &state,
        rejected.entrepreneur_id,
        PlatformEvent::new(event_type)
            .with_source("pitch", id)
            .with_actor(admin.user_id)
            .with_payload(serde_json::json!({
                "pitch_title": rejected.title,
                "reason": reason,
                "rejection_count": rejected.rejection_count,
                "resubmissions_remaining": MAX_REJECTIONS - rejected.rejection_count,
            })),
    )
    .await;

    Ok(Json(DataResponse {
        data: rejected.into(),
    }))
}

// ---------------------------------------------------------------------------
// Pitch updates
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/pitch-updates
///
/// List pitch updates in `status` (default `pending`), oldest first.
pub async fn list_pitch_updates(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PitchUpdateListParams>,
) -> AppResult<Json<DataResponse<Vec<PitchUpdate>>>> {
    let status = params
        .status
        .as_deref()
        .unwrap_or(pitch_update::STATUS_PENDING);
    pitch_update::validate_status(status)?;

    let updates = PitchUpdateRepo::list(
        &state.pool,
        status,
        clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
        clamp_offset(params.offset),
    )
    .await?;

    Ok(Json(DataResponse { data: updates }))
}

/// POST /api/v1/admin/pitch-updates/{id}/approve
///
/// Merge the staged fields into the live pitch. The pitch stays approved.
pub async fn approve_pitch_update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<MergedPitchUpdate>>> {
    let current = find_pitch_update(&state, id).await?;
    pitch_update::validate_reviewable(&current.status)?;

    let (update, merged) = PitchUpdateRepo::approve(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "The update was already reviewed or its pitch is no longer approved".into(),
            ))
        })?;

    tracing::info!(
        pitch_update_id = id,
        pitch_id = merged.id,
        admin_id = admin.user_id,
        "Pitch update approved and merged"
    );

    notify_owner(
        &state,
        merged.entrepreneur_id,
        PlatformEvent::new(PITCH_UPDATE_APPROVED)
            .with_source("pitch_update", id)
            .with_actor(admin.user_id)
            .with_payload(serde_json::json!({
                "pitch_id": merged.id,
                "pitch_title": merged.title,
            })),
    )
    .await;

    Ok(Json(DataResponse {
        data: MergedPitchUpdate {
            update,
            pitch: merged.into(),
        },
    }))
}

/// POST /api/v1/admin/pitch-updates/{id}/reject
///
/// Discard the staged fields. The live pitch is untouched.
pub async fn reject_pitch_update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<RejectRequest>,
) -> AppResult<Json<DataResponse<PitchUpdate>>> {
    let reason = input.reason.trim();
    pitch::validate_rejection_reason(reason)?;

    let current = find_pitch_update(&state, id).await?;
    pitch_update::validate_reviewable(&current.status)?;

    let rejected = PitchUpdateRepo::reject(&state.pool, id, reason)
        .await?
        .ok_or_else(|| status_changed("Pitch update"))?;

    tracing::info!(
        pitch_update_id = id,
        pitch_id = rejected.pitch_id,
        admin_id = admin.user_id,
        "Pitch update rejected"
    );

    if let Some(live) = PitchRepo::find_by_id(&state.pool, rejected.pitch_id).await? {
        notify_owner(
            &state,
            live.entrepreneur_id,
            PlatformEvent::new(PITCH_UPDATE_REJECTED)
                .with_source("pitch_update", id)
                .with_actor(admin.user_id)
                .with_payload(serde_json::json!({
                    "pitch_id": live.id,
                    "pitch_title": live.title,
                    "reason": reason,
                })),
        )
        .await;
    }

    Ok(Json(DataResponse { data: rejected }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

/// Load a user that is subject to vetting. Admin accounts are not.
async fn find_reviewable_user(state: &AppState, id: DbId) -> AppResult<User> {
    let user = find_user(state, id).await?;
    if user.role == ROLE_ADMIN {
        return Err(AppError::Core(CoreError::Forbidden(
            "Admin accounts cannot be reviewed".into(),
        )));
    }
    Ok(user)
}

async fn find_pitch(state: &AppState, id: DbId) -> AppResult<Pitch> {
    PitchRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Pitch", id }))
}

async fn find_pitch_update(state: &AppState, id: DbId) -> AppResult<PitchUpdate> {
    PitchUpdateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PitchUpdate",
            id,
        }))
}

/// The guarded update matched no row: another review landed first.
fn status_changed(entity: &str) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "{entity} status changed while the request was processed. Reload and try again."
    )))
}

/// Address `event` to the pitch owner and publish it.
///
/// Best-effort: the decision is already committed, so a failed lookup is
/// logged and the notification dropped.
async fn notify_owner(state: &AppState, owner_id: DbId, event: PlatformEvent) {
    match UserRepo::find_by_id(&state.pool, owner_id).await {
        Ok(Some(owner)) => state
            .event_bus
            .publish(event.with_recipient(owner.email, owner.full_name)),
        Ok(None) => {
            tracing::warn!(owner_id, event_type = %event.event_type, "Pitch owner not found, skipping notification");
        }
        Err(e) => {
            tracing::warn!(error = %e, owner_id, event_type = %event.event_type, "Owner lookup failed, skipping notification");
        }
    }
}
