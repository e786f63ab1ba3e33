//! Handlers for the investor marketplace (`/marketplace`).

use axum::extract::{Query, State};
use axum::Json;
use pitchwise_core::error::CoreError;
use pitchwise_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use pitchwise_core::roles::ROLE_INVESTOR;
use pitchwise_db::models::pitch::{MarketplaceParams, PitchResponse};
use pitchwise_db::repositories::{MarketplaceFilter, PitchRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{require_approved_account, RequireInvestor};
use crate::response::DataResponse;
use crate::state::AppState;

/// Longest accepted search string.
const MAX_SEARCH_LENGTH: usize = 100;

/// GET /api/v1/marketplace/pitches
///
/// Browse approved pitches. Investors must be approved; admins may browse
/// to preview what investors see.
pub async fn list_pitches(
    State(state): State<AppState>,
    RequireInvestor(user): RequireInvestor,
    Query(params): Query<MarketplaceParams>,
) -> AppResult<Json<DataResponse<Vec<PitchResponse>>>> {
    if user.role == ROLE_INVESTOR {
        require_approved_account(&state, &user).await?;
    }

    if let (Some(min), Some(max)) = (params.min_funding_goal, params.max_funding_goal) {
        if min > max {
            return Err(AppError::BadRequest(
                "min_funding_goal cannot exceed max_funding_goal".into(),
            ));
        }
    }

    let search = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty());
    if search.is_some_and(|q| q.chars().count() > MAX_SEARCH_LENGTH) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Search query exceeds {MAX_SEARCH_LENGTH} characters"
        ))));
    }

    let filter = MarketplaceFilter {
        industry: params.industry.as_deref(),
        stage: params.stage.as_deref(),
        min_funding_goal: params.min_funding_goal,
        max_funding_goal: params.max_funding_goal,
        search,
        limit: clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
        offset: clamp_offset(params.offset),
    };

    let pitches = PitchRepo::list_marketplace(&state.pool, &filter).await?;

    tracing::debug!(
        user_id = user.user_id,
        results = pitches.len(),
        "Marketplace listed"
    );

    Ok(Json(DataResponse {
        data: pitches.into_iter().map(PitchResponse::from).collect(),
    }))
}
