//! Staged pitch revisions awaiting admin review.

use pitchwise_core::pitch_fields::PitchFields;
use pitchwise_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `pitch_updates` table: a shadow copy of the mutable
/// pitch fields plus its own review status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PitchUpdate {
    pub id: DbId,
    pub pitch_id: DbId,
    pub requested_by: DbId,
    pub title: String,
    pub company_name: String,
    pub industry: String,
    pub stage: String,
    pub summary: String,
    pub description: String,
    pub location: Option<String>,
    pub website_url: Option<String>,
    pub funding_goal: i64,
    pub min_investment: i64,
    pub equity_offered: f64,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PitchUpdate {
    /// The staged field values.
    pub fn fields(&self) -> PitchFields {
        PitchFields {
            title: self.title.clone(),
            company_name: self.company_name.clone(),
            industry: self.industry.clone(),
            stage: self.stage.clone(),
            summary: self.summary.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            website_url: self.website_url.clone(),
            funding_goal: self.funding_goal,
            min_investment: self.min_investment,
            equity_offered: self.equity_offered,
        }
    }
}

/// Query parameters for the admin update queue.
#[derive(Debug, Default, Deserialize)]
pub struct PitchUpdateListParams {
    /// Defaults to `pending` when omitted.
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
