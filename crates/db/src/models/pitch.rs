//! Pitch entity model and DTOs.

use pitchwise_core::pitch::implied_valuation;
use pitchwise_core::pitch_fields::PitchFields;
use pitchwise_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `pitches` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Pitch {
    pub id: DbId,
    pub entrepreneur_id: DbId,
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
    pub rejection_count: i32,
    pub rejection_reason: Option<String>,
    pub submitted_at: Option<Timestamp>,
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Pitch {
    /// The entrepreneur-editable fields of this pitch.
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

/// A pitch as returned by the API, with derived figures.
#[derive(Debug, Clone, Serialize)]
pub struct PitchResponse {
    #[serde(flatten)]
    pub pitch: Pitch,
    pub implied_valuation: Option<i64>,
}

impl From<Pitch> for PitchResponse {
    fn from(pitch: Pitch) -> Self {
        let implied_valuation = implied_valuation(pitch.funding_goal, pitch.equity_offered);
        Self {
            pitch,
            implied_valuation,
        }
    }
}

/// Query parameters for listing pitches by status (admin and owner views).
#[derive(Debug, Default, Deserialize)]
pub struct PitchListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for the investor marketplace.
#[derive(Debug, Default, Deserialize)]
pub struct MarketplaceParams {
    pub industry: Option<String>,
    pub stage: Option<String>,
    pub min_funding_goal: Option<i64>,
    pub max_funding_goal: Option<i64>,
    /// Case-insensitive match against title, company name, and summary.
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
