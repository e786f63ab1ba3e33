//! The editable fields of a pitch and their validation rules.
//!
//! [`PitchFields`] is shared by pitch creation, in-place edits, and staged
//! pitch updates, so all three paths enforce the same rules.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Industries a pitch can be filed under.
pub const VALID_INDUSTRIES: &[&str] = &[
    "agriculture",
    "clean_energy",
    "consumer_goods",
    "education",
    "fintech",
    "food_beverage",
    "healthcare",
    "logistics",
    "manufacturing",
    "media",
    "real_estate",
    "retail",
    "software",
    "tourism",
    "other",
];

/// Company stages a pitch can declare.
pub const VALID_STAGES: &[&str] = &["idea", "prototype", "early_revenue", "growth", "scaling"];

/// The entrepreneur-editable fields of a pitch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_financials"))]
pub struct PitchFields {
    #[validate(length(min = 3, max = 150))]
    pub title: String,
    #[validate(length(min = 1, max = 150))]
    pub company_name: String,
    #[validate(custom(function = "validate_industry"))]
    pub industry: String,
    #[validate(custom(function = "validate_stage"))]
    pub stage: String,
    #[validate(length(min = 10, max = 500))]
    pub summary: String,
    #[validate(length(min = 1, max = 10000))]
    pub description: String,
    #[validate(length(max = 150))]
    pub location: Option<String>,
    #[validate(url)]
    pub website_url: Option<String>,
    /// Amount sought, in whole currency units.
    #[validate(range(min = 1))]
    pub funding_goal: i64,
    #[validate(range(min = 1))]
    pub min_investment: i64,
    /// Percentage of the company offered for `funding_goal`.
    #[validate(range(exclusive_min = 0.0, max = 100.0))]
    pub equity_offered: f64,
}

impl PitchFields {
    /// Trim the free-text fields so whitespace never counts toward a length
    /// rule. Blank optional fields become `None`.
    pub fn normalize(&mut self) {
        for text in [
            &mut self.title,
            &mut self.company_name,
            &mut self.summary,
            &mut self.description,
        ] {
            *text = text.trim().to_string();
        }
        self.location = trim_optional(self.location.take());
        self.website_url = trim_optional(self.website_url.take());
    }
}

/// Trim an optional string, mapping a blank value to `None`.
pub fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validation_error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Owned(message));
    err
}

fn validate_industry(industry: &str) -> Result<(), ValidationError> {
    if VALID_INDUSTRIES.contains(&industry) {
        Ok(())
    } else {
        Err(validation_error(
            "unknown_industry",
            format!("Unknown industry '{industry}'"),
        ))
    }
}

fn validate_stage(stage: &str) -> Result<(), ValidationError> {
    if VALID_STAGES.contains(&stage) {
        Ok(())
    } else {
        Err(validation_error(
            "unknown_stage",
            format!(
                "Unknown stage '{stage}'. Must be one of: {}",
                VALID_STAGES.join(", ")
            ),
        ))
    }
}

fn validate_financials(fields: &PitchFields) -> Result<(), ValidationError> {
    if fields.min_investment > fields.funding_goal {
        return Err(validation_error(
            "min_investment_exceeds_goal",
            "Minimum investment cannot exceed the funding goal".to_string(),
        ));
    }
    Ok(())
}
