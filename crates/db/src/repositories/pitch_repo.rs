//! Repository for the `pitches` table.

use pitchwise_core::pitch::{
    RejectionOutcome, MAX_REJECTIONS, STATUS_APPROVED, STATUS_DRAFT, STATUS_PENDING,
    STATUS_REJECTED,
};
use pitchwise_core::pitch_fields::PitchFields;
use pitchwise_core::types::DbId;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres};

use crate::models::pitch::Pitch;
use crate::models::stats::StatusCount;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, entrepreneur_id, title, company_name, industry, stage, summary, \
                        description, location, website_url, funding_goal, min_investment, \
                        equity_offered, status, rejection_count, rejection_reason, \
                        submitted_at, reviewed_at, created_at, updated_at";

/// Marketplace filters after clamping, passed straight through to SQL.
#[derive(Debug, Default, Clone)]
pub struct MarketplaceFilter<'a> {
    pub industry: Option<&'a str>,
    pub stage: Option<&'a str>,
    pub min_funding_goal: Option<i64>,
    pub max_funding_goal: Option<i64>,
    pub search: Option<&'a str>,
    pub limit: i64,
    pub offset: i64,
}

/// Provides CRUD and review transitions for pitches.
pub struct PitchRepo;

impl PitchRepo {
    /// Insert a new pitch in `status` (`draft` or `pending`).
    pub async fn create(
        pool: &PgPool,
        entrepreneur_id: DbId,
        fields: &PitchFields,
        status: &str,
    ) -> Result<Pitch, sqlx::Error> {
        let query = format!(
            "INSERT INTO pitches (title, company_name, industry, stage, summary, description,
                location, website_url, funding_goal, min_investment, equity_offered,
                entrepreneur_id, status, submitted_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                CASE WHEN $13 = '{STATUS_PENDING}' THEN NOW() ELSE NULL END)
             RETURNING {COLUMNS}"
        );
        bind_fields(sqlx::query_as::<_, Pitch>(&query), fields)
            .bind(entrepreneur_id)
            .bind(status)
            .fetch_one(pool)
            .await
    }

    /// Find a pitch by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Pitch>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pitches WHERE id = $1");
        sqlx::query_as::<_, Pitch>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List an entrepreneur's own pitches, most recently updated first.
    pub async fn list_for_owner(
        pool: &PgPool,
        entrepreneur_id: DbId,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Pitch>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pitches
             WHERE entrepreneur_id = $1
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY updated_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Pitch>(&query)
            .bind(entrepreneur_id)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List pitches for the admin review queue, oldest submission first.
    pub async fn list_by_status(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Pitch>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pitches
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY submitted_at ASC NULLS LAST, id ASC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Pitch>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List approved pitches for investors, newest approval first.
    pub async fn list_marketplace(
        pool: &PgPool,
        filter: &MarketplaceFilter<'_>,
    ) -> Result<Vec<Pitch>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pitches
             WHERE status = $1
               AND ($2::TEXT IS NULL OR industry = $2)
               AND ($3::TEXT IS NULL OR stage = $3)
               AND ($4::BIGINT IS NULL OR funding_goal >= $4)
               AND ($5::BIGINT IS NULL OR funding_goal <= $5)
               AND ($6::TEXT IS NULL
                    OR title ILIKE '%' || $6 || '%'
                    OR company_name ILIKE '%' || $6 || '%'
                    OR summary ILIKE '%' || $6 || '%')
             ORDER BY reviewed_at DESC NULLS LAST, id DESC
             LIMIT $7 OFFSET $8"
        );
        sqlx::query_as::<_, Pitch>(&query)
            .bind(STATUS_APPROVED)
            .bind(filter.industry)
            .bind(filter.stage)
            .bind(filter.min_funding_goal)
            .bind(filter.max_funding_goal)
            .bind(filter.search)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Overwrite the editable fields of a draft or rejected pitch.
    ///
    /// Returns `None` if the pitch is in any other status.
    pub async fn update_fields(
        pool: &PgPool,
        id: DbId,
        fields: &PitchFields,
    ) -> Result<Option<Pitch>, sqlx::Error> {
        let query = format!(
            "UPDATE pitches SET
                title = $1, company_name = $2, industry = $3, stage = $4, summary = $5,
                description = $6, location = $7, website_url = $8, funding_goal = $9,
                min_investment = $10, equity_offered = $11
             WHERE id = $12 AND status IN ('{STATUS_DRAFT}', '{STATUS_REJECTED}')
             RETURNING {COLUMNS}"
        );
        bind_fields(sqlx::query_as::<_, Pitch>(&query), fields)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Move a pitch from `from_status` to `pending`.
    ///
    /// Returns `None` if the pitch is no longer in `from_status` or has hit
    /// the rejection cap.
    pub async fn submit(
        pool: &PgPool,
        id: DbId,
        from_status: &str,
    ) -> Result<Option<Pitch>, sqlx::Error> {
        let query = format!(
            "UPDATE pitches SET
                status = $2,
                submitted_at = NOW()
             WHERE id = $1 AND status = $3 AND rejection_count < $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Pitch>(&query)
            .bind(id)
            .bind(STATUS_PENDING)
            .bind(from_status)
            .bind(MAX_REJECTIONS)
            .fetch_optional(pool)
            .await
    }

    /// Approve a pending pitch. Returns `None` if it is not pending.
    pub async fn approve(pool: &PgPool, id: DbId) -> Result<Option<Pitch>, sqlx::Error> {
        let query = format!(
            "UPDATE pitches SET
                status = $2,
                rejection_reason = NULL,
                reviewed_at = NOW()
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Pitch>(&query)
            .bind(id)
            .bind(STATUS_APPROVED)
            .bind(STATUS_PENDING)
            .fetch_optional(pool)
            .await
    }

    /// Apply a computed rejection to a pending pitch.
    ///
    /// `previous_count` is the rejection count the outcome was computed
    /// from; the update only lands if the row still has it.
    pub async fn reject(
        pool: &PgPool,
        id: DbId,
        previous_count: i32,
        outcome: RejectionOutcome,
        reason: &str,
    ) -> Result<Option<Pitch>, sqlx::Error> {
        let query = format!(
            "UPDATE pitches SET
                status = $2,
                rejection_count = $3,
                rejection_reason = $4,
                reviewed_at = NOW()
             WHERE id = $1 AND status = $5 AND rejection_count = $6
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Pitch>(&query)
            .bind(id)
            .bind(outcome.status)
            .bind(outcome.rejection_count)
            .bind(reason)
            .bind(STATUS_PENDING)
            .bind(previous_count)
            .fetch_optional(pool)
            .await
    }

    /// Delete a pitch that is not under review. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pitches WHERE id = $1 AND status <> $2")
            .bind(id)
            .bind(STATUS_PENDING)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count pitches per status.
    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM pitches GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await
    }
}

/// Bind the eleven editable pitch fields as `$1..$11`.
pub(crate) fn bind_fields<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    fields: &'q PitchFields,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    query
        .bind(&fields.title)
        .bind(&fields.company_name)
        .bind(&fields.industry)
        .bind(&fields.stage)
        .bind(&fields.summary)
        .bind(&fields.description)
        .bind(&fields.location)
        .bind(&fields.website_url)
        .bind(fields.funding_goal)
        .bind(fields.min_investment)
        .bind(fields.equity_offered)
}
