//! Repository for the `pitch_updates` table.

use pitchwise_core::pitch::STATUS_APPROVED as PITCH_APPROVED;
use pitchwise_core::pitch_fields::PitchFields;
use pitchwise_core::pitch_update::{STATUS_APPROVED, STATUS_PENDING, STATUS_REJECTED};
use pitchwise_core::types::DbId;
use sqlx::PgPool;

use super::pitch_repo::bind_fields;
use crate::models::pitch::Pitch;
use crate::models::pitch_update::PitchUpdate;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, pitch_id, requested_by, title, company_name, industry, stage, summary, \
                        description, location, website_url, funding_goal, min_investment, \
                        equity_offered, status, rejection_reason, reviewed_at, created_at, updated_at";

/// Pitch columns, qualified for use in `RETURNING` after an `UPDATE pitches`.
const PITCH_COLUMNS: &str = "id, entrepreneur_id, title, company_name, industry, stage, summary, \
                              description, location, website_url, funding_goal, min_investment, \
                              equity_offered, status, rejection_count, rejection_reason, \
                              submitted_at, reviewed_at, created_at, updated_at";

/// Provides staging and review of pitch updates.
pub struct PitchUpdateRepo;

impl PitchUpdateRepo {
    /// Stage `fields` as the pending update for `pitch_id`.
    ///
    /// Upserts against the partial unique index on pending updates, so an
    /// existing pending update is overwritten rather than duplicated.
    pub async fn upsert_pending(
        pool: &PgPool,
        pitch_id: DbId,
        requested_by: DbId,
        fields: &PitchFields,
    ) -> Result<PitchUpdate, sqlx::Error> {
        let query = format!(
            "INSERT INTO pitch_updates (title, company_name, industry, stage, summary, description,
                location, website_url, funding_goal, min_investment, equity_offered,
                pitch_id, requested_by, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, '{STATUS_PENDING}')
             ON CONFLICT (pitch_id) WHERE status = '{STATUS_PENDING}' DO UPDATE SET
                title = EXCLUDED.title,
                company_name = EXCLUDED.company_name,
                industry = EXCLUDED.industry,
                stage = EXCLUDED.stage,
                summary = EXCLUDED.summary,
                description = EXCLUDED.description,
                location = EXCLUDED.location,
                website_url = EXCLUDED.website_url,
                funding_goal = EXCLUDED.funding_goal,
                min_investment = EXCLUDED.min_investment,
                equity_offered = EXCLUDED.equity_offered,
                requested_by = EXCLUDED.requested_by
             RETURNING {COLUMNS}"
        );
        bind_fields(sqlx::query_as::<_, PitchUpdate>(&query), fields)
            .bind(pitch_id)
            .bind(requested_by)
            .fetch_one(pool)
            .await
    }

    /// Find a pitch update by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PitchUpdate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pitch_updates WHERE id = $1");
        sqlx::query_as::<_, PitchUpdate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the pending update for a pitch, if any.
    pub async fn find_pending_for_pitch(
        pool: &PgPool,
        pitch_id: DbId,
    ) -> Result<Option<PitchUpdate>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM pitch_updates WHERE pitch_id = $1 AND status = $2");
        sqlx::query_as::<_, PitchUpdate>(&query)
            .bind(pitch_id)
            .bind(STATUS_PENDING)
            .fetch_optional(pool)
            .await
    }

    /// List updates in `status`, oldest first.
    pub async fn list(
        pool: &PgPool,
        status: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PitchUpdate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pitch_updates
             WHERE status = $1
             ORDER BY updated_at ASC, id ASC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, PitchUpdate>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Merge a pending update into its (approved) pitch.
    ///
    /// Locks the update row, copies its fields onto the pitch, and marks it
    /// approved in one transaction. Returns `None` without changing anything
    /// if the update is no longer pending or the pitch is no longer approved.
    pub async fn approve(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<(PitchUpdate, Pitch)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!(
            "SELECT {COLUMNS} FROM pitch_updates WHERE id = $1 AND status = $2 FOR UPDATE"
        );
        let Some(pending) = sqlx::query_as::<_, PitchUpdate>(&select)
            .bind(id)
            .bind(STATUS_PENDING)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        let fields = pending.fields();
        let merge = format!(
            "UPDATE pitches SET
                title = $1, company_name = $2, industry = $3, stage = $4, summary = $5,
                description = $6, location = $7, website_url = $8, funding_goal = $9,
                min_investment = $10, equity_offered = $11
             WHERE id = $12 AND status = $13
             RETURNING {PITCH_COLUMNS}"
        );
        let Some(pitch) = bind_fields(sqlx::query_as::<_, Pitch>(&merge), &fields)
            .bind(pending.pitch_id)
            .bind(PITCH_APPROVED)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        let mark = format!(
            "UPDATE pitch_updates SET status = $2, reviewed_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let update = sqlx::query_as::<_, PitchUpdate>(&mark)
            .bind(id)
            .bind(STATUS_APPROVED)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((update, pitch)))
    }

    /// Reject a pending update. The pitch itself is left untouched.
    pub async fn reject(
        pool: &PgPool,
        id: DbId,
        reason: &str,
    ) -> Result<Option<PitchUpdate>, sqlx::Error> {
        let query = format!(
            "UPDATE pitch_updates SET
                status = $2,
                rejection_reason = $3,
                reviewed_at = NOW()
             WHERE id = $1 AND status = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PitchUpdate>(&query)
            .bind(id)
            .bind(STATUS_REJECTED)
            .bind(reason)
            .bind(STATUS_PENDING)
            .fetch_optional(pool)
            .await
    }

    /// Withdraw (delete) the pending update for a pitch. Returns `true` if one existed.
    pub async fn withdraw(pool: &PgPool, pitch_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pitch_updates WHERE pitch_id = $1 AND status = $2")
            .bind(pitch_id)
            .bind(STATUS_PENDING)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of updates awaiting review.
    pub async fn count_pending(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pitch_updates WHERE status = $1")
            .bind(STATUS_PENDING)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
