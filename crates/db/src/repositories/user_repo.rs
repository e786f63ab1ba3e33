//! Repository for the `users` table.

use pitchwise_core::accounts::{STATUS_APPROVED, STATUS_PENDING, STATUS_REJECTED};
use pitchwise_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::stats::StatusCount;
use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, role, status, full_name, phone, company_name, \
                        linkedin_url, investor_type, investment_min, investment_max, \
                        verification_documents, rejection_reason, reviewed_at, \
                        failed_login_count, locked_until, last_login_at, created_at, updated_at";

const INSERT: &str = "INSERT INTO users (email, password_hash, role, status, full_name, phone, \
                      company_name, linkedin_url, investor_type, investment_min, investment_max, \
                      verification_documents)
                      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)";

/// Provides CRUD and vetting operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!("{INSERT} RETURNING {COLUMNS}");
        bind_create(sqlx::query_as::<_, User>(&query), input)
            .fetch_one(pool)
            .await
    }

    /// Replace a rejected user with a fresh registration.
    ///
    /// The rejected row (and anything cascading from it) is deleted and a new
    /// row inserted in one transaction. Returns `None` if `existing_id` is no
    /// longer a rejected user, in which case nothing changes.
    pub async fn replace_rejected(
        pool: &PgPool,
        existing_id: DbId,
        input: &CreateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1 AND status = $2")
            .bind(existing_id)
            .bind(STATUS_REJECTED)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let query = format!("{INSERT} RETURNING {COLUMNS}");
        let user = bind_create(sqlx::query_as::<_, User>(&query), input)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(user))
    }

    /// Insert an approved admin unless the email is already taken.
    ///
    /// Returns `true` when a new admin row was created.
    pub async fn ensure_admin(pool: &PgPool, input: &CreateUser) -> Result<bool, sqlx::Error> {
        let query = format!(
            "{INSERT} ON CONFLICT ON CONSTRAINT uq_users_email DO NOTHING RETURNING {COLUMNS}"
        );
        let created = bind_create(sqlx::query_as::<_, User>(&query), input)
            .fetch_optional(pool)
            .await?;
        Ok(created.is_some())
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by (normalized) email.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List users with optional status and role filters, oldest first so the
    /// vetting queue is worked in arrival order.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        role: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::TEXT IS NULL OR role = $2)
             ORDER BY created_at ASC, id ASC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(status)
            .bind(role)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Approve a pending user. Returns `None` if the user is not pending.
    pub async fn approve(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                status = $2,
                rejection_reason = NULL,
                reviewed_at = NOW()
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(STATUS_APPROVED)
            .bind(STATUS_PENDING)
            .fetch_optional(pool)
            .await
    }

    /// Reject a pending or approved user. Returns `None` if the user is
    /// already rejected (or does not exist).
    pub async fn reject(
        pool: &PgPool,
        id: DbId,
        reason: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                status = $2,
                rejection_reason = $3,
                reviewed_at = NOW()
             WHERE id = $1 AND status IN ($4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(STATUS_REJECTED)
            .bind(reason)
            .bind(STATUS_PENDING)
            .bind(STATUS_APPROVED)
            .fetch_optional(pool)
            .await
    }

    /// Increment the failed login counter by 1.
    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET failed_login_count = failed_login_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Lock a user account until the specified timestamp and restart the
    /// failure count, so the next lock needs a fresh run of failures.
    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET locked_until = $2, failed_login_count = 0 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a successful login: reset `failed_login_count` to 0, clear `locked_until`,
    /// and set `last_login_at` to now.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Count non-admin users per status.
    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM users
             WHERE role <> 'admin'
             GROUP BY status
             ORDER BY status",
        )
        .fetch_all(pool)
        .await
    }
}

/// Bind the twelve insert parameters in [`INSERT`] order.
fn bind_create<'q, O>(
    query: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    input: &'q CreateUser,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    query
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&input.role)
        .bind(&input.status)
        .bind(&input.full_name)
        .bind(&input.phone)
        .bind(&input.company_name)
        .bind(&input.linkedin_url)
        .bind(&input.investor_type)
        .bind(input.investment_min)
        .bind(input.investment_max)
        .bind(&input.verification_documents)
}
