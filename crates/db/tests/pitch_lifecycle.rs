//! Repository-level tests for the pitch lifecycle and user vetting.
//!
//! These run against a real Postgres via `#[sqlx::test]`, which creates a
//! throwaway database per test and applies `./migrations`.

use pitchwise_core::accounts::{STATUS_PENDING as USER_PENDING, STATUS_REJECTED as USER_REJECTED};
use pitchwise_core::pitch::{self, MAX_REJECTIONS};
use pitchwise_core::pitch_fields::PitchFields;
use pitchwise_core::pitch_update;
use pitchwise_core::roles::ROLE_ENTREPRENEUR;
use pitchwise_db::models::user::{CreateUser, User};
use pitchwise_db::repositories::{PitchRepo, PitchUpdateRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_user(email: &str, full_name: &str) -> CreateUser {
    CreateUser {
        email: email.to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
        role: ROLE_ENTREPRENEUR.to_string(),
        status: USER_PENDING.to_string(),
        full_name: full_name.to_string(),
        phone: None,
        company_name: Some("Acme".to_string()),
        linkedin_url: None,
        investor_type: None,
        investment_min: None,
        investment_max: None,
        verification_documents: vec!["https://files.example.com/id.pdf".to_string()],
    }
}

fn fields(title: &str) -> PitchFields {
    PitchFields {
        title: title.to_string(),
        company_name: "Acme".to_string(),
        industry: "software".to_string(),
        stage: "growth".to_string(),
        summary: "Workflow tooling for small clinics.".to_string(),
        description: "Long description.".to_string(),
        location: None,
        website_url: None,
        funding_goal: 500_000,
        min_investment: 10_000,
        equity_offered: 10.0,
    }
}

async fn approved_entrepreneur(pool: &PgPool) -> User {
    let user = UserRepo::create(pool, &new_user("founder@example.com", "Ada Founder"))
        .await
        .unwrap();
    UserRepo::approve(pool, user.id).await.unwrap().unwrap()
}

// ---------------------------------------------------------------------------
// Pitch review
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn rejection_count_caps_at_three(pool: PgPool) {
    let owner = approved_entrepreneur(&pool).await;
    let mut current = PitchRepo::create(&pool, owner.id, &fields("Clinic OS"), pitch::STATUS_PENDING)
        .await
        .unwrap();
    assert!(current.submitted_at.is_some());

    for round in 1..=MAX_REJECTIONS {
        let outcome = pitch::reject(&current.status, current.rejection_count).unwrap();
        current = PitchRepo::reject(&pool, current.id, current.rejection_count, outcome, "No traction")
            .await
            .unwrap()
            .expect("pending pitch should be rejectable");
        assert_eq!(current.rejection_count, round);

        if round < MAX_REJECTIONS {
            assert_eq!(current.status, pitch::STATUS_REJECTED);
            current = PitchRepo::submit(&pool, current.id, pitch::STATUS_REJECTED)
                .await
                .unwrap()
                .expect("rejected pitch under the cap should resubmit");
        }
    }

    assert_eq!(current.status, pitch::STATUS_PERMANENTLY_REJECTED);
    assert_eq!(current.rejection_count, MAX_REJECTIONS);

    let resubmit = PitchRepo::submit(&pool, current.id, pitch::STATUS_REJECTED)
        .await
        .unwrap();
    assert!(resubmit.is_none(), "terminal pitch must not resubmit");
}

#[sqlx::test]
async fn stale_rejection_does_not_apply(pool: PgPool) {
    let owner = approved_entrepreneur(&pool).await;
    let created = PitchRepo::create(&pool, owner.id, &fields("Clinic OS"), pitch::STATUS_PENDING)
        .await
        .unwrap();

    let outcome = pitch::reject(&created.status, created.rejection_count).unwrap();
    PitchRepo::reject(&pool, created.id, 0, outcome, "first")
        .await
        .unwrap()
        .unwrap();

    // A second admin acting on the same stale read must not double-count.
    let second = PitchRepo::reject(&pool, created.id, 0, outcome, "second")
        .await
        .unwrap();
    assert!(second.is_none());
}

#[sqlx::test]
async fn in_place_edit_only_for_draft_or_rejected(pool: PgPool) {
    let owner = approved_entrepreneur(&pool).await;
    let draft = PitchRepo::create(&pool, owner.id, &fields("Draft"), pitch::STATUS_DRAFT)
        .await
        .unwrap();
    assert!(draft.submitted_at.is_none());

    let edited = PitchRepo::update_fields(&pool, draft.id, &fields("Draft v2"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(edited.title, "Draft v2");

    PitchRepo::submit(&pool, draft.id, pitch::STATUS_DRAFT)
        .await
        .unwrap()
        .unwrap();
    let blocked = PitchRepo::update_fields(&pool, draft.id, &fields("Sneaky"))
        .await
        .unwrap();
    assert!(blocked.is_none(), "pending pitch must not be edited in place");
}

// ---------------------------------------------------------------------------
// Pitch updates
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn at_most_one_pending_update_per_pitch(pool: PgPool) {
    let owner = approved_entrepreneur(&pool).await;
    let created = PitchRepo::create(&pool, owner.id, &fields("Clinic OS"), pitch::STATUS_PENDING)
        .await
        .unwrap();
    let approved = PitchRepo::approve(&pool, created.id).await.unwrap().unwrap();

    let first = PitchUpdateRepo::upsert_pending(&pool, approved.id, owner.id, &fields("Clinic OS v2"))
        .await
        .unwrap();
    let second =
        PitchUpdateRepo::upsert_pending(&pool, approved.id, owner.id, &fields("Clinic OS v3"))
            .await
            .unwrap();

    assert_eq!(first.id, second.id, "second stage must overwrite the first");
    assert_eq!(second.title, "Clinic OS v3");
    assert_eq!(PitchUpdateRepo::count_pending(&pool).await.unwrap(), 1);

    // Once merged, a new edit opens a new pending update.
    let (merged, pitch_row) = PitchUpdateRepo::approve(&pool, second.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(merged.status, pitch_update::STATUS_APPROVED);
    assert_eq!(pitch_row.title, "Clinic OS v3");
    assert_eq!(pitch_row.status, pitch::STATUS_APPROVED);

    let third = PitchUpdateRepo::upsert_pending(&pool, approved.id, owner.id, &fields("Clinic OS v4"))
        .await
        .unwrap();
    assert_ne!(third.id, second.id);
    assert_eq!(PitchUpdateRepo::count_pending(&pool).await.unwrap(), 1);
}

#[sqlx::test]
async fn rejected_update_leaves_pitch_untouched(pool: PgPool) {
    let owner = approved_entrepreneur(&pool).await;
    let created = PitchRepo::create(&pool, owner.id, &fields("Clinic OS"), pitch::STATUS_PENDING)
        .await
        .unwrap();
    PitchRepo::approve(&pool, created.id).await.unwrap().unwrap();

    let staged = PitchUpdateRepo::upsert_pending(&pool, created.id, owner.id, &fields("Renamed"))
        .await
        .unwrap();
    let rejected = PitchUpdateRepo::reject(&pool, staged.id, "Misleading title")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rejected.status, pitch_update::STATUS_REJECTED);

    let unchanged = PitchRepo::find_by_id(&pool, created.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, "Clinic OS");

    // Reviewing again is refused.
    assert!(PitchUpdateRepo::approve(&pool, staged.id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// User vetting
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn rejected_user_is_replaced_on_reregistration(pool: PgPool) {
    let original = UserRepo::create(&pool, &new_user("again@example.com", "First Try"))
        .await
        .unwrap();
    let rejected = UserRepo::reject(&pool, original.id, "Documents unreadable")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rejected.status, USER_REJECTED);

    let replacement =
        UserRepo::replace_rejected(&pool, original.id, &new_user("again@example.com", "Second Try"))
            .await
            .unwrap()
            .expect("rejected record should be replaceable");

    assert_eq!(replacement.status, USER_PENDING);
    assert_eq!(replacement.full_name, "Second Try");
    assert!(replacement.rejection_reason.is_none());
    assert!(UserRepo::find_by_id(&pool, original.id).await.unwrap().is_none());

    let by_email = UserRepo::find_by_email(&pool, "again@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, replacement.id);
}

#[sqlx::test]
async fn pending_user_is_not_replaced(pool: PgPool) {
    let original = UserRepo::create(&pool, &new_user("taken@example.com", "Holder"))
        .await
        .unwrap();

    let result =
        UserRepo::replace_rejected(&pool, original.id, &new_user("taken@example.com", "Intruder"))
            .await
            .unwrap();
    assert!(result.is_none());

    let still = UserRepo::find_by_id(&pool, original.id).await.unwrap().unwrap();
    assert_eq!(still.full_name, "Holder");
}

#[sqlx::test]
async fn duplicate_email_violates_unique_constraint(pool: PgPool) {
    UserRepo::create(&pool, &new_user("dup@example.com", "One"))
        .await
        .unwrap();
    let err = UserRepo::create(&pool, &new_user("dup@example.com", "Two"))
        .await
        .unwrap_err();
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.constraint(), Some("uq_users_email"));
        }
        other => panic!("expected database error, got {other:?}"),
    }
}
