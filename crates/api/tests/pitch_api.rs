//! End-to-end pitch lifecycle over HTTP: drafting, review, the rejection
//! cap, staged updates, and marketplace visibility.
//!
//! Requires Postgres via `DATABASE_URL`.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_json_auth, put_json_auth, token_for};
use pitchwise_api::auth::password::hash_password;
use pitchwise_core::accounts::{STATUS_APPROVED, STATUS_PENDING};
use pitchwise_core::roles::{ROLE_ADMIN, ROLE_ENTREPRENEUR, ROLE_INVESTOR};
use pitchwise_db::models::user::CreateUser;
use pitchwise_db::repositories::UserRepo;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Actors {
    founder: String,
    investor: String,
    admin: String,
}

async fn insert_user(pool: &PgPool, email: &str, role: &str, status: &str) -> i64 {
    let input = CreateUser {
        email: email.to_string(),
        password_hash: hash_password("correct-horse-battery").unwrap(),
        role: role.to_string(),
        status: status.to_string(),
        full_name: format!("{role} user"),
        phone: None,
        company_name: (role == ROLE_ENTREPRENEUR).then(|| "Acme Clinics".to_string()),
        linkedin_url: None,
        investor_type: (role == ROLE_INVESTOR).then(|| "angel".to_string()),
        investment_min: None,
        investment_max: None,
        verification_documents: Vec::new(),
    };
    UserRepo::create(pool, &input).await.unwrap().id
}

async fn actors(pool: &PgPool) -> Actors {
    let founder = insert_user(pool, "founder@example.com", ROLE_ENTREPRENEUR, STATUS_APPROVED).await;
    let investor = insert_user(pool, "investor@example.com", ROLE_INVESTOR, STATUS_APPROVED).await;
    let admin = insert_user(pool, "admin@example.com", ROLE_ADMIN, STATUS_APPROVED).await;
    Actors {
        founder: token_for(founder, ROLE_ENTREPRENEUR),
        investor: token_for(investor, ROLE_INVESTOR),
        admin: token_for(admin, ROLE_ADMIN),
    }
}

fn pitch_body(title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "company_name": "Acme Clinics",
        "industry": "healthcare",
        "stage": "prototype",
        "summary": "Scheduling software for small clinics.",
        "description": "Long description.",
        "funding_goal": 250000,
        "min_investment": 5000,
        "equity_offered": 10.0,
    })
}

/// Create a pitch and submit it in one call; returns its id.
async fn submitted_pitch(app: &axum::Router, founder: &str, title: &str) -> i64 {
    let mut body = pitch_body(title);
    body["submit"] = json!(true);
    let response = post_json_auth(app.clone(), "/api/v1/pitches", body, founder).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    json["data"]["id"].as_i64().unwrap()
}

async fn approve(app: &axum::Router, admin: &str, id: i64) {
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/admin/pitches/{id}/approve"),
        json!({}),
        admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn draft_is_private_until_approved(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);

    let response =
        post_json_auth(app.clone(), "/api/v1/pitches", pitch_body("Clinic scheduling"), &who.founder)
            .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "draft");
    assert_eq!(json["data"]["implied_valuation"], 2_500_000);
    let id = json["data"]["id"].as_i64().unwrap();

    // Investors cannot see drafts, and the marketplace is empty.
    let response = get_auth(app.clone(), &format!("/api/v1/pitches/{id}"), &who.investor).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/pitches/{id}/submit"),
        json!({}),
        &who.founder,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    approve(&app, &who.admin, id).await;

    let market = body_json(get_auth(app.clone(), "/api/v1/marketplace/pitches", &who.investor).await).await;
    assert_eq!(market["data"].as_array().unwrap().len(), 1);
    assert_eq!(market["data"][0]["id"], id);

    let response = get_auth(app, &format!("/api/v1/pitches/{id}"), &who.investor).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn third_rejection_is_permanent(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);
    let id = submitted_pitch(&app, &who.founder, "Clinic scheduling").await;
    let reject_uri = format!("/api/v1/admin/pitches/{id}/reject");
    let submit_uri = format!("/api/v1/pitches/{id}/submit");

    for round in 1..=2 {
        let response = post_json_auth(
            app.clone(),
            &reject_uri,
            json!({ "reason": "Financials are unclear" }),
            &who.admin,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"], "rejected");
        assert_eq!(json["data"]["rejection_count"], round);

        let response = post_json_auth(app.clone(), &submit_uri, json!({}), &who.founder).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = post_json_auth(
        app.clone(),
        &reject_uri,
        json!({ "reason": "Still unclear" }),
        &who.admin,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "permanently_rejected");
    assert_eq!(json["data"]["rejection_count"], 3);

    // No more resubmissions or edits.
    let response = post_json_auth(app.clone(), &submit_uri, json!({}), &who.founder).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let response = put_json_auth(
        app,
        &format!("/api/v1/pitches/{id}"),
        pitch_body("Renamed"),
        &who.founder,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn pending_pitch_cannot_be_edited_or_deleted(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);
    let id = submitted_pitch(&app, &who.founder, "Clinic scheduling").await;

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/pitches/{id}"),
        pitch_body("Renamed"),
        &who.founder,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = delete_auth(app, &format!("/api/v1/pitches/{id}"), &who.founder).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn edits_to_approved_pitch_are_staged_until_reviewed(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);
    let id = submitted_pitch(&app, &who.founder, "Clinic scheduling").await;
    approve(&app, &who.admin, id).await;

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/pitches/{id}"),
        pitch_body("Clinic scheduling v2"),
        &who.founder,
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["pitch"]["title"], "Clinic scheduling");
    assert_eq!(json["data"]["pitch"]["status"], "approved");
    let update_id = json["data"]["pending_update"]["id"].as_i64().unwrap();

    // A second edit replaces the staged revision instead of queueing another.
    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/pitches/{id}"),
        pitch_body("Clinic scheduling v3"),
        &who.founder,
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let queue = body_json(get_auth(app.clone(), "/api/v1/admin/pitch-updates", &who.admin).await).await;
    assert_eq!(queue["data"].as_array().unwrap().len(), 1);
    assert_eq!(queue["data"][0]["id"], update_id);
    assert_eq!(queue["data"][0]["title"], "Clinic scheduling v3");

    // The live listing is unchanged until the update is approved.
    let market = body_json(get_auth(app.clone(), "/api/v1/marketplace/pitches", &who.investor).await).await;
    assert_eq!(market["data"][0]["title"], "Clinic scheduling");

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/admin/pitch-updates/{update_id}/approve"),
        json!({}),
        &who.admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["update"]["status"], STATUS_APPROVED);
    assert_eq!(json["data"]["pitch"]["title"], "Clinic scheduling v3");
    assert_eq!(json["data"]["pitch"]["status"], "approved");

    let pending = body_json(
        get_auth(app, &format!("/api/v1/pitches/{id}/update-request"), &who.founder).await,
    )
    .await;
    assert!(pending["data"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn staged_update_can_be_withdrawn(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);
    let id = submitted_pitch(&app, &who.founder, "Clinic scheduling").await;
    approve(&app, &who.admin, id).await;

    put_json_auth(
        app.clone(),
        &format!("/api/v1/pitches/{id}"),
        pitch_body("Clinic scheduling v2"),
        &who.founder,
    )
    .await;

    let uri = format!("/api/v1/pitches/{id}/update-request");
    let response = delete_auth(app.clone(), &uri, &who.founder).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(app, &uri, &who.founder).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn pending_investor_cannot_browse(pool: PgPool) {
    let investor = insert_user(&pool, "new@example.com", ROLE_INVESTOR, STATUS_PENDING).await;
    let app = common::build_test_app(pool);

    let response = get_auth(
        app,
        "/api/v1/marketplace/pitches",
        &token_for(investor, ROLE_INVESTOR),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_vets_users_and_sees_queue_counts(pool: PgPool) {
    let who = actors(&pool).await;
    let applicant = insert_user(&pool, "new@example.com", ROLE_INVESTOR, STATUS_PENDING).await;
    let app = common::build_test_app(pool);

    let queue = body_json(
        get_auth(app.clone(), "/api/v1/admin/users?status=pending", &who.admin).await,
    )
    .await;
    assert_eq!(queue["data"].as_array().unwrap().len(), 1);
    assert_eq!(queue["data"][0]["id"], applicant);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/admin/users/{applicant}/reject"),
        json!({ "reason": "Could not verify identity" }),
        &who.admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "rejected");
    assert_eq!(json["data"]["rejection_reason"], "Could not verify identity");

    // A rejected user is final for this record.
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/admin/users/{applicant}/approve"),
        json!({}),
        &who.admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let stats = body_json(get_auth(app, "/api/v1/admin/stats", &who.admin).await).await;
    assert_eq!(stats["data"]["pending_pitch_updates"], 0);
    assert!(stats["data"]["users"].is_array());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn whitespace_only_title_or_summary_is_rejected(pool: PgPool) {
    let who = actors(&pool).await;
    let app = common::build_test_app(pool);

    for field in ["title", "summary"] {
        let mut body = pitch_body("Clinic scheduling");
        body[field] = json!("             ");
        let response = post_json_auth(app.clone(), "/api/v1/pitches", body, &who.founder).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "blank {field}");
    }

    let mut body = pitch_body("  Clinic scheduling  ");
    body["location"] = json!("   ");
    let response = post_json_auth(app, "/api/v1/pitches", body, &who.founder).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Clinic scheduling");
    assert!(json["data"]["location"].is_null());
}
