//! Repository-level tests for verification codes and their guess budget.

use chrono::{Duration, Utc};
use pitchwise_core::verification::{hash_code, MAX_VERIFY_ATTEMPTS};
use pitchwise_db::repositories::EmailVerificationRepo;
use sqlx::PgPool;

const EMAIL: &str = "ada@example.com";

async fn seed(pool: &PgPool) {
    EmailVerificationRepo::upsert(
        pool,
        EMAIL,
        &hash_code(EMAIL, "042042"),
        Utc::now() + Duration::minutes(10),
    )
    .await
    .unwrap();
}

#[sqlx::test]
async fn parallel_guesses_share_one_attempt_budget(pool: PgPool) {
    seed(&pool).await;

    let handles: Vec<_> = (0..MAX_VERIFY_ATTEMPTS * 3)
        .map(|_| {
            let pool = pool.clone();
            tokio::spawn(async move {
                EmailVerificationRepo::consume_attempt(&pool, EMAIL, MAX_VERIFY_ATTEMPTS)
                    .await
                    .unwrap()
                    .is_some()
            })
        })
        .collect();

    let mut granted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            granted += 1;
        }
    }

    assert_eq!(granted, MAX_VERIFY_ATTEMPTS);
    let record = EmailVerificationRepo::find_by_email(&pool, EMAIL)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.attempts, MAX_VERIFY_ATTEMPTS);
}

#[sqlx::test]
async fn consume_attempt_returns_the_bumped_row(pool: PgPool) {
    seed(&pool).await;

    let first = EmailVerificationRepo::consume_attempt(&pool, EMAIL, MAX_VERIFY_ATTEMPTS)
        .await
        .unwrap()
        .unwrap();
    let second = EmailVerificationRepo::consume_attempt(&pool, EMAIL, MAX_VERIFY_ATTEMPTS)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first.attempts, 1);
    assert_eq!(second.attempts, 2);
}

#[sqlx::test]
async fn verified_codes_accept_no_more_guesses(pool: PgPool) {
    seed(&pool).await;
    assert!(EmailVerificationRepo::mark_verified(&pool, EMAIL).await.unwrap());

    let claimed = EmailVerificationRepo::consume_attempt(&pool, EMAIL, MAX_VERIFY_ATTEMPTS)
        .await
        .unwrap();

    assert!(claimed.is_none());
}

#[sqlx::test]
async fn fresh_code_resets_the_budget(pool: PgPool) {
    seed(&pool).await;
    for _ in 0..MAX_VERIFY_ATTEMPTS {
        EmailVerificationRepo::consume_attempt(&pool, EMAIL, MAX_VERIFY_ATTEMPTS)
            .await
            .unwrap()
            .unwrap();
    }
    assert!(
        EmailVerificationRepo::consume_attempt(&pool, EMAIL, MAX_VERIFY_ATTEMPTS)
            .await
            .unwrap()
            .is_none()
    );

    seed(&pool).await;

    let claimed = EmailVerificationRepo::consume_attempt(&pool, EMAIL, MAX_VERIFY_ATTEMPTS)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(claimed.attempts, 1);
}
