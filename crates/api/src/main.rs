use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use pitchwise_core::accounts::{normalize_email, STATUS_APPROVED};
use pitchwise_core::roles::ROLE_ADMIN;
use pitchwise_db::models::user::CreateUser;
use pitchwise_db::repositories::UserRepo;
use pitchwise_events::{EmailConfig, EventBus, LogMailer, Mailer, ReviewNotifier, SmtpMailer};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pitchwise_api::auth::password::hash_password;
use pitchwise_api::background::verification_cleanup;
use pitchwise_api::config::{AdminBootstrap, ServerConfig};
use pitchwise_api::rate_limit::VerificationLimiter;
use pitchwise_api::router::build_app_router;
use pitchwise_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pitchwise_api=debug,pitchwise_events=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = pitchwise_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    pitchwise_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    pitchwise_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Admin bootstrap ---
    if let Some(admin) = &config.admin_bootstrap {
        bootstrap_admin(&pool, admin)
            .await
            .expect("Failed to bootstrap admin account");
    }

    // --- Mail delivery ---
    let mailer: Arc<dyn Mailer> = match EmailConfig::from_env() {
        Some(email_config) => {
            tracing::info!(host = %email_config.smtp_host, "SMTP delivery enabled");
            Arc::new(SmtpMailer::new(&email_config).expect("Invalid SMTP configuration"))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let notifier = ReviewNotifier::new(Arc::clone(&mailer));
    let notifier_handle = tokio::spawn(notifier.run(event_bus.subscribe()));
    tracing::info!("Review notifier started");

    // --- Verification rate limiter + cleanup ---
    let verification_limiter = Arc::new(VerificationLimiter::new(
        config.verification.rate_limit,
        Duration::from_secs(config.verification.rate_window_secs),
    ));
    let cleanup_cancel = CancellationToken::new();
    let cleanup_handle = tokio::spawn(verification_cleanup::run(
        pool.clone(),
        Arc::clone(&verification_limiter),
        cleanup_cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        mailer,
        verification_limiter,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cleanup_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), cleanup_handle).await;
    tracing::info!("Verification cleanup stopped");

    // Dropping the last sender closes the channel and ends the notifier loop.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), notifier_handle).await;
    tracing::info!("Review notifier shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Create the configured admin account if its email is not taken yet.
async fn bootstrap_admin(pool: &pitchwise_db::DbPool, admin: &AdminBootstrap) -> anyhow::Result<()> {
    let password_hash = hash_password(&admin.password)
        .map_err(|e| anyhow::anyhow!("Failed to hash ADMIN_PASSWORD: {e}"))?;
    let input = CreateUser {
        email: normalize_email(&admin.email),
        password_hash,
        role: ROLE_ADMIN.to_string(),
        status: STATUS_APPROVED.to_string(),
        full_name: "Administrator".to_string(),
        phone: None,
        company_name: None,
        linkedin_url: None,
        investor_type: None,
        investment_min: None,
        investment_max: None,
        verification_documents: Vec::new(),
    };

    let created = UserRepo::ensure_admin(pool, &input)
        .await
        .context("Inserting the admin user")?;
    if created {
        tracing::info!(email = %input.email, "Admin account created");
    } else {
        tracing::info!(email = %input.email, "Admin account already exists");
    }
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
