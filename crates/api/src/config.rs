use pitchwise_core::verification::DEFAULT_CODE_TTL_MINS;

use crate::auth::jwt::JwtConfig;

/// Default minimum password length for signups.
const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;
/// Default verification emails allowed per address per window.
const DEFAULT_VERIFICATION_RATE_LIMIT: u32 = 3;
/// Default verification rate-limit window in seconds (10 minutes).
const DEFAULT_VERIFICATION_RATE_WINDOW_SECS: u64 = 600;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Session token configuration (secret, lifetime).
    pub jwt: JwtConfig,
    /// Mark the session cookie `Secure` (default: `false`).
    pub cookie_secure: bool,
    /// Minimum accepted password length (default: `8`).
    pub min_password_length: usize,
    /// Email verification code lifetime and send rate limit.
    pub verification: VerificationConfig,
    /// Admin account to create at startup, if configured.
    pub admin_bootstrap: Option<AdminBootstrap>,
}

/// Email verification settings.
#[derive(Debug, Clone)]
pub struct VerificationConfig {
    /// Minutes a code stays valid.
    pub code_ttl_mins: i64,
    /// Sends allowed per email address within `rate_window_secs`.
    pub rate_limit: u32,
    pub rate_window_secs: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_ttl_mins: DEFAULT_CODE_TTL_MINS,
            rate_limit: DEFAULT_VERIFICATION_RATE_LIMIT,
            rate_window_secs: DEFAULT_VERIFICATION_RATE_WINDOW_SECS,
        }
    }
}

/// Credentials for the admin account seeded at startup.
#[derive(Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                    |
    /// |---------------------------------|----------------------------|
    /// | `HOST`                          | `0.0.0.0`                  |
    /// | `PORT`                          | `3000`                     |
    /// | `CORS_ORIGINS`                  | `http://localhost:3001`    |
    /// | `REQUEST_TIMEOUT_SECS`          | `30`                       |
    /// | `COOKIE_SECURE`                 | `false`                    |
    /// | `MIN_PASSWORD_LENGTH`           | `8`                        |
    /// | `VERIFICATION_CODE_TTL_MINS`    | `10`                       |
    /// | `VERIFICATION_RATE_LIMIT`       | `3`                        |
    /// | `VERIFICATION_RATE_WINDOW_SECS` | `600`                      |
    /// | `ADMIN_EMAIL`, `ADMIN_PASSWORD` | unset (no bootstrap)       |
    ///
    /// See [`JwtConfig::from_env`] for the session token variables.
    ///
    /// # Panics
    ///
    /// Panics on unparseable values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3001".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let cookie_secure: bool = std::env::var("COOKIE_SECURE")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("COOKIE_SECURE must be true or false");

        let min_password_length: usize = std::env::var("MIN_PASSWORD_LENGTH")
            .unwrap_or_else(|_| DEFAULT_MIN_PASSWORD_LENGTH.to_string())
            .parse()
            .expect("MIN_PASSWORD_LENGTH must be a valid usize");

        let verification = VerificationConfig {
            code_ttl_mins: std::env::var("VERIFICATION_CODE_TTL_MINS")
                .unwrap_or_else(|_| DEFAULT_CODE_TTL_MINS.to_string())
                .parse()
                .expect("VERIFICATION_CODE_TTL_MINS must be a valid i64"),
            rate_limit: std::env::var("VERIFICATION_RATE_LIMIT")
                .unwrap_or_else(|_| DEFAULT_VERIFICATION_RATE_LIMIT.to_string())
                .parse()
                .expect("VERIFICATION_RATE_LIMIT must be a valid u32"),
            rate_window_secs: std::env::var("VERIFICATION_RATE_WINDOW_SECS")
                .unwrap_or_else(|_| DEFAULT_VERIFICATION_RATE_WINDOW_SECS.to_string())
                .parse()
                .expect("VERIFICATION_RATE_WINDOW_SECS must be a valid u64"),
        };
        assert!(
            verification.rate_limit > 0 && verification.rate_window_secs > 0,
            "VERIFICATION_RATE_LIMIT and VERIFICATION_RATE_WINDOW_SECS must be positive"
        );

        let admin_bootstrap = match (
            std::env::var("ADMIN_EMAIL").ok().filter(|s| !s.is_empty()),
            std::env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty()),
        ) {
            (Some(email), Some(password)) => Some(AdminBootstrap { email, password }),
            _ => None,
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            cookie_secure,
            min_password_length,
            verification,
            admin_bootstrap,
        }
    }
}
