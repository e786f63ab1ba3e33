//! PitchWise event bus and email notification infrastructure.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope published by handlers.
//! - [`delivery`]: the [`Mailer`] abstraction with SMTP and log-only backends.
//! - [`ReviewNotifier`]: background service that emails users about
//!   review decisions, best-effort.

pub mod bus;
pub mod delivery;
pub mod notifier;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailError, LogMailer, Mailer, OutgoingEmail, SmtpMailer};
pub use notifier::ReviewNotifier;
