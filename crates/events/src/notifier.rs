//! Review-outcome email notifications.
//!
//! [`ReviewNotifier`] subscribes to the event bus and emails the user a
//! review decision concerns. Delivery is best-effort: failures are logged
//! and never reach the request that triggered the event.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::bus::{
    PlatformEvent, PITCH_APPROVED, PITCH_PERMANENTLY_REJECTED, PITCH_REJECTED,
    PITCH_UPDATE_APPROVED, PITCH_UPDATE_REJECTED, USER_APPROVED, USER_REJECTED,
};
use crate::delivery::email::{Mailer, OutgoingEmail};

/// Sends review decisions to the affected user.
pub struct ReviewNotifier {
    mailer: Arc<dyn Mailer>,
}

impl ReviewNotifier {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Run the notification loop.
    ///
    /// Exits when the channel is closed (i.e. the
    /// [`EventBus`](crate::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.handle(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Review notifier lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, review notifier shutting down");
                    break;
                }
            }
        }
    }

    async fn handle(&self, event: &PlatformEvent) {
        let Some(email) = compose(event) else {
            return;
        };
        if let Err(e) = self.mailer.send(&email).await {
            tracing::warn!(
                error = %e,
                event_type = %event.event_type,
                to = %email.to,
                "Failed to send review notification"
            );
        }
    }
}

/// Build the email for `event`, or `None` if the event has no recipient or
/// is not a review decision.
pub fn compose(event: &PlatformEvent) -> Option<OutgoingEmail> {
    let to = event.recipient_email.clone()?;
    let name = event.recipient_name.as_deref().unwrap_or("there");
    let title = event.payload["pitch_title"].as_str().unwrap_or("your pitch");
    let reason = event.payload["reason"].as_str();

    let (subject, mut body) = match event.event_type.as_str() {
        USER_APPROVED => (
            "Your PitchWise account has been approved".to_string(),
            format!("Hi {name},\n\nYour account has been approved. You now have full access to PitchWise."),
        ),
        USER_REJECTED => (
            "Your PitchWise application".to_string(),
            format!("Hi {name},\n\nWe were unable to approve your account. You may register again with updated details."),
        ),
        PITCH_APPROVED => (
            format!("\"{title}\" is now live"),
            format!("Hi {name},\n\nYour pitch \"{title}\" has been approved and is now visible to investors."),
        ),
        PITCH_REJECTED => {
            let remaining = event.payload["resubmissions_remaining"].as_i64().unwrap_or(0);
            (
                format!("\"{title}\" needs changes"),
                format!(
                    "Hi {name},\n\nYour pitch \"{title}\" was not approved. \
                     You can edit and resubmit it {remaining} more time(s)."
                ),
            )
        }
        PITCH_PERMANENTLY_REJECTED => (
            format!("\"{title}\" has been permanently rejected"),
            format!(
                "Hi {name},\n\nYour pitch \"{title}\" has reached the rejection limit \
                 and can no longer be resubmitted."
            ),
        ),
        PITCH_UPDATE_APPROVED => (
            format!("Changes to \"{title}\" are live"),
            format!("Hi {name},\n\nYour requested changes to \"{title}\" have been approved and published."),
        ),
        PITCH_UPDATE_REJECTED => (
            format!("Changes to \"{title}\" were not approved"),
            format!(
                "Hi {name},\n\nYour requested changes to \"{title}\" were not approved. \
                 The live listing is unchanged."
            ),
        ),
        _ => return None,
    };

    if let Some(reason) = reason {
        body.push_str(&format!("\n\nReason: {reason}"));
    }
    body.push_str("\n\nThe PitchWise team");

    Some(OutgoingEmail { to, subject, body })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::bus::EventBus;
    use crate::delivery::email::EmailError;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _email: &OutgoingEmail) -> Result<(), EmailError> {
            Err(EmailError::Build("relay down".to_string()))
        }
    }

    fn pitch_event(event_type: &str) -> PlatformEvent {
        PlatformEvent::new(event_type)
            .with_source("pitch", 9)
            .with_recipient("founder@example.com", "Ada")
            .with_payload(serde_json::json!({
                "pitch_title": "Clinic OS",
                "reason": "Financials missing",
                "resubmissions_remaining": 2,
            }))
    }

    #[test]
    fn rejected_pitch_email_includes_reason_and_remaining() {
        let email = compose(&pitch_event(PITCH_REJECTED)).unwrap();
        assert_eq!(email.to, "founder@example.com");
        assert!(email.subject.contains("Clinic OS"));
        assert!(email.body.contains("Reason: Financials missing"));
        assert!(email.body.contains("2 more time(s)"));
    }

    #[test]
    fn permanent_rejection_has_its_own_subject() {
        let email = compose(&pitch_event(PITCH_PERMANENTLY_REJECTED)).unwrap();
        assert!(email.subject.contains("permanently rejected"));
    }

    #[test]
    fn approval_without_reason_omits_reason_line() {
        let event = PlatformEvent::new(USER_APPROVED).with_recipient("inv@example.com", "Grace");
        let email = compose(&event).unwrap();
        assert!(email.body.starts_with("Hi Grace,"));
        assert!(!email.body.contains("Reason:"));
    }

    #[test]
    fn event_without_recipient_is_skipped() {
        assert!(compose(&PlatformEvent::new(PITCH_APPROVED)).is_none());
    }

    #[test]
    fn unrelated_event_is_skipped() {
        let event = PlatformEvent::new("system.tick").with_recipient("a@example.com", "A");
        assert!(compose(&event).is_none());
    }

    #[tokio::test]
    async fn notifier_delivers_and_exits_when_bus_dropped() {
        let mailer = Arc::new(RecordingMailer::default());
        let bus = EventBus::default();
        let handle = tokio::spawn(ReviewNotifier::new(mailer.clone()).run(bus.subscribe()));

        bus.publish(pitch_event(PITCH_UPDATE_APPROVED));
        drop(bus);

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("notifier should stop once the bus is dropped")
            .unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].subject.contains("are live"));
    }

    #[tokio::test]
    async fn send_failure_does_not_stop_the_loop() {
        let bus = EventBus::default();
        let handle = tokio::spawn(ReviewNotifier::new(Arc::new(FailingMailer)).run(bus.subscribe()));

        bus.publish(pitch_event(PITCH_APPROVED));
        bus.publish(pitch_event(PITCH_REJECTED));
        drop(bus);

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("notifier should drain and stop")
            .unwrap();
    }
}
