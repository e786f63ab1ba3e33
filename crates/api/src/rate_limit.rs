//! Per-email rate limiting for verification sends.
//!
//! Backed by a keyed `governor` GCRA limiter: each address gets a burst of
//! `max` sends and one cell back per `window`, so any span shorter than
//! `window` holds at most `max` sends. State is in-process and resets on
//! restart.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};

type KeyedLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Limits how often a verification code can be sent to one email address.
pub struct VerificationLimiter {
    limiter: KeyedLimiter,
}

impl VerificationLimiter {
    /// Allow `max` sends per `window` for each key.
    ///
    /// A zero `max` is treated as one. The window never drops below 1ms.
    pub fn new(max: u32, window: Duration) -> Self {
        let burst = NonZeroU32::new(max).unwrap_or(NonZeroU32::MIN);
        let period = window.max(Duration::from_millis(1));
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
            .allow_burst(burst);

        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    /// Record a send to `key`. Returns `false` if the key is over its limit.
    pub fn check(&self, key: &str) -> bool {
        self.limiter.check_key(&key.to_string()).is_ok()
    }

    /// Drop keys whose limit has fully replenished.
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.limiter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limiter.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_max_then_rejects() {
        let limiter = VerificationLimiter::new(3, Duration::from_secs(600));
        assert!(limiter.check("a@example.com"));
        assert!(limiter.check("a@example.com"));
        assert!(limiter.check("a@example.com"));
        assert!(!limiter.check("a@example.com"), "fourth send inside the window");
    }

    #[test]
    fn spaced_sends_stay_within_one_window() {
        let window = Duration::from_millis(300);
        let limiter = VerificationLimiter::new(3, window);
        let start = std::time::Instant::now();
        let mut allowed = 0;
        while start.elapsed() < Duration::from_millis(250) {
            if limiter.check("a@example.com") {
                allowed += 1;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(allowed, 3, "sends admitted inside one {window:?} window");
    }

    #[test]
    fn keys_are_limited_independently() {
        let limiter = VerificationLimiter::new(1, Duration::from_secs(600));
        assert!(limiter.check("a@example.com"));
        assert!(!limiter.check("a@example.com"));
        assert!(limiter.check("b@example.com"));
        assert_eq!(limiter.len(), 2);
    }

    #[test]
    fn replenishes_after_window() {
        let limiter = VerificationLimiter::new(1, Duration::from_millis(50));
        assert!(limiter.check("a@example.com"));
        assert!(!limiter.check("a@example.com"));
        std::thread::sleep(Duration::from_millis(120));
        assert!(limiter.check("a@example.com"));
    }

    #[test]
    fn retain_recent_drops_replenished_keys() {
        let limiter = VerificationLimiter::new(1, Duration::from_millis(20));
        assert!(limiter.check("a@example.com"));
        std::thread::sleep(Duration::from_millis(80));
        limiter.retain_recent();
        assert!(limiter.is_empty());
    }

    #[test]
    fn zero_max_still_allows_one() {
        let limiter = VerificationLimiter::new(0, Duration::from_secs(60));
        assert!(limiter.check("a@example.com"));
        assert!(!limiter.check("a@example.com"));
    }
}
