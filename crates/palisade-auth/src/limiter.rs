//! Login attempt limiter with time-windowed lockout.
//!
//! Tracks attempts per normalized identifier. The window opens at the first
//! attempt and lasts the lockout duration; at the threshold the identifier
//! is rejected without further counting until the window elapses, at which
//! point the record resets rather than decaying continuously.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Per-identifier attempt bookkeeping.
#[derive(Debug, Clone, Copy)]
struct AttemptRecord {
    count: u32,
    window_started: Instant,
}

/// Sliding-window-by-reset login throttle.
///
/// All checks for one identifier serialize against the same record, so
/// concurrent attempts cannot lose updates.
#[derive(Debug)]
pub struct LoginAttemptLimiter {
    attempts: Mutex<HashMap<String, AttemptRecord>>,
    max_attempts: u32,
    lockout: Duration,
}

impl LoginAttemptLimiter {
    /// Create a limiter allowing `max_attempts` per `lockout` window.
    #[must_use]
    pub fn new(max_attempts: u32, lockout: Duration) -> Self {
        Self {
            attempts: Mutex::new(HashMap::new()),
            max_attempts,
            lockout,
        }
    }

    /// Whether `identifier` may attempt a login now.
    ///
    /// Returns true and records the attempt while under the threshold, or
    /// when the window has elapsed (the record then resets to count 1).
    /// Returns false without counting while locked out.
    pub fn can_attempt(&self, identifier: &str) -> bool {
        let key = normalize(identifier);
        let mut attempts = self.attempts.lock().expect("attempts lock poisoned");

        match attempts.get_mut(&key) {
            None => {
                attempts.insert(
                    key,
                    AttemptRecord {
                        count: 1,
                        window_started: Instant::now(),
                    },
                );
                true
            }
            Some(record) => {
                if record.window_started.elapsed() >= self.lockout {
                    debug!("Attempt window elapsed, resetting counter");
                    record.count = 1;
                    record.window_started = Instant::now();
                    true
                } else if record.count >= self.max_attempts {
                    warn!("Login attempt rejected, identifier is locked out");
                    false
                } else {
                    record.count += 1;
                    true
                }
            }
        }
    }

    /// Time left before a locked-out identifier may attempt again.
    ///
    /// `None` when the identifier is not currently locked out.
    #[must_use]
    pub fn remaining_lockout(&self, identifier: &str) -> Option<Duration> {
        let key = normalize(identifier);
        let attempts = self.attempts.lock().expect("attempts lock poisoned");

        let record = attempts.get(&key)?;
        if record.count >= self.max_attempts {
            self.lockout.checked_sub(record.window_started.elapsed())
        } else {
            None
        }
    }

    /// Clear the record for `identifier` (called on successful login).
    pub fn reset(&self, identifier: &str) {
        let key = normalize(identifier);
        self.attempts
            .lock()
            .expect("attempts lock poisoned")
            .remove(&key);
    }
}

/// Identifiers are matched case-insensitively and ignoring surrounding
/// whitespace, so throttling cannot be dodged by re-casing an email.
fn normalize(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}
