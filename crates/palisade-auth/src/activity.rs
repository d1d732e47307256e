//! Session activity tracking with a debounced inactivity timer.
//!
//! Every qualifying user interaction is reported through
//! [`ActivityTracker::record_activity`], which restarts a single deferred
//! timer. If the timer ever fires, an [`SessionEvent::InactivityTimeout`]
//! is emitted on the tracker's event channel for the controller to act on.

use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Events emitted by background session watchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// No activity was recorded within the inactivity window.
    InactivityTimeout,
}

#[derive(Debug)]
struct ActivityState {
    last_activity: Instant,
    timer: JoinHandle<()>,
}

/// Debounced inactivity watchdog.
///
/// At most one timeout is pending at any moment: each call to
/// [`record_activity`](Self::record_activity) cancels and replaces the
/// previous timer.
#[derive(Debug)]
pub struct ActivityTracker {
    state: Mutex<Option<ActivityState>>,
    window: Duration,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl ActivityTracker {
    /// Create a tracker with the given inactivity window.
    ///
    /// Returns the tracker and the receiving end of its event channel.
    #[must_use]
    pub fn new(window: Duration) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Self {
                state: Mutex::new(None),
                window,
                events,
            },
            receiver,
        )
    }

    /// Record a qualifying user interaction.
    ///
    /// Restarts the inactivity timer. Must be called from within a tokio
    /// runtime.
    pub fn record_activity(&self) {
        let mut state = self.state.lock().expect("activity state lock poisoned");

        if let Some(previous) = state.take() {
            previous.timer.abort();
        }

        let events = self.events.clone();
        let window = self.window;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            debug!("Inactivity window elapsed");
            let _ = events.send(SessionEvent::InactivityTimeout);
        });

        *state = Some(ActivityState {
            last_activity: Instant::now(),
            timer,
        });
    }

    /// Whether activity was recorded within the inactivity window.
    #[must_use]
    pub fn is_active(&self) -> bool {
        let state = self.state.lock().expect("activity state lock poisoned");
        state
            .as_ref()
            .is_some_and(|s| s.last_activity.elapsed() < self.window)
    }

    /// Cancel any pending timeout and reset state (called on logout).
    ///
    /// Cancellation is synchronous: once this returns, no stale timer can
    /// fire against cleared session state.
    pub fn clear(&self) {
        let mut state = self.state.lock().expect("activity state lock poisoned");
        if let Some(previous) = state.take() {
            previous.timer.abort();
        }
    }
}

impl Drop for ActivityTracker {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            if let Some(previous) = state.take() {
                previous.timer.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(1800);

    /// Let spawned timer tasks run after the clock moves.
    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_active_after_recording() {
        let (tracker, _events) = ActivityTracker::new(WINDOW);

        assert!(!tracker.is_active());
        tracker.record_activity();
        assert!(tracker.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_inactive_after_window() {
        let (tracker, _events) = ActivityTracker::new(WINDOW);

        tracker.record_activity();
        tokio::time::advance(WINDOW + Duration::from_secs(1)).await;

        assert!(!tracker.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fires_once_despite_many_recordings() {
        let (tracker, mut events) = ActivityTracker::new(WINDOW);

        for _ in 0..10 {
            tracker.record_activity();
        }

        tokio::time::advance(WINDOW + Duration::from_secs(1)).await;
        settle().await;

        assert_eq!(events.try_recv(), Ok(SessionEvent::InactivityTimeout));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_recording_postpones_timeout() {
        let (tracker, mut events) = ActivityTracker::new(WINDOW);

        tracker.record_activity();
        tokio::time::advance(WINDOW - Duration::from_secs(60)).await;
        settle().await;

        // Still inside the window: a new interaction restarts the timer
        tracker.record_activity();
        tokio::time::advance(WINDOW - Duration::from_secs(60)).await;
        settle().await;
        assert!(events.try_recv().is_err());
        assert!(tracker.is_active());

        tokio::time::advance(Duration::from_secs(61)).await;
        settle().await;
        assert_eq!(events.try_recv(), Ok(SessionEvent::InactivityTimeout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cancels_pending_timeout() {
        let (tracker, mut events) = ActivityTracker::new(WINDOW);

        tracker.record_activity();
        tracker.clear();

        tokio::time::advance(WINDOW + Duration::from_secs(1)).await;
        settle().await;

        assert!(events.try_recv().is_err());
        assert!(!tracker.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_activity_never_times_out() {
        let (tracker, mut events) = ActivityTracker::new(WINDOW);

        for _ in 0..6 {
            tracker.record_activity();
            tokio::time::advance(WINDOW / 2).await;
            settle().await;
        }

        assert!(events.try_recv().is_err());
        assert!(tracker.is_active());
    }
}
