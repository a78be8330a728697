// Rate budget tracking.
// Records the provider-reported remaining call budget; purely observational,
// never blocks a call. The snapshot survives sessions through the same
// durable medium as the response cache.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::KvMedium;

/// Singleton key in the shared medium.
const STATE_KEY: &str = "rate_limit";

/// Remaining calls at or below which callers should surface a warning.
pub const LOW_REMAINING_THRESHOLD: u32 = 5;

/// Last provider-reported budget. Never decremented locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitState {
    pub remaining: u32,
    /// Reset time in epoch milliseconds.
    pub reset_at_ms: i64,
    pub total: u32,
}

impl RateLimitState {
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.reset_at_ms)
    }

    /// Whether the budget is close to exhaustion.
    pub fn is_low(&self) -> bool {
        self.remaining <= LOW_REMAINING_THRESHOLD
    }
}

/// Tracks the provider's last-known budget, persisted across sessions.
pub struct RateLimitTracker {
    medium: Arc<dyn KvMedium>,
    state: Mutex<Option<RateLimitState>>,
}

impl RateLimitTracker {
    /// Create a tracker, loading any snapshot persisted by a prior session.
    pub fn new(medium: Arc<dyn KvMedium>) -> Self {
        let state = load(medium.as_ref());
        Self {
            medium,
            state: Mutex::new(state),
        }
    }

    /// Overwrite the snapshot from a complete response header triple.
    /// Callers must only invoke this when all three headers were present;
    /// partial header sets leave prior state untouched by never reaching
    /// this method.
    pub fn update(&self, remaining: u32, reset_epoch_secs: i64, total: u32) {
        let next = RateLimitState {
            remaining,
            reset_at_ms: reset_epoch_secs * 1000,
            total,
        };

        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            *state = Some(next);
        }

        match serde_json::to_string(&next) {
            Ok(raw) => {
                if let Err(e) = self.medium.put(STATE_KEY, &raw) {
                    warn!(error = %e, "failed to persist rate limit state");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize rate limit state"),
        }
    }

    /// Last-known budget, if any response has ever reported one.
    pub fn read(&self) -> Option<RateLimitState> {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load(medium: &dyn KvMedium) -> Option<RateLimitState> {
    match medium.get(STATE_KEY) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(error = %e, "discarding corrupt rate limit snapshot");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "failed to load rate limit snapshot");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryMedium;

    #[test]
    fn test_starts_absent() {
        let tracker = RateLimitTracker::new(Arc::new(MemoryMedium::new()));
        assert_eq!(tracker.read(), None);
    }

    #[test]
    fn test_update_overwrites_and_converts_reset_to_ms() {
        let tracker = RateLimitTracker::new(Arc::new(MemoryMedium::new()));
        tracker.update(42, 1_700_000_000, 5000);

        let state = tracker.read().unwrap();
        assert_eq!(state.remaining, 42);
        assert_eq!(state.reset_at_ms, 1_700_000_000_000);
        assert_eq!(state.total, 5000);

        tracker.update(41, 1_700_000_000, 5000);
        assert_eq!(tracker.read().unwrap().remaining, 41);
    }

    #[test]
    fn test_snapshot_survives_sessions() {
        let medium = Arc::new(MemoryMedium::new());

        let first = RateLimitTracker::new(medium.clone());
        first.update(10, 1_700_000_000, 60);
        drop(first);

        let second = RateLimitTracker::new(medium);
        assert_eq!(second.read().unwrap().remaining, 10);
    }

    #[test]
    fn test_corrupt_snapshot_ignored() {
        let medium = Arc::new(MemoryMedium::new());
        medium.put(STATE_KEY, "garbage").unwrap();

        let tracker = RateLimitTracker::new(medium);
        assert_eq!(tracker.read(), None);
    }

    #[test]
    fn test_low_budget_threshold() {
        let state = RateLimitState {
            remaining: 5,
            reset_at_ms: 0,
            total: 60,
        };
        assert!(state.is_low());

        let state = RateLimitState { remaining: 6, ..state };
        assert!(!state.is_low());
    }
}
