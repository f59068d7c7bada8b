//! High score tracking
//!
//! Read once at startup, written through to the store every time the best
//! score goes up. The in-memory value is authoritative: a failed write is
//! logged and the game carries on.

use crate::persistence::HighScoreStore;

/// Best score seen across every run in this process
pub struct HighScore {
    best: u64,
    store: Box<dyn HighScoreStore>,
}

impl HighScore {
    /// Load the persisted value; an unreadable store starts from zero
    pub fn load(store: Box<dyn HighScoreStore>) -> Self {
        let best = match store.high_score() {
            Ok(score) => {
                log::info!("Loaded high score {}", score);
                score
            }
            Err(e) => {
                log::warn!("High score unavailable ({}), starting fresh", e);
                0
            }
        };
        Self { best, store }
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    /// Record a score; returns true when it set a new high
    pub fn observe(&mut self, score: u64) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        if let Err(e) = self.store.set_high_score(score) {
            log::warn!("Failed to persist high score {}: {}", score, e);
        }
        true
    }
}

impl std::fmt::Debug for HighScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighScore").field("best", &self.best).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GameError, Result};
    use crate::persistence::MemoryStore;
    use proptest::prelude::*;

    struct BrokenStore;

    impl HighScoreStore for BrokenStore {
        fn high_score(&self) -> Result<u64> {
            Err(GameError::Storage("unavailable".into()))
        }

        fn set_high_score(&mut self, _score: u64) -> Result<()> {
            Err(GameError::Storage("quota exceeded".into()))
        }
    }

    #[test]
    fn test_loads_persisted_value() {
        let store = MemoryStore::with_value(1234);
        let tracker = HighScore::load(Box::new(store));
        assert_eq!(tracker.best(), 1234);
    }

    #[test]
    fn test_writes_only_on_increase() {
        let handle = MemoryStore::with_value(100);
        let mut tracker = HighScore::load(Box::new(handle.clone()));
        assert!(!tracker.observe(50));
        assert!(!tracker.observe(100));
        assert_eq!(handle.writes(), 0);
        assert!(tracker.observe(101));
        assert!(tracker.observe(150));
        assert_eq!(handle.value(), 150);
        assert_eq!(handle.writes(), 2);
    }

    #[test]
    fn test_broken_store_is_not_fatal() {
        let mut tracker = HighScore::load(Box::new(BrokenStore));
        assert_eq!(tracker.best(), 0);
        assert!(tracker.observe(10));
        assert_eq!(tracker.best(), 10);
    }

    proptest! {
        #[test]
        fn prop_high_score_is_running_max(
            initial in 0u64..1000,
            runs in prop::collection::vec(prop::collection::vec(0u64..5000, 0..20), 1..5),
        ) {
            let handle = MemoryStore::with_value(initial);
            let mut tracker = HighScore::load(Box::new(handle.clone()));
            let mut expected = initial;
            let mut last_persisted = handle.value();
            for run in runs {
                for score in run {
                    tracker.observe(score);
                    expected = expected.max(score);
                    prop_assert!(handle.value() >= last_persisted);
                    last_persisted = handle.value();
                }
            }
            prop_assert_eq!(tracker.best(), expected);
            prop_assert_eq!(handle.value(), expected);
        }
    }
}
