//! High score persistence
//!
//! The game keeps exactly one persisted value across runs: the best score.
//! Stores are plain get/set; tracking and write policy live in
//! `crate::highscores`.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::Result;

/// Key-value store for the persisted high score
pub trait HighScoreStore {
    /// Stored best score; a missing value reads as 0
    fn high_score(&self) -> Result<u64>;

    fn set_high_score(&mut self, score: u64) -> Result<()>;
}

/// Process-local store (native builds and tests)
///
/// Clones share the same cell, so a test can keep a handle and inspect what
/// the game wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Rc<Cell<u64>>,
    writes: Rc<Cell<u32>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(score: u64) -> Self {
        let store = Self::default();
        store.value.set(score);
        store
    }

    pub fn value(&self) -> u64 {
        self.value.get()
    }

    /// Number of `set_high_score` calls seen so far
    pub fn writes(&self) -> u32 {
        self.writes.get()
    }
}

impl HighScoreStore for MemoryStore {
    fn high_score(&self) -> Result<u64> {
        Ok(self.value.get())
    }

    fn set_high_score(&mut self, score: u64) -> Result<()> {
        self.value.set(score);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_clones_share_value() {
        let handle = MemoryStore::with_value(12);
        let mut store = handle.clone();
        assert_eq!(store.high_score().unwrap(), 12);
        store.set_high_score(40).unwrap();
        assert_eq!(handle.value(), 40);
        assert_eq!(handle.writes(), 1);
    }
}
