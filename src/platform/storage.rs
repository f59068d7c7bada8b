//! LocalStorage-backed high score

use crate::error::{GameError, Result};
use crate::persistence::HighScoreStore;

/// Stores the best score as a decimal string under a fixed key
#[derive(Debug)]
pub struct LocalStorageStore {
    storage: web_sys::Storage,
}

impl LocalStorageStore {
    pub const KEY: &'static str = "forestRunnerHighScore";

    /// Fails when the page has no LocalStorage (private mode, sandboxed frame)
    pub fn open() -> Result<Self> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(GameError::MissingCollaborator("localStorage"))?;
        Ok(Self { storage })
    }
}

impl HighScoreStore for LocalStorageStore {
    fn high_score(&self) -> Result<u64> {
        let raw = self
            .storage
            .get_item(Self::KEY)
            .map_err(|e| GameError::Storage(format!("{:?}", e)))?;
        // Unparsable values read as zero
        Ok(raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0))
    }

    fn set_high_score(&mut self, score: u64) -> Result<()> {
        self.storage
            .set_item(Self::KEY, &score.to_string())
            .map_err(|e| GameError::Storage(format!("{:?}", e)))
    }
}
