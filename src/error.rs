//! Crate error type

use std::error::Error;
use std::fmt;

/// Errors surfaced by the runner core
#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    /// Chunk generation was asked for with parameters no caller should produce
    InvalidGeneration(String),
    /// A required collaborator was not supplied at startup
    MissingCollaborator(&'static str),
    /// Settings failed validation
    InvalidSettings(String),
    /// The high score store rejected a write
    Storage(String),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GameError::InvalidGeneration(msg) => write!(f, "Invalid generation parameters: {}", msg),
            GameError::MissingCollaborator(name) => write!(f, "Missing collaborator: {}", name),
            GameError::InvalidSettings(msg) => write!(f, "Invalid settings: {}", msg),
            GameError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl Error for GameError {}

pub type Result<T> = std::result::Result<T, GameError>;
