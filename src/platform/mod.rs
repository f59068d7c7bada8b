//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keyboard keys and touch buttons to control intent)
//! - Storage (LocalStorage on web)

pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod storage;

pub use input::{Control, ControlState};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorageStore;
