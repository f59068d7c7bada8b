//! Presentation collaborators
//!
//! Procedural prop builders and a render surface that packs the live scene
//! into GPU instance records for the host page's renderer.

pub mod instances;
pub mod props;

pub use instances::{InstanceBuffer, InstanceRaw};
pub use props::ProceduralProps;
