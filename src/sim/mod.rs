//! Gameplay core
//!
//! All gameplay logic lives here. This module stays free of rendering and
//! platform code:
//! - Randomness comes in through `RandomSource` (seeded in tests)
//! - Presentation is reached only through `RenderSurface` and `PropFactory`
//! - Each tick mutates player, world and run in a fixed order

pub mod aabb;
pub mod chunk;
pub mod collision;
pub mod difficulty;
pub mod generate;
pub mod kinematics;
pub mod random;
pub mod scene;
pub mod state;
pub mod tick;
pub mod world;

pub use aabb::Aabb;
pub use chunk::{Chunk, ChunkCoord, Obstacle, Perk};
pub use collision::{CollisionReport, Resolution};
pub use difficulty::DifficultyCurve;
pub use generate::{ChunkGenerator, GenerationParams, ObstaclePattern};
pub use random::{RandomSource, SeededRandom};
pub use scene::{Animated, ObjectId, Prop, PropFactory, PropKind, RenderSurface, SceneObject};
pub use state::{GameEvent, GamePhase, PerkKind, PlayerState, RunState, TimedEffect};
pub use tick::{Runner, RunnerBuilder, TickInput};
pub use world::{ReconcileReport, World};
