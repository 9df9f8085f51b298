//! Game entities for the flatland engine.
//!
//! Each entity is a textured quad glued to a rigid body. The entity's
//! pixel-space position is a derived, cached copy of the body's physics
//! position, refreshed exactly once per `update` call; the physics world
//! stays authoritative.
//!
//! Frame order is `update` then `draw`, single-threaded, once per frame.
//!
//! # Invariants
//! - Entities never mutate the physics world outside `init`.
//! - `draw` is read-only on entity state.
//! - Bodies are owned by the world, textures by the store; entities own
//!   only their quad slot and release it in `destroy`.

pub mod context;
pub mod platform;
pub mod player;
pub mod scene;

pub use context::{Drawable, FrameContext};
pub use platform::Platform;
pub use player::Player;
pub use scene::Scene;
