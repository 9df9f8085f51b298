//! Shared types for the flatland engine.
//!
//! # Invariants
//! - Rendering operates in pixel space, simulation in physics space.
//! - The two are related by a single uniform scale ([`WorldScale`]),
//!   owned by the application root and passed down by value.

pub mod types;
pub mod units;

pub use types::{EntityId, Rect};
pub use units::WorldScale;
