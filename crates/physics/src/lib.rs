//! Physics backend for the flatland engine, backed by rapier2d.
//!
//! # Invariants
//! - The world exclusively owns body lifetime. Callers hold [`BodyHandle`]s,
//!   which are generational arena indices; a handle to a removed body
//!   queries to `None` and never panics.
//! - All positions crossing this boundary are in physics units (meters).
//!   Pixel conversion happens in the caller via `WorldScale`.

pub mod world;

pub use world::{BodyHandle, BodyKind, BoxBodyDef, PhysicsWorld};
