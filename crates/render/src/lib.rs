//! Backend-agnostic rendering interface for the flatland engine.
//!
//! Entities render through the [`RenderBackend`] trait, never through a GPU
//! API directly. The wgpu implementation lives in `flatland-render-wgpu`;
//! [`RecordingBackend`] here is the GPU-free implementation used by tests
//! and headless runs.
//!
//! # Invariants
//! - A quad is always 4 vertices in triangle-strip order.
//! - Backends own quad slots; callers hold [`QuadId`]s and must destroy
//!   what they create.

pub mod backend;
pub mod transform_stack;
pub mod vertex;

pub use backend::{DrawCall, QuadId, RecordingBackend, RenderBackend};
pub use transform_stack::TransformStack;
pub use vertex::{SpriteVertex, quad_vertices};
