//! wgpu render backend for the flatland engine.
//!
//! Implements [`flatland_render::RenderBackend`] with one triangle-strip
//! pipeline and a dynamic vertex buffer per quad slot. Runs headless:
//! device acquisition takes no window surface, so the same backend serves
//! offscreen targets and tests on machines with an adapter.
//!
//! # Invariants
//! - The backend never mutates entity state; it only receives uploads.
//! - A bad shader override degrades to the builtin WGSL, never a panic.

mod context;
mod gpu;
mod shaders;

pub use context::{ContextError, GpuContext};
pub use gpu::QuadRenderer;
pub use shaders::{SPRITE_SHADER, load_shader_source};
