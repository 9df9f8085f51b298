use flatland_assets::TextureStore;
use flatland_common::WorldScale;
use flatland_physics::PhysicsWorld;
use flatland_render::RenderBackend;

/// The collaborators an entity touches during `init` and `update`.
///
/// Owned by the application root and reassembled each frame; entities
/// never hold onto any of these between calls.
pub struct FrameContext<'a> {
    pub backend: &'a mut dyn RenderBackend,
    pub textures: &'a mut TextureStore,
    pub physics: &'a mut PhysicsWorld,
    pub scale: WorldScale,
}

/// Per-frame entity lifecycle.
///
/// `init` once, then `update` and `draw` once per frame in that order.
pub trait Drawable {
    /// One-time resource allocation: quad slot, texture, physics body.
    fn init(&mut self, ctx: &mut FrameContext<'_>);

    /// Per-frame synchronization between render and physics state.
    fn update(&mut self, ctx: &mut FrameContext<'_>);

    /// Issue this entity's draw. Must not mutate entity state.
    fn draw(&self, backend: &mut dyn RenderBackend);

    /// Release backend resources. Body removal stays with the world.
    fn destroy(&mut self, backend: &mut dyn RenderBackend);
}
