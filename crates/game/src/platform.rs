use crate::context::{Drawable, FrameContext};
use flatland_assets::Texture;
use flatland_common::Rect;
use flatland_physics::{BodyHandle, BodyKind, BoxBodyDef};
use flatland_render::{QuadId, RenderBackend, TransformStack, quad_vertices};
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;

/// Default tile asset for platforms.
pub const PLATFORM_SPRITE: &str = "assets/platform.png";

/// Static level geometry: a textured quad backed by a fixed body.
///
/// Unlike [`crate::Player`], the position is set once at construction and
/// never refreshed from physics; fixed bodies do not move.
pub struct Platform {
    rect: Rect,
    draw_depth: f32,
    sprite_path: PathBuf,
    texture: Option<Arc<Texture>>,
    body: Option<BodyHandle>,
    quad: Option<QuadId>,
    transform_stack: TransformStack,
}

impl Platform {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            draw_depth: 0.0,
            sprite_path: PathBuf::from(PLATFORM_SPRITE),
            texture: None,
            body: None,
            quad: None,
            transform_stack: TransformStack::new(),
        }
    }

    pub fn with_sprite(mut self, path: impl Into<PathBuf>) -> Self {
        self.sprite_path = path.into();
        self
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn draw_depth(&self) -> f32 {
        self.draw_depth
    }

    pub fn set_draw_depth(&mut self, depth: f32) {
        self.draw_depth = depth;
    }

    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub fn set_transform_stack(&mut self, stack: TransformStack) {
        self.transform_stack = stack;
    }
}

impl Drawable for Platform {
    fn init(&mut self, ctx: &mut FrameContext<'_>) {
        let quad = ctx.backend.create_quad();
        let vertices = quad_vertices(self.rect.origin(), self.rect.w, self.rect.h, self.draw_depth);
        ctx.backend.upload_quad(quad, &vertices);
        self.quad = Some(quad);

        self.texture = Some(ctx.textures.load_or_placeholder(&self.sprite_path));

        let scale = ctx.scale;
        let def = BoxBodyDef {
            position: scale.to_physics(self.rect.origin()),
            half_extents: Vec2::new(
                scale.scalar_to_physics(self.rect.w) / 2.0,
                scale.scalar_to_physics(self.rect.h) / 2.0,
            ),
            kind: BodyKind::Fixed,
            ..BoxBodyDef::default()
        };
        self.body = Some(ctx.physics.spawn_box(&def));
    }

    fn update(&mut self, _ctx: &mut FrameContext<'_>) {
        // Geometry is static; the initial upload stays valid.
    }

    fn draw(&self, backend: &mut dyn RenderBackend) {
        let (Some(quad), Some(texture)) = (self.quad, self.texture.as_ref()) else {
            tracing::debug!("draw on uninitialized platform skipped");
            return;
        };
        backend.draw_quad(quad, texture, self.transform_stack.flatten());
    }

    fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(quad) = self.quad.take() {
            backend.destroy_quad(quad);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatland_assets::TextureStore;
    use flatland_common::WorldScale;
    use flatland_physics::PhysicsWorld;
    use flatland_render::RecordingBackend;
    use glam::Mat4;

    fn frame_ctx<'a>(
        backend: &'a mut RecordingBackend,
        textures: &'a mut TextureStore,
        physics: &'a mut PhysicsWorld,
    ) -> FrameContext<'a> {
        FrameContext {
            backend,
            textures,
            physics,
            scale: WorldScale::default(),
        }
    }

    #[test]
    fn init_spawns_fixed_body_and_uploads_once() {
        let mut backend = RecordingBackend::new();
        let mut textures = TextureStore::new();
        let mut physics = PhysicsWorld::default();
        let mut ctx = frame_ctx(&mut backend, &mut textures, &mut physics);

        let mut platform = Platform::new(Rect::new(0.0, 100.0, 640.0, 16.0));
        platform.init(&mut ctx);

        let body = platform.body().unwrap();
        let scale = WorldScale::default();
        let pos = physics.body_position(body).unwrap();
        assert!((pos - scale.to_physics(Vec2::new(0.0, 100.0))).length() < 1e-5);

        // Fixed body: gravity does not move it.
        for _ in 0..60 {
            physics.step(1.0 / 60.0);
        }
        let after = physics.body_position(body).unwrap();
        assert!((pos - after).length() < 1e-6);

        let quad = QuadId(0);
        assert_eq!(backend.uploads(quad).len(), 1);
    }

    #[test]
    fn update_does_not_reupload() {
        let mut backend = RecordingBackend::new();
        let mut textures = TextureStore::new();
        let mut physics = PhysicsWorld::default();
        let mut ctx = frame_ctx(&mut backend, &mut textures, &mut physics);

        let mut platform = Platform::new(Rect::new(0.0, 0.0, 64.0, 16.0));
        platform.init(&mut ctx);

        let mut ctx = frame_ctx(&mut backend, &mut textures, &mut physics);
        platform.update(&mut ctx);
        platform.update(&mut ctx);

        assert_eq!(backend.uploads(QuadId(0)).len(), 1);
    }

    #[test]
    fn draw_after_init_records_call() {
        let mut backend = RecordingBackend::new();
        let mut textures = TextureStore::new();
        let mut physics = PhysicsWorld::default();
        let mut ctx = frame_ctx(&mut backend, &mut textures, &mut physics);

        let mut platform = Platform::new(Rect::new(0.0, 0.0, 64.0, 16.0));
        platform.init(&mut ctx);
        platform.set_transform_stack(TransformStack::with_root(Mat4::IDENTITY));
        platform.draw(&mut backend);

        assert_eq!(backend.draw_calls().len(), 1);
    }

    #[test]
    fn draw_before_init_is_skipped() {
        let mut backend = RecordingBackend::new();
        let platform = Platform::new(Rect::new(0.0, 0.0, 64.0, 16.0));
        platform.draw(&mut backend);
        assert!(backend.draw_calls().is_empty());
    }
}
