use crate::context::{Drawable, FrameContext};
use flatland_assets::Texture;
use flatland_common::Rect;
use flatland_physics::{BodyHandle, BodyKind, BoxBodyDef};
use flatland_render::{QuadId, RenderBackend, TransformStack, quad_vertices};
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;

/// Default sprite asset for the player.
pub const PLAYER_SPRITE: &str = "assets/player.png";

/// The player entity: a textured quad glued to a dynamic rigid body.
///
/// Position, width and height are in pixel space. The position is a cached
/// copy of the body's physics position and is refreshed once per
/// [`Player::update`]; it is never fed back into the simulation.
pub struct Player {
    pos: Vec2,
    width: f32,
    height: f32,
    standing: bool,
    running: bool,
    draw_depth: f32,
    sprite_path: PathBuf,
    texture: Option<Arc<Texture>>,
    body: Option<BodyHandle>,
    quad: Option<QuadId>,
    transform_stack: TransformStack,
}

impl Player {
    /// Pure value construction; no resources are touched until `init`.
    pub fn new(pos: Vec2, width: f32, height: f32) -> Self {
        Self {
            pos,
            width,
            height,
            standing: false,
            running: false,
            draw_depth: 0.0,
            sprite_path: PathBuf::from(PLAYER_SPRITE),
            texture: None,
            body: None,
            quad: None,
            transform_stack: TransformStack::new(),
        }
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.origin(), rect.w, rect.h)
    }

    /// Override the sprite asset resolved during `init`.
    pub fn with_sprite(mut self, path: impl Into<PathBuf>) -> Self {
        self.sprite_path = path.into();
        self
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = width;
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn set_height(&mut self, height: f32) {
        self.height = height;
    }

    pub fn draw_depth(&self) -> f32 {
        self.draw_depth
    }

    pub fn set_draw_depth(&mut self, depth: f32) {
        self.draw_depth = depth;
    }

    pub fn standing(&self) -> bool {
        self.standing
    }

    pub fn set_standing(&mut self, standing: bool) {
        self.standing = standing;
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Non-owning handle to this entity's body, once initialized.
    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub fn texture(&self) -> Option<&Arc<Texture>> {
        self.texture.as_ref()
    }

    /// Swap the texture. With `change_dims` the entity adopts the
    /// texture's pixel dimensions; otherwise size is left alone.
    pub fn set_texture(&mut self, texture: Arc<Texture>, change_dims: bool) {
        if change_dims {
            self.width = texture.width as f32;
            self.height = texture.height as f32;
        }
        self.texture = Some(texture);
    }

    pub fn transform_stack(&self) -> &TransformStack {
        &self.transform_stack
    }

    pub fn transform_stack_mut(&mut self) -> &mut TransformStack {
        &mut self.transform_stack
    }

    pub fn set_transform_stack(&mut self, stack: TransformStack) {
        self.transform_stack = stack;
    }

    fn upload_vertices(&self, ctx: &mut FrameContext<'_>) {
        if let Some(quad) = self.quad {
            let vertices = quad_vertices(self.pos, self.width, self.height, self.draw_depth);
            ctx.backend.upload_quad(quad, &vertices);
        }
    }
}

impl Drawable for Player {
    fn init(&mut self, ctx: &mut FrameContext<'_>) {
        self.quad = Some(ctx.backend.create_quad());
        self.upload_vertices(ctx);

        // Missing sprite degrades to the placeholder inside the store.
        self.texture = Some(ctx.textures.load_or_placeholder(&self.sprite_path));

        let scale = ctx.scale;
        let def = BoxBodyDef {
            position: scale.to_physics(self.pos),
            half_extents: Vec2::new(
                scale.scalar_to_physics(self.width) / 2.0,
                scale.scalar_to_physics(self.height) / 2.0,
            ),
            kind: BodyKind::Dynamic,
            fixed_rotation: true,
            density: 1.0,
            friction: 0.3,
            restitution: 0.0,
        };
        self.body = Some(ctx.physics.spawn_box(&def));

        tracing::info!(x = self.pos.x, y = self.pos.y, "player initialized");
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        // The upload reads the position cached by the previous refresh,
        // so the rendered quad trails the simulation by one step.
        self.upload_vertices(ctx);

        if let Some(body) = self.body {
            if let Some(physics_pos) = ctx.physics.body_position(body) {
                self.pos = ctx.scale.to_pixels(physics_pos);
            }
        }
    }

    fn draw(&self, backend: &mut dyn RenderBackend) {
        let (Some(quad), Some(texture)) = (self.quad, self.texture.as_ref()) else {
            tracing::debug!("draw on uninitialized player skipped");
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
