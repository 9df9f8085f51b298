use crate::context::{Drawable, FrameContext};
use flatland_common::EntityId;
use flatland_render::RenderBackend;
use std::collections::BTreeMap;

/// Ordered collection of drawable entities.
///
/// Iteration order follows [`EntityId`] ordering, so per-frame traversal is
/// deterministic for a given set of entities.
#[derive(Default)]
pub struct Scene {
    entries: BTreeMap<EntityId, Box<dyn Drawable>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity, returning its id.
    pub fn insert(&mut self, drawable: Box<dyn Drawable>) -> EntityId {
        let id = EntityId::new();
        self.entries.insert(id, drawable);
        id
    }

    /// Remove an entity without releasing its backend resources; call
    /// `destroy` on it first if it was initialized.
    pub fn remove(&mut self, id: EntityId) -> Option<Box<dyn Drawable>> {
        self.entries.remove(&id)
    }

    pub fn init_all(&mut self, ctx: &mut FrameContext<'_>) {
        for entity in self.entries.values_mut() {
            entity.init(ctx);
        }
    }

    pub fn update_all(&mut self, ctx: &mut FrameContext<'_>) {
        for entity in self.entries.values_mut() {
            entity.update(ctx);
        }
    }

    pub fn draw_all(&self, backend: &mut dyn RenderBackend) {
        for entity in self.entries.values() {
            entity.draw(backend);
        }
    }

    pub fn destroy_all(&mut self, backend: &mut dyn RenderBackend) {
        for entity in self.entries.values_mut() {
            entity.destroy(backend);
        }
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Platform, Player};
    use flatland_assets::TextureStore;
    use flatland_common::{Rect, WorldScale};
    use flatland_physics::PhysicsWorld;
    use flatland_render::RecordingBackend;
    use glam::Vec2;

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
    fn insert_and_remove() {
        let mut scene = Scene::new();
        let id = scene.insert(Box::new(Player::new(Vec2::ZERO, 8.0, 8.0)));
        assert_eq!(scene.len(), 1);
        assert!(scene.remove(id).is_some());
        assert!(scene.is_empty());
        assert!(scene.remove(id).is_none());
    }

    #[test]
    fn lifecycle_touches_every_entity() {
        let mut backend = RecordingBackend::new();
        let mut textures = TextureStore::new();
        let mut physics = PhysicsWorld::default();

        let mut scene = Scene::new();
        scene.insert(Box::new(Player::new(Vec2::new(0.0, 64.0), 32.0, 32.0)));
        scene.insert(Box::new(Platform::new(Rect::new(0.0, 0.0, 640.0, 16.0))));

        let mut ctx = frame_ctx(&mut backend, &mut textures, &mut physics);
        scene.init_all(&mut ctx);
        assert_eq!(physics.body_count(), 2);
        assert_eq!(backend.quad_count(), 2);

        let mut ctx = frame_ctx(&mut backend, &mut textures, &mut physics);
        scene.update_all(&mut ctx);
        scene.draw_all(&mut backend);
        assert_eq!(backend.draw_calls().len(), 2);

        scene.destroy_all(&mut backend);
        assert!(scene.is_empty());
        assert_eq!(backend.quad_count(), 0);
    }
}
