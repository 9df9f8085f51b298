use crate::vertex::SpriteVertex;
use flatland_assets::{Texture, TextureId};
use glam::Mat4;
use std::collections::BTreeMap;

/// Handle to a backend-owned quad slot (one dynamic vertex buffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuadId(pub u64);

/// The rendering seam entities draw through.
///
/// Backends own all GPU (or recorded) state; callers hold [`QuadId`]s.
/// `draw_quad` issues a 4-vertex triangle-strip draw with the given
/// projection matrix and texture bound.
pub trait RenderBackend {
    /// Allocate a quad slot sized for 4 interleaved vertices.
    fn create_quad(&mut self) -> QuadId;

    /// Re-upload a quad's vertex data (dynamic, once per frame).
    fn upload_quad(&mut self, quad: QuadId, vertices: &[SpriteVertex; 4]);

    /// Draw a quad with the given texture and projection matrix.
    ///
    /// At most one draw per quad per frame: backends that defer encoding
    /// hold a single projection per quad slot, so a second draw of the
    /// same quad in one frame may render with the last projection given.
    fn draw_quad(&mut self, quad: QuadId, texture: &Texture, projection: Mat4);

    /// Release a quad slot. Further calls with this id are ignored.
    fn destroy_quad(&mut self, quad: QuadId);
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub quad: QuadId,
    pub texture: TextureId,
    pub projection: Mat4,
}

/// In-memory backend recording every upload and draw.
///
/// Stands in for the GPU in tests and headless runs: assertions read back
/// exactly what a real backend would have received.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_id: u64,
    uploads: BTreeMap<QuadId, Vec<[SpriteVertex; 4]>>,
    draws: Vec<DrawCall>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// All uploads ever made to a quad, oldest first.
    pub fn uploads(&self, quad: QuadId) -> &[[SpriteVertex; 4]] {
        self.uploads.get(&quad).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The most recent vertex data uploaded to a quad.
    pub fn last_upload(&self, quad: QuadId) -> Option<&[SpriteVertex; 4]> {
        self.uploads.get(&quad).and_then(|v| v.last())
    }

    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draws
    }

    pub fn quad_alive(&self, quad: QuadId) -> bool {
        self.uploads.contains_key(&quad)
    }

    pub fn quad_count(&self) -> usize {
        self.uploads.len()
    }
}

impl RenderBackend for RecordingBackend {
    fn create_quad(&mut self) -> QuadId {
        let id = QuadId(self.next_id);
        self.next_id += 1;
        self.uploads.insert(id, Vec::new());
        id
    }

    fn upload_quad(&mut self, quad: QuadId, vertices: &[SpriteVertex; 4]) {
        if let Some(history) = self.uploads.get_mut(&quad) {
            history.push(*vertices);
        }
    }

    fn draw_quad(&mut self, quad: QuadId, texture: &Texture, projection: Mat4) {
        if self.uploads.contains_key(&quad) {
            self.draws.push(DrawCall {
                quad,
                texture: texture.id,
                projection,
            });
        }
    }

    fn destroy_quad(&mut self, quad: QuadId) {
        self.uploads.remove(&quad);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::quad_vertices;
    use glam::Vec2;

    fn texture() -> Texture {
        Texture::from_rgba(1, 1, vec![255, 255, 255, 255])
    }

    #[test]
    fn create_gives_distinct_ids() {
        let mut backend = RecordingBackend::new();
        let a = backend.create_quad();
        let b = backend.create_quad();
        assert_ne!(a, b);
        assert_eq!(backend.quad_count(), 2);
    }

    #[test]
    fn uploads_are_recorded_in_order() {
        let mut backend = RecordingBackend::new();
        let quad = backend.create_quad();
        let first = quad_vertices(Vec2::ZERO, 1.0, 1.0, 0.0);
        let second = quad_vertices(Vec2::new(5.0, 0.0), 1.0, 1.0, 0.0);
        backend.upload_quad(quad, &first);
        backend.upload_quad(quad, &second);

        assert_eq!(backend.uploads(quad).len(), 2);
        assert_eq!(backend.last_upload(quad), Some(&second));
    }

    #[test]
    fn draw_records_texture_and_projection() {
        let mut backend = RecordingBackend::new();
        let quad = backend.create_quad();
        let tex = texture();
        backend.draw_quad(quad, &tex, Mat4::IDENTITY);

        let calls = backend.draw_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].quad, quad);
        assert_eq!(calls[0].texture, tex.id);
    }

    #[test]
    fn destroyed_quad_ignores_further_calls() {
        let mut backend = RecordingBackend::new();
        let quad = backend.create_quad();
        backend.destroy_quad(quad);
        assert!(!backend.quad_alive(quad));

        backend.upload_quad(quad, &quad_vertices(Vec2::ZERO, 1.0, 1.0, 0.0));
        backend.draw_quad(quad, &texture(), Mat4::IDENTITY);
        assert!(backend.uploads(quad).is_empty());
        assert!(backend.draw_calls().is_empty());
    }
}
