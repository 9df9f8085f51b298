//! Texture cache for the flatland engine.
//!
//! Textures are shared, externally-cached resources: entities hold
//! `Arc<Texture>` references, the store owns the cache. Ids are
//! content-addressed hashes of the decoded pixels, so the same image
//! loaded from two paths resolves to one texture.
//!
//! Load failure is non-fatal by design: [`TextureStore::load_or_placeholder`]
//! logs a warning and substitutes a built-in checkerboard so the frame loop
//! keeps running with a visibly degraded sprite instead of an unbound one.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Content-addressed texture ID computed from the decoded pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// A decoded RGBA8 image, CPU-side.
///
/// GPU backends upload this on first use and cache by [`TextureId`].
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Texture {
    /// Build a texture from raw RGBA8 pixels, computing its content id.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        // Widened so the expected length cannot overflow for huge images.
        debug_assert_eq!(rgba.len() as u64, width as u64 * height as u64 * 4);
        let id = content_id(width, height, &rgba);
        Self {
            id,
            width,
            height,
            rgba,
        }
    }
}

/// Errors from texture loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decode error: {0}")]
    Decode(#[from] image::ImageError),
}

/// Path-keyed cache of shared textures.
///
/// The store is the only owner of cached entries; everything else holds
/// `Arc` clones and never outlives the cache's interest in the data.
pub struct TextureStore {
    by_path: BTreeMap<PathBuf, Arc<Texture>>,
    by_id: BTreeMap<TextureId, Arc<Texture>>,
    placeholder: Arc<Texture>,
}

impl Default for TextureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureStore {
    pub fn new() -> Self {
        Self {
            by_path: BTreeMap::new(),
            by_id: BTreeMap::new(),
            placeholder: Arc::new(checkerboard()),
        }
    }

    /// Load and cache a texture, deduplicating by content id.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<Arc<Texture>, AssetError> {
        let path = path.as_ref();
        if let Some(texture) = self.by_path.get(path) {
            return Ok(texture.clone());
        }

        let decoded = image::open(path)?.to_rgba8();
        let (width, height) = decoded.dimensions();
        let texture = Texture::from_rgba(width, height, decoded.into_raw());

        // Same pixels under a different path: reuse the cached allocation.
        let shared = self
            .by_id
            .entry(texture.id)
            .or_insert_with(|| Arc::new(texture))
            .clone();
        self.by_path.insert(path.to_path_buf(), shared.clone());
        Ok(shared)
    }

    /// Load a texture, falling back to the placeholder on failure.
    ///
    /// The failure is logged, not surfaced; callers get a valid texture
    /// either way.
    pub fn load_or_placeholder(&mut self, path: impl AsRef<Path>) -> Arc<Texture> {
        let path = path.as_ref();
        match self.load(path) {
            Ok(texture) => texture,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "texture load failed, using placeholder");
                self.placeholder.clone()
            }
        }
    }

    /// The built-in checkerboard texture.
    pub fn placeholder(&self) -> Arc<Texture> {
        self.placeholder.clone()
    }

    /// Look up a cached texture by content id.
    pub fn get(&self, id: TextureId) -> Option<Arc<Texture>> {
        self.by_id.get(&id).cloned()
    }

    /// Number of distinct cached textures (placeholder excluded).
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

fn content_id(width: u32, height: u32, rgba: &[u8]) -> TextureId {
    let mut hasher = Sha256::new();
    hasher.update(width.to_le_bytes());
    hasher.update(height.to_le_bytes());
    hasher.update(rgba);
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    TextureId(u64::from_le_bytes(bytes))
}

/// 8x8 magenta/black checkerboard, the classic missing-texture stand-in.
fn checkerboard() -> Texture {
    const SIZE: u32 = 8;
    let mut rgba = Vec::with_capacity(SIZE as usize * SIZE as usize * 4);
    for y in 0..SIZE {
        for x in 0..SIZE {
            let on = (x / 2 + y / 2) % 2 == 0;
            if on {
                rgba.extend_from_slice(&[255, 0, 255, 255]);
            } else {
                rgba.extend_from_slice(&[0, 0, 0, 255]);
            }
        }
    }
    Texture::from_rgba(SIZE, SIZE, rgba)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_png(dir: &Path, name: &str, w: u32, h: u32, pixel: [u8; 4]) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(w, h, Rgba(pixel))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn load_decodes_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "sprite.png", 16, 24, [255, 0, 0, 255]);

        let mut store = TextureStore::new();
        let texture = store.load(&path).unwrap();
        assert_eq!(texture.width, 16);
        assert_eq!(texture.height, 24);
        assert_eq!(texture.rgba.len(), 16 * 24 * 4);
    }

    #[test]
    fn identical_content_dedupes() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 4, 4, [0, 255, 0, 255]);
        let b = write_png(dir.path(), "b.png", 4, 4, [0, 255, 0, 255]);

        let mut store = TextureStore::new();
        let ta = store.load(&a).unwrap();
        let tb = store.load(&b).unwrap();
        assert_eq!(ta.id, tb.id);
        assert!(Arc::ptr_eq(&ta, &tb));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn repeated_load_hits_path_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "sprite.png", 4, 4, [1, 2, 3, 255]);

        let mut store = TextureStore::new();
        let first = store.load(&path).unwrap();
        let second = store.load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_file_falls_back_to_placeholder() {
        let mut store = TextureStore::new();
        let texture = store.load_or_placeholder("no/such/file.png");
        assert_eq!(texture.id, store.placeholder().id);
        assert!(store.is_empty());
    }

    #[test]
    fn placeholder_is_valid_rgba() {
        let store = TextureStore::new();
        let p = store.placeholder();
        assert_eq!(p.rgba.len() as u64, p.width as u64 * p.height as u64 * 4);
    }
}
