use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Conversion between pixel space and physics space.
///
/// Rendering works in pixels, the rigid-body simulation in meters. A single
/// uniform scale relates the two; no axis is flipped. The application root
/// owns one of these and hands copies to whatever needs to convert.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldScale {
    pub pixels_per_meter: f32,
}

impl Default for WorldScale {
    fn default() -> Self {
        Self {
            pixels_per_meter: 32.0,
        }
    }
}

impl WorldScale {
    pub fn new(pixels_per_meter: f32) -> Self {
        Self { pixels_per_meter }
    }

    /// Convert a pixel-space point to physics units.
    pub fn to_physics(&self, pixels: Vec2) -> Vec2 {
        pixels / self.pixels_per_meter
    }

    /// Convert a physics-space point to pixels.
    pub fn to_pixels(&self, physics: Vec2) -> Vec2 {
        physics * self.pixels_per_meter
    }

    /// Convert a pixel-space length to physics units.
    pub fn scalar_to_physics(&self, pixels: f32) -> f32 {
        pixels / self.pixels_per_meter
    }

    /// Convert a physics-space length to pixels.
    pub fn scalar_to_pixels(&self, meters: f32) -> f32 {
        meters * self.pixels_per_meter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_round_trip() {
        let scale = WorldScale::default();
        let p = Vec2::new(137.5, -42.25);
        let back = scale.to_pixels(scale.to_physics(p));
        assert!((back - p).length() < 1e-4);
    }

    #[test]
    fn scalar_round_trip() {
        let scale = WorldScale::new(30.0);
        let w = 64.0;
        let back = scale.scalar_to_pixels(scale.scalar_to_physics(w));
        assert!((back - w).abs() < 1e-4);
    }

    #[test]
    fn conversion_is_uniform() {
        let scale = WorldScale::new(32.0);
        assert_eq!(scale.to_physics(Vec2::new(32.0, 64.0)), Vec2::new(1.0, 2.0));
        assert_eq!(scale.scalar_to_physics(16.0), 0.5);
        assert_eq!(scale.scalar_to_pixels(2.0), 64.0);
    }
}
