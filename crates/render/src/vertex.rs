use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// One quad vertex: interleaved position.xyz + texcoord.uv, 5 floats.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

/// Build the 4 vertices of an axis-aligned quad in triangle-strip order.
///
/// Corners are (x,y), (x,y+h), (x+w,y), (x+w,y+h) with texcoords
/// (0,0), (0,1), (1,0), (1,1). Depth goes into position.z for ordering.
pub fn quad_vertices(pos: Vec2, width: f32, height: f32, depth: f32) -> [SpriteVertex; 4] {
    let (x, y) = (pos.x, pos.y);
    [
        SpriteVertex {
            position: [x, y, depth],
            tex_coords: [0.0, 0.0],
        },
        SpriteVertex {
            position: [x, y + height, depth],
            tex_coords: [0.0, 1.0],
        },
        SpriteVertex {
            position: [x + width, y, depth],
            tex_coords: [1.0, 0.0],
        },
        SpriteVertex {
            position: [x + width, y + height, depth],
            tex_coords: [1.0, 1.0],
        },
    ]
}
