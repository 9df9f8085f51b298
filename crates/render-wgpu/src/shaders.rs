use std::borrow::Cow;
use std::path::Path;

/// WGSL shader for textured quads: projection uniform, position.xyz +
/// texcoord.uv vertex layout.
pub const SPRITE_SHADER: &str = r#"
struct Uniforms {
    proj_mat: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var sprite_texture: texture_2d<f32>;
@group(1) @binding(1)
var sprite_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) tex_coords: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) tex_coords: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.proj_mat * vec4<f32>(vertex.position, 1.0);
    out.tex_coords = vertex.tex_coords;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(sprite_texture, sprite_sampler, in.tex_coords);
}
"#;

/// Resolve shader source: a readable override file, or the builtin.
///
/// An unreadable override is logged and ignored; rendering must not stop
/// over a missing asset.
pub fn load_shader_source(override_path: Option<&Path>) -> Cow<'static, str> {
    match override_path {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(source) => Cow::Owned(source),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "shader read failed, using builtin");
                Cow::Borrowed(SPRITE_SHADER)
            }
        },
        None => Cow::Borrowed(SPRITE_SHADER),
    }
}
