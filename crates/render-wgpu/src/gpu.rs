use crate::context::GpuContext;
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use flatland_assets::{Texture, TextureId};
use flatland_render::{QuadId, RenderBackend, SpriteVertex};
use glam::Mat4;
use std::collections::BTreeMap;
use std::path::Path;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    proj_mat: [[f32; 4]; 4],
}

/// GPU-side state for one quad slot.
struct QuadSlot {
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
}

/// A draw recorded during the frame, encoded on [`QuadRenderer::flush`].
struct PendingDraw {
    quad: QuadId,
    texture: TextureId,
}

/// wgpu implementation of [`RenderBackend`].
///
/// One shared triangle-strip pipeline; each quad slot owns its vertex and
/// uniform buffers and releases them on destroy. Draws accumulate during
/// the frame and are encoded into a single render pass by `flush`.
pub struct QuadRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    quads: BTreeMap<QuadId, QuadSlot>,
    texture_bind_groups: BTreeMap<TextureId, wgpu::BindGroup>,
    pending: Vec<PendingDraw>,
    next_id: u64,
}

impl QuadRenderer {
    /// Build the pipeline for the given target format.
    ///
    /// `shader_override` may point at a WGSL file; a file that fails to
    /// read or validate is logged and replaced by the builtin shader.
    pub fn new(
        context: &GpuContext,
        target_format: wgpu::TextureFormat,
        shader_override: Option<&Path>,
    ) -> Self {
        let device = context.device.clone();
        let queue = context.queue.clone();

        let shader = Self::compile_shader(&device, shader_override);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("quad_uniform_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("quad_texture_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quad_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("quad_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<SpriteVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x2,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("quad_sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            device,
            queue,
            pipeline,
            uniform_layout,
            texture_layout,
            sampler,
            quads: BTreeMap::new(),
            texture_bind_groups: BTreeMap::new(),
            pending: Vec::new(),
            next_id: 0,
        }
    }

    /// Compile the shader module, degrading to the builtin on a bad override.
    fn compile_shader(device: &wgpu::Device, shader_override: Option<&Path>) -> wgpu::ShaderModule {
        let source = shaders::load_shader_source(shader_override);

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("quad_shader"),
            source: wgpu::ShaderSource::Wgsl(source),
        });
        let error = pollster::block_on(device.pop_error_scope());

        match error {
            None => module,
            Some(e) => {
                tracing::warn!(error = %e, "shader validation failed, using builtin");
                device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some("quad_shader_builtin"),
                    source: wgpu::ShaderSource::Wgsl(shaders::SPRITE_SHADER.into()),
                })
            }
        }
    }

    fn texture_bind_group(&mut self, texture: &Texture) -> &wgpu::BindGroup {
        if !self.texture_bind_groups.contains_key(&texture.id) {
            let gpu_texture = self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("sprite_texture"),
                size: wgpu::Extent3d {
                    width: texture.width,
                    height: texture.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });

            self.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &gpu_texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &texture.rgba,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * texture.width),
                    rows_per_image: Some(texture.height),
                },
                wgpu::Extent3d {
                    width: texture.width,
                    height: texture.height,
                    depth_or_array_layers: 1,
                },
            );

            let view = gpu_texture.create_view(&Default::default());
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("sprite_texture_bind_group"),
                layout: &self.texture_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });
            self.texture_bind_groups.insert(texture.id, bind_group);
        }
        &self.texture_bind_groups[&texture.id]
    }

    /// Encode all pending draws into one render pass against `view`.
    pub fn flush(&mut self, view: &wgpu::TextureView, clear_color: wgpu::Color) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("quad_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("quad_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            for draw in &self.pending {
                // A quad destroyed after queuing its draw is skipped.
                let Some(slot) = self.quads.get(&draw.quad) else {
                    continue;
                };
                let Some(texture_bind_group) = self.texture_bind_groups.get(&draw.texture) else {
                    continue;
                };
                pass.set_bind_group(0, &slot.uniform_bind_group, &[]);
                pass.set_bind_group(1, texture_bind_group, &[]);
                pass.set_vertex_buffer(0, slot.vertex_buffer.slice(..));
                pass.draw(0..4, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.pending.clear();
    }

    /// Number of live quad slots.
    pub fn quad_count(&self) -> usize {
        self.quads.len()
    }
}

impl RenderBackend for QuadRenderer {
    fn create_quad(&mut self) -> QuadId {
        let id = QuadId(self.next_id);
        self.next_id += 1;

        let vertex_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quad_vertex_buffer"),
            size: (4 * std::mem::size_of::<SpriteVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quad_uniform_buffer"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quad_uniform_bind_group"),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        self.quads.insert(
            id,
            QuadSlot {
                vertex_buffer,
                uniform_buffer,
                uniform_bind_group,
            },
        );
        id
    }

    fn upload_quad(&mut self, quad: QuadId, vertices: &[SpriteVertex; 4]) {
        if let Some(slot) = self.quads.get(&quad) {
            self.queue
                .write_buffer(&slot.vertex_buffer, 0, bytemuck::cast_slice(vertices));
        }
    }

    // The projection lands in the slot's single uniform buffer now while
    // encoding waits for flush; queuing the same quad twice in one frame
    // renders both draws with the last projection written.
    fn draw_quad(&mut self, quad: QuadId, texture: &Texture, projection: Mat4) {
        let Some(slot) = self.quads.get(&quad) else {
            return;
        };
        self.queue.write_buffer(
            &slot.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                proj_mat: projection.to_cols_array_2d(),
            }),
        );
        self.texture_bind_group(texture);
        self.pending.push(PendingDraw {
            quad,
            texture: texture.id,
        });
    }

    fn destroy_quad(&mut self, quad: QuadId) {
        self.quads.remove(&quad);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatland_render::quad_vertices;
    use glam::Vec2;

    // Exercises the full backend against a real adapter; skipped on
    // machines without one.
    #[test]
    fn offscreen_smoke() {
        let Ok(context) = GpuContext::headless() else {
            eprintln!("no GPU adapter, skipping");
            return;
        };

        let format = wgpu::TextureFormat::Rgba8UnormSrgb;
        let mut renderer = QuadRenderer::new(&context, format, None);

        let target = context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("test_target"),
            size: wgpu::Extent3d {
                width: 64,
                height: 64,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = target.create_view(&Default::default());

        let quad = renderer.create_quad();
        renderer.upload_quad(quad, &quad_vertices(Vec2::new(8.0, 8.0), 16.0, 16.0, 0.0));

        let texture = Texture::from_rgba(1, 1, vec![255, 255, 255, 255]);
        renderer.draw_quad(quad, &texture, Mat4::orthographic_rh(0.0, 64.0, 64.0, 0.0, -1.0, 1.0));
        renderer.flush(&view, wgpu::Color::BLACK);

        assert_eq!(renderer.quad_count(), 1);
        renderer.destroy_quad(quad);
        assert_eq!(renderer.quad_count(), 0);
    }
}
