use effects::{BlendMode, Effect, EffectKind, Geometry};
use wgpu::util::DeviceExt;

use crate::compile::{compile_shader, ShaderError};

/// Largest uniform payload any effect packs (particles: three matrices plus
/// four vectors).
pub(crate) const MAX_UNIFORM_BYTES: u64 = 256;

const CORNER_STRIDE: u64 = 16;
const CORNER_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x4];
const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x4, 2 => Float32x4];
/// Bytes per particle record: position, random and color `vec4`s.
pub(crate) const INSTANCE_STRIDE: u64 = 48;

pub(crate) struct PipelineLayouts {
    pub uniform_layout: wgpu::BindGroupLayout,
    pub pipeline_layout: wgpu::PipelineLayout,
}

impl PipelineLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("effect pipeline layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });
        Self {
            uniform_layout,
            pipeline_layout,
        }
    }
}

/// Index and corner buffers for effects drawn as unit quads.
pub(crate) struct QuadBuffers {
    pub vertices: wgpu::Buffer,
    pub indices: wgpu::Buffer,
}

impl QuadBuffers {
    fn new(device: &wgpu::Device, capacity: u32) -> Self {
        let (corners, indices) = effects::unit_quads(capacity);
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad corners"),
            contents: bytemuck::cast_slice(&corners),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad indices"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self { vertices, indices }
    }
}

/// Compiled pipeline for one effect plus the static geometry it draws.
pub(crate) struct EffectPipeline {
    pub kind: EffectKind,
    pub pipeline: wgpu::RenderPipeline,
    pub quads: Option<QuadBuffers>,
}

impl EffectPipeline {
    pub fn new(
        device: &wgpu::Device,
        layouts: &PipelineLayouts,
        surface_format: wgpu::TextureFormat,
        sample_count: u32,
        effect: &dyn Effect,
    ) -> Result<Self, ShaderError> {
        let spec = effect.shader();
        let module = compile_shader(device, &spec)?;

        let geometry = effect.geometry();
        let buffers = vertex_layouts(geometry);

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(spec.label),
            layout: Some(&layouts.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some(spec.vertex_entry),
                buffers: &buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some(spec.fragment_entry),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(blend_state(effect.blend())),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(ShaderError::Pipeline {
                label: spec.label,
                message: err.to_string(),
            });
        }

        let quads = match geometry {
            Geometry::IndexedQuads { capacity, .. } => Some(QuadBuffers::new(device, capacity)),
            _ => None,
        };

        tracing::debug!(effect = %effect.kind(), ?geometry, "built effect pipeline");
        Ok(Self {
            kind: effect.kind(),
            pipeline,
            quads,
        })
    }
}

fn vertex_layouts(geometry: Geometry) -> Vec<wgpu::VertexBufferLayout<'static>> {
    match geometry {
        Geometry::FullscreenTriangle => Vec::new(),
        Geometry::IndexedQuads { .. } => vec![wgpu::VertexBufferLayout {
            array_stride: CORNER_STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &CORNER_ATTRIBUTES,
        }],
        Geometry::InstancedQuads { .. } => vec![wgpu::VertexBufferLayout {
            array_stride: INSTANCE_STRIDE,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &INSTANCE_ATTRIBUTES,
        }],
    }
}

pub(crate) fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    match mode {
        BlendMode::Replace => wgpu::BlendState::REPLACE,
        BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
        BlendMode::Premultiplied => wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layouts_follow_geometry() {
        assert!(vertex_layouts(Geometry::FullscreenTriangle).is_empty());

        let quads = vertex_layouts(Geometry::IndexedQuads {
            count: 3,
            capacity: 20,
        });
        assert_eq!(quads[0].array_stride, 16);
        assert_eq!(quads[0].step_mode, wgpu::VertexStepMode::Vertex);

        let instanced = vertex_layouts(Geometry::InstancedQuads { instances: 10 });
        assert_eq!(instanced[0].array_stride, INSTANCE_STRIDE);
        assert_eq!(instanced[0].step_mode, wgpu::VertexStepMode::Instance);
        assert_eq!(instanced[0].attributes.len(), 3);
    }

    #[test]
    fn every_effect_fits_the_uniform_buffer() {
        let frame = effects::FrameContext::new(0.0, 0, effects::Viewport::new(800.0, 600.0));
        for kind in EffectKind::ALL {
            let effect = effects::create(kind);
            let bytes = effect.uniforms(&frame).len() as u64;
            assert!(bytes <= MAX_UNIFORM_BYTES, "{kind} packs {bytes} bytes");
        }
    }

    #[test]
    fn blend_modes_map_to_wgpu_presets() {
        assert_eq!(blend_state(BlendMode::Replace), wgpu::BlendState::REPLACE);
        assert_eq!(
            blend_state(BlendMode::Premultiplied),
            wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING
        );
    }
}
