use std::time::{Duration, Instant};

use anyhow::Result;
use effects::{Effect, EffectKind, FrameContext, Geometry};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::{debug, error, warn};
use winit::dpi::PhysicalSize;

use crate::types::{Antialiasing, SurfaceAlpha};

use super::context::GpuContext;
use super::pipeline::{EffectPipeline, PipelineLayouts, INSTANCE_STRIDE, MAX_UNIFORM_BYTES};

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa color target"),
            size: extent,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// Instance records uploaded for the current effect.
struct InstanceBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
    generation: u64,
}

/// Owns every GPU resource needed to present an effect.
///
/// ```text
///   Window ─▶ Surface ─▶ Device ─▶ Queue
///                          │
///                          ├─▶ EffectPipeline (per effect, rebuilt on switch)
///                          ├─▶ uniform buffer (sized for the largest payload)
///                          └─▶ instance buffer (particles only)
/// ```
pub(crate) struct GpuState {
    context: GpuContext,
    layouts: PipelineLayouts,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    /// `None` while the current effect's pipeline failed to build.
    pipeline: Option<EffectPipeline>,
    instances: Option<InstanceBuffer>,
    multisample_target: Option<MultisampleTarget>,
    last_fps_update: Instant,
    frames_since_last_update: u32,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        size: PhysicalSize<u32>,
        antialiasing: Antialiasing,
        surface_alpha: SurfaceAlpha,
        effect: &dyn Effect,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, size, antialiasing, surface_alpha)?;
        let layouts = PipelineLayouts::new(&context.device);

        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("effect uniforms"),
            size: MAX_UNIFORM_BYTES,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("uniform bind group"),
                layout: &layouts.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        let multisample_target = (context.sample_count > 1).then(|| {
            MultisampleTarget::new(
                &context.device,
                context.surface_format,
                context.size,
                context.sample_count,
            )
        });

        let mut state = Self {
            context,
            layouts,
            uniform_buffer,
            uniform_bind_group,
            pipeline: None,
            instances: None,
            multisample_target,
            last_fps_update: Instant::now(),
            frames_since_last_update: 0,
        };
        state.set_effect(effect);
        Ok(state)
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn current_kind(&self) -> Option<EffectKind> {
        self.pipeline.as_ref().map(|pipeline| pipeline.kind)
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        self.multisample_target = (self.context.sample_count > 1).then(|| {
            MultisampleTarget::new(
                &self.context.device,
                self.context.surface_format,
                self.context.size,
                self.context.sample_count,
            )
        });
    }

    /// Rebuilds the pipeline for `effect`. A failure is logged once and the
    /// surface keeps presenting the effect's clear color until the next switch.
    pub(crate) fn set_effect(&mut self, effect: &dyn Effect) {
        self.instances = None;
        match EffectPipeline::new(
            &self.context.device,
            &self.layouts,
            self.context.surface_format,
            self.context.sample_count,
            effect,
        ) {
            Ok(pipeline) => self.pipeline = Some(pipeline),
            Err(err) => {
                error!(effect = %effect.kind(), error = %err, "failed to build effect pipeline");
                self.pipeline = None;
            }
        }
    }

    /// Uploads the effect's payload, draws it once and presents.
    pub(crate) fn render(
        &mut self,
        effect: &dyn Effect,
        frame_context: &FrameContext,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;
        self.record_stats();

        let payload = effect.uniforms(frame_context);
        if payload.len() as u64 > MAX_UNIFORM_BYTES {
            warn!(
                effect = %effect.kind(),
                bytes = payload.len(),
                "uniform payload exceeds buffer; truncating"
            );
        }
        let len = payload.len().min(MAX_UNIFORM_BYTES as usize);
        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, &payload[..len]);
        self.upload_instances(effect);

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });

        let [r, g, b, a] = effect.clear_color();
        let (attachment_view, resolve_target) = match self.multisample_target.as_ref() {
            Some(msaa) => (&msaa.view, Some(&view)),
            None => (&view, None),
        };
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("effect pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.pipeline.as_ref() {
                render_pass.set_pipeline(&pipeline.pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                match effect.geometry() {
                    Geometry::FullscreenTriangle => render_pass.draw(0..3, 0..1),
                    Geometry::IndexedQuads { count, capacity } => {
                        if let Some(quads) = pipeline.quads.as_ref() {
                            render_pass.set_vertex_buffer(0, quads.vertices.slice(..));
                            render_pass
                                .set_index_buffer(quads.indices.slice(..), wgpu::IndexFormat::Uint32);
                            render_pass.draw_indexed(0..count.min(capacity) * 6, 0, 0..1);
                        }
                    }
                    Geometry::InstancedQuads { instances } => {
                        if let Some(buffer) = self.instances.as_ref() {
                            let drawable = (buffer.capacity / INSTANCE_STRIDE) as u32;
                            render_pass.set_vertex_buffer(0, buffer.buffer.slice(..));
                            render_pass.draw(0..6, 0..instances.min(drawable));
                        }
                    }
                }
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn upload_instances(&mut self, effect: &dyn Effect) {
        let Some(data) = effect.instances() else {
            self.instances = None;
            return;
        };
        if data.stride != INSTANCE_STRIDE || data.bytes.is_empty() {
            return;
        }
        if let Some(current) = self.instances.as_ref() {
            if current.generation == data.generation {
                return;
            }
        }

        let needed = data.bytes.len() as u64;
        let reuse = self
            .instances
            .as_ref()
            .is_some_and(|current| current.capacity >= needed);
        if reuse {
            if let Some(current) = self.instances.as_mut() {
                self.context.queue.write_buffer(&current.buffer, 0, data.bytes);
                current.generation = data.generation;
            }
        } else {
            let buffer = self.context.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("effect instances"),
                size: needed,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.context.queue.write_buffer(&buffer, 0, data.bytes);
            self.instances = Some(InstanceBuffer {
                buffer,
                capacity: needed,
                generation: data.generation,
            });
        }
        debug!(
            effect = %effect.kind(),
            generation = data.generation,
            bytes = needed,
            "uploaded instance data"
        );
    }

    fn record_stats(&mut self) {
        let now = Instant::now();
        self.frames_since_last_update += 1;
        let elapsed = now.saturating_duration_since(self.last_fps_update);
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames_since_last_update as f32 / elapsed.as_secs_f32();
            debug!(
                fps = fps.round(),
                effect = ?self.current_kind(),
                "render stats"
            );
            self.frames_since_last_update = 0;
            self.last_fps_update = now;
        }
    }
}
