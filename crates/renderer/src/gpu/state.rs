use std::time::{Duration, Instant};

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use shading::{FrameInputs, Resolution};
use tracing::{debug, warn};
use wgpu::util::DeviceExt;

use crate::error::RendererError;
use crate::host::{FrameStatus, FrameTarget};
use crate::types::{AdapterProfile, Antialiasing, ColorSpaceMode, GpuPowerPreference};

use super::context::{GpuContext, SurfaceColorSpace};
use super::pipeline::{BackdropPipeline, QUAD_VERTICES};
use super::uniforms::BackdropUniforms;

/// GPU frame target: one pipeline, one quad, one uniform buffer.
pub struct GpuState {
    context: GpuContext,
    pipeline: BackdropPipeline,
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: BackdropUniforms,
    multisample_target: Option<MultisampleTarget>,
    last_fps_update: Instant,
    frames_since_last_update: u32,
    frames_per_second: f32,
}

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: Resolution,
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

    fn for_context(context: &GpuContext) -> Option<Self> {
        (context.sample_count > 1).then(|| {
            Self::new(
                &context.device,
                context.surface_format,
                context.size,
                context.sample_count,
            )
        })
    }
}

impl GpuState {
    /// Builds the context, pipeline and buffers for `target`.
    ///
    /// The returned state holds a surface tied to `target`'s native window;
    /// it must be dropped before that window.
    pub(crate) fn new<T>(
        target: &T,
        initial_size: Resolution,
        antialiasing: Antialiasing,
        color_space: ColorSpaceMode,
        gpu_power: GpuPowerPreference,
    ) -> Result<Self, RendererError>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size, antialiasing, color_space, gpu_power)?;
        let pipeline =
            BackdropPipeline::new(&context.device, context.surface_format, context.sample_count);

        let vertex_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("backdrop quad"),
                contents: bytemuck::cast_slice(&QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let uniforms = BackdropUniforms::new(&FrameInputs::new(initial_size, 0.0));
        let uniform_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("backdrop uniforms"),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("backdrop uniform bind group"),
                layout: &pipeline.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        let multisample_target = MultisampleTarget::for_context(&context);
        debug!(
            format = ?context.surface_format,
            linear = context.color_space == SurfaceColorSpace::Linear,
            samples = context.sample_count,
            "backdrop pipeline ready"
        );

        Ok(Self {
            context,
            pipeline,
            vertex_buffer,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
            multisample_target,
            last_fps_update: Instant::now(),
            frames_since_last_update: 0,
            frames_per_second: 0.0,
        })
    }

    pub fn adapter_profile(&self) -> &AdapterProfile {
        &self.context.adapter_profile
    }

    pub fn size(&self) -> Resolution {
        self.context.size
    }

    fn record_frame_stats(&mut self) {
        let now = Instant::now();
        self.frames_since_last_update += 1;
        let elapsed = now.saturating_duration_since(self.last_fps_update);
        if elapsed >= Duration::from_secs(1) {
            self.frames_per_second = self.frames_since_last_update as f32 / elapsed.as_secs_f32();
            self.frames_since_last_update = 0;
            self.last_fps_update = now;
            debug!(
                fps = self.frames_per_second.round(),
                time = self.uniforms.time,
                "render stats"
            );
        }
    }

    fn encode_draw(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let (attachment_view, resolve_target) = match self.multisample_target.as_ref() {
            Some(msaa) => (&msaa.view, Some(view)),
            None => (view, None),
        };
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("backdrop pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: attachment_view,
                depth_slice: None,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_pipeline(&self.pipeline.pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
    }
}

impl FrameTarget for GpuState {
    fn label(&self) -> &'static str {
        "gpu"
    }

    fn resize(&mut self, resolution: Resolution) {
        self.context.resize(resolution);
        self.multisample_target = MultisampleTarget::for_context(&self.context);
    }

    fn draw(&mut self, inputs: &FrameInputs) -> Result<FrameStatus, RendererError> {
        let frame = match self.context.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("surface lost or outdated; reconfiguring");
                self.context.reconfigure();
                return Ok(FrameStatus::Skipped);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("timed out acquiring the next surface texture");
                return Ok(FrameStatus::Skipped);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RendererError::OutOfMemory),
            Err(err) => return Err(RendererError::Surface(err)),
        };

        if self.uniforms.update(inputs) {
            self.context
                .queue
                .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));
        }

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("backdrop encoder"),
                });
        self.encode_draw(&mut encoder, &view);
        self.context.queue.submit(Some(encoder.finish()));

        let suboptimal = frame.suboptimal;
        frame.present();
        if suboptimal {
            self.context.reconfigure();
        }

        self.record_frame_stats();
        Ok(FrameStatus::Presented)
    }
}
