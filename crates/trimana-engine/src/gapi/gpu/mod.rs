//! wgpu backend.
//!
//! Resources are created eagerly on the device. Draws are recorded into the
//! current frame with everything they reference (pipeline, bind groups,
//! buffers) and replayed into one render pass on `present`.

mod buffers;
mod context;
mod gpu;
mod shader;
mod texture;

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use anyhow::Result;
use winit::dpi::PhysicalSize;

pub use buffers::{GpuIndexBuffer, GpuVertexArray, GpuVertexBuffer};
pub use gpu::GpuInit;
pub use shader::GpuShader;
pub use gpu::SurfaceErrorAction;
pub use texture::GpuTexture;

use self::context::GpuShared;
use self::gpu::Gpu;
use super::resources::{IndexBuffer, RendererApi, VertexArray};
use super::shader_source::ShaderOrigin;
use super::texture_file::TextureOptions;
use super::tracker::ResourceCounts;
use crate::paint::Color;

/// One recorded indexed draw.
struct DrawRecord {
    pipeline: wgpu::RenderPipeline,
    uniforms: wgpu::BindGroup,
    textures: wgpu::BindGroup,
    vertex_buffers: Vec<wgpu::Buffer>,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

#[derive(Default)]
struct FrameCommands {
    clear: Option<Color>,
    draws: Vec<DrawRecord>,
}

pub(crate) struct GpuDevice {
    gpu: RefCell<Gpu>,
    shared: Rc<GpuShared>,
    clear_color: Cell<Color>,
    frame: RefCell<FrameCommands>,
}

impl GpuDevice {
    pub fn new(window: Arc<winit::window::Window>, init: &GpuInit) -> Result<Self> {
        let gpu = pollster::block_on(Gpu::new(window, init.clone()))?;
        let shared = GpuShared::new(gpu.device().clone(), gpu.queue().clone(), gpu.surface_format());

        log::info!(
            "wgpu backend ready: {:?}, {}x{}",
            gpu.surface_format(),
            gpu.size().width,
            gpu.size().height
        );

        Ok(Self {
            gpu: RefCell::new(gpu),
            shared: Rc::new(shared),
            clear_color: Cell::new(Color::BLACK),
            frame: RefCell::new(FrameCommands::default()),
        })
    }

    pub fn create_vertex_buffer(&self, vertices: &[f32]) -> GpuVertexBuffer {
        GpuVertexBuffer::new(&self.shared, vertices)
    }

    pub fn create_index_buffer(&self, indices: &[u32]) -> GpuIndexBuffer {
        GpuIndexBuffer::new(&self.shared, indices)
    }

    pub fn create_vertex_array(&self) -> GpuVertexArray {
        GpuVertexArray::new(&self.shared)
    }

    pub fn create_shader(&self, name: &str, origin: ShaderOrigin<'_>) -> GpuShader {
        GpuShader::new(&self.shared, name, origin)
    }

    pub fn create_texture_2d(&self, path: &Path, options: TextureOptions) -> GpuTexture {
        GpuTexture::new(&self.shared, path, options)
    }

    pub fn resource_counts(&self) -> ResourceCounts {
        self.shared.tracker.counts()
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.gpu.borrow_mut().resize(PhysicalSize::new(width, height));
    }

    pub fn set_vsync(&self, enabled: bool) {
        self.gpu.borrow_mut().set_vsync(enabled);
    }

    /// Replays the recorded frame into the surface and presents it.
    ///
    /// Errors only when the surface is lost beyond recovery.
    pub fn present(&self) -> Result<()> {
        let commands = std::mem::take(&mut *self.frame.borrow_mut());
        let mut gpu = self.gpu.borrow_mut();

        let size = gpu.size();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }

        let mut frame = match gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                let message = err.to_string();
                return match gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => Err(anyhow::anyhow!("surface error: {message}")),
                    action => {
                        log::debug!("frame skipped: {action:?}");
                        Ok(())
                    }
                };
            }
        };

        let load = match commands.clear {
            Some(color) => wgpu::LoadOp::Clear(color.into()),
            None => wgpu::LoadOp::Load,
        };

        {
            let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("trimana scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for draw in &commands.draws {
                rpass.set_pipeline(&draw.pipeline);
                rpass.set_bind_group(0, &draw.uniforms, &[]);
                rpass.set_bind_group(1, &draw.textures, &[]);
                for (slot, buffer) in draw.vertex_buffers.iter().enumerate() {
                    rpass.set_vertex_buffer(slot as u32, buffer.slice(..));
                }
                rpass.set_index_buffer(draw.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }

        gpu.submit(frame);
        Ok(())
    }

    fn record_draw(&self, vertex_array: &dyn VertexArray) -> Option<DrawRecord> {
        let shader = {
            let bound = self.shared.bound.borrow();
            bound.shader.as_ref().and_then(Weak::upgrade)
        };
        let Some(shader) = shader.filter(|s| s.is_valid()) else {
            log::debug!("draw skipped: no valid shader bound");
            return None;
        };

        let index = vertex_array.index_buffer()?;
        let index_buffer = index.as_any().downcast_ref::<GpuIndexBuffer>()?;
        if index_buffer.count() == 0 {
            return None;
        }

        let mut vertex_buffers = Vec::with_capacity(vertex_array.vertex_buffers().len());
        for vb in vertex_array.vertex_buffers() {
            let raw = vb.as_any().downcast_ref::<GpuVertexBuffer>()?.raw();
            if raw.size() == 0 {
                return None;
            }
            vertex_buffers.push(raw.clone());
        }

        let pipeline = shader.pipeline(&self.shared, vertex_array.attributes(), vertex_buffers.len())?;
        let uniforms = shader.uniform_bind_group(&self.shared)?;
        let textures = self.texture_bind_group(&shader)?;

        Some(DrawRecord {
            pipeline,
            uniforms,
            textures,
            vertex_buffers,
            index_buffer: index_buffer.raw().clone(),
            index_count: index_buffer.count(),
        })
    }

    fn texture_bind_group(&self, shader: &shader::ShaderCore) -> Option<wgpu::BindGroup> {
        let layout = shader.texture_layout()?;
        let bound = self.shared.bound.borrow();

        let cores: Vec<Option<Rc<texture::TextureCore>>> = shader
            .texture_slots()
            .iter()
            .map(|slot| bound.textures.get(slot).and_then(Weak::upgrade))
            .collect();

        let fallback = &self.shared.fallback;
        let entries: Vec<wgpu::BindGroupEntry<'_>> = shader
            .texture_slots()
            .iter()
            .zip(&cores)
            .flat_map(|(slot, core)| {
                let (view, sampler) = match core {
                    Some(core) => (&core.view, &core.sampler),
                    None => (&fallback.view, &fallback.sampler),
                };
                [
                    wgpu::BindGroupEntry {
                        binding: slot * 2,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: slot * 2 + 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ]
            })
            .collect();

        Some(self.shared.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("trimana texture bind group"),
            layout,
            entries: &entries,
        }))
    }
}

impl RendererApi for GpuDevice {
    fn init(&self) {
        self.shared.blending.set(true);
    }

    fn set_clear_color(&self, color: Color) {
        self.clear_color.set(color);
    }

    fn clear(&self) {
        self.frame.borrow_mut().clear = Some(self.clear_color.get());
    }

    fn draw_indexed(&self, vertex_array: &dyn VertexArray) {
        if let Some(record) = self.record_draw(vertex_array) {
            self.frame.borrow_mut().draws.push(record);
        }
    }
}
