use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};

use super::gpu::{GpuDevice, GpuInit};
use super::headless::{HeadlessDevice, HeadlessProbe};
use super::resources::{IndexBuffer, RendererApi, Shader, Texture, VertexArray, VertexBuffer};
use super::shader_source::ShaderOrigin;
use super::texture_file::TextureOptions;
use super::tracker::ResourceCounts;
use crate::platform::Window;
use crate::renderer::Renderer;

/// Which backend every factory of a `Graphics` produces resources for.
///
/// Chosen once at startup; a `Graphics` never switches backends.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum GraphicsApi {
    /// Recording backend without a GPU.
    Headless,
    #[default]
    Wgpu,
}

enum Backend {
    Headless(HeadlessDevice),
    Wgpu(GpuDevice),
}

/// Resource factory and frame sink of the active backend.
pub struct Graphics {
    api: GraphicsApi,
    backend: Backend,
}

impl Graphics {
    pub fn new(api: GraphicsApi, window: &Window, init: &GpuInit) -> Result<Self> {
        let backend = match api {
            GraphicsApi::Headless => Backend::Headless(HeadlessDevice::new().0),
            GraphicsApi::Wgpu => {
                let native = window
                    .native()
                    .context("the wgpu backend needs a native window")?;
                Backend::Wgpu(GpuDevice::new(native, init)?)
            }
        };

        log::info!("graphics backend: {api:?}");
        Ok(Self { api, backend })
    }

    /// A headless `Graphics` plus a probe into what it records.
    pub fn headless() -> (Self, HeadlessProbe) {
        let (device, probe) = HeadlessDevice::new();
        (
            Self {
                api: GraphicsApi::Headless,
                backend: Backend::Headless(device),
            },
            probe,
        )
    }

    #[inline]
    pub fn api(&self) -> GraphicsApi {
        self.api
    }

    /// Returns a vertex buffer holding `vertices`. Set its layout before
    /// attaching it to a vertex array.
    pub fn create_vertex_buffer(&self, vertices: &[f32]) -> Box<dyn VertexBuffer> {
        match &self.backend {
            Backend::Headless(d) => Box::new(d.create_vertex_buffer(vertices)),
            Backend::Wgpu(d) => Box::new(d.create_vertex_buffer(vertices)),
        }
    }

    pub fn create_index_buffer(&self, indices: &[u32]) -> Rc<dyn IndexBuffer> {
        match &self.backend {
            Backend::Headless(d) => Rc::new(d.create_index_buffer(indices)),
            Backend::Wgpu(d) => Rc::new(d.create_index_buffer(indices)),
        }
    }

    pub fn create_vertex_array(&self) -> Box<dyn VertexArray> {
        match &self.backend {
            Backend::Headless(d) => Box::new(d.create_vertex_array()),
            Backend::Wgpu(d) => Box::new(d.create_vertex_array()),
        }
    }

    /// Loads a `#type`-split shader file. Check `is_valid` before use.
    pub fn create_shader(&self, name: &str, path: impl AsRef<Path>) -> Rc<dyn Shader> {
        self.shader_from(name, ShaderOrigin::File(path.as_ref()))
    }

    pub fn create_shader_from_files(
        &self,
        name: &str,
        vertex: impl AsRef<Path>,
        fragment: impl AsRef<Path>,
    ) -> Rc<dyn Shader> {
        self.shader_from(
            name,
            ShaderOrigin::Files {
                vertex: vertex.as_ref(),
                fragment: fragment.as_ref(),
            },
        )
    }

    pub fn create_shader_from_source(&self, name: &str, source: &str) -> Rc<dyn Shader> {
        self.shader_from(name, ShaderOrigin::Source(source))
    }

    fn shader_from(&self, name: &str, origin: ShaderOrigin<'_>) -> Rc<dyn Shader> {
        match &self.backend {
            Backend::Headless(d) => Rc::new(d.create_shader(name, origin)),
            Backend::Wgpu(d) => Rc::new(d.create_shader(name, origin)),
        }
    }

    /// Decodes and uploads an RGB/RGBA image. Check `is_valid` before use.
    pub fn create_texture_2d(
        &self,
        path: impl AsRef<Path>,
        options: TextureOptions,
    ) -> Rc<dyn Texture> {
        let path = path.as_ref();
        match &self.backend {
            Backend::Headless(d) => Rc::new(d.create_texture_2d(path, options)),
            Backend::Wgpu(d) => Rc::new(d.create_texture_2d(path, options)),
        }
    }

    /// The backend's draw/clear entry points.
    pub fn api_backend(&self) -> &dyn RendererApi {
        match &self.backend {
            Backend::Headless(d) => d,
            Backend::Wgpu(d) => d,
        }
    }

    /// The render façade over this backend.
    pub fn renderer(&self) -> Renderer<'_> {
        Renderer::new(self.api_backend())
    }

    /// Presents the frame recorded since the previous call.
    pub fn present(&self) -> Result<()> {
        match &self.backend {
            Backend::Headless(d) => {
                d.present();
                Ok(())
            }
            Backend::Wgpu(d) => d.present(),
        }
    }

    /// Framebuffer resize, in physical pixels.
    pub fn resize(&self, width: u32, height: u32) {
        match &self.backend {
            Backend::Headless(d) => d.resize(width, height),
            Backend::Wgpu(d) => d.resize(width, height),
        }
    }

    pub fn set_vsync(&self, enabled: bool) {
        match &self.backend {
            Backend::Headless(d) => d.set_vsync(enabled),
            Backend::Wgpu(d) => d.set_vsync(enabled),
        }
    }

    /// Live native handles per resource kind.
    pub fn resource_counts(&self) -> ResourceCounts {
        match &self.backend {
            Backend::Headless(d) => d.resource_counts(),
            Backend::Wgpu(d) => d.resource_counts(),
        }
    }
}
