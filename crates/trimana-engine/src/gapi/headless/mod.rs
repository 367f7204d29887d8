//! Recording backend.
//!
//! Implements every resource interface without a GPU: binds, attribute
//! pointers, clears and draws are appended to a `Recording`, and native
//! handles are simulated by tracked ids. Used by tests and by tools that run
//! the loop without a display.

mod buffers;
mod shader;
mod texture;

use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::{Rc, Weak};

pub use buffers::{HeadlessIndexBuffer, HeadlessVertexArray, HeadlessVertexBuffer};
pub use shader::HeadlessShader;
pub use texture::HeadlessTexture;

use super::texture_file::TextureOptions;
use super::layout::ShaderDataType;
use super::resources::{RendererApi, VertexArray};
use super::shader_source::ShaderOrigin;
use super::tracker::{ResourceCounts, ResourceId, ResourceKind, ResourceTracker};
use super::uniform::UniformValue;
use crate::paint::Color;

/// A bind or unbind issued against the simulated device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindOp {
    Bind(ResourceKind, ResourceId),
    BindTexture { slot: u32, id: ResourceId },
    Unbind(ResourceKind),
}

/// One enabled vertex attribute pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePointer {
    pub vertex_array: ResourceId,
    pub buffer: ResourceId,
    pub location: u32,
    pub data_type: ShaderDataType,
    pub components: u32,
    pub normalized: bool,
    pub stride: u32,
    pub offset: u32,
}

/// One indexed draw, with the state it observed.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Number of frames presented before this draw.
    pub frame: u64,
    pub vertex_array: ResourceId,
    pub shader: Option<ResourceId>,
    pub textures: Vec<(u32, ResourceId)>,
    pub index_count: u32,
    /// Written uniforms of the bound shader at draw time.
    pub uniforms: Vec<(String, UniformValue)>,
}

impl DrawCall {
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }
}

#[derive(Debug, Default)]
pub struct Recording {
    pub initialized: bool,
    pub blending: bool,
    pub clear_color: Color,
    /// Colors of every `clear`, in order.
    pub clears: Vec<Color>,
    pub binds: Vec<BindOp>,
    pub attribute_pointers: Vec<AttributePointer>,
    pub draws: Vec<DrawCall>,
    pub frames_presented: u64,
    pub surface_size: (u32, u32),
    pub vsync: bool,
}

#[derive(Debug, Default)]
struct BindState {
    shader: Option<Weak<shader::ShaderCore>>,
    textures: BTreeMap<u32, ResourceId>,
}

pub(crate) struct HeadlessContext {
    recording: RefCell<Recording>,
    bound: RefCell<BindState>,
    tracker: Rc<ResourceTracker>,
}

impl HeadlessContext {
    fn record(&self, f: impl FnOnce(&mut Recording)) {
        f(&mut self.recording.borrow_mut());
    }

    fn bind(&self, kind: ResourceKind, id: ResourceId) {
        self.record(|r| r.binds.push(BindOp::Bind(kind, id)));
    }

    fn unbind(&self, kind: ResourceKind) {
        self.record(|r| r.binds.push(BindOp::Unbind(kind)));
    }
}

/// Read access to what the headless backend recorded.
#[derive(Clone)]
pub struct HeadlessProbe {
    ctx: Rc<HeadlessContext>,
}

impl HeadlessProbe {
    pub fn recording(&self) -> Ref<'_, Recording> {
        self.ctx.recording.borrow()
    }

    pub fn draws(&self) -> Vec<DrawCall> {
        self.recording().draws.clone()
    }

    pub fn attribute_pointers(&self) -> Vec<AttributePointer> {
        self.recording().attribute_pointers.clone()
    }

    pub fn frames_presented(&self) -> u64 {
        self.recording().frames_presented
    }

    pub fn resource_counts(&self) -> ResourceCounts {
        self.ctx.tracker.counts()
    }
}

/// The headless backend device.
pub(crate) struct HeadlessDevice {
    ctx: Rc<HeadlessContext>,
}

impl HeadlessDevice {
    pub fn new() -> (Self, HeadlessProbe) {
        let ctx = Rc::new(HeadlessContext {
            recording: RefCell::new(Recording {
                vsync: true,
                ..Recording::default()
            }),
            bound: RefCell::new(BindState::default()),
            tracker: ResourceTracker::new(),
        });
        let probe = HeadlessProbe { ctx: Rc::clone(&ctx) };
        (Self { ctx }, probe)
    }

    pub fn create_vertex_buffer(&self, vertices: &[f32]) -> HeadlessVertexBuffer {
        HeadlessVertexBuffer::new(&self.ctx, vertices)
    }

    pub fn create_index_buffer(&self, indices: &[u32]) -> HeadlessIndexBuffer {
        HeadlessIndexBuffer::new(&self.ctx, indices)
    }

    pub fn create_vertex_array(&self) -> HeadlessVertexArray {
        HeadlessVertexArray::new(&self.ctx)
    }

    pub fn create_shader(&self, name: &str, origin: ShaderOrigin<'_>) -> HeadlessShader {
        HeadlessShader::new(&self.ctx, name, origin)
    }

    pub fn create_texture_2d(&self, path: &Path, options: TextureOptions) -> HeadlessTexture {
        HeadlessTexture::new(&self.ctx, path, options)
    }

    pub fn present(&self) {
        self.ctx.record(|r| r.frames_presented += 1);
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.ctx.record(|r| r.surface_size = (width, height));
    }

    pub fn set_vsync(&self, enabled: bool) {
        self.ctx.record(|r| r.vsync = enabled);
    }

    pub fn resource_counts(&self) -> ResourceCounts {
        self.ctx.tracker.counts()
    }
}

impl RendererApi for HeadlessDevice {
    fn init(&self) {
        self.ctx.record(|r| {
            r.initialized = true;
            r.blending = true;
        });
    }

    fn set_clear_color(&self, color: Color) {
        self.ctx.record(|r| r.clear_color = color);
    }

    fn clear(&self) {
        self.ctx.record(|r| {
            let color = r.clear_color;
            r.clears.push(color);
        });
    }

    fn draw_indexed(&self, vertex_array: &dyn VertexArray) {
        let index_count = vertex_array.index_buffer().map_or(0, |ib| ib.count());
        let bound = self.ctx.bound.borrow();
        let shader = bound.shader.as_ref().and_then(Weak::upgrade);

        let call = DrawCall {
            frame: self.ctx.recording.borrow().frames_presented,
            vertex_array: vertex_array.id(),
            shader: shader.as_ref().map(|s| s.id()),
            textures: bound.textures.iter().map(|(s, id)| (*s, *id)).collect(),
            index_count,
            uniforms: shader.as_ref().map(|s| s.snapshot()).unwrap_or_default(),
        };
        drop(bound);

        self.ctx.record(|r| r.draws.push(call));
    }
}
