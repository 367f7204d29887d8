use std::any::Any;
use std::rc::Rc;

use super::{AttributePointer, HeadlessContext};
use crate::gapi::error::GraphicsError;
use crate::gapi::layout::BufferLayout;
use crate::gapi::resources::{IndexBuffer, VertexArray, VertexBuffer};
use crate::gapi::tracker::{ResourceId, ResourceKind, TrackedHandle};
use crate::gapi::vertex_array::{AttributeSlot, VertexArrayState};

pub struct HeadlessVertexBuffer {
    ctx: Rc<HeadlessContext>,
    handle: TrackedHandle,
    layout: BufferLayout,
    vertices: Vec<f32>,
}

impl HeadlessVertexBuffer {
    pub(crate) fn new(ctx: &Rc<HeadlessContext>, vertices: &[f32]) -> Self {
        Self {
            ctx: Rc::clone(ctx),
            handle: ctx.tracker.acquire(ResourceKind::VertexBuffer),
            layout: BufferLayout::default(),
            vertices: vertices.to_vec(),
        }
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }
}

impl VertexBuffer for HeadlessVertexBuffer {
    fn bind(&self) {
        self.ctx.bind(ResourceKind::VertexBuffer, self.id());
    }

    fn unbind(&self) {
        self.ctx.unbind(ResourceKind::VertexBuffer);
    }

    fn layout(&self) -> &BufferLayout {
        &self.layout
    }

    fn set_layout(&mut self, layout: BufferLayout) {
        self.layout = layout;
    }

    fn id(&self) -> ResourceId {
        self.handle.id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct HeadlessIndexBuffer {
    ctx: Rc<HeadlessContext>,
    handle: TrackedHandle,
    indices: Vec<u32>,
}

impl HeadlessIndexBuffer {
    pub(crate) fn new(ctx: &Rc<HeadlessContext>, indices: &[u32]) -> Self {
        Self {
            ctx: Rc::clone(ctx),
            handle: ctx.tracker.acquire(ResourceKind::IndexBuffer),
            indices: indices.to_vec(),
        }
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

impl IndexBuffer for HeadlessIndexBuffer {
    fn bind(&self) {
        self.ctx.bind(ResourceKind::IndexBuffer, self.id());
    }

    fn unbind(&self) {
        self.ctx.unbind(ResourceKind::IndexBuffer);
    }

    fn count(&self) -> u32 {
        self.indices.len() as u32
    }

    fn id(&self) -> ResourceId {
        self.handle.id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct HeadlessVertexArray {
    ctx: Rc<HeadlessContext>,
    handle: TrackedHandle,
    state: VertexArrayState,
}

impl HeadlessVertexArray {
    pub(crate) fn new(ctx: &Rc<HeadlessContext>) -> Self {
        Self {
            ctx: Rc::clone(ctx),
            handle: ctx.tracker.acquire(ResourceKind::VertexArray),
            state: VertexArrayState::default(),
        }
    }
}

impl VertexArray for HeadlessVertexArray {
    fn bind(&self) {
        self.ctx.bind(ResourceKind::VertexArray, self.id());
    }

    fn unbind(&self) {
        self.ctx.unbind(ResourceKind::VertexArray);
    }

    fn add_vertex_buffer(&mut self, buffer: Rc<dyn VertexBuffer>) -> Result<(), GraphicsError> {
        self.bind();
        buffer.bind();

        let buffer_id = buffer.id();
        let slots = self.state.add_vertex_buffer(buffer)?;

        let vertex_array = self.id();
        let pointers: Vec<AttributePointer> = self
            .state
            .attributes()
            .iter()
            .filter(|a| slots.contains(&a.location))
            .map(|a| AttributePointer {
                vertex_array,
                buffer: buffer_id,
                location: a.location,
                data_type: a.data_type,
                components: a.components,
                normalized: a.normalized,
                stride: a.stride,
                offset: a.offset,
            })
            .collect();

        self.ctx.record(|r| r.attribute_pointers.extend(pointers));
        Ok(())
    }

    fn set_index_buffer(&mut self, buffer: Rc<dyn IndexBuffer>) {
        self.bind();
        buffer.bind();
        self.state.set_index_buffer(buffer);
    }

    fn vertex_buffers(&self) -> &[Rc<dyn VertexBuffer>] {
        self.state.buffers()
    }

    fn index_buffer(&self) -> Option<&Rc<dyn IndexBuffer>> {
        self.state.index_buffer()
    }

    fn attributes(&self) -> &[AttributeSlot] {
        self.state.attributes()
    }

    fn id(&self) -> ResourceId {
        self.handle.id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
