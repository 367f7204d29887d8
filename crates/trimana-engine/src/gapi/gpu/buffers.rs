use std::any::Any;
use std::rc::Rc;

use wgpu::util::DeviceExt;

use super::context::GpuShared;
use crate::gapi::error::GraphicsError;
use crate::gapi::layout::BufferLayout;
use crate::gapi::resources::{IndexBuffer, VertexArray, VertexBuffer};
use crate::gapi::tracker::{ResourceId, ResourceKind, TrackedHandle};
use crate::gapi::vertex_array::{AttributeSlot, VertexArrayState};

// wgpu binds buffers per render pass, so bind/unbind only log here. The draw
// reads buffers straight from the vertex array.

pub struct GpuVertexBuffer {
    handle: TrackedHandle,
    buffer: wgpu::Buffer,
    layout: BufferLayout,
}

impl GpuVertexBuffer {
    pub(crate) fn new(shared: &Rc<GpuShared>, vertices: &[f32]) -> Self {
        let buffer = shared
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("trimana vertex buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        Self {
            handle: shared.tracker.acquire(ResourceKind::VertexBuffer),
            buffer,
            layout: BufferLayout::default(),
        }
    }

    pub(crate) fn raw(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

impl VertexBuffer for GpuVertexBuffer {
    fn bind(&self) {
        log::trace!("bind vertex buffer #{}", self.id());
    }

    fn unbind(&self) {}

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

pub struct GpuIndexBuffer {
    handle: TrackedHandle,
    buffer: wgpu::Buffer,
    count: u32,
}

impl GpuIndexBuffer {
    pub(crate) fn new(shared: &Rc<GpuShared>, indices: &[u32]) -> Self {
        let buffer = shared
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("trimana index buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        Self {
            handle: shared.tracker.acquire(ResourceKind::IndexBuffer),
            buffer,
            count: indices.len() as u32,
        }
    }

    pub(crate) fn raw(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

impl IndexBuffer for GpuIndexBuffer {
    fn bind(&self) {
        log::trace!("bind index buffer #{}", self.id());
    }

    fn unbind(&self) {}

    fn count(&self) -> u32 {
        self.count
    }

    fn id(&self) -> ResourceId {
        self.handle.id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct GpuVertexArray {
    handle: TrackedHandle,
    state: VertexArrayState,
}

impl GpuVertexArray {
    pub(crate) fn new(shared: &Rc<GpuShared>) -> Self {
        Self {
            handle: shared.tracker.acquire(ResourceKind::VertexArray),
            state: VertexArrayState::default(),
        }
    }
}

impl VertexArray for GpuVertexArray {
    fn bind(&self) {
        log::trace!("bind vertex array #{}", self.id());
    }

    fn unbind(&self) {}

    fn add_vertex_buffer(&mut self, buffer: Rc<dyn VertexBuffer>) -> Result<(), GraphicsError> {
        let id = buffer.id();
        let slots = self.state.add_vertex_buffer(buffer)?;
        log::trace!("vertex array #{}: buffer #{id} -> slots {slots:?}", self.id());
        Ok(())
    }

    fn set_index_buffer(&mut self, buffer: Rc<dyn IndexBuffer>) {
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
