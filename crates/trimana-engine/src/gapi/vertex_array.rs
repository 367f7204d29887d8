use std::ops::Range;
use std::rc::Rc;

use super::error::GraphicsError;
use super::layout::{BufferLayout, ShaderDataType};
use super::resources::{IndexBuffer, VertexBuffer};

/// One enabled vertex attribute slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeSlot {
    /// Shader location; contiguous across every buffer of the array.
    pub location: u32,
    /// Index of the owning buffer in attach order.
    pub buffer_index: usize,
    pub data_type: ShaderDataType,
    pub components: u32,
    pub normalized: bool,
    pub stride: u32,
    pub offset: u32,
}

/// Buffers and attribute slots of one vertex array.
///
/// Shared by every backend so slot assignment lives in one place.
#[derive(Default)]
pub(crate) struct VertexArrayState {
    buffers: Vec<Rc<dyn VertexBuffer>>,
    index: Option<Rc<dyn IndexBuffer>>,
    attributes: Vec<AttributeSlot>,
    next_location: u32,
}

impl VertexArrayState {
    /// Attaches `buffer` and returns the slot range given to its elements.
    pub fn add_vertex_buffer(
        &mut self,
        buffer: Rc<dyn VertexBuffer>,
    ) -> Result<Range<u32>, GraphicsError> {
        let layout: &BufferLayout = buffer.layout();
        if layout.is_empty() {
            return Err(GraphicsError::EmptyLayout { buffer: buffer.id() });
        }

        let first = self.next_location;
        let buffer_index = self.buffers.len();
        for element in layout {
            self.attributes.push(AttributeSlot {
                location: self.next_location,
                buffer_index,
                data_type: element.data_type,
                components: element.components,
                normalized: element.normalized,
                stride: layout.stride(),
                offset: element.offset,
            });
            self.next_location += 1;
        }

        self.buffers.push(buffer);
        Ok(first..self.next_location)
    }

    pub fn set_index_buffer(&mut self, buffer: Rc<dyn IndexBuffer>) {
        self.index = Some(buffer);
    }

    pub fn buffers(&self) -> &[Rc<dyn VertexBuffer>] {
        &self.buffers
    }

    pub fn index_buffer(&self) -> Option<&Rc<dyn IndexBuffer>> {
        self.index.as_ref()
    }

    pub fn attributes(&self) -> &[AttributeSlot] {
        &self.attributes
    }
}
