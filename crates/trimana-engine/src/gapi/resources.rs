//! Backend-neutral resource interfaces.
//!
//! Each trait has one implementation per backend. Every live implementation
//! owns exactly one native handle, allocated in its constructor and released
//! on drop. Zero-state resources (failed construction) report id `0`.

use std::any::Any;
use std::rc::Rc;

use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

use super::error::GraphicsError;
use super::layout::BufferLayout;
use super::tracker::ResourceId;
use super::uniform::UniformValue;
use super::vertex_array::AttributeSlot;
use crate::paint::Color;

pub trait VertexBuffer {
    fn bind(&self);
    fn unbind(&self);

    fn layout(&self) -> &BufferLayout;

    /// Layouts are set before the buffer is shared with a vertex array; once
    /// attached, the buffer lives behind `Rc` and cannot be re-laid out.
    fn set_layout(&mut self, layout: BufferLayout);

    fn id(&self) -> ResourceId;
    fn as_any(&self) -> &dyn Any;
}

pub trait IndexBuffer {
    fn bind(&self);
    fn unbind(&self);

    /// Number of `u32` indices.
    fn count(&self) -> u32;

    fn id(&self) -> ResourceId;
    fn as_any(&self) -> &dyn Any;
}

pub trait VertexArray {
    fn bind(&self);
    fn unbind(&self);

    /// Attaches `buffer`, assigning its layout elements the next attribute
    /// slots in order. Slots continue across buffers; they never restart at 0.
    fn add_vertex_buffer(&mut self, buffer: Rc<dyn VertexBuffer>) -> Result<(), GraphicsError>;
    fn set_index_buffer(&mut self, buffer: Rc<dyn IndexBuffer>);

    fn vertex_buffers(&self) -> &[Rc<dyn VertexBuffer>];
    fn index_buffer(&self) -> Option<&Rc<dyn IndexBuffer>>;
    fn attributes(&self) -> &[AttributeSlot];

    fn id(&self) -> ResourceId;
    fn as_any(&self) -> &dyn Any;
}

/// A linked shader program.
///
/// Uniform setters never panic: an unknown name (including a uniform the
/// compiler dropped) or a mismatched type is logged and returns `false`
/// without touching any stored value.
pub trait Shader {
    fn bind(&self);
    fn unbind(&self);

    fn name(&self) -> &str;
    fn id(&self) -> ResourceId;

    /// `false` when loading, compiling or linking failed.
    fn is_valid(&self) -> bool;

    fn set_uniform(&self, name: &str, value: UniformValue) -> bool;

    /// Last value written to `name`, if any.
    fn uniform_value(&self, name: &str) -> Option<UniformValue>;

    fn as_any(&self) -> &dyn Any;

    fn set_int(&self, name: &str, value: i32) -> bool {
        self.set_uniform(name, UniformValue::Int(value))
    }

    fn set_uint(&self, name: &str, value: u32) -> bool {
        self.set_uniform(name, UniformValue::UInt(value))
    }

    fn set_float(&self, name: &str, value: f32) -> bool {
        self.set_uniform(name, UniformValue::Float(value))
    }

    fn set_float2(&self, name: &str, value: Vec2) -> bool {
        self.set_uniform(name, UniformValue::Float2(value))
    }

    fn set_float3(&self, name: &str, value: Vec3) -> bool {
        self.set_uniform(name, UniformValue::Float3(value))
    }

    fn set_float4(&self, name: &str, value: Vec4) -> bool {
        self.set_uniform(name, UniformValue::Float4(value))
    }

    fn set_mat2(&self, name: &str, value: Mat2) -> bool {
        self.set_uniform(name, UniformValue::Mat2(value))
    }

    fn set_mat3(&self, name: &str, value: Mat3) -> bool {
        self.set_uniform(name, UniformValue::Mat3(value))
    }

    fn set_mat4(&self, name: &str, value: Mat4) -> bool {
        self.set_uniform(name, UniformValue::Mat4(value))
    }
}

pub trait Texture {
    /// Binds to texture unit `slot`.
    fn bind(&self, slot: u32);
    fn unbind(&self);

    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Channel count of the source image (3 or 4), `0` in the zero state.
    fn channels(&self) -> u8;

    fn id(&self) -> ResourceId;
    fn as_any(&self) -> &dyn Any;

    fn is_valid(&self) -> bool {
        self.id() != 0
    }
}

/// Draw/clear entry points of the active backend.
pub trait RendererApi {
    /// One-time pipeline state: alpha blending `SRC_ALPHA / ONE_MINUS_SRC_ALPHA`.
    fn init(&self);

    fn set_clear_color(&self, color: Color);
    fn clear(&self);

    /// One indexed draw of `vertex_array` with the currently bound shader and
    /// textures, sized by its index buffer's count.
    fn draw_indexed(&self, vertex_array: &dyn VertexArray);
}
