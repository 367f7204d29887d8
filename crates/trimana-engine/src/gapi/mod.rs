//! Graphics resource abstraction.
//!
//! Backend-neutral interfaces for buffers, vertex arrays, shaders and
//! textures, one implementation of each per backend, and the `Graphics`
//! factory that picks the backend once at startup.
//!
//! Ownership model:
//! - every resource owns one native handle, released on drop
//! - vertex arrays share their buffers through `Rc`; buffers never point back
//! - shaders and textures are handed out as `Rc` so layers can share them

mod error;
mod graphics;
pub mod gpu;
pub mod headless;
mod layout;
mod resources;
mod shader_library;
mod shader_source;
mod texture_file;
mod tracker;
mod uniform;
mod vertex_array;

pub use error::GraphicsError;
pub use gpu::{GpuInit, SurfaceErrorAction};
pub use graphics::{Graphics, GraphicsApi};
pub use layout::{BufferElement, BufferLayout, ShaderDataType};
pub use resources::{IndexBuffer, RendererApi, Shader, Texture, VertexArray, VertexBuffer};
pub use shader_library::ShaderLibrary;
pub use shader_source::{preprocess, ShaderOrigin, ShaderSources, ShaderStage};
pub use texture_file::{TextureFilter, TextureOptions, TextureWrap};
pub use tracker::{ResourceCounts, ResourceId, ResourceKind};
pub use uniform::{UniformDecl, UniformKind, UniformValue};
pub use vertex_array::AttributeSlot;

#[cfg(test)]
mod tests;
