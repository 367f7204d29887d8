use std::path::PathBuf;

use thiserror::Error;

use super::uniform::UniformKind;

/// Failures inside the graphics resource layer.
///
/// Resource constructors log these and fall back to a zero-state resource;
/// only `VertexArray::add_vertex_buffer` hands one back to the caller.
#[derive(Debug, Error)]
pub enum GraphicsError {
    #[error("shader file not found: {0}")]
    ShaderFileMissing(PathBuf),

    #[error("failed to read shader file {path}: {source}")]
    ShaderFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("shader `{shader}`: {message}")]
    ShaderSyntax { shader: String, message: String },

    #[error("shader `{shader}` failed to compile ({stage} stage): {diagnostic}")]
    ShaderCompile {
        shader: String,
        stage: &'static str,
        diagnostic: String,
    },

    #[error("failed to decode texture {path}: {source}")]
    TextureDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("texture {path} has {channels} channels; only 3 and 4 are supported")]
    UnsupportedChannels { path: PathBuf, channels: u8 },

    #[error("vertex buffer {buffer} has an empty layout")]
    EmptyLayout { buffer: u32 },

    #[error("uniform `{name}` not found in shader `{shader}`")]
    UniformNotFound { shader: String, name: String },

    #[error("uniform `{name}` in shader `{shader}` is {declared:?}, got {written:?}")]
    UniformTypeMismatch {
        shader: String,
        name: String,
        declared: UniformKind,
        written: UniformKind,
    },
}
