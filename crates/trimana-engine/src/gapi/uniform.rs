use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

use super::error::GraphicsError;

/// Shape of a uniform value.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformKind {
    Int,
    UInt,
    Float,
    Float2,
    Float3,
    Float4,
    Mat2,
    Mat3,
    Mat4,
}

impl UniformKind {
    /// Parses a WGSL type name (`f32`, `vec3<f32>`, `vec3f`, `mat4x4<f32>`, ...).
    pub fn from_wgsl(ty: &str) -> Option<Self> {
        let ty: String = ty.chars().filter(|c| !c.is_whitespace()).collect();
        let kind = match ty.as_str() {
            "i32" => Self::Int,
            "u32" => Self::UInt,
            "f32" => Self::Float,
            "vec2<f32>" | "vec2f" => Self::Float2,
            "vec3<f32>" | "vec3f" => Self::Float3,
            "vec4<f32>" | "vec4f" => Self::Float4,
            "mat2x2<f32>" | "mat2x2f" => Self::Mat2,
            "mat3x3<f32>" | "mat3x3f" => Self::Mat3,
            "mat4x4<f32>" | "mat4x4f" => Self::Mat4,
            _ => return None,
        };
        Some(kind)
    }

    /// Byte size in the WGSL uniform address space.
    ///
    /// `mat3x3` columns are padded to 16 bytes.
    pub const fn gpu_size(self) -> u64 {
        match self {
            Self::Int | Self::UInt | Self::Float => 4,
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 | Self::Mat2 => 16,
            Self::Mat3 => 48,
            Self::Mat4 => 64,
        }
    }
}

/// A value written through one of the `Shader::set_*` setters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    UInt(u32),
    Float(f32),
    Float2(Vec2),
    Float3(Vec3),
    Float4(Vec4),
    Mat2(Mat2),
    Mat3(Mat3),
    Mat4(Mat4),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            Self::Int(_) => UniformKind::Int,
            Self::UInt(_) => UniformKind::UInt,
            Self::Float(_) => UniformKind::Float,
            Self::Float2(_) => UniformKind::Float2,
            Self::Float3(_) => UniformKind::Float3,
            Self::Float4(_) => UniformKind::Float4,
            Self::Mat2(_) => UniformKind::Mat2,
            Self::Mat3(_) => UniformKind::Mat3,
            Self::Mat4(_) => UniformKind::Mat4,
        }
    }

    /// Appends the uniform-address-space bytes of this value to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Self::Int(v) => out.extend_from_slice(bytemuck::bytes_of(v)),
            Self::UInt(v) => out.extend_from_slice(bytemuck::bytes_of(v)),
            Self::Float(v) => out.extend_from_slice(bytemuck::bytes_of(v)),
            Self::Float2(v) => out.extend_from_slice(bytemuck::bytes_of(v)),
            Self::Float3(v) => out.extend_from_slice(bytemuck::bytes_of(v)),
            Self::Float4(v) => out.extend_from_slice(bytemuck::bytes_of(v)),
            Self::Mat2(m) => out.extend_from_slice(bytemuck::cast_slice(&m.to_cols_array())),
            Self::Mat3(m) => {
                for col in [m.x_axis, m.y_axis, m.z_axis] {
                    out.extend_from_slice(bytemuck::cast_slice(&col.extend(0.0).to_array()));
                }
            }
            Self::Mat4(m) => out.extend_from_slice(bytemuck::cast_slice(&m.to_cols_array())),
        }
    }
}

/// A uniform declared by a shader's source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformDecl {
    pub name: String,
    /// Binding index inside group 0; doubles as the uniform location.
    pub binding: u32,
    pub kind: UniformKind,
}

#[derive(Debug, Clone)]
pub(crate) struct UniformSlot {
    pub decl: UniformDecl,
    pub value: Option<UniformValue>,
}

/// CPU-side uniform storage of one shader program.
///
/// Writes are validated against the declarations; a rejected write leaves
/// every slot untouched.
#[derive(Debug, Clone, Default)]
pub(crate) struct UniformBlock {
    slots: Vec<UniformSlot>,
}

impl UniformBlock {
    pub fn new(decls: Vec<UniformDecl>) -> Self {
        Self {
            slots: decls
                .into_iter()
                .map(|decl| UniformSlot { decl, value: None })
                .collect(),
        }
    }

    pub fn location(&self, name: &str) -> Option<u32> {
        self.find(name).map(|s| s.decl.binding)
    }

    pub fn write(
        &mut self,
        shader: &str,
        name: &str,
        value: UniformValue,
    ) -> Result<(), GraphicsError> {
        let not_found = || GraphicsError::UniformNotFound {
            shader: shader.to_string(),
            name: name.to_string(),
        };
        let location = self.location(name).ok_or_else(not_found)?;
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.decl.binding == location)
            .ok_or_else(not_found)?;

        if slot.decl.kind != value.kind() {
            return Err(GraphicsError::UniformTypeMismatch {
                shader: shader.to_string(),
                name: name.to_string(),
                declared: slot.decl.kind,
                written: value.kind(),
            });
        }

        slot.value = Some(value);
        Ok(())
    }

    /// `write`, with failures logged and flattened to `false`.
    pub fn set(&mut self, shader: &str, name: &str, value: UniformValue) -> bool {
        match self.write(shader, name, value) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    pub fn value(&self, name: &str) -> Option<UniformValue> {
        self.find(name).and_then(|s| s.value)
    }

    pub fn slots(&self) -> &[UniformSlot] {
        &self.slots
    }

    /// Every written uniform, in declaration order.
    pub fn snapshot(&self) -> Vec<(String, UniformValue)> {
        self.slots
            .iter()
            .filter_map(|s| s.value.map(|v| (s.decl.name.clone(), v)))
            .collect()
    }

    fn find(&self, name: &str) -> Option<&UniformSlot> {
        self.slots.iter().find(|s| s.decl.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> UniformBlock {
        UniformBlock::new(vec![
            UniformDecl { name: "u_view_projection".into(), binding: 0, kind: UniformKind::Mat4 },
            UniformDecl { name: "u_color".into(), binding: 2, kind: UniformKind::Float4 },
        ])
    }

    #[test]
    fn wgsl_type_names() {
        assert_eq!(UniformKind::from_wgsl("vec4<f32>"), Some(UniformKind::Float4));
        assert_eq!(UniformKind::from_wgsl("vec3f"), Some(UniformKind::Float3));
        assert_eq!(UniformKind::from_wgsl("mat4x4< f32 >"), Some(UniformKind::Mat4));
        assert_eq!(UniformKind::from_wgsl("texture_2d<f32>"), None);
    }

    #[test]
    fn location_is_binding() {
        let b = block();
        assert_eq!(b.location("u_color"), Some(2));
        assert_eq!(b.location("u_missing"), None);
    }

    #[test]
    fn write_lands_in_the_slot_at_its_location() {
        let mut b = block();
        assert!(b.set("flat", "u_color", UniformValue::Float4(Vec4::X)));

        let written: Vec<u32> = b
            .slots()
            .iter()
            .filter(|s| s.value.is_some())
            .map(|s| s.decl.binding)
            .collect();
        assert_eq!(written, [2]);
    }

    #[test]
    fn missing_name_is_rejected_without_mutation() {
        let mut b = block();
        assert!(b.set("flat", "u_color", UniformValue::Float4(Vec4::ONE)));

        assert!(!b.set("flat", "u_missing", UniformValue::Float4(Vec4::ZERO)));

        assert_eq!(b.value("u_color"), Some(UniformValue::Float4(Vec4::ONE)));
        assert_eq!(b.value("u_view_projection"), None);
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let mut b = block();
        let err = b.write("flat", "u_color", UniformValue::Float(1.0)).unwrap_err();
        assert!(matches!(err, GraphicsError::UniformTypeMismatch { .. }));
        assert_eq!(b.value("u_color"), None);
    }

    #[test]
    fn mat3_encodes_padded_columns() {
        let mut out = Vec::new();
        UniformValue::Mat3(Mat3::IDENTITY).encode(&mut out);
        assert_eq!(out.len() as u64, UniformKind::Mat3.gpu_size());

        let floats: Vec<f32> = bytemuck::pod_collect_to_vec(&out);
        assert_eq!(&floats[0..4], &[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(&floats[4..8], &[0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn encoded_sizes_match_declared_sizes() {
        let values = [
            UniformValue::Int(1),
            UniformValue::Float2(Vec2::ONE),
            UniformValue::Float3(Vec3::ONE),
            UniformValue::Mat2(Mat2::IDENTITY),
            UniformValue::Mat4(Mat4::IDENTITY),
        ];
        for v in values {
            let mut out = Vec::new();
            v.encode(&mut out);
            assert_eq!(out.len() as u64, v.kind().gpu_size(), "{:?}", v.kind());
        }
    }
}
