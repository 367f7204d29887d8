use std::fmt;

/// Element type of one vertex attribute.
///
/// Every variant fits a single attribute slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderDataType {
    Float,
    Float2,
    Float3,
    Float4,
    Int,
    Int2,
    Int3,
    Int4,
    UInt,
    UInt2,
    UInt3,
    UInt4,
}

impl ShaderDataType {
    /// Number of scalar components (1–4).
    pub const fn components(self) -> u32 {
        match self {
            Self::Float | Self::Int | Self::UInt => 1,
            Self::Float2 | Self::Int2 | Self::UInt2 => 2,
            Self::Float3 | Self::Int3 | Self::UInt3 => 3,
            Self::Float4 | Self::Int4 | Self::UInt4 => 4,
        }
    }

    /// Byte size of one element. All scalar kinds are 4 bytes wide.
    pub const fn size(self) -> u32 {
        4 * self.components()
    }

    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::Float2 | Self::Float3 | Self::Float4)
    }
}

/// One attribute inside a vertex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BufferElement {
    pub name: String,
    pub data_type: ShaderDataType,
    pub components: u32,
    pub size: u32,
    /// Assigned by `BufferLayout::new`.
    pub offset: u32,
    pub normalized: bool,
}

impl BufferElement {
    pub fn new(data_type: ShaderDataType, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type,
            components: data_type.components(),
            size: data_type.size(),
            offset: 0,
            normalized: false,
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalized = true;
        self
    }
}

/// Ordered vertex attribute description plus derived stride.
///
/// Offsets come from a single left-to-right prefix sum at construction; the
/// final running total is the stride. An empty layout has stride 0 and is
/// rejected by `VertexArray::add_vertex_buffer`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BufferLayout {
    elements: Vec<BufferElement>,
    stride: u32,
}

impl BufferLayout {
    pub fn new(elements: impl IntoIterator<Item = BufferElement>) -> Self {
        let mut elements: Vec<BufferElement> = elements.into_iter().collect();

        let mut offset = 0;
        for element in &mut elements {
            element.offset = offset;
            offset += element.size;
        }

        Self {
            elements,
            stride: offset,
        }
    }

    #[inline]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    #[inline]
    pub fn elements(&self) -> &[BufferElement] {
        &self.elements
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BufferElement> {
        self.elements.iter()
    }
}

impl FromIterator<BufferElement> for BufferLayout {
    fn from_iter<I: IntoIterator<Item = BufferElement>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a BufferLayout {
    type Item = &'a BufferElement;
    type IntoIter = std::slice::Iter<'a, BufferElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for BufferLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, e) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:?}@{}", e.name, e.data_type, e.offset)?;
        }
        write!(f, "] stride {}", self.stride)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ShaderDataType::*;

    #[test]
    fn position_color_layout() {
        let layout = BufferLayout::new([
            BufferElement::new(Float3, "a_position"),
            BufferElement::new(Float4, "a_color"),
        ]);

        let offsets: Vec<u32> = layout.iter().map(|e| e.offset).collect();
        assert_eq!(offsets, vec![0, 12]);
        assert_eq!(layout.stride(), 28);
    }

    #[test]
    fn offsets_are_prefix_sums_of_sizes() {
        let types = [Float2, Int, Float4, UInt3, Float];
        let layout: BufferLayout = types
            .iter()
            .enumerate()
            .map(|(i, t)| BufferElement::new(*t, format!("e{i}")))
            .collect();

        let mut running = 0;
        for (element, t) in layout.iter().zip(types) {
            assert_eq!(element.offset, running);
            assert_eq!(element.size, t.size());
            assert_eq!(element.components, t.components());
            running += t.size();
        }
        assert_eq!(layout.stride(), running);
    }

    #[test]
    fn empty_layout_has_zero_stride() {
        let layout = BufferLayout::new(Vec::new());
        assert!(layout.is_empty());
        assert_eq!(layout.stride(), 0);
    }

    #[test]
    fn normalized_flag_is_kept() {
        let layout = BufferLayout::new([BufferElement::new(UInt4, "a_color").normalized()]);
        assert!(layout.elements()[0].normalized);
    }
}
