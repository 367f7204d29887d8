//! Shader source loading, `#type` stage splitting and WGSL declaration
//! reflection. Pure text processing shared by every backend.

use std::path::{Path, PathBuf};

use super::error::GraphicsError;
use super::uniform::{UniformDecl, UniformKind};

const STAGE_MARKER: &str = "#type";

/// Where a shader program's text comes from.
#[derive(Debug, Clone, Copy)]
pub enum ShaderOrigin<'a> {
    /// One file split into stages by `#type` markers.
    File(&'a Path),
    /// One file per stage, no markers.
    Files { vertex: &'a Path, fragment: &'a Path },
    /// In-memory text with `#type` markers.
    Source(&'a str),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
}

impl ShaderStage {
    /// Accepts `pixel` as an alias for `fragment`.
    pub fn from_marker(name: &str) -> Option<Self> {
        match name {
            "vertex" => Some(Self::Vertex),
            "fragment" | "pixel" => Some(Self::Fragment),
            "geometry" => Some(Self::Geometry),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
            Self::Geometry => "geometry",
        }
    }
}

/// Per-stage source text of one program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
    pub geometry: Option<String>,
}

impl ShaderSources {
    pub fn stages(&self) -> impl Iterator<Item = (ShaderStage, &str)> {
        [
            Some((ShaderStage::Vertex, self.vertex.as_str())),
            Some((ShaderStage::Fragment, self.fragment.as_str())),
            self.geometry.as_deref().map(|g| (ShaderStage::Geometry, g)),
        ]
        .into_iter()
        .flatten()
    }
}

/// Reads and splits the program text described by `origin`.
pub fn load(shader: &str, origin: ShaderOrigin<'_>) -> Result<ShaderSources, GraphicsError> {
    match origin {
        ShaderOrigin::File(path) => preprocess(shader, &read(path)?),
        ShaderOrigin::Files { vertex, fragment } => Ok(ShaderSources {
            vertex: read(vertex)?,
            fragment: read(fragment)?,
            geometry: None,
        }),
        ShaderOrigin::Source(text) => preprocess(shader, text),
    }
}

fn read(path: &Path) -> Result<String, GraphicsError> {
    if !path.is_file() {
        return Err(GraphicsError::ShaderFileMissing(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|source| GraphicsError::ShaderFileRead {
        path: PathBuf::from(path),
        source,
    })
}

/// Splits `text` on `#type <stage>` lines.
///
/// Text before the first marker is a prelude prepended to every stage. Both a
/// vertex and a fragment stage are required; a stage may appear once.
pub fn preprocess(shader: &str, text: &str) -> Result<ShaderSources, GraphicsError> {
    let syntax = |message: String| GraphicsError::ShaderSyntax {
        shader: shader.to_string(),
        message,
    };

    let mut prelude = String::new();
    let mut blocks: Vec<(ShaderStage, String)> = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        if let Some(rest) = line.trim_start().strip_prefix(STAGE_MARKER) {
            let name = rest.trim();
            let stage = ShaderStage::from_marker(name).ok_or_else(|| {
                syntax(format!("line {}: unknown stage `{name}`", line_no + 1))
            })?;
            if blocks.iter().any(|(s, _)| *s == stage) {
                return Err(syntax(format!("duplicate {} stage", stage.label())));
            }
            blocks.push((stage, prelude.clone()));
            continue;
        }

        let target = match blocks.last_mut() {
            Some((_, body)) => body,
            None => &mut prelude,
        };
        target.push_str(line);
        target.push('\n');
    }

    if blocks.is_empty() {
        return Err(syntax(format!("no `{STAGE_MARKER}` marker")));
    }

    let mut take = |stage: ShaderStage| {
        blocks
            .iter()
            .position(|(s, _)| *s == stage)
            .map(|i| blocks.swap_remove(i).1)
    };

    let vertex = take(ShaderStage::Vertex).ok_or_else(|| syntax("missing vertex stage".into()))?;
    let fragment =
        take(ShaderStage::Fragment).ok_or_else(|| syntax("missing fragment stage".into()))?;
    let geometry = take(ShaderStage::Geometry);

    Ok(ShaderSources {
        vertex,
        fragment,
        geometry,
    })
}

// ── reflection ────────────────────────────────────────────────────────────

/// One `var` declaration with its resource attributes.
struct VarDecl<'a> {
    group: Option<u32>,
    binding: Option<u32>,
    address_space: Option<&'a str>,
    name: &'a str,
    ty: &'a str,
}

fn strip_comments(src: &str) -> String {
    src.lines()
        .map(|l| l.split("//").next().unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n")
}

fn attribute(statement: &str, attr: &str) -> Option<u32> {
    let start = statement.find(attr)? + attr.len();
    let rest = statement[start..].trim_start().strip_prefix('(')?;
    let end = rest.find(')')?;
    rest[..end].trim().parse().ok()
}

fn var_decls(src: &str) -> Vec<VarDecl<'_>> {
    src.split(';')
        .filter_map(|statement| {
            // Only module-scope resource declarations carry a binding.
            let binding_at = statement.find("@binding")?;
            let var_at = binding_at + statement[binding_at..].find("var")?;
            let before = &statement[..var_at];
            let mut rest = &statement[var_at + 3..];

            let mut address_space = None;
            if let Some(inner) = rest.trim_start().strip_prefix('<') {
                let close = inner.find('>')?;
                address_space = Some(inner[..close].trim());
                rest = &inner[close + 1..];
            }

            let (name, ty) = rest.split_once(':')?;
            Some(VarDecl {
                group: attribute(before, "@group"),
                binding: attribute(before, "@binding"),
                address_space,
                name: name.trim(),
                ty: ty.trim(),
            })
        })
        .collect()
}

/// Collects `@group(0) @binding(N) var<uniform> name: type;` declarations
/// across every stage, deduplicated by name.
pub fn reflect_uniforms(shader: &str, sources: &ShaderSources) -> Vec<UniformDecl> {
    let mut decls: Vec<UniformDecl> = Vec::new();

    for (_, src) in sources.stages() {
        let src = strip_comments(src);
        for var in var_decls(&src) {
            if var.address_space != Some("uniform") {
                continue;
            }
            if decls.iter().any(|d| d.name == var.name) {
                continue;
            }
            let (Some(0), Some(binding)) = (var.group, var.binding) else {
                log::warn!("shader `{shader}`: uniform `{}` is not in group 0; ignored", var.name);
                continue;
            };
            let Some(kind) = UniformKind::from_wgsl(var.ty) else {
                log::warn!(
                    "shader `{shader}`: uniform `{}` has unsupported type `{}`; ignored",
                    var.name,
                    var.ty
                );
                continue;
            };
            decls.push(UniformDecl {
                name: var.name.to_string(),
                binding,
                kind,
            });
        }
    }

    decls.sort_by_key(|d| d.binding);
    decls
}

/// Texture slots declared as `@group(1) @binding(2 * slot) var name: texture_2d<f32>;`.
///
/// The sampler for slot `s` lives at binding `2 * s + 1`.
pub fn reflect_texture_slots(sources: &ShaderSources) -> Vec<u32> {
    let mut slots: Vec<u32> = Vec::new();

    for (_, src) in sources.stages() {
        let src = strip_comments(src);
        for var in var_decls(&src) {
            if var.address_space.is_some() || !var.ty.starts_with("texture_2d") {
                continue;
            }
            if let (Some(1), Some(binding)) = (var.group, var.binding) {
                if binding % 2 == 0 && !slots.contains(&(binding / 2)) {
                    slots.push(binding / 2);
                }
            }
        }
    }

    slots.sort_unstable();
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAT: &str = "\
@group(0) @binding(0) var<uniform> u_view_projection: mat4x4<f32>;
@group(0) @binding(1) var<uniform> u_transform: mat4x4<f32>;
#type vertex
@vertex fn vs_main(@location(0) p: vec3<f32>) -> @builtin(position) vec4<f32> {
    return u_view_projection * u_transform * vec4<f32>(p, 1.0);
}
#type pixel
@group(0) @binding(2) var<uniform> u_color: vec4<f32>;
@fragment fn fs_main() -> @location(0) vec4<f32> { return u_color; }
";

    // ── preprocess ────────────────────────────────────────────────────────

    #[test]
    fn splits_stages_and_prepends_prelude() {
        let s = preprocess("flat", FLAT).unwrap();

        assert!(s.vertex.starts_with("@group(0) @binding(0)"));
        assert!(s.vertex.contains("fn vs_main"));
        assert!(!s.vertex.contains("fn fs_main"));

        assert!(s.fragment.contains("u_transform: mat4x4<f32>"));
        assert!(s.fragment.contains("fn fs_main"));
        assert!(!s.fragment.contains("#type"));
        assert_eq!(s.geometry, None);
    }

    #[test]
    fn missing_marker_is_a_syntax_error() {
        let err = preprocess("bad", "@vertex fn vs_main() {}").unwrap_err();
        assert!(matches!(err, GraphicsError::ShaderSyntax { .. }));
    }

    #[test]
    fn unknown_stage_is_a_syntax_error() {
        let err = preprocess("bad", "#type compute\nfn main() {}").unwrap_err();
        assert!(err.to_string().contains("unknown stage `compute`"));
    }

    #[test]
    fn missing_fragment_is_a_syntax_error() {
        let err = preprocess("bad", "#type vertex\nfn a() {}").unwrap_err();
        assert!(err.to_string().contains("missing fragment stage"));
    }

    #[test]
    fn geometry_stage_is_kept() {
        let s = preprocess("g", "#type vertex\nA\n#type geometry\nB\n#type fragment\nC\n").unwrap();
        assert_eq!(s.vertex, "A\n");
        assert_eq!(s.geometry.as_deref(), Some("B\n"));
        assert_eq!(s.fragment, "C\n");
    }

    #[test]
    fn missing_file_is_reported() {
        let path = std::env::temp_dir().join("trimana-no-such-shader.wgsl");
        let err = load("ghost", ShaderOrigin::File(&path)).unwrap_err();
        assert!(matches!(err, GraphicsError::ShaderFileMissing(_)));
    }

    // ── reflection ────────────────────────────────────────────────────────

    #[test]
    fn reflects_uniforms_across_stages() {
        let s = preprocess("flat", FLAT).unwrap();
        let decls = reflect_uniforms("flat", &s);

        let names: Vec<(&str, u32)> = decls.iter().map(|d| (d.name.as_str(), d.binding)).collect();
        assert_eq!(
            names,
            vec![("u_view_projection", 0), ("u_transform", 1), ("u_color", 2)]
        );
        assert_eq!(decls[2].kind, UniformKind::Float4);
    }

    #[test]
    fn commented_declarations_are_ignored() {
        let s = ShaderSources {
            vertex: "// @group(0) @binding(3) var<uniform> u_old: f32;\n".into(),
            fragment: String::new(),
            geometry: None,
        };
        assert!(reflect_uniforms("c", &s).is_empty());
    }

    #[test]
    fn reflects_texture_slots() {
        let s = ShaderSources {
            vertex: String::new(),
            fragment: "\
@group(1) @binding(0) var u_texture: texture_2d<f32>;
@group(1) @binding(1) var u_sampler: sampler;
@group(1) @binding(2) var u_mask: texture_2d<f32>;
@group(1) @binding(3) var u_mask_sampler: sampler;
"
            .into(),
            geometry: None,
        };
        assert_eq!(reflect_texture_slots(&s), vec![0, 1]);
    }
}
