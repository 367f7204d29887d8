use std::rc::Rc;

use glam::{Mat4, Vec4};

use super::headless::{BindOp, HeadlessProbe};
use super::texture_file::test_images;
use super::*;

const FLAT_COLOR: &str = "\
@group(0) @binding(0) var<uniform> u_view_projection: mat4x4<f32>;
@group(0) @binding(1) var<uniform> u_transform: mat4x4<f32>;
@group(0) @binding(2) var<uniform> u_color: vec4<f32>;

#type vertex
@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return u_view_projection * u_transform * vec4<f32>(position, 1.0);
}

#type fragment
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return u_color;
}
";

fn headless() -> (Graphics, HeadlessProbe) {
    Graphics::headless()
}

fn buffer_with(gfx: &Graphics, layout: BufferLayout) -> Rc<dyn VertexBuffer> {
    let mut vb = gfx.create_vertex_buffer(&[0.0; 16]);
    vb.set_layout(layout);
    vb.into()
}

// ── resource lifetime ─────────────────────────────────────────────────────

#[test]
fn dropping_buffers_releases_every_handle() {
    let (gfx, probe) = headless();

    let buffers: Vec<_> = (0..8).map(|_| gfx.create_vertex_buffer(&[1.0, 2.0, 3.0])).collect();
    assert_eq!(probe.resource_counts().vertex_buffers, 8);

    drop(buffers);
    assert_eq!(probe.resource_counts().total(), 0);
}

#[test]
fn vertex_array_keeps_shared_buffers_alive() {
    let (gfx, probe) = headless();
    let layout = BufferLayout::new([BufferElement::new(ShaderDataType::Float3, "a_position")]);

    let vb = buffer_with(&gfx, layout);
    let ib = gfx.create_index_buffer(&[0, 1, 2]);
    let mut va = gfx.create_vertex_array();
    va.add_vertex_buffer(Rc::clone(&vb)).unwrap();
    va.set_index_buffer(ib);

    drop(vb);
    assert_eq!(probe.resource_counts().vertex_buffers, 1);
    assert_eq!(probe.resource_counts().index_buffers, 1);

    drop(va);
    assert_eq!(probe.resource_counts(), ResourceCounts::default());
}

// ── vertex arrays ─────────────────────────────────────────────────────────

#[test]
fn attribute_slots_continue_across_buffers() {
    let (gfx, probe) = headless();
    use ShaderDataType::*;

    let first = buffer_with(
        &gfx,
        BufferLayout::new([
            BufferElement::new(Float3, "a_position"),
            BufferElement::new(Float2, "a_texcoord"),
            BufferElement::new(Float4, "a_color"),
        ]),
    );
    let second = buffer_with(
        &gfx,
        BufferLayout::new([
            BufferElement::new(Float, "a_weight"),
            BufferElement::new(UInt, "a_id"),
        ]),
    );
    let (first_id, second_id) = (first.id(), second.id());

    let mut va = gfx.create_vertex_array();
    va.add_vertex_buffer(first).unwrap();
    va.add_vertex_buffer(second).unwrap();

    let slots: Vec<(u32, usize)> = va.attributes().iter().map(|a| (a.location, a.buffer_index)).collect();
    assert_eq!(slots, vec![(0, 0), (1, 0), (2, 0), (3, 1), (4, 1)]);

    let pointers = probe.attribute_pointers();
    let recorded: Vec<(u32, u32)> = pointers.iter().map(|p| (p.location, p.buffer)).collect();
    assert_eq!(
        recorded,
        vec![
            (0, first_id),
            (1, first_id),
            (2, first_id),
            (3, second_id),
            (4, second_id)
        ]
    );

    // stride and offsets come from each buffer's own layout
    assert_eq!(pointers[2].stride, 36);
    assert_eq!(pointers[2].offset, 20);
    assert_eq!(pointers[4].stride, 8);
    assert_eq!(pointers[4].offset, 4);
}

#[test]
fn empty_layout_is_rejected() {
    let (gfx, probe) = headless();
    let vb = buffer_with(&gfx, BufferLayout::default());

    let mut va = gfx.create_vertex_array();
    let err = va.add_vertex_buffer(vb).unwrap_err();

    assert!(matches!(err, GraphicsError::EmptyLayout { .. }));
    assert!(va.vertex_buffers().is_empty());
    assert!(probe.attribute_pointers().is_empty());
}

// ── shaders ───────────────────────────────────────────────────────────────

#[test]
fn unknown_uniform_returns_false_and_keeps_other_values() {
    let (gfx, _probe) = headless();
    let shader = gfx.create_shader_from_source("flat", FLAT_COLOR);
    assert!(shader.is_valid());

    let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
    assert!(shader.set_float4("u_color", red));
    assert!(shader.set_mat4("u_transform", Mat4::IDENTITY));

    assert!(!shader.set_float4("u_tint", Vec4::ONE));
    assert!(!shader.set_float("u_color", 0.5));

    assert_eq!(shader.uniform_value("u_color"), Some(UniformValue::Float4(red)));
    assert_eq!(shader.uniform_value("u_transform"), Some(UniformValue::Mat4(Mat4::IDENTITY)));
    assert_eq!(shader.uniform_value("u_tint"), None);
}

#[test]
fn missing_shader_file_leaves_zero_state() {
    let (gfx, probe) = headless();
    let shader = gfx.create_shader("ghost", std::env::temp_dir().join("trimana-ghost.glsl"));

    assert!(!shader.is_valid());
    assert_eq!(shader.id(), 0);
    assert_eq!(shader.name(), "ghost");
    assert!(!shader.set_mat4("u_transform", Mat4::IDENTITY));
    assert_eq!(probe.resource_counts().shaders, 0);
}

#[test]
fn failed_compile_keeps_handle_but_is_unusable() {
    let (gfx, probe) = headless();
    let shader = gfx.create_shader_from_source("broken", "#type vertex\n@vertex fn v() {}\n#type fragment\nfn f() {}\n");

    assert!(!shader.is_valid());
    assert_ne!(shader.id(), 0);
    assert_eq!(probe.resource_counts().shaders, 1);
}

#[test]
fn shader_pair_from_separate_files() {
    let dir = std::env::temp_dir();
    let vertex = dir.join(format!("trimana-{}-pair.vert.wgsl", std::process::id()));
    let fragment = dir.join(format!("trimana-{}-pair.frag.wgsl", std::process::id()));
    std::fs::write(&vertex, "@group(0) @binding(0) var<uniform> u_scale: f32;\n@vertex fn vs_main() {}\n").unwrap();
    std::fs::write(&fragment, "@fragment fn fs_main() {}\n").unwrap();

    let (gfx, _probe) = headless();
    let shader = gfx.create_shader_from_files("pair", &vertex, &fragment);

    assert!(shader.is_valid());
    assert!(shader.set_float("u_scale", 2.0));
}

#[test]
fn library_rejects_duplicate_names() {
    let (gfx, _probe) = headless();
    let mut library = ShaderLibrary::new();

    assert!(library.add(gfx.create_shader_from_source("flat", FLAT_COLOR)));
    assert!(!library.add(gfx.create_shader_from_source("flat", FLAT_COLOR)));
    assert!(library.exists("flat"));
    assert_eq!(library.len(), 1);
    assert!(library.get("textured").is_none());
}

#[test]
fn loading_a_taken_name_returns_the_registered_shader() {
    let path = std::env::temp_dir().join(format!("trimana-{}-library.wgsl", std::process::id()));
    std::fs::write(&path, FLAT_COLOR).unwrap();

    let (gfx, probe) = headless();
    let mut library = ShaderLibrary::new();

    let first = library.load(&gfx, "flat", &path);
    let again = library.load(&gfx, "flat", "does/not/exist.wgsl");

    assert!(Rc::ptr_eq(&first, &again));
    assert!(again.is_valid());
    assert_eq!(probe.resource_counts().shaders, 1);
    assert_eq!(library.len(), 1);
}

// ── textures ──────────────────────────────────────────────────────────────

#[test]
fn texture_reports_decoded_dimensions() {
    let (gfx, probe) = headless();
    let path = test_images::write_rgb_png("gapi-texture");

    let texture = gfx.create_texture_2d(&path, TextureOptions::default());
    assert!(texture.is_valid());
    assert_eq!((texture.width(), texture.height(), texture.channels()), (2, 2, 3));
    assert_eq!(probe.resource_counts().textures, 1);

    texture.bind(3);
    assert_eq!(
        probe.recording().binds.last(),
        Some(&BindOp::BindTexture { slot: 3, id: texture.id() })
    );
}

#[test]
fn unsupported_texture_leaves_zero_state() {
    let (gfx, probe) = headless();
    let path = test_images::write_gray_png("gapi-gray");

    let texture = gfx.create_texture_2d(&path, TextureOptions::default());
    assert!(!texture.is_valid());
    assert_eq!((texture.width(), texture.height(), texture.channels()), (0, 0, 0));
    assert_eq!(probe.resource_counts().textures, 0);
}
