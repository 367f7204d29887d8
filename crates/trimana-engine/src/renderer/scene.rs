use std::cell::Cell;

use glam::Mat4;

use super::camera::OrthographicCamera;
use crate::gapi::{RendererApi, Shader, VertexArray};
use crate::paint::Color;

/// Shared state of one `begin_scene` .. `end_scene` bracket.
///
/// Not `Clone`: a scene is consumed by `end_scene`, so its view-projection
/// cannot outlive the frame it was begun in.
#[must_use = "a scene must be passed to `end_scene`"]
#[derive(Debug)]
pub struct Scene {
    view_projection: Mat4,
    submissions: Cell<u32>,
}

impl Scene {
    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    /// Draws submitted so far.
    #[inline]
    pub fn submissions(&self) -> u32 {
        self.submissions.get()
    }
}

/// Stateless entry points over the active backend.
#[derive(Copy, Clone)]
pub struct Renderer<'a> {
    api: &'a dyn RendererApi,
}

impl<'a> Renderer<'a> {
    pub fn new(api: &'a dyn RendererApi) -> Self {
        Self { api }
    }

    /// One-time backend pipeline state. Called by the application at startup.
    pub fn init(&self) {
        self.api.init();
    }

    pub fn set_clear_color(&self, color: Color) {
        self.api.set_clear_color(color);
    }

    pub fn clear(&self) {
        self.api.clear();
    }

    pub fn begin_scene(&self, camera: &OrthographicCamera) -> Scene {
        self.begin_scene_with(camera.view_projection())
    }

    pub fn begin_scene_with(&self, view_projection: Mat4) -> Scene {
        Scene {
            view_projection,
            submissions: Cell::new(0),
        }
    }

    /// One indexed draw of `vertex_array` with whatever shader is bound.
    pub fn submit(&self, scene: &Scene, vertex_array: &dyn VertexArray) {
        vertex_array.bind();
        self.draw(scene, vertex_array);
    }

    /// Binds `shader`, pushes the scene's view-projection and `transform`,
    /// then issues one indexed draw.
    pub fn submit_with_shader(
        &self,
        scene: &Scene,
        shader: &dyn Shader,
        vertex_array: &dyn VertexArray,
        transform: Mat4,
    ) {
        shader.bind();
        shader.set_mat4("u_view_projection", scene.view_projection);
        shader.set_mat4("u_transform", transform);

        vertex_array.bind();
        self.draw(scene, vertex_array);
    }

    pub fn end_scene(&self, scene: Scene) {
        log::trace!("scene ended after {} draws", scene.submissions());
    }

    fn draw(&self, scene: &Scene, vertex_array: &dyn VertexArray) {
        debug_assert!(
            vertex_array.index_buffer().is_some(),
            "vertex array {} has no index buffer",
            vertex_array.id()
        );
        self.api.draw_indexed(vertex_array);
        scene.submissions.set(scene.submissions.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use glam::{Mat4, Vec3};

    use super::*;
    use crate::gapi::{
        BufferElement, BufferLayout, Graphics, ResourceKind, ShaderDataType, UniformValue,
    };
    use crate::gapi::headless::BindOp;

    const SHADER: &str = "\
@group(0) @binding(0) var<uniform> u_view_projection: mat4x4<f32>;
@group(0) @binding(1) var<uniform> u_transform: mat4x4<f32>;
#type vertex
@vertex fn vs_main() {}
#type fragment
@fragment fn fs_main() {}
";

    fn quad(gfx: &Graphics) -> Box<dyn VertexArray> {
        let mut vb = gfx.create_vertex_buffer(&[
            -0.5, -0.5, 0.0, //
            0.5, -0.5, 0.0, //
            0.5, 0.5, 0.0, //
            -0.5, 0.5, 0.0,
        ]);
        vb.set_layout(BufferLayout::new([BufferElement::new(
            ShaderDataType::Float3,
            "a_position",
        )]));

        let mut va = gfx.create_vertex_array();
        va.add_vertex_buffer(vb.into()).unwrap();
        va.set_index_buffer(gfx.create_index_buffer(&[0, 1, 2, 2, 3, 0]));
        va
    }

    // ── clear / init ──────────────────────────────────────────────────────

    #[test]
    fn init_and_clear_reach_the_backend() {
        let (gfx, probe) = Graphics::headless();
        let renderer = gfx.renderer();

        renderer.init();
        renderer.set_clear_color(Color::rgba(0.1, 0.1, 0.1, 1.0));
        renderer.clear();

        let rec = probe.recording();
        assert!(rec.initialized && rec.blending);
        assert_eq!(rec.clears, vec![Color::rgba(0.1, 0.1, 0.1, 1.0)]);
    }

    // ── submission ────────────────────────────────────────────────────────

    #[test]
    fn repeated_submits_draw_once_each_with_their_own_transform() {
        let (gfx, probe) = Graphics::headless();
        let renderer = gfx.renderer();
        let shader = gfx.create_shader_from_source("flat", SHADER);
        let va = quad(&gfx);

        let camera = OrthographicCamera::new(-1.6, 1.6, -0.9, 0.9);
        let scene = renderer.begin_scene(&camera);
        for x in 0..3 {
            let transform = Mat4::from_translation(Vec3::new(x as f32 * 0.11, 0.0, 0.0));
            renderer.submit_with_shader(&scene, shader.as_ref(), va.as_ref(), transform);
        }
        assert_eq!(scene.submissions(), 3);
        renderer.end_scene(scene);

        let draws = probe.draws();
        assert_eq!(draws.len(), 3);
        for (x, draw) in draws.iter().enumerate() {
            assert_eq!(draw.index_count, 6);
            assert_eq!(draw.shader, Some(shader.id()));
            assert_eq!(
                draw.uniform("u_view_projection"),
                Some(UniformValue::Mat4(camera.view_projection()))
            );
            assert_eq!(
                draw.uniform("u_transform"),
                Some(UniformValue::Mat4(Mat4::from_translation(Vec3::new(
                    x as f32 * 0.11,
                    0.0,
                    0.0
                ))))
            );
        }
    }

    #[test]
    fn submit_binds_the_vertex_array_before_drawing() {
        let (gfx, probe) = Graphics::headless();
        let renderer = gfx.renderer();
        let va = quad(&gfx);

        let scene = renderer.begin_scene_with(Mat4::IDENTITY);
        renderer.submit(&scene, va.as_ref());
        renderer.end_scene(scene);

        assert_eq!(
            probe.recording().binds.last(),
            Some(&BindOp::Bind(ResourceKind::VertexArray, va.id()))
        );
        let draws = probe.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].vertex_array, va.id());
        assert_eq!(draws[0].shader, None);
    }

    #[test]
    fn each_scene_carries_its_own_view_projection() {
        let (gfx, probe) = Graphics::headless();
        let renderer = gfx.renderer();
        let shader: Rc<dyn Shader> = gfx.create_shader_from_source("flat", SHADER);
        let va = quad(&gfx);

        let first = Mat4::from_scale(Vec3::splat(2.0));
        let scene = renderer.begin_scene_with(first);
        renderer.submit_with_shader(&scene, shader.as_ref(), va.as_ref(), Mat4::IDENTITY);
        renderer.end_scene(scene);

        let scene = renderer.begin_scene_with(Mat4::IDENTITY);
        renderer.submit_with_shader(&scene, shader.as_ref(), va.as_ref(), Mat4::IDENTITY);
        renderer.end_scene(scene);

        let draws = probe.draws();
        assert_eq!(draws[0].uniform("u_view_projection"), Some(UniformValue::Mat4(first)));
        assert_eq!(
            draws[1].uniform("u_view_projection"),
            Some(UniformValue::Mat4(Mat4::IDENTITY))
        );
    }
}
