use std::path::PathBuf;
use std::rc::Rc;

use glam::{Mat4, Vec3, Vec4};
use trimana_engine::events::{Event, EventDispatcher, KeyPress, MouseScroll, WindowResize};
use trimana_engine::gapi::{
    BufferElement, BufferLayout, Graphics, ShaderDataType, ShaderLibrary, Texture, TextureOptions,
    VertexArray,
};
use trimana_engine::input::Key;
use trimana_engine::layers::{FrameCtx, Layer};
use trimana_engine::renderer::OrthographicCamera;

const CAMERA_SPEED: f32 = 1.0;
/// Degrees per second.
const CAMERA_ROTATION_SPEED: f32 = 30.0;

const GRID: u32 = 20;
const GRID_SPACING: f32 = 0.11;
const GRID_SCALE: f32 = 0.1;

const PALETTE: [Vec4; 3] = [
    Vec4::new(0.2, 0.3, 0.8, 1.0),
    Vec4::new(0.8, 0.3, 0.2, 1.0),
    Vec4::new(0.3, 0.8, 0.4, 1.0),
];

#[rustfmt::skip]
const SQUARE_VERTICES: [f32; 36] = [
    // position          texcoord    color
    -0.5, -0.5, 0.0,     0.0, 0.0,   0.2, 0.3, 0.8, 1.0,
     0.5, -0.5, 0.0,     1.0, 0.0,   0.2, 0.3, 0.8, 1.0,
     0.5,  0.5, 0.0,     1.0, 1.0,   0.2, 0.3, 0.8, 1.0,
    -0.5,  0.5, 0.0,     0.0, 1.0,   0.2, 0.3, 0.8, 1.0,
];

const SQUARE_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// A grid of flat-colored squares plus one textured square, seen through a
/// movable orthographic camera.
pub struct ExampleLayer {
    assets: PathBuf,

    shaders: ShaderLibrary,
    texture: Option<Rc<dyn Texture>>,
    square: Option<Box<dyn VertexArray>>,

    camera: OrthographicCamera,
    camera_position: Vec3,
    camera_rotation: f32,
    aspect_ratio: f32,
    zoom: f32,

    palette_index: usize,
}

impl ExampleLayer {
    pub fn new(assets: PathBuf, aspect_ratio: f32) -> Self {
        let zoom = 1.0;
        Self {
            assets,
            shaders: ShaderLibrary::new(),
            texture: None,
            square: None,
            camera: OrthographicCamera::new(
                -aspect_ratio * zoom,
                aspect_ratio * zoom,
                -zoom,
                zoom,
            ),
            camera_position: Vec3::ZERO,
            camera_rotation: 0.0,
            aspect_ratio,
            zoom,
            palette_index: 0,
        }
    }

    fn update_projection(&mut self) {
        let (w, h) = (self.aspect_ratio * self.zoom, self.zoom);
        self.camera.set_projection(-w, w, -h, h);
    }

    fn build_square(graphics: &Graphics) -> Option<Box<dyn VertexArray>> {
        let mut vb = graphics.create_vertex_buffer(&SQUARE_VERTICES);
        vb.set_layout(BufferLayout::new([
            BufferElement::new(ShaderDataType::Float3, "a_position"),
            BufferElement::new(ShaderDataType::Float2, "a_texcoord"),
            BufferElement::new(ShaderDataType::Float4, "a_color"),
        ]));

        let mut va = graphics.create_vertex_array();
        if let Err(err) = va.add_vertex_buffer(vb.into()) {
            log::error!("square geometry: {err}");
            return None;
        }
        va.set_index_buffer(graphics.create_index_buffer(&SQUARE_INDICES));
        Some(va)
    }

    fn move_camera(&mut self, ctx: &FrameCtx<'_>) {
        let dt = ctx.time.seconds();
        let input = ctx.input();

        let axis = |positive: Key, negative: Key| {
            input.key_down(positive) as i32 as f32 - input.key_down(negative) as i32 as f32
        };

        self.camera_position.x += axis(Key::D, Key::A) * CAMERA_SPEED * dt;
        self.camera_position.y += axis(Key::W, Key::S) * CAMERA_SPEED * dt;
        self.camera_rotation += axis(Key::Q, Key::E) * CAMERA_ROTATION_SPEED * dt;

        self.camera.set_position(self.camera_position);
        self.camera.set_rotation(self.camera_rotation);
    }
}

impl Layer for ExampleLayer {
    fn name(&self) -> &str {
        "example_layer"
    }

    fn on_attach(&mut self, graphics: &Graphics) {
        let shaders = self.assets.join("shaders");
        self.shaders.load(graphics, "flat_color", shaders.join("flat_color.wgsl"));
        self.shaders.load(graphics, "texture", shaders.join("texture.wgsl"));

        let texture = graphics.create_texture_2d(
            self.assets.join("textures").join("checkerboard.png"),
            TextureOptions {
                flip_vertically: true,
                ..TextureOptions::default()
            },
        );
        self.texture = texture.is_valid().then_some(texture);

        self.square = Self::build_square(graphics);
        log::info!("example layer attached: {:?}", graphics.resource_counts());
    }

    fn on_detach(&mut self) {
        self.square = None;
        self.texture = None;
    }

    fn on_update(&mut self, ctx: &mut FrameCtx<'_>) {
        self.move_camera(ctx);

        let Some(square) = &self.square else {
            return;
        };

        let renderer = ctx.renderer();
        let scene = renderer.begin_scene(&self.camera);

        if let Some(flat) = self.shaders.get("flat_color").filter(|s| s.is_valid()) {
            flat.bind();
            flat.set_float4("u_color", PALETTE[self.palette_index]);

            let scale = Mat4::from_scale(Vec3::splat(GRID_SCALE));
            for x in 0..GRID {
                for y in 0..GRID {
                    let position =
                        Vec3::new(x as f32 * GRID_SPACING, y as f32 * GRID_SPACING, 0.0);
                    let transform = Mat4::from_translation(position) * scale;
                    renderer.submit_with_shader(&scene, flat.as_ref(), square.as_ref(), transform);
                }
            }
        }

        let textured = self.shaders.get("texture").filter(|s| s.is_valid());
        if let (Some(texture), Some(textured)) = (&self.texture, textured) {
            texture.bind(0);
            renderer.submit_with_shader(
                &scene,
                textured.as_ref(),
                square.as_ref(),
                Mat4::from_scale(Vec3::splat(1.5)),
            );
        }

        renderer.end_scene(scene);
    }

    fn on_event(&mut self, event: &mut Event) {
        let mut dispatcher = EventDispatcher::new(event);

        dispatcher.dispatch::<MouseScroll>(|e| {
            self.zoom = (self.zoom - e.y_offset * 0.25).clamp(0.25, 10.0);
            self.update_projection();
            false
        });

        dispatcher.dispatch::<WindowResize>(|e| {
            if e.height > 0 {
                self.aspect_ratio = e.width as f32 / e.height as f32;
                self.update_projection();
            }
            false
        });

        dispatcher.dispatch::<KeyPress>(|e| {
            if e.key != Key::Space {
                return false;
            }
            self.palette_index = (self.palette_index + 1) % PALETTE.len();
            log::info!("grid color {:?}", PALETTE[self.palette_index]);
            true
        });
    }
}
