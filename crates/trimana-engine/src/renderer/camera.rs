use glam::{Mat4, Vec3};

/// 2D camera with an orthographic projection.
///
/// Every setter recomputes the cached matrices, so reads are free.
#[derive(Debug, Clone, PartialEq)]
pub struct OrthographicCamera {
    projection: Mat4,
    view: Mat4,
    view_projection: Mat4,

    position: Vec3,
    /// Rotation about +Z, in degrees.
    rotation: f32,
}

impl OrthographicCamera {
    /// Camera looking at the box `[left, right] x [bottom, top]` with depth
    /// range `[-1, 1]`.
    pub fn new(left: f32, right: f32, bottom: f32, top: f32) -> Self {
        let mut camera = Self {
            projection: Mat4::orthographic_rh(left, right, bottom, top, -1.0, 1.0),
            view: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
            position: Vec3::ZERO,
            rotation: 0.0,
        };
        camera.recalculate();
        camera
    }

    /// Keeps position and rotation.
    pub fn set_projection(&mut self, left: f32, right: f32, bottom: f32, top: f32) {
        self.projection = Mat4::orthographic_rh(left, right, bottom, top, -1.0, 1.0);
        self.recalculate();
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.recalculate();
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
        self.recalculate();
    }

    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        self.view
    }

    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    fn recalculate(&mut self) {
        let transform = Mat4::from_translation(self.position)
            * Mat4::from_rotation_z(self.rotation.to_radians());
        self.view = transform.inverse();
        self.view_projection = self.projection * self.view;
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec3, Vec4Swizzles};

    use super::*;

    fn project(camera: &OrthographicCamera, p: Vec3) -> (f32, f32) {
        let clip = camera.view_projection() * p.extend(1.0);
        let ndc = clip.xy() / clip.w;
        (ndc.x, ndc.y)
    }

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-5 && (a.1 - b.1).abs() < 1e-5
    }

    #[test]
    fn bounds_map_to_clip_edges() {
        let camera = OrthographicCamera::new(-1.6, 1.6, -0.9, 0.9);
        assert!(close(project(&camera, Vec3::new(1.6, 0.9, 0.0)), (1.0, 1.0)));
        assert!(close(project(&camera, Vec3::new(-1.6, -0.9, 0.0)), (-1.0, -1.0)));
    }

    #[test]
    fn moving_the_camera_moves_the_world_the_other_way() {
        let mut camera = OrthographicCamera::new(-1.0, 1.0, -1.0, 1.0);
        camera.set_position(Vec3::new(0.5, 0.0, 0.0));

        assert!(close(project(&camera, Vec3::new(0.5, 0.0, 0.0)), (0.0, 0.0)));
        assert!(close(project(&camera, Vec3::ZERO), (-0.5, 0.0)));
    }

    #[test]
    fn rotation_is_in_degrees_about_z() {
        let mut camera = OrthographicCamera::new(-1.0, 1.0, -1.0, 1.0);
        camera.set_rotation(90.0);

        assert!(close(project(&camera, Vec3::X), (0.0, -1.0)));
        assert_eq!(camera.rotation(), 90.0);
    }

    #[test]
    fn new_projection_keeps_the_view() {
        let mut camera = OrthographicCamera::new(-1.0, 1.0, -1.0, 1.0);
        camera.set_position(Vec3::new(0.25, 0.25, 0.0));
        let view = camera.view();

        camera.set_projection(-2.0, 2.0, -2.0, 2.0);
        assert_eq!(camera.view(), view);
        assert_eq!(camera.view_projection(), camera.projection() * view);
    }
}
