//! Render façade.
//!
//! `Renderer` owns no resources. It forwards to the active backend and
//! carries the camera's view-projection for one scene through an explicit
//! `Scene` value instead of shared state.
//!
//! Convention:
//! - `u_view_projection` and `u_transform` are the uniform names pushed by
//!   `submit_with_shader`
//! - one `submit*` call is exactly one indexed draw

mod camera;
mod scene;

pub use camera::OrthographicCamera;
pub use scene::{Renderer, Scene};
