use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use super::shader::ShaderCore;
use super::texture::{upload_rgba, TextureCore};
use crate::gapi::texture_file::TextureOptions;
use crate::gapi::tracker::ResourceTracker;

/// What the next `draw_indexed` reads, like a GL binding table.
#[derive(Default)]
pub(super) struct BindState {
    pub shader: Option<Weak<ShaderCore>>,
    pub textures: BTreeMap<u32, Weak<TextureCore>>,
}

/// Device-level state shared by every wgpu resource.
pub(crate) struct GpuShared {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    pub uniform_alignment: u64,
    pub blending: Cell<bool>,
    pub(super) bound: RefCell<BindState>,
    pub tracker: Rc<ResourceTracker>,
    /// Bound to texture slots a shader declares but nothing filled.
    pub fallback: FallbackTexture,
}

pub(crate) struct FallbackTexture {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl GpuShared {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, surface_format: wgpu::TextureFormat) -> Self {
        let (_texture, view, sampler) = upload_rgba(
            &device,
            &queue,
            "trimana fallback texture",
            1,
            1,
            &[u8::MAX; 4],
            TextureOptions::default(),
        );
        let uniform_alignment = device.limits().min_uniform_buffer_offset_alignment as u64;

        Self {
            device,
            queue,
            surface_format,
            uniform_alignment,
            blending: Cell::new(false),
            bound: RefCell::new(BindState::default()),
            tracker: ResourceTracker::new(),
            fallback: FallbackTexture { view, sampler },
        }
    }

    /// Runs `f` inside a validation error scope and returns the captured
    /// diagnostic, if any.
    pub fn validated<T>(&self, f: impl FnOnce(&wgpu::Device) -> T) -> (T, Option<String>) {
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f(&self.device);
        let error = pollster::block_on(scope.pop());
        (value, error.map(|e| e.to_string()))
    }
}
