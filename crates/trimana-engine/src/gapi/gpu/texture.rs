use std::any::Any;
use std::path::Path;
use std::rc::Rc;

use super::context::GpuShared;
use crate::gapi::resources::Texture;
use crate::gapi::texture_file::{self, TextureFilter, TextureOptions, TextureWrap};
use crate::gapi::tracker::{ResourceId, ResourceKind, TrackedHandle};

pub(crate) struct TextureCore {
    handle: TrackedHandle,
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

pub struct GpuTexture {
    shared: Rc<GpuShared>,
    core: Option<Rc<TextureCore>>,
    width: u32,
    height: u32,
    channels: u8,
}

impl GpuTexture {
    pub(crate) fn new(shared: &Rc<GpuShared>, path: &Path, options: TextureOptions) -> Self {
        let mut texture = Self {
            shared: Rc::clone(shared),
            core: None,
            width: 0,
            height: 0,
            channels: 0,
        };

        let img = match texture_file::decode_file(path, options.flip_vertically) {
            Ok(img) => img,
            Err(e) => {
                log::error!("{e}");
                return texture;
            }
        };

        let label = format!("texture {}", path.display());
        let (tex, view, sampler) = upload_rgba(
            &shared.device,
            &shared.queue,
            &label,
            img.width,
            img.height,
            &img.to_rgba(),
            options,
        );

        texture.core = Some(Rc::new(TextureCore {
            handle: shared.tracker.acquire(ResourceKind::Texture),
            _texture: tex,
            view,
            sampler,
        }));
        texture.width = img.width;
        texture.height = img.height;
        texture.channels = img.channels;
        texture
    }
}

impl Texture for GpuTexture {
    fn bind(&self, slot: u32) {
        let mut bound = self.shared.bound.borrow_mut();
        match &self.core {
            Some(core) => {
                bound.textures.insert(slot, Rc::downgrade(core));
            }
            None => {
                bound.textures.remove(&slot);
            }
        }
    }

    fn unbind(&self) {
        let Some(core) = &self.core else { return };
        self.shared
            .bound
            .borrow_mut()
            .textures
            .retain(|_, t| !std::ptr::eq(t.as_ptr(), Rc::as_ptr(core)));
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn channels(&self) -> u8 {
        self.channels
    }

    fn id(&self) -> ResourceId {
        self.core.as_ref().map_or(0, |c| c.handle.id())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Creates a sampled RGBA8 texture from tightly packed pixels.
pub(super) fn upload_rgba(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    rgba: &[u8],
    options: TextureOptions,
) -> (wgpu::Texture, wgpu::TextureView, wgpu::Sampler) {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let filter = match options.filter {
        TextureFilter::Linear => wgpu::FilterMode::Linear,
        TextureFilter::Nearest => wgpu::FilterMode::Nearest,
    };
    let address_mode = match options.wrap {
        TextureWrap::Repeat => wgpu::AddressMode::Repeat,
        TextureWrap::ClampToEdge => wgpu::AddressMode::ClampToEdge,
    };

    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    });

    (texture, view, sampler)
}
