use std::any::Any;
use std::path::Path;
use std::rc::Rc;

use super::{BindOp, HeadlessContext};
use crate::gapi::texture_file::{self, TextureOptions};
use crate::gapi::resources::Texture;
use crate::gapi::tracker::{ResourceId, ResourceKind, TrackedHandle};

pub struct HeadlessTexture {
    ctx: Rc<HeadlessContext>,
    handle: Option<TrackedHandle>,
    width: u32,
    height: u32,
    channels: u8,
    options: TextureOptions,
}

impl HeadlessTexture {
    pub(crate) fn new(ctx: &Rc<HeadlessContext>, path: &Path, options: TextureOptions) -> Self {
        let mut texture = Self {
            ctx: Rc::clone(ctx),
            handle: None,
            width: 0,
            height: 0,
            channels: 0,
            options,
        };

        match texture_file::decode_file(path, options.flip_vertically) {
            Ok(img) => {
                texture.handle = Some(ctx.tracker.acquire(ResourceKind::Texture));
                texture.width = img.width;
                texture.height = img.height;
                texture.channels = img.channels;
            }
            Err(e) => log::error!("{e}"),
        }

        texture
    }

    pub fn options(&self) -> TextureOptions {
        self.options
    }
}

impl Texture for HeadlessTexture {
    fn bind(&self, slot: u32) {
        let id = self.id();
        self.ctx.record(|r| r.binds.push(BindOp::BindTexture { slot, id }));
        self.ctx.bound.borrow_mut().textures.insert(slot, id);
    }

    fn unbind(&self) {
        let id = self.id();
        self.ctx.unbind(ResourceKind::Texture);
        self.ctx.bound.borrow_mut().textures.retain(|_, bound| *bound != id);
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
        self.handle.as_ref().map_or(0, TrackedHandle::id)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
