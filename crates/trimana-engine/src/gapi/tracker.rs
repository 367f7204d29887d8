use std::cell::Cell;
use std::rc::Rc;

/// Identifier of one native handle. `0` is the zero state.
pub type ResourceId = u32;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ResourceKind {
    VertexBuffer,
    IndexBuffer,
    VertexArray,
    Shader,
    Texture,
}

/// Live native handles per resource kind.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ResourceCounts {
    pub vertex_buffers: usize,
    pub index_buffers: usize,
    pub vertex_arrays: usize,
    pub shaders: usize,
    pub textures: usize,
}

impl ResourceCounts {
    pub fn total(&self) -> usize {
        self.vertex_buffers + self.index_buffers + self.vertex_arrays + self.shaders + self.textures
    }

    fn slot(&mut self, kind: ResourceKind) -> &mut usize {
        match kind {
            ResourceKind::VertexBuffer => &mut self.vertex_buffers,
            ResourceKind::IndexBuffer => &mut self.index_buffers,
            ResourceKind::VertexArray => &mut self.vertex_arrays,
            ResourceKind::Shader => &mut self.shaders,
            ResourceKind::Texture => &mut self.textures,
        }
    }
}

/// Hands out resource ids and counts live handles for one `Graphics`.
#[derive(Debug, Default)]
pub(crate) struct ResourceTracker {
    next_id: Cell<ResourceId>,
    live: Cell<ResourceCounts>,
}

impl ResourceTracker {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Registers a new native handle; the count drops with the returned guard.
    pub fn acquire(self: &Rc<Self>, kind: ResourceKind) -> TrackedHandle {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.adjust(kind, |n| *n += 1);

        TrackedHandle {
            tracker: Rc::clone(self),
            kind,
            id,
        }
    }

    pub fn counts(&self) -> ResourceCounts {
        self.live.get()
    }

    fn adjust(&self, kind: ResourceKind, f: impl FnOnce(&mut usize)) {
        let mut live = self.live.get();
        f(live.slot(kind));
        self.live.set(live);
    }
}

/// Ownership token for one live native handle.
#[derive(Debug)]
pub(crate) struct TrackedHandle {
    tracker: Rc<ResourceTracker>,
    kind: ResourceKind,
    id: ResourceId,
}

impl TrackedHandle {
    #[inline]
    pub fn id(&self) -> ResourceId {
        self.id
    }
}

impl Drop for TrackedHandle {
    fn drop(&mut self) {
        log::trace!("release {:?} #{}", self.kind, self.id);
        self.tracker.adjust(self.kind, |n| *n -= 1);
    }
}
