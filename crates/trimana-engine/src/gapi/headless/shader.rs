use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use super::HeadlessContext;
use crate::gapi::error::GraphicsError;
use crate::gapi::resources::Shader;
use crate::gapi::shader_source::{self, ShaderOrigin, ShaderSources, ShaderStage};
use crate::gapi::tracker::{ResourceId, ResourceKind, TrackedHandle};
use crate::gapi::uniform::{UniformBlock, UniformValue};

pub(super) struct ShaderCore {
    handle: Option<TrackedHandle>,
    name: String,
    valid: bool,
    uniforms: RefCell<UniformBlock>,
}

impl ShaderCore {
    pub(super) fn id(&self) -> ResourceId {
        self.handle.as_ref().map_or(0, TrackedHandle::id)
    }

    pub(super) fn snapshot(&self) -> Vec<(String, UniformValue)> {
        self.uniforms.borrow().snapshot()
    }
}

pub struct HeadlessShader {
    ctx: Rc<HeadlessContext>,
    core: Rc<ShaderCore>,
    sources: ShaderSources,
}

impl HeadlessShader {
    pub(crate) fn new(ctx: &Rc<HeadlessContext>, name: &str, origin: ShaderOrigin<'_>) -> Self {
        let sources = match shader_source::load(name, origin) {
            Ok(sources) => sources,
            Err(e) => {
                log::error!("{e}");
                return Self::zero(ctx, name);
            }
        };

        let handle = ctx.tracker.acquire(ResourceKind::Shader);
        let valid = match check_entry_points(name, &sources) {
            Ok(()) => true,
            Err(e) => {
                log::error!("{e}");
                false
            }
        };

        let uniforms = if valid {
            UniformBlock::new(shader_source::reflect_uniforms(name, &sources))
        } else {
            UniformBlock::default()
        };

        Self {
            ctx: Rc::clone(ctx),
            core: Rc::new(ShaderCore {
                handle: Some(handle),
                name: name.to_string(),
                valid,
                uniforms: RefCell::new(uniforms),
            }),
            sources,
        }
    }

    fn zero(ctx: &Rc<HeadlessContext>, name: &str) -> Self {
        Self {
            ctx: Rc::clone(ctx),
            core: Rc::new(ShaderCore {
                handle: None,
                name: name.to_string(),
                valid: false,
                uniforms: RefCell::new(UniformBlock::default()),
            }),
            sources: ShaderSources::default(),
        }
    }

    pub fn sources(&self) -> &ShaderSources {
        &self.sources
    }
}

/// Stand-in for compilation: every stage must declare its entry point.
fn check_entry_points(name: &str, sources: &ShaderSources) -> Result<(), GraphicsError> {
    for (stage, src) in sources.stages() {
        let attr = match stage {
            ShaderStage::Vertex => "@vertex",
            ShaderStage::Fragment => "@fragment",
            ShaderStage::Geometry => continue,
        };
        if !src.contains(attr) {
            return Err(GraphicsError::ShaderCompile {
                shader: name.to_string(),
                stage: stage.label(),
                diagnostic: format!("no `{attr}` entry point"),
            });
        }
    }
    Ok(())
}

impl Shader for HeadlessShader {
    fn bind(&self) {
        self.ctx.bind(ResourceKind::Shader, self.id());
        self.ctx.bound.borrow_mut().shader = Some(Rc::downgrade(&self.core));
    }

    fn unbind(&self) {
        self.ctx.unbind(ResourceKind::Shader);
        self.ctx.bound.borrow_mut().shader = None;
    }

    fn name(&self) -> &str {
        &self.core.name
    }

    fn id(&self) -> ResourceId {
        self.core.id()
    }

    fn is_valid(&self) -> bool {
        self.core.valid
    }

    fn set_uniform(&self, name: &str, value: UniformValue) -> bool {
        self.core.uniforms.borrow_mut().set(&self.core.name, name, value)
    }

    fn uniform_value(&self, name: &str) -> Option<UniformValue> {
        self.core.uniforms.borrow().value(name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
