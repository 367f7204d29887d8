use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use super::graphics::Graphics;
use super::resources::Shader;

/// Name-keyed registry of shared shaders.
#[derive(Default)]
pub struct ShaderLibrary {
    shaders: HashMap<String, Rc<dyn Shader>>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `shader` under its own name. A taken name is logged and
    /// leaves the library unchanged.
    pub fn add(&mut self, shader: Rc<dyn Shader>) -> bool {
        let name = shader.name().to_string();
        self.add_named(name, shader)
    }

    pub fn add_named(&mut self, name: impl Into<String>, shader: Rc<dyn Shader>) -> bool {
        let name = name.into();
        if self.shaders.contains_key(&name) {
            log::warn!("shader `{name}` already exists in the library");
            return false;
        }
        self.shaders.insert(name, shader);
        true
    }

    /// Creates a shader from a `#type` file and registers it. A taken name
    /// returns the registered shader and leaves `path` unread.
    pub fn load(&mut self, graphics: &Graphics, name: &str, path: impl AsRef<Path>) -> Rc<dyn Shader> {
        if let Some(existing) = self.get(name) {
            log::warn!("shader `{name}` already exists in the library; keeping it");
            return existing;
        }
        let shader = graphics.create_shader(name, path);
        self.add_named(name, Rc::clone(&shader));
        shader
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Shader>> {
        self.shaders.get(name).cloned()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.shaders.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }
}
