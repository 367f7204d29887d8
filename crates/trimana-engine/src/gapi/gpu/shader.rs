use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::rc::Rc;

use super::context::GpuShared;
use crate::gapi::error::GraphicsError;
use crate::gapi::layout::ShaderDataType;
use crate::gapi::resources::Shader;
use crate::gapi::shader_source::{self, ShaderOrigin, ShaderSources, ShaderStage};
use crate::gapi::tracker::{ResourceId, ResourceKind, TrackedHandle};
use crate::gapi::uniform::{UniformBlock, UniformDecl, UniformValue};
use crate::gapi::vertex_array::AttributeSlot;

/// Compiled stages plus the layouts derived from reflection.
struct Program {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    attributes: Vec<AttributeSlot>,
    blending: bool,
}

pub(crate) struct ShaderCore {
    handle: Option<TrackedHandle>,
    name: String,
    program: Option<Program>,
    uniforms: RefCell<UniformBlock>,
    texture_slots: Vec<u32>,
    pipelines: RefCell<HashMap<PipelineKey, wgpu::RenderPipeline>>,
}

impl ShaderCore {
    pub fn id(&self) -> ResourceId {
        self.handle.as_ref().map_or(0, TrackedHandle::id)
    }

    pub fn is_valid(&self) -> bool {
        self.program.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn texture_slots(&self) -> &[u32] {
        &self.texture_slots
    }

    pub fn texture_layout(&self) -> Option<&wgpu::BindGroupLayout> {
        self.program.as_ref().map(|p| &p.texture_layout)
    }

    /// Packs every uniform into one buffer and builds the group 0 bind group.
    ///
    /// Unwritten uniforms read as zero.
    pub fn uniform_bind_group(&self, shared: &GpuShared) -> Option<wgpu::BindGroup> {
        use wgpu::util::DeviceExt;

        let program = self.program.as_ref()?;
        let block = self.uniforms.borrow();

        let mut bytes: Vec<u8> = Vec::new();
        let mut ranges: Vec<(u32, u64, u64)> = Vec::new();
        for slot in block.slots() {
            let offset = align_to(bytes.len() as u64, shared.uniform_alignment);
            let size = align_to(slot.decl.kind.gpu_size(), 16);
            bytes.resize(offset as usize, 0);
            if let Some(value) = slot.value {
                value.encode(&mut bytes);
            }
            bytes.resize((offset + size) as usize, 0);
            ranges.push((slot.decl.binding, offset, size));
        }

        let buffer = (!bytes.is_empty()).then(|| {
            shared
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("trimana uniforms"),
                    contents: &bytes,
                    usage: wgpu::BufferUsages::UNIFORM,
                })
        });

        let entries: Vec<wgpu::BindGroupEntry<'_>> = match &buffer {
            Some(buffer) => ranges
                .iter()
                .map(|&(binding, offset, size)| wgpu::BindGroupEntry {
                    binding,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer,
                        offset,
                        size: NonZeroU64::new(size),
                    }),
                })
                .collect(),
            None => Vec::new(),
        };

        Some(shared.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("trimana uniform bind group"),
            layout: &program.uniform_layout,
            entries: &entries,
        }))
    }

    /// Returns the cached pipeline for this vertex layout, building it on
    /// first use. `None` if the layout does not match the shader inputs.
    pub fn pipeline(
        &self,
        shared: &GpuShared,
        attributes: &[AttributeSlot],
        buffer_count: usize,
    ) -> Option<wgpu::RenderPipeline> {
        let program = self.program.as_ref()?;
        let key = PipelineKey {
            attributes: attributes.to_vec(),
            blending: shared.blending.get(),
        };

        if let Some(pipeline) = self.pipelines.borrow().get(&key) {
            return Some(pipeline.clone());
        }

        let per_buffer: Vec<(u64, Vec<wgpu::VertexAttribute>)> = (0..buffer_count)
            .map(|i| {
                let slots: Vec<&AttributeSlot> =
                    attributes.iter().filter(|a| a.buffer_index == i).collect();
                let stride = slots.first().map_or(0, |a| a.stride as u64);
                let attrs = slots
                    .iter()
                    .map(|a| wgpu::VertexAttribute {
                        format: vertex_format(a.data_type),
                        offset: a.offset as u64,
                        shader_location: a.location,
                    })
                    .collect();
                (stride, attrs)
            })
            .collect();

        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = per_buffer
            .iter()
            .map(|(stride, attrs)| wgpu::VertexBufferLayout {
                array_stride: *stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attrs,
            })
            .collect();

        let blend = if key.blending {
            wgpu::BlendState::ALPHA_BLENDING
        } else {
            wgpu::BlendState::REPLACE
        };

        let label = format!("{} pipeline", self.name);
        let (pipeline, error) = shared.validated(|device| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&label),
                layout: Some(&program.pipeline_layout),

                vertex: wgpu::VertexState {
                    module: &program.vertex,
                    entry_point: None,
                    compilation_options: Default::default(),
                    buffers: &buffers,
                },

                fragment: Some(wgpu::FragmentState {
                    module: &program.fragment,
                    entry_point: None,
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: shared.surface_format,
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        });

        if let Some(diagnostic) = error {
            log::error!("shader `{}`: vertex layout rejected: {diagnostic}", self.name);
            return None;
        }

        self.pipelines.borrow_mut().insert(key, pipeline.clone());
        Some(pipeline)
    }
}

pub struct GpuShader {
    shared: Rc<GpuShared>,
    core: Rc<ShaderCore>,
}

impl GpuShader {
    pub(crate) fn new(shared: &Rc<GpuShared>, name: &str, origin: ShaderOrigin<'_>) -> Self {
        let mut core = ShaderCore {
            handle: None,
            name: name.to_string(),
            program: None,
            uniforms: RefCell::new(UniformBlock::default()),
            texture_slots: Vec::new(),
            pipelines: RefCell::new(HashMap::new()),
        };

        match shader_source::load(name, origin) {
            Ok(sources) => {
                core.handle = Some(shared.tracker.acquire(ResourceKind::Shader));
                let uniforms = shader_source::reflect_uniforms(name, &sources);
                let texture_slots = shader_source::reflect_texture_slots(&sources);

                match build_program(shared, name, &sources, &uniforms, &texture_slots) {
                    Ok(program) => {
                        core.program = Some(program);
                        core.uniforms = RefCell::new(UniformBlock::new(uniforms));
                        core.texture_slots = texture_slots;
                    }
                    Err(e) => log::error!("{e}"),
                }
            }
            Err(e) => log::error!("{e}"),
        }

        Self {
            shared: Rc::clone(shared),
            core: Rc::new(core),
        }
    }
}

fn build_program(
    shared: &GpuShared,
    name: &str,
    sources: &ShaderSources,
    uniforms: &[UniformDecl],
    texture_slots: &[u32],
) -> Result<Program, GraphicsError> {
    if sources.geometry.is_some() {
        log::warn!("shader `{name}`: geometry stage is not supported by wgpu; ignored");
    }

    let compile = |stage: ShaderStage, src: &str| {
        let label = format!("{name} {}", stage.label());
        let (module, error) = shared.validated(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&label),
                source: wgpu::ShaderSource::Wgsl(src.into()),
            })
        });
        match error {
            None => Ok(module),
            Some(diagnostic) => Err(GraphicsError::ShaderCompile {
                shader: name.to_string(),
                stage: stage.label(),
                diagnostic,
            }),
        }
    };

    let vertex = compile(ShaderStage::Vertex, &sources.vertex)?;
    let fragment = compile(ShaderStage::Fragment, &sources.fragment)?;

    let uniform_entries: Vec<wgpu::BindGroupLayoutEntry> = uniforms
        .iter()
        .map(|u| wgpu::BindGroupLayoutEntry {
            binding: u.binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(u.kind.gpu_size()),
            },
            count: None,
        })
        .collect();

    let texture_entries: Vec<wgpu::BindGroupLayoutEntry> = texture_slots
        .iter()
        .flat_map(|slot| {
            [
                wgpu::BindGroupLayoutEntry {
                    binding: slot * 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: slot * 2 + 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ]
        })
        .collect();

    let (layouts, error) = shared.validated(|device| {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("trimana uniform bgl"),
            entries: &uniform_entries,
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("trimana texture bgl"),
            entries: &texture_entries,
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("trimana pipeline layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            immediate_size: 0,
        });
        (uniform_layout, texture_layout, pipeline_layout)
    });

    if let Some(diagnostic) = error {
        return Err(GraphicsError::ShaderCompile {
            shader: name.to_string(),
            stage: "link",
            diagnostic,
        });
    }

    let (uniform_layout, texture_layout, pipeline_layout) = layouts;
    Ok(Program {
        vertex,
        fragment,
        uniform_layout,
        texture_layout,
        pipeline_layout,
    })
}

fn vertex_format(data_type: ShaderDataType) -> wgpu::VertexFormat {
    use ShaderDataType::*;
    match data_type {
        Float => wgpu::VertexFormat::Float32,
        Float2 => wgpu::VertexFormat::Float32x2,
        Float3 => wgpu::VertexFormat::Float32x3,
        Float4 => wgpu::VertexFormat::Float32x4,
        Int => wgpu::VertexFormat::Sint32,
        Int2 => wgpu::VertexFormat::Sint32x2,
        Int3 => wgpu::VertexFormat::Sint32x3,
        Int4 => wgpu::VertexFormat::Sint32x4,
        UInt => wgpu::VertexFormat::Uint32,
        UInt2 => wgpu::VertexFormat::Uint32x2,
        UInt3 => wgpu::VertexFormat::Uint32x3,
        UInt4 => wgpu::VertexFormat::Uint32x4,
    }
}

fn align_to(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment) * alignment
}

impl Shader for GpuShader {
    fn bind(&self) {
        self.shared.bound.borrow_mut().shader = Some(Rc::downgrade(&self.core));
    }

    fn unbind(&self) {
        self.shared.bound.borrow_mut().shader = None;
    }

    fn name(&self) -> &str {
        self.core.name()
    }

    fn id(&self) -> ResourceId {
        self.core.id()
    }

    fn is_valid(&self) -> bool {
        self.core.is_valid()
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
