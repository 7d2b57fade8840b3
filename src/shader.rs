use std::fmt;

use crate::error::ShaderError;
use crate::mesh;

pub const VERTEX_SOURCE: &str = include_str!("shaders/hexagon_vs.wgsl");
pub const FRAGMENT_SOURCE: &str = include_str!("shaders/hexagon_fs.wgsl");

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn entry_point(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs_main",
            ShaderStage::Fragment => "fs_main",
        }
    }

    fn naga_stage(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Parses and validates one WGSL stage. The module must expose the stage's
/// entry point (`vs_main` or `fs_main`) with the matching stage kind.
pub fn compile_stage(stage: ShaderStage, source: &str) -> Result<naga::Module, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Compile {
        stage,
        log: e.emit_to_string(source),
    })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|e| ShaderError::Compile {
        stage,
        log: error_chain(&e),
    })?;

    let entry_point = stage.entry_point();
    if !module
        .entry_points
        .iter()
        .any(|ep| ep.name == entry_point && ep.stage == stage.naga_stage())
    {
        return Err(ShaderError::Compile {
            stage,
            log: format!("no {} entry point named '{}'", stage, entry_point),
        });
    }

    Ok(module)
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut log = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        log.push_str(": ");
        log.push_str(&cause.to_string());
        source = cause.source();
    }
    log
}

/// A linked vertex + fragment pipeline. Only `link` builds one, so a value
/// of this type is always safe to bind.
pub struct Program {
    pipeline: wgpu::RenderPipeline,
}

impl Program {
    pub fn link(
        device: &wgpu::Device,
        vertex_source: &str,
        fragment_source: &str,
        color_format: wgpu::TextureFormat,
    ) -> Result<Program, ShaderError> {
        // check both stages before giving up so every broken stage gets logged
        let vertex = compile_stage(ShaderStage::Vertex, vertex_source);
        let fragment = compile_stage(ShaderStage::Fragment, fragment_source);
        for err in [vertex.as_ref().err(), fragment.as_ref().err()]
            .into_iter()
            .flatten()
        {
            log::error!("{}", err);
        }
        vertex?;
        fragment?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Vertex Shader"),
            source: wgpu::ShaderSource::Wgsl(vertex_source.into()),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Fragment Shader"),
            source: wgpu::ShaderSource::Wgsl(fragment_source.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Program Layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

        let pipeline = create_render_pipeline(
            device,
            &layout,
            color_format,
            &[mesh::Vertex::desc()],
            &vertex_module,
            &fragment_module,
        );

        // the stage modules are not needed once the pipeline exists
        drop(vertex_module);
        drop(fragment_module);

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            let err = ShaderError::Link {
                log: error_chain(&err),
            };
            log::error!("{}", err);
            return Err(err);
        }

        log::info!("Linked shader program");
        Ok(Program { pipeline })
    }

    /// Builds the program from the embedded hexagon shaders.
    pub fn hexagon(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
    ) -> Result<Program, ShaderError> {
        Self::link(device, VERTEX_SOURCE, FRAGMENT_SOURCE, color_format)
    }

    pub fn bind<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        render_pass.set_pipeline(&self.pipeline);
    }
}

fn create_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    vertex_module: &wgpu::ShaderModule,
    fragment_module: &wgpu::ShaderModule,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Hexagon Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: vertex_module,
            entry_point: ShaderStage::Vertex.entry_point(),
            buffers: vertex_layouts,
        },
        fragment: Some(wgpu::FragmentState {
            module: fragment_module,
            entry_point: ShaderStage::Fragment.entry_point(),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
