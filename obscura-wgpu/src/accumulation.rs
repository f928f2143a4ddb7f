//! The per-camera temporal accumulation pipeline.
//!
//! One instance exists per active camera. Every frame it re-negotiates the
//! accumulation format against the host's target descriptor (cheap, and it
//! tolerates window resizes and dynamic resolution without leaking
//! stale-sized buffers), keeps the persistent history texture in sync, and
//! encodes the fixed stage sequence declared by [`build_graph`].

use obscura_core::ShutterFrameParameters;

use crate::formats::{negotiate_format, FormatProbe};
use crate::graph::{
    build_graph, CocSource, PipelineConfig, PipelineVariant, StageGraph,
};
use crate::passes::composite::{render_coc_debug, render_composite, render_exposure_blend};
use crate::passes::downscale::{render_coc_prepass, render_downscale};
use crate::passes::temporal::{copy_to_history, render_temporal_blend};
use crate::pipeline;
use crate::targets::{create_color_target, AccumulationHistory, ColorTarget, TargetDescriptor};
use crate::uniforms::ShutterUniforms;

/// Host-owned views into the frame being rendered.
pub struct FrameTargets<'a> {
    pub color_view: &'a wgpu::TextureView,
    pub depth_view: &'a wgpu::TextureView,
    pub desc: TargetDescriptor,
}

/// Pipelines that depend on the negotiated accumulation format and/or the
/// host's output format; rebuilt when either changes.
struct FormatPipelines {
    accumulation_format: wgpu::TextureFormat,
    output_format: wgpu::TextureFormat,
    blit_to_accum: wgpu::RenderPipeline,
    blit_to_output: wgpu::RenderPipeline,
    blit_bgl: wgpu::BindGroupLayout,
    temporal: wgpu::RenderPipeline,
    temporal_bgl: wgpu::BindGroupLayout,
    exposure: wgpu::RenderPipeline,
    exposure_bgl: wgpu::BindGroupLayout,
    coc_debug: wgpu::RenderPipeline,
    coc_debug_bgl: wgpu::BindGroupLayout,
}

impl FormatPipelines {
    fn new(
        device: &wgpu::Device,
        accumulation_format: wgpu::TextureFormat,
        output_format: wgpu::TextureFormat,
    ) -> Self {
        let (blit_to_accum, blit_bgl) = pipeline::create_blit_pipeline(device, accumulation_format);
        let (blit_to_output, _) = pipeline::create_blit_pipeline(device, output_format);
        let (temporal, temporal_bgl) =
            pipeline::create_temporal_pipeline(device, accumulation_format);
        let (exposure, exposure_bgl) =
            pipeline::create_exposure_pipeline(device, accumulation_format);
        let (coc_debug, coc_debug_bgl) =
            pipeline::create_coc_debug_pipeline(device, output_format);
        Self {
            accumulation_format,
            output_format,
            blit_to_accum,
            blit_to_output,
            blit_bgl,
            temporal,
            temporal_bgl,
            exposure,
            exposure_bgl,
            coc_debug,
            coc_debug_bgl,
        }
    }
}

pub struct TemporalAccumulationPipeline {
    config: PipelineConfig,
    /// Composite the CoC map instead of the blended output (debug view).
    pub debug_coc: bool,
    history: AccumulationHistory,
    uniform_buffer: wgpu::Buffer,
    linear_sampler: wgpu::Sampler,
    point_sampler: wgpu::Sampler,
    coc_pipeline: wgpu::RenderPipeline,
    coc_bgl: wgpu::BindGroupLayout,
    depth_downscale_pipeline: wgpu::RenderPipeline,
    depth_downscale_bgl: wgpu::BindGroupLayout,
    format_pipelines: Option<FormatPipelines>,
}

impl TemporalAccumulationPipeline {
    pub fn new(device: &wgpu::Device, config: PipelineConfig) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shutter Uniforms"),
            size: std::mem::size_of::<ShutterUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let linear_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shutter Linear Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });
        let point_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shutter Point Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });
        let (coc_pipeline, coc_bgl) = pipeline::create_coc_pipeline(device);
        let (depth_downscale_pipeline, depth_downscale_bgl) =
            pipeline::create_depth_downscale_pipeline(device);

        Self {
            config,
            debug_coc: false,
            history: AccumulationHistory::new(),
            uniform_buffer,
            linear_sampler,
            point_sampler,
            coc_pipeline,
            coc_bgl,
            depth_downscale_pipeline,
            depth_downscale_bgl,
            format_pipelines: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The stage/resource declaration for a frame with this descriptor,
    /// exposed so the host scheduler can inspect what will run.
    pub fn declare(&self, probe: &impl FormatProbe, desc: &TargetDescriptor) -> StageGraph {
        build_graph(&self.config, desc, negotiate_format(probe, desc.format))
    }

    /// Release the persistent accumulation resources. The next `record`
    /// reallocates and reseeds.
    pub fn dispose(&mut self) {
        self.history.release();
    }

    /// Encode this frame's stage sequence. `lens_flares` comes from the
    /// host's render settings; `params` is the scheduler's block for this
    /// frame.
    pub fn record(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        probe: &impl FormatProbe,
        frame: &FrameTargets,
        params: &ShutterFrameParameters,
        lens_flares: bool,
    ) {
        let accumulation_format = negotiate_format(probe, frame.desc.format);
        self.ensure_pipelines(device, accumulation_format, frame.desc.format);

        let coc_from_depth = self.config.coc_source == CocSource::Depth;
        let uniforms = ShutterUniforms::new(params, lens_flares, coc_from_depth);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let graph = build_graph(&self.config, &frame.desc, accumulation_format);
        let target = transient(device, &graph, "shutter target");
        let downscaled = transient(device, &graph, "downscaled");

        match self.config.variant {
            PipelineVariant::ExposureOnly => {
                self.record_exposure_only(device, encoder, frame, &target, &downscaled);
            }
            PipelineVariant::Temporal => {
                let coc = transient(device, &graph, "coc map");
                self.record_temporal(device, encoder, frame, &target, &downscaled, &coc);
            }
        }
    }

    fn ensure_pipelines(
        &mut self,
        device: &wgpu::Device,
        accumulation_format: wgpu::TextureFormat,
        output_format: wgpu::TextureFormat,
    ) {
        let stale = match &self.format_pipelines {
            Some(p) => {
                p.accumulation_format != accumulation_format || p.output_format != output_format
            }
            None => true,
        };
        if stale {
            log::debug!(
                "building shutter pipelines for {accumulation_format:?} -> {output_format:?}"
            );
            self.format_pipelines = Some(FormatPipelines::new(
                device,
                accumulation_format,
                output_format,
            ));
        }
    }

    fn blit_bind_group(
        &self,
        device: &wgpu::Device,
        source: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        let pipelines = self.format_pipelines.as_ref().unwrap();
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Blit Bind Group"),
            layout: &pipelines.blit_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.linear_sampler),
                },
            ],
        })
    }

    fn record_temporal(
        &mut self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        frame: &FrameTargets,
        target: &ColorTarget,
        downscaled: &ColorTarget,
        coc: &ColorTarget,
    ) {
        let accum_desc = TargetDescriptor {
            format: self
                .format_pipelines
                .as_ref()
                .unwrap()
                .accumulation_format,
            ..frame.desc
        };
        let reseeded = self.history.ensure(device, &accum_desc);
        if reseeded {
            // Fresh history holds garbage; seed it from the current frame so
            // the blend never reads uninitialized memory.
            let seed = self.blit_bind_group(device, frame.color_view);
            let pipelines = self.format_pipelines.as_ref().unwrap();
            render_composite(
                encoder,
                self.history.view().unwrap(),
                &pipelines.blit_to_accum,
                &seed,
            );
        }

        // Stage 1: downscale the CoC-target buffer.
        match self.config.coc_source {
            CocSource::SceneColor => {
                let bind = self.blit_bind_group(device, frame.color_view);
                let pipelines = self.format_pipelines.as_ref().unwrap();
                render_downscale(encoder, &downscaled.view, &pipelines.blit_to_accum, &bind);
            }
            CocSource::Depth => {
                let bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Depth Downscale Bind Group"),
                    layout: &self.depth_downscale_bgl,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(frame.depth_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&self.point_sampler),
                        },
                    ],
                });
                render_downscale(encoder, &downscaled.view, &self.depth_downscale_pipeline, &bind);
            }
        }

        // Stage 2: CoC prepass at reduced resolution.
        let coc_bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("CoC Bind Group"),
            layout: &self.coc_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&downscaled.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(frame.depth_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.linear_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.point_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        });
        render_coc_prepass(encoder, &coc.view, &self.coc_pipeline, &coc_bind);

        // Stage 3: blend current frame with history into the target.
        let pipelines = self.format_pipelines.as_ref().unwrap();
        let temporal_bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Temporal Blend Bind Group"),
            layout: &pipelines.temporal_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(frame.color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(self.history.view().unwrap()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&coc.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.linear_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        });
        render_temporal_blend(encoder, &target.view, &pipelines.temporal, &temporal_bind);

        // Stage 4: carry the blended result into the next frame.
        copy_to_history(
            encoder,
            &target.texture,
            self.history.texture().unwrap(),
            target.width,
            target.height,
        );

        // Stage 5: composite back into the host's color target.
        if self.debug_coc {
            let debug_bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("CoC Debug Bind Group"),
                layout: &pipelines.coc_debug_bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&coc.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.linear_sampler),
                    },
                ],
            });
            render_coc_debug(encoder, frame.color_view, &pipelines.coc_debug, &debug_bind);
        } else {
            let out_bind = self.blit_bind_group(device, &target.view);
            let pipelines = self.format_pipelines.as_ref().unwrap();
            render_composite(encoder, frame.color_view, &pipelines.blit_to_output, &out_bind);
        }
    }

    fn record_exposure_only(
        &mut self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        frame: &FrameTargets,
        target: &ColorTarget,
        downscaled: &ColorTarget,
    ) {
        let down_bind = self.blit_bind_group(device, frame.color_view);
        let pipelines = self.format_pipelines.as_ref().unwrap();
        render_downscale(encoder, &downscaled.view, &pipelines.blit_to_accum, &down_bind);

        let blend_bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Exposure Blend Bind Group"),
            layout: &pipelines.exposure_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(frame.color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&downscaled.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.linear_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        });
        render_exposure_blend(encoder, &target.view, &pipelines.exposure, &blend_bind);

        let out_bind = self.blit_bind_group(device, &target.view);
        let pipelines = self.format_pipelines.as_ref().unwrap();
        render_composite(encoder, frame.color_view, &pipelines.blit_to_output, &out_bind);
    }
}

/// Allocate one of the graph's transient images.
fn transient(device: &wgpu::Device, graph: &StageGraph, name: &'static str) -> ColorTarget {
    let desc = graph
        .resources
        .iter()
        .find(|r| r.name == name && !r.external && !r.persistent)
        .unwrap_or_else(|| panic!("graph lacks transient resource {name}"));
    create_color_target(device, desc.width, desc.height, desc.format, name)
}
