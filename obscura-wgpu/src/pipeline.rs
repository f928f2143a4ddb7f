//! Render pipeline and bind group layout creation for the shutter passes.
//! Each constructor builds one wgpu::RenderPipeline around a fullscreen
//! triangle; the output format is the per-frame negotiated accumulation
//! format, so pipelines are rebuilt when negotiation changes its answer.

use crate::graph::COC_FORMAT;
use crate::shaders;

fn fullscreen_module(
    device: &wgpu::Device,
    label: &str,
    source: &str,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    module: &wgpu::ShaderModule,
    bgl: &wgpu::BindGroupLayout,
    target_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[bgl],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn texture_entry(binding: u32, sample_type: wgpu::TextureSampleType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type,
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32, binding_type: wgpu::SamplerBindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(binding_type),
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

const FLOAT_TEX: wgpu::TextureSampleType = wgpu::TextureSampleType::Float { filterable: true };

/// Blit: one sampled texture to one color target. Used for the color
/// downscale and the final composite.
pub fn create_blit_pipeline(
    device: &wgpu::Device,
    target_format: wgpu::TextureFormat,
) -> (wgpu::RenderPipeline, wgpu::BindGroupLayout) {
    let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Blit Bind Group Layout"),
        entries: &[
            texture_entry(0, FLOAT_TEX),
            sampler_entry(1, wgpu::SamplerBindingType::Filtering),
        ],
    });
    let module = fullscreen_module(device, "Blit", shaders::BLIT_SHADER);
    let pipeline = fullscreen_pipeline(device, "Blit Pipeline", &module, &bgl, target_format);
    (pipeline, bgl)
}

/// Depth downscale: depth texture to the single-channel proxy buffer.
pub fn create_depth_downscale_pipeline(
    device: &wgpu::Device,
) -> (wgpu::RenderPipeline, wgpu::BindGroupLayout) {
    let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Depth Downscale Bind Group Layout"),
        entries: &[
            texture_entry(0, wgpu::TextureSampleType::Depth),
            sampler_entry(1, wgpu::SamplerBindingType::NonFiltering),
        ],
    });
    let module = fullscreen_module(device, "Depth Downscale", shaders::DEPTH_DOWNSCALE_SHADER);
    let pipeline =
        fullscreen_pipeline(device, "Depth Downscale Pipeline", &module, &bgl, COC_FORMAT);
    (pipeline, bgl)
}

/// CoC prepass: downscaled buffer + full-res depth + shutter uniforms into
/// the R16Float CoC map.
pub fn create_coc_pipeline(
    device: &wgpu::Device,
) -> (wgpu::RenderPipeline, wgpu::BindGroupLayout) {
    let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("CoC Bind Group Layout"),
        entries: &[
            texture_entry(0, FLOAT_TEX),
            texture_entry(1, wgpu::TextureSampleType::Depth),
            sampler_entry(2, wgpu::SamplerBindingType::Filtering),
            sampler_entry(3, wgpu::SamplerBindingType::NonFiltering),
            uniform_entry(4),
        ],
    });
    let module = fullscreen_module(device, "CoC Prepass", shaders::COC_SHADER);
    let pipeline = fullscreen_pipeline(device, "CoC Pipeline", &module, &bgl, COC_FORMAT);
    (pipeline, bgl)
}

/// Temporal blend: current color + history + CoC map into the shutter target.
pub fn create_temporal_pipeline(
    device: &wgpu::Device,
    target_format: wgpu::TextureFormat,
) -> (wgpu::RenderPipeline, wgpu::BindGroupLayout) {
    let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Temporal Blend Bind Group Layout"),
        entries: &[
            texture_entry(0, FLOAT_TEX),
            texture_entry(1, FLOAT_TEX),
            texture_entry(2, FLOAT_TEX),
            sampler_entry(3, wgpu::SamplerBindingType::Filtering),
            uniform_entry(4),
        ],
    });
    let module = fullscreen_module(device, "Temporal Blend", shaders::TEMPORAL_SHADER);
    let pipeline =
        fullscreen_pipeline(device, "Temporal Blend Pipeline", &module, &bgl, target_format);
    (pipeline, bgl)
}

/// Exposure-only blend: current color + anamorphic half-res buffer.
pub fn create_exposure_pipeline(
    device: &wgpu::Device,
    target_format: wgpu::TextureFormat,
) -> (wgpu::RenderPipeline, wgpu::BindGroupLayout) {
    let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Exposure Blend Bind Group Layout"),
        entries: &[
            texture_entry(0, FLOAT_TEX),
            texture_entry(1, FLOAT_TEX),
            sampler_entry(2, wgpu::SamplerBindingType::Filtering),
            uniform_entry(3),
        ],
    });
    let module = fullscreen_module(device, "Exposure Blend", shaders::EXPOSURE_SHADER);
    let pipeline =
        fullscreen_pipeline(device, "Exposure Blend Pipeline", &module, &bgl, target_format);
    (pipeline, bgl)
}

/// CoC debug view: grayscale CoC map over the output target.
pub fn create_coc_debug_pipeline(
    device: &wgpu::Device,
    target_format: wgpu::TextureFormat,
) -> (wgpu::RenderPipeline, wgpu::BindGroupLayout) {
    let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("CoC Debug Bind Group Layout"),
        entries: &[
            texture_entry(0, FLOAT_TEX),
            sampler_entry(1, wgpu::SamplerBindingType::Filtering),
        ],
    });
    let module = fullscreen_module(device, "CoC Debug", shaders::COC_DEBUG_SHADER);
    let pipeline =
        fullscreen_pipeline(device, "CoC Debug Pipeline", &module, &bgl, target_format);
    (pipeline, bgl)
}
