//! Downscale and CoC prepass encoding.

use super::fullscreen_pass;

/// Blit the CoC-target buffer into the reduced-resolution intermediate.
pub fn render_downscale(
    encoder: &mut wgpu::CommandEncoder,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    fullscreen_pass(encoder, target, pipeline, bind_group, "Shutter Downscale");
}

/// Evaluate the circle-of-confusion map at reduced resolution.
pub fn render_coc_prepass(
    encoder: &mut wgpu::CommandEncoder,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    fullscreen_pass(encoder, target, pipeline, bind_group, "CoC Prepass");
}
