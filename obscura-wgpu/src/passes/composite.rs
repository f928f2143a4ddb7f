//! Final composite back into the host's color target.

use super::fullscreen_pass;

/// Blit the accumulated target into the active color attachment.
pub fn render_composite(
    encoder: &mut wgpu::CommandEncoder,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    fullscreen_pass(encoder, target, pipeline, bind_group, "Shutter Output");
}

/// Exposure-only main pass: multiplier plus anamorphic bleed.
pub fn render_exposure_blend(
    encoder: &mut wgpu::CommandEncoder,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    fullscreen_pass(encoder, target, pipeline, bind_group, "Exposure Blend");
}

/// Grayscale CoC visualization over the output target.
pub fn render_coc_debug(
    encoder: &mut wgpu::CommandEncoder,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    fullscreen_pass(encoder, target, pipeline, bind_group, "CoC Debug View");
}
