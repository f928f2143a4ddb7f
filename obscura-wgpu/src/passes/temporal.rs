//! Temporal blend pass and the history copy that follows it.

use super::fullscreen_pass;

/// Blend the current frame into the accumulation target, weighted by
/// shutter intensity and the CoC map.
pub fn render_temporal_blend(
    encoder: &mut wgpu::CommandEncoder,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    fullscreen_pass(encoder, target, pipeline, bind_group, "Temporal Blend");
}

/// Copy the blended target into the persistent history texture for the next
/// frame. Source and history always share size and format, so this is a
/// plain texture copy.
pub fn copy_to_history(
    encoder: &mut wgpu::CommandEncoder,
    source: &wgpu::Texture,
    history: &wgpu::Texture,
    width: u32,
    height: u32,
) {
    encoder.copy_texture_to_texture(
        wgpu::ImageCopyTexture {
            texture: source,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::ImageCopyTexture {
            texture: history,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}
