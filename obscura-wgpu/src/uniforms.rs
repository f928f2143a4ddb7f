//! GPU uniform blocks — must match the WGSL bind group layouts.

use bytemuck::{Pod, Zeroable};

use obscura_core::ShutterFrameParameters;

/// Shutter parameter block bound to every shutter pass.
///
/// `shutter` is the classic info vector: (intensity, color multiplier,
/// frame index, normalized aperture). `lens` carries the CoC/composite
/// scalars: (focus distance, anamorphism, lens-flare flag, depth-CoC flag).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct ShutterUniforms {
    pub shutter: [f32; 4],
    pub lens: [f32; 4],
}

impl ShutterUniforms {
    pub fn new(params: &ShutterFrameParameters, lens_flares: bool, coc_from_depth: bool) -> Self {
        Self {
            shutter: [
                params.intensity,
                params.color_multiplier,
                params.frame_index as f32,
                params.normalized_aperture,
            ],
            lens: [
                params.focus_distance,
                params.anamorphism,
                if lens_flares { 1.0 } else { 0.0 },
                if coc_from_depth { 1.0 } else { 0.0 },
            ],
        }
    }
}
