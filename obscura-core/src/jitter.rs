//! Sub-pixel and aperture-plane jitter synthesis.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;

use crate::bokeh::shape_radius;

/// Radical-inverse low-discrepancy value for `index` in the given base.
///
/// `index` should start at 1; index 0 always maps to 0 and wastes a sample.
pub fn halton(mut index: u32, base: u32) -> f32 {
    let inv_base = 1.0 / base as f32;
    let mut fraction = inv_base;
    let mut result = 0.0;
    while index > 0 {
        result += (index % base) as f32 * fraction;
        index /= base;
        fraction *= inv_base;
    }
    result
}

/// Draw one aperture-plane offset, in meters, shaped by the iris.
///
/// The polar radius scales with the square of the shutter intensity and with
/// the physical aperture diameter (focal length over f-number; the /2000
/// folds the millimeter-to-meter conversion with the diameter's radius half).
/// Multiplying by [`shape_radius`] shapes the sample disc to the iris
/// silhouette.
pub fn aperture_jitter<R: Rng + ?Sized>(
    rng: &mut R,
    max_allowed: f32,
    intensity: f32,
    focal_length: f32,
    aperture: f32,
    blade_count: i32,
    curvature: f32,
) -> Vec2 {
    let angle = rng.gen::<f32>() * 2.0 * PI;
    let mut radius = (rng.gen::<f32>() * 0.5).abs();
    radius *= intensity * intensity * max_allowed;
    radius *= (focal_length / aperture) / 2000.0;
    radius *= shape_radius(angle, blade_count, curvature);
    Vec2::new(radius * angle.cos(), radius * angle.sin())
}

/// Halton-driven sub-pixel offset in clip-space units for the given frame.
pub fn pixel_jitter(
    frame_index: u32,
    max_allowed: f32,
    intensity: f32,
    width: u32,
    height: u32,
) -> Vec2 {
    let sample = (frame_index & 1023) + 1;
    let mut jitter = Vec2::new(
        halton(sample, 2) - 0.5,
        halton(sample, 3) - 0.5,
    );
    jitter.x *= 2.0 / width.max(1) as f32;
    jitter.y *= 2.0 / height.max(1) as f32;
    jitter * max_allowed * intensity
}
