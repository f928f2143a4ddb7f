//! Polygonal-iris aperture shape.

use std::f32::consts::PI;

/// Radius multiplier of a `blade_count`-sided iris at polar angle `angle`,
/// interpolated toward a circle as `curvature` goes to 1.
///
/// `blade_count` must be >= 3 (guaranteed by lens validation), which keeps
/// the cosine denominator away from zero for any angle.
pub fn shape_radius(angle: f32, blade_count: i32, curvature: f32) -> f32 {
    let n = blade_count as f32;
    let nt = (PI / n).cos();
    let k = (2.0 * PI / n) * ((n * angle + PI) / (2.0 * PI)).floor();
    let dt = (angle - k).cos();
    (nt / dt).powf(curvature)
}
