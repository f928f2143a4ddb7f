//! Per-camera, per-frame scheduling of shutter parameters and jitter.

use glam::Vec3;
use rand::Rng;

use crate::jitter::{aperture_jitter, pixel_jitter};
use crate::lens::{focal_length_from_fov, ExposureTarget, LensParameters, LensRig};
use crate::timing::FrameTimingPredictor;
use crate::transform::CameraTransform;

/// The parameter block published to the GPU pipeline each frame. Produced
/// fresh on frame begin; nothing in it persists.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShutterFrameParameters {
    /// Fraction of the predicted frame interval the shutter stays open, [0, 1].
    pub intensity: f32,
    /// Linear exposure color multiplier, > 0.
    pub color_multiplier: f32,
    /// Frame counter folded to [0, 64) for shader-side sequencing.
    pub frame_index: u32,
    /// clamp01(0.7 / f-number): 1 at the widest supported aperture.
    pub normalized_aperture: f32,
    /// Focus plane distance in meters, feeding the CoC prepass.
    pub focus_distance: f32,
    /// Anamorphic squeeze in [-1, 1], feeding the composite stage.
    pub anamorphism: f32,
}

/// Per-frame inputs read from the host renderer.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext {
    pub width: u32,
    pub height: u32,
    /// Vertical field of view, used to derive a focal length when the
    /// camera carries no physical lens.
    pub fov_deg: f32,
    /// Physical focal length in millimeters, when present.
    pub focal_length: Option<f32>,
}

impl FrameContext {
    fn focal_length_mm(&self) -> f32 {
        self.focal_length
            .unwrap_or_else(|| focal_length_from_fov(self.fov_deg, 24.0))
    }
}

/// Host-tunable jitter budgets and effect toggles.
#[derive(Clone, Copy, Debug)]
pub struct RenderSettings {
    /// Aperture jitter budget in [0, 1]; 0 disables the camera re-aim path.
    pub max_aperture_jitter: f32,
    /// Sub-pixel jitter budget in [0, 1].
    pub max_pixel_jitter: f32,
    pub enable_lens_flares: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_aperture_jitter: 1.0,
            max_pixel_jitter: 1.0,
            enable_lens_flares: true,
        }
    }
}

/// Drives one camera through its frame-begin / frame-end cycle.
///
/// The scheduler owns the camera's timing history and jitter state. On frame
/// begin it snapshots the transform unconditionally, so a host that aborted
/// the previous frame (skipping frame end and the restore) still starts
/// clean.
#[derive(Debug, Default)]
pub struct CameraFrameScheduler {
    timing: FrameTimingPredictor,
    frame_index: u32,
    snapshot: CameraTransform,
    did_jitter: bool,
    attached: bool,
}

impl CameraFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark that a pipeline is consuming this camera's parameters.
    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Frame-begin hook. Snapshots the transform, derives this frame's
    /// [`ShutterFrameParameters`], and applies jitter when the shutter is
    /// open and a budget allows it. Returns `None` when no pipeline is
    /// attached.
    #[allow(clippy::too_many_arguments)]
    pub fn begin_frame<R: Rng + ?Sized>(
        &mut self,
        transform: &mut CameraTransform,
        ctx: &FrameContext,
        rig: &LensRig,
        physical: Option<&LensParameters>,
        exposure: ExposureTarget,
        settings: &RenderSettings,
        rng: &mut R,
    ) -> Option<ShutterFrameParameters> {
        self.snapshot = *transform;
        let up = transform.up();
        self.did_jitter = false;

        if !self.attached {
            return None;
        }

        let predicted_delta = self.timing.predict_next();

        let mut lens = rig.resolve_lens(physical);
        lens.validate();
        lens.apply_exposure(exposure);
        // Exposure overrides can push values out of range; clamp again.
        lens.validate();

        self.frame_index = (self.frame_index + 1) % 1024;
        let intensity = (1.0 - predicted_delta / lens.shutter_speed).clamp(0.0, 1.0);
        let normalized_aperture = (0.7 / lens.aperture).clamp(0.0, 1.0);

        let params = ShutterFrameParameters {
            intensity,
            color_multiplier: lens.exposure_color_multiplier(),
            frame_index: self.frame_index % 64,
            normalized_aperture,
            focus_distance: lens.focus_distance,
            anamorphism: lens.anamorphism,
        };

        if intensity > 0.0 {
            if settings.max_aperture_jitter > 0.0 {
                let offset = aperture_jitter(
                    rng,
                    settings.max_aperture_jitter,
                    intensity,
                    ctx.focal_length_mm(),
                    lens.aperture,
                    lens.blade_count,
                    lens.current_curvature(),
                );
                // Aim point on the focus plane, taken before the offset so
                // every jittered sample converges on the same point.
                let focus_point: Vec3 =
                    transform.position + transform.forward() * lens.focus_distance;
                transform.translate_local(offset);
                transform.look_at(focus_point, up);
                self.did_jitter = true;
            }

            if settings.max_pixel_jitter > 0.0 {
                let offset = pixel_jitter(
                    self.frame_index,
                    settings.max_pixel_jitter,
                    intensity,
                    ctx.width,
                    ctx.height,
                );
                transform.translate_local(offset);
                self.did_jitter = true;
            }
        }

        Some(params)
    }

    /// Frame-end hook. Records the frame's raw delta-time and undoes any
    /// jitter applied on frame begin, restoring the exact snapshot.
    pub fn end_frame(&mut self, transform: &mut CameraTransform, raw_delta_time: f32) {
        self.timing.push(raw_delta_time);
        if self.did_jitter {
            *transform = self.snapshot;
            self.did_jitter = false;
        }
    }
}
