//! Physical-camera model for shutter-based temporal post-processing.
//!
//! This crate is the CPU side of the effect: lens physics and exposure, the
//! polygonal-iris bokeh shape, low-discrepancy jitter synthesis, frame-time
//! prediction, and the per-camera scheduler that publishes one
//! [`ShutterFrameParameters`] block per frame. The GPU stage graph that
//! consumes those parameters lives in `obscura-wgpu`.

pub mod bokeh;
pub mod jitter;
pub mod lens;
pub mod registry;
pub mod scheduler;
pub mod timing;
pub mod transform;

pub use lens::{ExposureMode, ExposureTarget, LensParameters, LensRig, SourcePolicy};
pub use registry::{CameraId, CameraRegistry};
pub use scheduler::{CameraFrameScheduler, FrameContext, RenderSettings, ShutterFrameParameters};
pub use timing::FrameTimingPredictor;
pub use transform::CameraTransform;
