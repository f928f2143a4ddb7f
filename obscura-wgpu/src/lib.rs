//! WebGPU temporal accumulation pipeline for Obscura.
//!
//! Consumes the per-frame [`ShutterFrameParameters`] published by
//! `obscura-core` and drives the fixed stage sequence
//! downscale -> CoC prepass -> temporal blend -> history copy -> composite
//! against the host's color and depth targets. The accumulation format is
//! renegotiated every frame against an ordered fallback list; the persistent
//! history buffer is reallocated only when the target descriptor changes.
//!
//! [`ShutterFrameParameters`]: obscura_core::ShutterFrameParameters

mod accumulation;
pub mod context;
pub mod formats;
pub mod graph;
pub mod passes;
pub mod pipeline;
pub mod shaders;
pub mod targets;
pub mod uniforms;

pub use accumulation::{FrameTargets, TemporalAccumulationPipeline};
pub use context::GpuContext;
pub use formats::{negotiate_format, FormatProbe, ACCUMULATION_FORMATS};
pub use graph::{
    build_graph, CocSource, DownscaleDivisor, PipelineConfig, PipelineVariant, StageGraph,
    StageKind,
};
pub use targets::{AccumulationHistory, TargetDescriptor};
pub use uniforms::ShutterUniforms;
