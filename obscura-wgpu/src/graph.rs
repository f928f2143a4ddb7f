//! Declarative stage graph handed to the host scheduler.
//!
//! The graph names each pass and the resources it reads and writes; the host
//! (or this crate's own recorder) executes the stages strictly in order.
//! Ordering is fixed because each stage consumes the previous stage's
//! output.

use crate::targets::TargetDescriptor;

/// Single-channel format of the circle-of-confusion map.
pub const COC_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R16Float;
/// Depth format expected from the host.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Resolution divisor for the intermediate blur-evaluation buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DownscaleDivisor {
    #[default]
    Half,
    Third,
    Quarter,
}

impl DownscaleDivisor {
    pub fn factor(self) -> u32 {
        match self {
            DownscaleDivisor::Half => 2,
            DownscaleDivisor::Third => 3,
            DownscaleDivisor::Quarter => 4,
        }
    }

    pub fn apply(self, extent: u32) -> u32 {
        (extent / self.factor()).max(1)
    }
}

/// Which buffer the downscale stage feeds into CoC evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CocSource {
    #[default]
    SceneColor,
    Depth,
}

/// Closed set of pipeline variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PipelineVariant {
    /// Exposure multiplier plus anamorphic bleed only; no temporal state.
    ExposureOnly,
    /// Full shutter accumulation with history buffer and CoC-weighted blend.
    #[default]
    Temporal,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PipelineConfig {
    pub variant: PipelineVariant,
    pub downscale: DownscaleDivisor,
    pub coc_source: CocSource,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageKind {
    Downscale,
    CocPrepass,
    TemporalBlend,
    HistoryCopy,
    ExposureBlend,
    Composite,
}

pub type ResourceId = usize;

/// One image in the graph. `external` resources are owned by the host
/// (scene color, depth); `persistent` ones outlive the frame (history).
#[derive(Clone, Copy, Debug)]
pub struct ResourceDesc {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub persistent: bool,
    pub external: bool,
}

#[derive(Clone, Debug)]
pub struct StageDesc {
    pub name: &'static str,
    pub kind: StageKind,
    pub inputs: Vec<ResourceId>,
    pub output: ResourceId,
}

/// Ordered pass/resource declaration for one frame.
#[derive(Clone, Debug, Default)]
pub struct StageGraph {
    pub resources: Vec<ResourceDesc>,
    pub stages: Vec<StageDesc>,
}

impl StageGraph {
    fn resource(&mut self, desc: ResourceDesc) -> ResourceId {
        self.resources.push(desc);
        self.resources.len() - 1
    }

    fn stage(&mut self, name: &'static str, kind: StageKind, inputs: Vec<ResourceId>, output: ResourceId) {
        self.stages.push(StageDesc {
            name,
            kind,
            inputs,
            output,
        });
    }

    pub fn persistent_resources(&self) -> impl Iterator<Item = &ResourceDesc> {
        self.resources.iter().filter(|r| r.persistent)
    }
}

/// Build the frame's stage graph for the negotiated accumulation format.
pub fn build_graph(
    config: &PipelineConfig,
    desc: &TargetDescriptor,
    accumulation_format: wgpu::TextureFormat,
) -> StageGraph {
    let mut graph = StageGraph::default();
    let down_w = config.downscale.apply(desc.width);
    let down_h = config.downscale.apply(desc.height);
    // When CoC is evaluated from depth the reduced buffer holds a
    // single-channel depth proxy instead of scene color.
    let downscaled_format = match (config.variant, config.coc_source) {
        (PipelineVariant::Temporal, CocSource::Depth) => COC_FORMAT,
        _ => accumulation_format,
    };

    let source = graph.resource(ResourceDesc {
        name: "scene color",
        width: desc.width,
        height: desc.height,
        format: desc.format,
        persistent: false,
        external: true,
    });
    let target = graph.resource(ResourceDesc {
        name: "shutter target",
        width: desc.width,
        height: desc.height,
        format: accumulation_format,
        persistent: false,
        external: false,
    });
    let downscaled = graph.resource(ResourceDesc {
        name: "downscaled",
        width: down_w,
        height: down_h,
        format: downscaled_format,
        persistent: false,
        external: false,
    });

    match config.variant {
        PipelineVariant::ExposureOnly => {
            graph.stage("exposure downscale", StageKind::Downscale, vec![source], downscaled);
            graph.stage(
                "exposure blend",
                StageKind::ExposureBlend,
                vec![source, downscaled],
                target,
            );
            graph.stage("output", StageKind::Composite, vec![target], source);
        }
        PipelineVariant::Temporal => {
            let depth = graph.resource(ResourceDesc {
                name: "scene depth",
                width: desc.width,
                height: desc.height,
                format: DEPTH_FORMAT,
                persistent: false,
                external: true,
            });
            let history = graph.resource(ResourceDesc {
                name: "accumulation history",
                width: desc.width,
                height: desc.height,
                format: accumulation_format,
                persistent: true,
                external: false,
            });
            let coc = graph.resource(ResourceDesc {
                name: "coc map",
                width: down_w,
                height: down_h,
                format: COC_FORMAT,
                persistent: false,
                external: false,
            });

            let downscale_input = match config.coc_source {
                CocSource::SceneColor => source,
                CocSource::Depth => depth,
            };
            graph.stage("downscale", StageKind::Downscale, vec![downscale_input], downscaled);
            graph.stage(
                "coc prepass",
                StageKind::CocPrepass,
                vec![downscaled, depth],
                coc,
            );
            graph.stage(
                "temporal blend",
                StageKind::TemporalBlend,
                vec![source, history, coc],
                target,
            );
            graph.stage("history copy", StageKind::HistoryCopy, vec![target], history);
            graph.stage("output", StageKind::Composite, vec![target], source);
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc() -> TargetDescriptor {
        TargetDescriptor {
            width: 1920,
            height: 1080,
            format: wgpu::TextureFormat::Rgba16Float,
            hdr: true,
        }
    }

    #[test]
    fn test_temporal_stage_order_is_fixed() {
        let graph = build_graph(&PipelineConfig::default(), &desc(), desc().format);
        let kinds: Vec<StageKind> = graph.stages.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            [
                StageKind::Downscale,
                StageKind::CocPrepass,
                StageKind::TemporalBlend,
                StageKind::HistoryCopy,
                StageKind::Composite,
            ]
        );
    }

    #[test]
    fn test_each_stage_consumes_prior_output() {
        let graph = build_graph(&PipelineConfig::default(), &desc(), desc().format);
        for pair in graph.stages.windows(2) {
            assert!(
                pair[1].inputs.contains(&pair[0].output)
                    || pair[1].output == pair[0].output
                    || pair[1].inputs == pair[0].inputs,
                "{} does not depend on {}",
                pair[1].name,
                pair[0].name
            );
        }
        // The blend reads the CoC map the prepass wrote.
        let coc_out = graph.stages[1].output;
        assert!(graph.stages[2].inputs.contains(&coc_out));
    }

    #[test]
    fn test_only_history_is_persistent() {
        let graph = build_graph(&PipelineConfig::default(), &desc(), desc().format);
        let persistent: Vec<&str> = graph.persistent_resources().map(|r| r.name).collect();
        assert_eq!(persistent, ["accumulation history"]);
    }

    #[test]
    fn test_divisor_sizing() {
        for (divisor, factor) in [
            (DownscaleDivisor::Half, 2),
            (DownscaleDivisor::Third, 3),
            (DownscaleDivisor::Quarter, 4),
        ] {
            let config = PipelineConfig {
                downscale: divisor,
                ..Default::default()
            };
            let graph = build_graph(&config, &desc(), desc().format);
            let down = graph
                .resources
                .iter()
                .find(|r| r.name == "downscaled")
                .unwrap();
            assert_eq!(down.width, 1920 / factor);
            assert_eq!(down.height, 1080 / factor);
        }
        // Tiny targets never collapse to zero.
        assert_eq!(DownscaleDivisor::Quarter.apply(3), 1);
    }

    #[test]
    fn test_exposure_only_has_no_temporal_state() {
        let config = PipelineConfig {
            variant: PipelineVariant::ExposureOnly,
            ..Default::default()
        };
        let graph = build_graph(&config, &desc(), desc().format);
        assert!(graph.persistent_resources().next().is_none());
        assert!(graph
            .stages
            .iter()
            .all(|s| s.kind != StageKind::TemporalBlend && s.kind != StageKind::HistoryCopy));
        let kinds: Vec<StageKind> = graph.stages.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            [StageKind::Downscale, StageKind::ExposureBlend, StageKind::Composite]
        );
    }

    #[test]
    fn test_depth_coc_source_feeds_downscale() {
        let config = PipelineConfig {
            coc_source: CocSource::Depth,
            ..Default::default()
        };
        let graph = build_graph(&config, &desc(), desc().format);
        let downscale = &graph.stages[0];
        let input = graph.resources[downscale.inputs[0]];
        assert_eq!(input.name, "scene depth");
    }
}
