//! Device-free integration: scheduler output feeding the pipeline's
//! per-frame declarations across simulated frames and a resize.

use obscura_core::{
    CameraRegistry, CameraTransform, ExposureMode, ExposureTarget, FrameContext, LensParameters,
    LensRig, RenderSettings,
};
use obscura_wgpu::{
    build_graph, negotiate_format, FormatProbe, PipelineConfig, ShutterUniforms, StageKind,
    TargetDescriptor,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

struct EverythingSupported;

impl FormatProbe for EverythingSupported {
    fn is_render_format(&self, _format: wgpu::TextureFormat) -> bool {
        true
    }
}

fn descriptor(width: u32, height: u32) -> TargetDescriptor {
    TargetDescriptor {
        width,
        height,
        format: wgpu::TextureFormat::Rgba16Float,
        hdr: true,
    }
}

#[test]
fn test_frame_cycle_feeds_pipeline_declaration() {
    let _ = env_logger::try_init();

    let mut registry = CameraRegistry::new();
    let camera = 1u64;
    registry.scheduler(camera).attach();

    let rig = LensRig {
        settings: LensParameters {
            shutter_speed: 1.0 / 24.0,
            aperture: 2.8,
            ..Default::default()
        },
        ..Default::default()
    };
    let exposure = ExposureTarget {
        desired_exposure: 0.0,
        mode: ExposureMode::DoNothing,
    };
    let settings = RenderSettings::default();
    let mut rng = StdRng::seed_from_u64(99);
    let mut transform = CameraTransform::default();

    let mut desc = descriptor(1280, 720);
    let config = PipelineConfig::default();

    for frame in 0..12 {
        // Window resize between frames 5 and 6.
        if frame == 6 {
            desc = descriptor(1920, 1080);
        }

        let ctx = FrameContext {
            width: desc.width,
            height: desc.height,
            fov_deg: 60.0,
            focal_length: None,
        };

        let home = transform;
        let params = registry
            .get_mut(camera)
            .unwrap()
            .begin_frame(
                &mut transform,
                &ctx,
                &rig,
                None,
                exposure,
                &settings,
                &mut rng,
            )
            .expect("attached camera publishes parameters");

        // The declaration for this frame matches the live descriptor.
        let format = negotiate_format(&EverythingSupported, desc.format);
        let graph = build_graph(&config, &desc, format);
        let history = graph
            .persistent_resources()
            .next()
            .expect("temporal variant persists a history buffer");
        assert_eq!((history.width, history.height), (desc.width, desc.height));

        // The blend stage consumes the scheduler's parameter block.
        assert!(graph
            .stages
            .iter()
            .any(|s| s.kind == StageKind::TemporalBlend));
        let uniforms = ShutterUniforms::new(&params, settings.enable_lens_flares, false);
        assert_eq!(uniforms.shutter[0], params.intensity);
        assert!(uniforms.shutter[1] > 0.0);

        registry
            .get_mut(camera)
            .unwrap()
            .end_frame(&mut transform, 1.0 / 48.0);
        assert_eq!(transform, home, "frame end restores the camera pose");
    }

    // Positive intensity once the timing history warms up to 1/48s frames
    // against a 1/24s shutter.
    let ctx = FrameContext {
        width: desc.width,
        height: desc.height,
        fov_deg: 60.0,
        focal_length: None,
    };
    let params = registry
        .get_mut(camera)
        .unwrap()
        .begin_frame(
            &mut transform,
            &ctx,
            &rig,
            None,
            exposure,
            &settings,
            &mut rng,
        )
        .unwrap();
    assert!((params.intensity - 0.5).abs() < 1e-4);

    registry.remove(camera);
    assert!(registry.is_empty());
}
