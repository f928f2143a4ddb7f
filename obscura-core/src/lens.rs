//! Physical lens and camera-body model.
//!
//! All parameter handling here is silently clamping: implausible values are
//! pulled back into range by [`LensParameters::validate`] instead of being
//! rejected, so downstream math never divides by zero or sees a NaN.

/// Lens + body parameters for one camera, in physical units.
///
/// `aperture` is an f-number, `shutter_speed` is in seconds, `focus_distance`
/// in meters. `blade_curvature` is an (f-number, f-number) pair: below the
/// first bound the iris is fully round, above the second it is fully
/// polygonal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LensParameters {
    pub focus_distance: f32,
    pub aperture: f32,
    pub shutter_speed: f32,
    pub iso: f32,
    pub blade_count: i32,
    pub blade_curvature: (f32, f32),
    pub anamorphism: f32,
}

impl Default for LensParameters {
    fn default() -> Self {
        Self {
            focus_distance: 10.0,
            aperture: 5.6,
            shutter_speed: 1.0 / 30.0,
            iso: 200.0,
            blade_count: 5,
            blade_curvature: (2.0, 11.0),
            anamorphism: 0.0,
        }
    }
}

/// Which one of the photometric triangle values an exposure override mutates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExposureMode {
    DoNothing,
    #[default]
    OverrideIso,
    OverrideAperture,
    OverrideShutterSpeed,
}

/// A desired exposure in stops plus the parameter allowed to move to reach it.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExposureTarget {
    /// Exposure compensation in stops, [-10, 10].
    pub desired_exposure: f32,
    pub mode: ExposureMode,
}

impl LensParameters {
    /// Clamp every field into its physical range and sort the curvature pair.
    /// Idempotent; never rejects input.
    pub fn validate(&mut self) -> &mut Self {
        self.aperture = self.aperture.clamp(0.7, 32.0);
        self.focus_distance = self.focus_distance.max(0.01);
        self.shutter_speed = self.shutter_speed.max(0.002);
        self.iso = self.iso.max(50.0);
        self.blade_count = self.blade_count.clamp(3, 11);
        self.anamorphism = self.anamorphism.clamp(-1.0, 1.0);

        let lo = self.blade_curvature.0.clamp(0.7, 32.0);
        let hi = self.blade_curvature.1.clamp(0.7, 32.0);
        self.blade_curvature = (lo.min(hi), lo.max(hi));
        self
    }

    /// Reach `target.desired_exposure` by rewriting exactly one of
    /// iso / aperture / shutter speed; the other two are untouched.
    pub fn apply_exposure(&mut self, target: ExposureTarget) -> &mut Self {
        let ev = target.desired_exposure.clamp(-10.0, 10.0);
        // Linear multiplier the exposure should land on.
        let m = 2f32.powf(-ev);
        match target.mode {
            ExposureMode::DoNothing => {}
            ExposureMode::OverrideIso => {
                self.iso = 120.0 * m * self.aperture * self.aperture / self.shutter_speed;
            }
            ExposureMode::OverrideAperture => {
                // 0.09128709 = sqrt(1/120), the inverse of the calibration
                // factor used by the iso and shutter overrides.
                self.aperture =
                    (0.09128709 * (m * self.shutter_speed * self.iso).sqrt() / m).abs();
            }
            ExposureMode::OverrideShutterSpeed => {
                self.shutter_speed = 120.0 * m * self.aperture * self.aperture / self.iso;
            }
        }
        self
    }

    /// Linear color multiplier for the current triangle, relative to the
    /// ISO-100 f/1 1s baseline. Deliberately left in log2/pow form rather
    /// than reduced to `iso * shutter / (120 * aperture^2)`.
    pub fn exposure_color_multiplier(&self) -> f32 {
        let ev100 = ((self.aperture * self.aperture / self.shutter_speed)
            * (100.0 / self.iso))
            .log2();
        1.0 / (1.2 * 2f32.powf(ev100))
    }

    /// Bokeh roundness in [0, 1]: 1 when the aperture is at or below the
    /// lower curvature bound (round iris), 0 at or above the upper bound
    /// (blades fully visible).
    pub fn current_curvature(&self) -> f32 {
        let (lo, hi) = self.blade_curvature;
        remap(self.aperture, lo, hi, 1.0, 0.0).clamp(0.0, 1.0)
    }
}

fn remap(value: f32, range_min: f32, range_max: f32, target_min: f32, target_max: f32) -> f32 {
    target_min + (value - range_min) * (target_max - target_min) / (range_max - range_min)
}

/// Focal length in millimeters for a vertical field of view, assuming a
/// 24mm sensor height (full-frame). Fallback for cameras that carry no
/// physical lens description.
pub fn focal_length_from_fov(fov_deg: f32, sensor_height_mm: f32) -> f32 {
    sensor_height_mm * 0.5 / (fov_deg.to_radians() * 0.5).tan()
}

/// Where a lens field group is read from when both a physical camera
/// description and override settings exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SourcePolicy {
    /// Always read the override settings.
    Settings,
    /// Read the physical camera when one is present, else the settings.
    #[default]
    PhysicalCamera,
}

/// Pick between a physical-camera value and a settings fallback under one
/// policy. The same rule applies to every lens field group.
pub fn resolve<T>(has_physical: bool, policy: SourcePolicy, physical: T, fallback: T) -> T {
    if has_physical && policy == SourcePolicy::PhysicalCamera {
        physical
    } else {
        fallback
    }
}

/// Per-camera lens configuration: fallback parameters plus a source policy
/// for each of the three field groups (body, lens, aperture shape).
#[derive(Clone, Copy, Debug, Default)]
pub struct LensRig {
    pub settings: LensParameters,
    pub body_source: SourcePolicy,
    pub lens_source: SourcePolicy,
    pub shape_source: SourcePolicy,
}

impl LensRig {
    /// Merge the rig with an optional physical camera description into the
    /// parameter set used this frame. Output is not yet validated.
    pub fn resolve_lens(&self, physical: Option<&LensParameters>) -> LensParameters {
        let has = physical.is_some();
        let phys = physical.copied().unwrap_or(self.settings);
        LensParameters {
            iso: resolve(has, self.body_source, phys.iso, self.settings.iso),
            shutter_speed: resolve(
                has,
                self.body_source,
                phys.shutter_speed,
                self.settings.shutter_speed,
            ),
            focus_distance: resolve(
                has,
                self.lens_source,
                phys.focus_distance,
                self.settings.focus_distance,
            ),
            aperture: resolve(has, self.lens_source, phys.aperture, self.settings.aperture),
            anamorphism: resolve(
                has,
                self.lens_source,
                phys.anamorphism,
                self.settings.anamorphism,
            ),
            blade_count: resolve(
                has,
                self.shape_source,
                phys.blade_count,
                self.settings.blade_count,
            ),
            blade_curvature: resolve(
                has,
                self.shape_source,
                phys.blade_curvature,
                self.settings.blade_curvature,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wild() -> LensParameters {
        LensParameters {
            focus_distance: -4.0,
            aperture: 100.0,
            shutter_speed: 0.0,
            iso: 1.0,
            blade_count: 99,
            blade_curvature: (40.0, 0.1),
            anamorphism: 3.0,
        }
    }

    #[test]
    fn test_validate_clamps_everything() {
        let mut lens = wild();
        lens.validate();
        assert_eq!(lens.aperture, 32.0);
        assert_eq!(lens.focus_distance, 0.01);
        assert_eq!(lens.shutter_speed, 0.002);
        assert_eq!(lens.iso, 50.0);
        assert_eq!(lens.blade_count, 11);
        assert_eq!(lens.anamorphism, 1.0);
    }

    #[test]
    fn test_validate_is_idempotent() {
        let mut once = wild();
        once.validate();
        let mut twice = once;
        twice.validate();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_validate_sorts_curvature_pair() {
        let mut lens = LensParameters {
            blade_curvature: (11.0, 2.0),
            ..Default::default()
        };
        lens.validate();
        assert!(lens.blade_curvature.0 <= lens.blade_curvature.1);
        assert_eq!(lens.blade_curvature, (2.0, 11.0));
    }

    #[test]
    fn test_do_nothing_leaves_triangle_alone() {
        let mut lens = LensParameters::default();
        let before = lens;
        lens.apply_exposure(ExposureTarget {
            desired_exposure: 3.5,
            mode: ExposureMode::DoNothing,
        });
        assert_eq!(lens.iso, before.iso);
        assert_eq!(lens.aperture, before.aperture);
        assert_eq!(lens.shutter_speed, before.shutter_speed);
    }

    // After an override with linear target m = 2^(-ev), the triangle holds
    // ev100 = log2(100 / (120 * m)), so the multiplier's 1.2 factor cancels
    // and the multiplier itself lands on m.
    fn assert_round_trip(mode: ExposureMode, ev: f32) {
        let mut lens = LensParameters::default();
        lens.validate();
        lens.apply_exposure(ExposureTarget {
            desired_exposure: ev,
            mode,
        });
        let expected = 2f32.powf(-ev);
        let got = lens.exposure_color_multiplier();
        assert!(
            (got - expected).abs() / expected < 1e-4,
            "{mode:?} ev={ev}: expected {expected}, got {got}"
        );
    }

    #[test]
    fn test_override_iso_round_trips_exposure() {
        assert_round_trip(ExposureMode::OverrideIso, 0.0);
        assert_round_trip(ExposureMode::OverrideIso, 2.0);
        assert_round_trip(ExposureMode::OverrideIso, -3.0);
    }

    #[test]
    fn test_override_aperture_round_trips_exposure() {
        assert_round_trip(ExposureMode::OverrideAperture, 1.0);
        assert_round_trip(ExposureMode::OverrideAperture, -1.0);
    }

    #[test]
    fn test_override_shutter_speed_round_trips_exposure() {
        assert_round_trip(ExposureMode::OverrideShutterSpeed, 0.5);
        assert_round_trip(ExposureMode::OverrideShutterSpeed, -2.0);
    }

    #[test]
    fn test_neutral_override_yields_unit_multiplier() {
        // ev = 0 pins the multiplier at exactly 1, whatever parameter moved.
        for mode in [
            ExposureMode::OverrideIso,
            ExposureMode::OverrideAperture,
            ExposureMode::OverrideShutterSpeed,
        ] {
            let mut lens = LensParameters::default();
            lens.validate();
            lens.apply_exposure(ExposureTarget {
                desired_exposure: 0.0,
                mode,
            });
            let got = lens.exposure_color_multiplier();
            assert!((got - 1.0).abs() < 1e-4, "{mode:?}: {got}");
        }
    }

    #[test]
    fn test_current_curvature_monotone_and_bounded() {
        let mut prev = f32::INFINITY;
        for i in 0..64 {
            let lens = LensParameters {
                aperture: 0.7 + i as f32 * 0.49,
                ..Default::default()
            };
            let c = lens.current_curvature();
            assert!((0.0..=1.0).contains(&c));
            assert!(c <= prev, "curvature must not increase with aperture");
            prev = c;
        }
    }

    #[test]
    fn test_current_curvature_endpoints() {
        let lens = LensParameters {
            aperture: 0.7,
            blade_curvature: (2.0, 11.0),
            ..Default::default()
        };
        assert_eq!(lens.current_curvature(), 1.0);
        let lens = LensParameters {
            aperture: 32.0,
            blade_curvature: (2.0, 11.0),
            ..Default::default()
        };
        assert_eq!(lens.current_curvature(), 0.0);
    }

    #[test]
    fn test_focal_length_from_fov() {
        // 24mm sensor, ~53.13 degrees vfov -> 24mm lens.
        let f = focal_length_from_fov(53.130104, 24.0);
        assert!((f - 24.0).abs() < 1e-3, "got {f}");
    }

    #[test]
    fn test_resolve_policies() {
        assert_eq!(resolve(true, SourcePolicy::PhysicalCamera, 1, 2), 1);
        assert_eq!(resolve(false, SourcePolicy::PhysicalCamera, 1, 2), 2);
        assert_eq!(resolve(true, SourcePolicy::Settings, 1, 2), 2);
        assert_eq!(resolve(false, SourcePolicy::Settings, 1, 2), 2);
    }

    #[test]
    fn test_lens_rig_mixed_sources() {
        let rig = LensRig {
            settings: LensParameters {
                iso: 400.0,
                aperture: 8.0,
                ..Default::default()
            },
            body_source: SourcePolicy::Settings,
            lens_source: SourcePolicy::PhysicalCamera,
            shape_source: SourcePolicy::PhysicalCamera,
        };
        let physical = LensParameters {
            iso: 100.0,
            aperture: 1.4,
            blade_count: 9,
            ..Default::default()
        };
        let lens = rig.resolve_lens(Some(&physical));
        assert_eq!(lens.iso, 400.0); // body comes from settings
        assert_eq!(lens.aperture, 1.4); // lens comes from the camera
        assert_eq!(lens.blade_count, 9);
    }
}
