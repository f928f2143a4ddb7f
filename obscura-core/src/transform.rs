//! Minimal camera transform the scheduler reads and perturbs.

use glam::{Mat3, Quat, Vec2, Vec3};

/// World-space camera pose. Right-handed, -Z forward, +Y up, matching the
/// wgpu view convention used by the render backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for CameraTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl CameraTransform {
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Offset the position in the camera's own frame (x right, y up).
    pub fn translate_local(&mut self, offset: Vec2) {
        self.position += self.rotation * Vec3::new(offset.x, offset.y, 0.0);
    }

    /// Re-aim the camera so `forward()` points at `target`, keeping roll
    /// aligned to `up`.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let to_target = target - self.position;
        if to_target.length_squared() < f32::EPSILON {
            return;
        }
        let z_axis = (-to_target).normalize();
        let x_axis = up.cross(z_axis).normalize();
        let y_axis = z_axis.cross(x_axis);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(x_axis, y_axis, z_axis)).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_axes() {
        let t = CameraTransform::default();
        assert_eq!(t.forward(), Vec3::NEG_Z);
        assert_eq!(t.up(), Vec3::Y);
        assert_eq!(t.right(), Vec3::X);
    }

    #[test]
    fn test_translate_local_uses_camera_frame() {
        let mut t = CameraTransform {
            position: Vec3::ZERO,
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        };
        // Camera yawed 90 degrees left: local +x maps to world -z.
        t.translate_local(Vec2::new(1.0, 0.0));
        assert!((t.position - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_look_at_aims_forward_axis() {
        let mut t = CameraTransform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::IDENTITY,
        };
        let target = Vec3::new(-4.0, 0.5, -7.0);
        t.look_at(target, Vec3::Y);
        let expected = (target - t.position).normalize();
        assert!((t.forward() - expected).length() < 1e-5);
        // Roll stays upright.
        assert!(t.up().dot(Vec3::Y) > 0.0);
    }

    #[test]
    fn test_look_at_degenerate_target_is_noop() {
        let mut t = CameraTransform::default();
        let before = t;
        t.look_at(t.position, Vec3::Y);
        assert_eq!(t, before);
    }
}
