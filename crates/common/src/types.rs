use glam::{Mat4, UVec2, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Spatial transform: position, Euler rotation (radians), scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Rotate-only matrix: `Rx * Ry * Rz`.
    ///
    /// Applied to a vector this rotates around Z first, then Y, then X, which
    /// is the intrinsic X→Y→Z order.
    pub fn rotation_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.rotation.x)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_z(self.rotation.z)
    }

    /// Full model matrix: `T * Rx * Ry * Rz * S`.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * self.rotation_matrix()
            * Mat4::from_scale(self.scale)
    }
}

/// Construction parameters for a plane.
///
/// Every field is optional. Absent fields resolve to their defaults; a present
/// value always applies, including zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneConfig {
    /// World position. Default `0`.
    pub position: Option<Vec3>,
    /// Euler rotation in radians, X→Y→Z. Default `0`.
    pub rotation: Option<Vec3>,
    /// Width and height. Default `1 × 1`.
    pub size: Option<Vec2>,
    /// Subdivision count along X and Y. Default `1 × 1`.
    pub segments: Option<UVec2>,
    /// Per-axis scale. Default `1`.
    pub scale: Option<Vec3>,
}

impl PlaneConfig {
    pub const DEFAULT_SIZE: Vec2 = Vec2::ONE;
    pub const DEFAULT_SEGMENTS: UVec2 = UVec2::ONE;

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = Some(Vec2::new(width, height));
        self
    }

    pub fn with_segments(mut self, x: u32, y: u32) -> Self {
        self.segments = Some(UVec2::new(x, y));
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Resolved transform with defaults applied.
    pub fn transform(&self) -> Transform {
        let defaults = Transform::default();
        Transform {
            position: self.position.unwrap_or(defaults.position),
            rotation: self.rotation.unwrap_or(defaults.rotation),
            scale: self.scale.unwrap_or(defaults.scale),
        }
    }

    pub fn resolved_size(&self) -> Vec2 {
        self.size.unwrap_or(Self::DEFAULT_SIZE)
    }

    pub fn resolved_segments(&self) -> UVec2 {
        self.segments.unwrap_or(Self::DEFAULT_SEGMENTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Vec3::ZERO);
        assert_eq!(t.scale, Vec3::ONE);
        assert!(t.matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn pure_x_rotation_ignores_zero_y_and_z() {
        let t = Transform {
            rotation: Vec3::new(FRAC_PI_2, 0.0, 0.0),
            ..Transform::default()
        };
        let expected = Mat4::from_rotation_x(FRAC_PI_2);
        assert!(t.rotation_matrix().abs_diff_eq(expected, 1e-5));
        assert!(t.matrix().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn rotation_order_is_x_then_y_then_z() {
        let t = Transform {
            rotation: Vec3::new(FRAC_PI_2, FRAC_PI_2, 0.0),
            ..Transform::default()
        };
        let xy = Mat4::from_rotation_x(FRAC_PI_2) * Mat4::from_rotation_y(FRAC_PI_2);
        let yx = Mat4::from_rotation_y(FRAC_PI_2) * Mat4::from_rotation_x(FRAC_PI_2);
        assert!(t.rotation_matrix().abs_diff_eq(xy, 1e-5));
        assert!(!t.rotation_matrix().abs_diff_eq(yx, 1e-5));
    }

    #[test]
    fn rotate_only_matrix_has_no_translation_or_scale() {
        let t = Transform {
            position: Vec3::new(3.0, -2.0, 7.0),
            rotation: Vec3::new(0.3, 0.2, 0.1),
            scale: Vec3::splat(4.0),
        };
        let r = t.rotation_matrix();
        assert_eq!(r.w_axis, glam::Vec4::W);
        assert!((r.x_axis.truncate().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn translation_lands_in_last_column() {
        let t = Transform {
            position: Vec3::new(-8.0, 1.0, 2.0),
            ..Transform::default()
        };
        let p = t.matrix().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(-8.0, 1.0, 2.0), 1e-6));
    }

    #[test]
    fn plane_config_defaults() {
        let cfg = PlaneConfig::default();
        assert_eq!(cfg.transform(), Transform::default());
        assert_eq!(cfg.resolved_size(), Vec2::ONE);
        assert_eq!(cfg.resolved_segments(), UVec2::ONE);
    }

    #[test]
    fn present_zero_overrides_apply() {
        let cfg = PlaneConfig::default()
            .with_position(Vec3::ZERO)
            .with_scale(Vec3::new(0.0, 1.0, 1.0))
            .with_size(0.0, 2.0);
        assert_eq!(cfg.transform().scale.x, 0.0);
        assert_eq!(cfg.resolved_size(), Vec2::new(0.0, 2.0));
    }

    #[test]
    fn plane_config_from_partial_json() {
        let cfg: PlaneConfig =
            serde_json::from_str(r#"{ "position": [-8.0, 0.0, 0.0], "segments": [4, 2] }"#)
                .unwrap();
        assert_eq!(cfg.transform().position, Vec3::new(-8.0, 0.0, 0.0));
        assert_eq!(cfg.resolved_segments(), UVec2::new(4, 2));
        assert_eq!(cfg.rotation, None);
        assert_eq!(cfg.resolved_size(), Vec2::ONE);
    }
}
