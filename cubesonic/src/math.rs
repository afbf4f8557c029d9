//! Math types for CubeSonic

pub use glam::Vec3;

/// Which way the listener faces for a given rotation angle.
///
/// The "at" vector sweeps the plane spanned by `forward_at_zero` and
/// `forward_at_quarter_turn`:
/// `at = cos(theta) * forward_at_zero + sin(theta) * forward_at_quarter_turn`.
/// The "up" vector never changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationConvention {
    pub forward_at_zero: Vec3,
    pub forward_at_quarter_turn: Vec3,
    pub up: Vec3,
}

impl OrientationConvention {
    /// The sound-stage convention: the listener turns in the Y/Z plane with +X up.
    pub const YZ_PLANE_X_UP: Self = Self {
        forward_at_zero: Vec3::Y,
        forward_at_quarter_turn: Vec3::Z,
        up: Vec3::X,
    };

    pub fn orientation(&self, rotation: f32) -> ListenerOrientation {
        let (sin, cos) = rotation.sin_cos();
        ListenerOrientation {
            at: self.forward_at_zero * cos + self.forward_at_quarter_turn * sin,
            up: self.up,
        }
    }
}

impl Default for OrientationConvention {
    fn default() -> Self {
        Self::YZ_PLANE_X_UP
    }
}

/// The ("at", "up") pair a spatial backend consumes as listener orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListenerOrientation {
    pub at: Vec3,
    pub up: Vec3,
}

impl ListenerOrientation {
    /// The listener's right-hand direction, `at x up`.
    pub fn right(&self) -> Vec3 {
        self.at.cross(self.up)
    }

    /// Flattened `[at.x, at.y, at.z, up.x, up.y, up.z]`, the layout OpenAL-style
    /// backends take for listener orientation.
    pub fn to_array(&self) -> [f32; 6] {
        [
            self.at.x, self.at.y, self.at.z, self.up.x, self.up.y, self.up.z,
        ]
    }
}

impl Default for ListenerOrientation {
    fn default() -> Self {
        OrientationConvention::default().orientation(0.0)
    }
}

/// Position and rotation of the listener.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ListenerPose {
    pub position: Vec3,
    /// Radians about the convention's up axis.
    pub rotation: f32,
}

impl ListenerPose {
    pub fn new(position: Vec3, rotation: f32) -> Self {
        Self { position, rotation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_default_orientation_matches_formula() {
        let convention = OrientationConvention::default();
        for step in -64..=64 {
            let theta = step as f32 * PI / 16.0;
            let orientation = convention.orientation(theta);
            let expected = Vec3::new(0.0, theta.cos(), theta.sin());
            assert!(orientation.at.abs_diff_eq(expected, EPSILON), "theta = {}", theta);
            assert_eq!(orientation.up, Vec3::X);
        }
    }

    #[test]
    fn test_quarter_turn_faces_z() {
        let orientation = OrientationConvention::default().orientation(FRAC_PI_2);
        assert!(orientation.at.abs_diff_eq(Vec3::Z, EPSILON));
    }

    #[test]
    fn test_right_vector() {
        let orientation = ListenerOrientation::default();
        assert_eq!(orientation.at, Vec3::Y);
        assert_eq!(orientation.right(), Vec3::NEG_Z);
    }

    #[test]
    fn test_to_array_layout() {
        let orientation = ListenerOrientation::default();
        assert_eq!(orientation.to_array(), [0.0, 1.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_custom_convention() {
        let convention = OrientationConvention {
            forward_at_zero: Vec3::NEG_Z,
            forward_at_quarter_turn: Vec3::X,
            up: Vec3::Y,
        };
        let orientation = convention.orientation(FRAC_PI_2);
        assert!(orientation.at.abs_diff_eq(Vec3::X, EPSILON));
        assert_eq!(orientation.up, Vec3::Y);
    }
}
