use crate::math::{ListenerOrientation, Vec3};
use std::f32::consts::FRAC_PI_4;

/// Left/right balance of `source` as heard from `listener` facing `orientation`.
///
/// Returns -1.0 for fully left, 1.0 for fully right. A source at the listener's
/// position is centred.
pub fn balance(listener: Vec3, orientation: &ListenerOrientation, source: Vec3) -> f32 {
    let Some(direction) = (source - listener).try_normalize() else {
        return 0.0;
    };
    let Some(right) = orientation.right().try_normalize() else {
        return 0.0;
    };
    direction.dot(right).clamp(-1.0, 1.0)
}

/// Constant-power gains `(left, right)` for a balance in `[-1, 1]`.
pub fn constant_power_gains(pan: f32) -> (f32, f32) {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
    (angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::OrientationConvention;

    #[test]
    fn test_source_ahead_is_centred() {
        let orientation = ListenerOrientation::default();
        let pan = balance(Vec3::ZERO, &orientation, Vec3::new(0.0, 2.0, 0.0));
        assert!(pan.abs() < 1e-6);
    }

    #[test]
    fn test_source_on_right() {
        // facing +Y with +X up, the right-hand side is -Z
        let orientation = ListenerOrientation::default();
        let pan = balance(Vec3::ZERO, &orientation, Vec3::new(0.0, 0.0, -1.0));
        assert!((pan - 1.0).abs() < 1e-6);
        let pan = balance(Vec3::ZERO, &orientation, Vec3::new(0.0, 0.0, 1.0));
        assert!((pan + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_turning_moves_source_across() {
        let convention = OrientationConvention::default();
        let source = Vec3::new(0.0, 0.0, 1.0);
        let facing = convention.orientation(std::f32::consts::FRAC_PI_2);
        assert!(balance(Vec3::ZERO, &facing, source).abs() < 1e-6);
        let away = convention.orientation(0.0);
        assert!(balance(Vec3::ZERO, &away, source) < -0.99);
    }

    #[test]
    fn test_coincident_source() {
        let orientation = ListenerOrientation::default();
        assert_eq!(balance(Vec3::ONE, &orientation, Vec3::ONE), 0.0);
    }

    #[test]
    fn test_constant_power() {
        let (left, right) = constant_power_gains(0.0);
        assert!((left - right).abs() < 1e-6);
        assert!((left * left + right * right - 1.0).abs() < 1e-6);

        let (left, right) = constant_power_gains(1.0);
        assert!(left.abs() < 1e-6);
        assert!((right - 1.0).abs() < 1e-6);
    }
}
