//! Spatial parameter model.
//!
//! Turns a source position and a listener pose into the gains a stereo
//! renderer applies: distance attenuation around the reference distance and a
//! constant-power left/right balance from the listener's orientation.

mod distance;
mod panning;

pub use distance::{Attenuation, DistanceModel};
pub use panning::{balance, constant_power_gains};

use crate::config::CubeSonicPlaybackDesc;
use crate::math::{ListenerOrientation, Vec3};

/// Derived playback parameters for one source/listener configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackParams {
    /// Distance between listener and source
    pub distance: f32,
    /// Gain from the distance model
    pub attenuation: f32,
    /// -1.0 (left) to 1.0 (right)
    pub pan: f32,
    /// `attenuation` times the constant-power left gain
    pub left_gain: f32,
    /// `attenuation` times the constant-power right gain
    pub right_gain: f32,
}

impl PlaybackParams {
    pub fn compute(
        attenuation: &Attenuation,
        source: Vec3,
        listener: Vec3,
        orientation: &ListenerOrientation,
    ) -> Self {
        let distance = listener.distance(source);
        let gain = attenuation.gain(distance);
        let pan = balance(listener, orientation, source);
        let (left, right) = constant_power_gains(pan);

        Self {
            distance,
            attenuation: gain,
            pan,
            left_gain: gain * left,
            right_gain: gain * right,
        }
    }
}

impl Default for PlaybackParams {
    fn default() -> Self {
        let (left, right) = constant_power_gains(0.0);
        Self {
            distance: 0.0,
            attenuation: 1.0,
            pan: 0.0,
            left_gain: left,
            right_gain: right,
        }
    }
}

impl From<&CubeSonicPlaybackDesc> for Attenuation {
    fn from(desc: &CubeSonicPlaybackDesc) -> Self {
        Self {
            model: desc.distance_model,
            reference_distance: desc.reference_distance,
            rolloff_factor: desc.rolloff_factor,
            max_distance: desc.max_distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_for_orbiting_listener() {
        let desc = CubeSonicPlaybackDesc::default();
        let attenuation = Attenuation::from(&desc);
        let orientation = ListenerOrientation::default();

        let params = PlaybackParams::compute(
            &attenuation,
            Vec3::ZERO,
            Vec3::new(0.0, 1.0, 0.0),
            &orientation,
        );

        assert!((params.distance - 1.0).abs() < 1e-6);
        assert!((params.attenuation - 0.15).abs() < 1e-6);
        assert!(params.pan.abs() < 1e-6);
        assert!((params.left_gain - params.right_gain).abs() < 1e-6);
    }
}
