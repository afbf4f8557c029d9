use crate::math::OrientationConvention;
use crate::spatial::DistanceModel;

/// Configuration descriptor for a CubeSonic playback session
#[derive(Debug, Clone)]
pub struct CubeSonicPlaybackDesc {
    /// Distance at which attenuation begins to roll off, in scene units
    pub reference_distance: f32,
    /// How quickly gain falls off past the reference distance
    pub rolloff_factor: f32,
    /// Distance beyond which gain stops decreasing
    pub max_distance: f32,
    pub distance_model: DistanceModel,
    /// Whether the single voice loops
    pub looping: bool,
    /// Mapping from listener rotation to the (at, up) orientation pair
    pub orientation: OrientationConvention,
    /// Output sample rate requested from the device
    pub sample_rate: u32,
    /// Frames per device callback
    pub block_size: usize,
    /// Output channels (typically 2 for stereo)
    pub channels: u16,
    /// Capacity of the directive queue between the engine and the audio callback
    pub command_capacity: usize,
}

impl Default for CubeSonicPlaybackDesc {
    fn default() -> Self {
        Self {
            reference_distance: 0.15,
            rolloff_factor: 1.0,
            max_distance: f32::MAX,
            distance_model: DistanceModel::InverseClamped,
            looping: true,
            orientation: OrientationConvention::default(),
            sample_rate: 48000,
            block_size: 512,
            channels: 2,
            command_capacity: 256,
        }
    }
}

impl CubeSonicPlaybackDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reference_distance(mut self, distance: f32) -> Self {
        self.reference_distance = distance;
        self
    }

    pub fn rolloff_factor(mut self, factor: f32) -> Self {
        self.rolloff_factor = factor;
        self
    }

    pub fn max_distance(mut self, distance: f32) -> Self {
        self.max_distance = distance;
        self
    }

    pub fn distance_model(mut self, model: DistanceModel) -> Self {
        self.distance_model = model;
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn orientation(mut self, convention: OrientationConvention) -> Self {
        self.orientation = convention;
        self
    }

    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = rate;
        self
    }

    pub fn block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    pub fn channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    pub fn command_capacity(mut self, capacity: usize) -> Self {
        self.command_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_sound_stage() {
        let desc = CubeSonicPlaybackDesc::default();
        assert_eq!(desc.reference_distance, 0.15);
        assert!(desc.looping);
        assert_eq!(desc.orientation, OrientationConvention::YZ_PLANE_X_UP);
        assert_eq!(desc.distance_model, DistanceModel::InverseClamped);
    }

    #[test]
    fn test_builder_setters() {
        let desc = CubeSonicPlaybackDesc::new()
            .reference_distance(1.0)
            .rolloff_factor(2.0)
            .looping(false)
            .sample_rate(44100);
        assert_eq!(desc.reference_distance, 1.0);
        assert_eq!(desc.rolloff_factor, 2.0);
        assert!(!desc.looping);
        assert_eq!(desc.sample_rate, 44100);
    }
}
