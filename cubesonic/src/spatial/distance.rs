/// How gain falls off with distance between listener and source.
///
/// The formulas follow the OpenAL distance models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceModel {
    /// No attenuation, gain is always 1.0
    None,
    /// `ref / (ref + rolloff * (d - ref))` with `d` clamped to `[ref, max]`
    #[default]
    InverseClamped,
    /// `1 - rolloff * (d - ref) / (max - ref)` with `d` clamped to `[ref, max]`
    LinearClamped,
}

/// Parameters of a distance model; `reference_distance` is the knee of the curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub model: DistanceModel,
    pub reference_distance: f32,
    pub rolloff_factor: f32,
    pub max_distance: f32,
}

impl Attenuation {
    pub fn gain(&self, distance: f32) -> f32 {
        let reference = self.reference_distance;
        let clamped = distance.max(reference).min(self.max_distance.max(reference));

        match self.model {
            DistanceModel::None => 1.0,
            DistanceModel::InverseClamped => {
                let denominator = reference + self.rolloff_factor * (clamped - reference);
                if denominator <= 0.0 {
                    1.0
                } else {
                    reference / denominator
                }
            }
            DistanceModel::LinearClamped => {
                let span = self.max_distance - reference;
                if span <= 0.0 || !span.is_finite() {
                    return 1.0;
                }
                (1.0 - self.rolloff_factor * (clamped - reference) / span).clamp(0.0, 1.0)
            }
        }
    }
}
