use crate::math::{ListenerOrientation, Vec3};
use crate::spatial::{Attenuation, PlaybackParams};

/// Directives forwarded from [`CpalBackend`](super::CpalBackend) to the audio callback.
#[derive(Debug)]
pub enum VoiceCommand {
    /// Mono samples already at the output sample rate
    Load(Vec<f32>),
    SetLooping(bool),
    SetReferenceDistance(f32),
    SetSourcePosition(Vec3),
    SetListenerPosition(Vec3),
    SetListenerOrientation(ListenerOrientation),
    Play,
    Stop,
}

/// Software voice: one mono buffer rendered to stereo with distance
/// attenuation and constant-power balance.
///
/// Lives on the audio thread. `Play` restarts from the first frame and `Stop`
/// rewinds, matching OpenAL source semantics.
#[derive(Debug)]
pub struct VoiceRenderer {
    samples: Vec<f32>,
    cursor: usize,
    looping: bool,
    playing: bool,
    attenuation: Attenuation,
    source: Vec3,
    listener: Vec3,
    orientation: ListenerOrientation,
    params: PlaybackParams,
}

impl VoiceRenderer {
    pub fn new(attenuation: Attenuation) -> Self {
        let mut renderer = Self {
            samples: Vec::new(),
            cursor: 0,
            looping: false,
            playing: false,
            attenuation,
            source: Vec3::ZERO,
            listener: Vec3::ZERO,
            orientation: ListenerOrientation::default(),
            params: PlaybackParams::default(),
        };
        renderer.update_params();
        renderer
    }

    pub fn apply(&mut self, command: VoiceCommand) {
        match command {
            VoiceCommand::Load(samples) => {
                self.samples = samples;
                self.cursor = 0;
                self.playing = false;
            }
            VoiceCommand::SetLooping(looping) => self.looping = looping,
            VoiceCommand::SetReferenceDistance(distance) => {
                self.attenuation.reference_distance = distance;
                self.update_params();
            }
            VoiceCommand::SetSourcePosition(position) => {
                self.source = position;
                self.update_params();
            }
            VoiceCommand::SetListenerPosition(position) => {
                self.listener = position;
                self.update_params();
            }
            VoiceCommand::SetListenerOrientation(orientation) => {
                self.orientation = orientation;
                self.update_params();
            }
            VoiceCommand::Play => {
                self.cursor = 0;
                self.playing = !self.samples.is_empty();
            }
            VoiceCommand::Stop => {
                self.cursor = 0;
                self.playing = false;
            }
        }
    }

    /// Mixes the voice into `buffer` (interleaved, `channels` wide).
    /// Returns the number of frames that carried audio.
    pub fn render(&mut self, buffer: &mut [f32], channels: u16) -> usize {
        let channels = channels as usize;
        if !self.playing || channels == 0 {
            return 0;
        }

        let mut frames_filled = 0;
        for frame in buffer.chunks_mut(channels) {
            if self.cursor >= self.samples.len() {
                if self.looping && !self.samples.is_empty() {
                    self.cursor = 0;
                } else {
                    self.playing = false;
                    break;
                }
            }

            let sample = self.samples[self.cursor];
            match frame {
                [mono] => *mono += sample * self.params.attenuation,
                [left, right, ..] => {
                    *left += sample * self.params.left_gain;
                    *right += sample * self.params.right_gain;
                }
                [] => {}
            }

            self.cursor += 1;
            frames_filled += 1;
        }

        frames_filled
    }

    pub fn params(&self) -> PlaybackParams {
        self.params
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn update_params(&mut self) {
        self.params = PlaybackParams::compute(
            &self.attenuation,
            self.source,
            self.listener,
            &self.orientation,
        );
    }
}
