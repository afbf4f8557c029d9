//! Playback backends.
//!
//! A backend is the sink for the directives the parameter engine issues: it
//! owns the single voice (device, buffer and source) and turns positions and
//! orientation into sound. [`CpalBackend`] renders in software through the
//! default output device; [`RecordingBackend`] only records what it is told.

mod cpal_backend;
mod recording;
mod voice;

pub use cpal_backend::CpalBackend;
pub use recording::RecordingBackend;
pub use voice::{VoiceCommand, VoiceRenderer};

use crate::audio_data::PcmBuffer;
use crate::error::Result;
use crate::math::{ListenerOrientation, Vec3};

/// Directive sink for a single spatialized voice.
///
/// Directives must be applied in the order they are issued. Allocation and
/// buffer upload failures are fatal to the session; every other method may
/// reject a command with [`CubeSonicError::Backend`](crate::CubeSonicError::Backend)
/// and must then leave its state unchanged.
pub trait PlaybackBackend {
    /// Opens the device and creates the voice.
    fn allocate_voice(&mut self) -> Result<()>;

    /// Releases everything `allocate_voice` created. Safe to call twice.
    fn release_voice(&mut self);

    /// Uploads decoded PCM into the voice. The buffer is dropped when the call returns.
    fn load_buffer(&mut self, buffer: PcmBuffer) -> Result<()>;

    fn set_looping(&mut self, looping: bool) -> Result<()>;

    fn set_reference_distance(&mut self, distance: f32) -> Result<()>;

    fn set_source_position(&mut self, position: Vec3) -> Result<()>;

    fn set_listener_position(&mut self, position: Vec3) -> Result<()>;

    fn set_listener_orientation(&mut self, orientation: ListenerOrientation) -> Result<()>;

    fn play(&mut self) -> Result<()>;

    fn stop(&mut self) -> Result<()>;
}

/// Kind of a [`Directive`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    AllocateVoice,
    ReleaseVoice,
    LoadBuffer,
    SetLooping,
    SetReferenceDistance,
    SetSourcePosition,
    SetListenerPosition,
    SetListenerOrientation,
    Play,
    Stop,
}

impl DirectiveKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AllocateVoice => "allocate_voice",
            Self::ReleaseVoice => "release_voice",
            Self::LoadBuffer => "load_buffer",
            Self::SetLooping => "set_looping",
            Self::SetReferenceDistance => "set_reference_distance",
            Self::SetSourcePosition => "set_source_position",
            Self::SetListenerPosition => "set_listener_position",
            Self::SetListenerOrientation => "set_listener_orientation",
            Self::Play => "play",
            Self::Stop => "stop",
        }
    }
}

/// One applied backend directive.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    AllocateVoice,
    ReleaseVoice,
    LoadBuffer {
        frames: usize,
        sample_rate: u32,
        channels: u16,
    },
    SetLooping(bool),
    SetReferenceDistance(f32),
    SetSourcePosition(Vec3),
    SetListenerPosition(Vec3),
    SetListenerOrientation(ListenerOrientation),
    Play,
    Stop,
}

impl Directive {
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Self::AllocateVoice => DirectiveKind::AllocateVoice,
            Self::ReleaseVoice => DirectiveKind::ReleaseVoice,
            Self::LoadBuffer { .. } => DirectiveKind::LoadBuffer,
            Self::SetLooping(_) => DirectiveKind::SetLooping,
            Self::SetReferenceDistance(_) => DirectiveKind::SetReferenceDistance,
            Self::SetSourcePosition(_) => DirectiveKind::SetSourcePosition,
            Self::SetListenerPosition(_) => DirectiveKind::SetListenerPosition,
            Self::SetListenerOrientation(_) => DirectiveKind::SetListenerOrientation,
            Self::Play => DirectiveKind::Play,
            Self::Stop => DirectiveKind::Stop,
        }
    }
}
