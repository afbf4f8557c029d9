use crate::audio_data::PcmBuffer;
use crate::backend::{Directive, DirectiveKind, PlaybackBackend};
use crate::error::{CubeSonicError, Result};
use crate::math::{ListenerOrientation, Vec3};
use std::collections::HashSet;

/// Backend that records every directive it accepts, in order.
///
/// Directive kinds can be marked as rejected to exercise failure paths:
/// a rejected `allocate_voice` or `load_buffer` fails like a missing device,
/// any other rejected directive fails with a non-fatal backend error.
/// Rejected directives are not recorded.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    directives: Vec<Directive>,
    rejected: HashSet<DirectiveKind>,
    voice_allocated: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following directive of `kind` fail.
    pub fn reject(&mut self, kind: DirectiveKind) {
        self.rejected.insert(kind);
    }

    pub fn accept(&mut self, kind: DirectiveKind) {
        self.rejected.remove(&kind);
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn take_directives(&mut self) -> Vec<Directive> {
        std::mem::take(&mut self.directives)
    }

    pub fn count(&self, kind: DirectiveKind) -> usize {
        self.directives.iter().filter(|d| d.kind() == kind).count()
    }

    pub fn last(&self, kind: DirectiveKind) -> Option<&Directive> {
        self.directives.iter().rev().find(|d| d.kind() == kind)
    }

    pub fn voice_allocated(&self) -> bool {
        self.voice_allocated
    }

    fn record(&mut self, directive: Directive) -> Result<()> {
        let kind = directive.kind();
        if self.rejected.contains(&kind) {
            return Err(match kind {
                DirectiveKind::AllocateVoice => {
                    CubeSonicError::AudioDevice("Voice allocation refused".to_string())
                }
                DirectiveKind::LoadBuffer => {
                    CubeSonicError::AudioDevice("Buffer upload refused".to_string())
                }
                _ => CubeSonicError::backend(kind.name(), "rejected by recording backend"),
            });
        }

        if kind != DirectiveKind::AllocateVoice && !self.voice_allocated {
            return Err(CubeSonicError::NoVoice);
        }

        log::debug!("Recorded directive {:?}", directive);
        self.directives.push(directive);
        Ok(())
    }
}

impl PlaybackBackend for RecordingBackend {
    fn allocate_voice(&mut self) -> Result<()> {
        self.record(Directive::AllocateVoice)?;
        self.voice_allocated = true;
        Ok(())
    }

    fn release_voice(&mut self) {
        if self.voice_allocated {
            self.directives.push(Directive::ReleaseVoice);
            self.voice_allocated = false;
        }
    }

    fn load_buffer(&mut self, buffer: PcmBuffer) -> Result<()> {
        self.record(Directive::LoadBuffer {
            frames: buffer.total_frames(),
            sample_rate: buffer.sample_rate(),
            channels: buffer.format().channels,
        })
    }

    fn set_looping(&mut self, looping: bool) -> Result<()> {
        self.record(Directive::SetLooping(looping))
    }

    fn set_reference_distance(&mut self, distance: f32) -> Result<()> {
        self.record(Directive::SetReferenceDistance(distance))
    }

    fn set_source_position(&mut self, position: Vec3) -> Result<()> {
        self.record(Directive::SetSourcePosition(position))
    }

    fn set_listener_position(&mut self, position: Vec3) -> Result<()> {
        self.record(Directive::SetListenerPosition(position))
    }

    fn set_listener_orientation(&mut self, orientation: ListenerOrientation) -> Result<()> {
        self.record(Directive::SetListenerOrientation(orientation))
    }

    fn play(&mut self) -> Result<()> {
        self.record(Directive::Play)
    }

    fn stop(&mut self) -> Result<()> {
        self.record(Directive::Stop)
    }
}
