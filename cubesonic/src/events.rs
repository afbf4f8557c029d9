//! Event types for CubeSonic

/// Notifications queued by [`CubeSonicPlayback`](crate::CubeSonicPlayback) for
/// the driver to poll once per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum CubeSonicEvent {
    VoiceAllocated,
    VoiceReleased,
    PlaybackStarted,
    PlaybackStopped,
    InterruptionBegan {
        /// Whether the voice was playing when the interruption arrived
        was_playing: bool,
    },
    InterruptionEnded {
        /// Whether playback was restarted automatically
        resumed: bool,
    },
    /// A non-fatal backend rejection; engine state was left unchanged
    CommandRejected {
        command: &'static str,
        error: String,
    },
}

impl CubeSonicEvent {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::CommandRejected { .. })
    }

    pub fn is_interruption(&self) -> bool {
        matches!(
            self,
            Self::InterruptionBegan { .. } | Self::InterruptionEnded { .. }
        )
    }
}
