//! The spatial audio parameter engine.
//!
//! [`CubeSonicPlayback`] owns one looping voice on a [`PlaybackBackend`] and
//! translates pose updates into backend directives:
//! - [`VoiceState`]: lifecycle of the voice (idle, initialized, playing, stopped)
//! - [`CubeSonicPlayback`]: pose setters, start/stop and interruption handling
//!
//! All methods run synchronously on the caller's thread and issue directives
//! in call order.

use crate::audio_data::{AudioAsset, PcmBuffer};
use crate::backend::PlaybackBackend;
use crate::config::CubeSonicPlaybackDesc;
use crate::error::{CubeSonicError, Result};
use crate::events::CubeSonicEvent;
use crate::math::{ListenerOrientation, ListenerPose, Vec3};
use crate::session::{AudioSession, InterruptionPhase, SessionSubscription};
use crate::spatial::{Attenuation, PlaybackParams};
use std::sync::Arc;

/// Lifecycle of the single voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    /// No backend resources are allocated
    Idle,
    /// Voice allocated and configured, never started
    Initialized,
    Playing,
    Stopped,
}

impl VoiceState {
    pub fn has_voice(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Positional playback of one looping sound for a moving listener.
///
/// Construction decodes the asset and allocates the voice; any failure there
/// is fatal and returned from [`CubeSonicPlayback::new`]. After that, rejected
/// runtime commands are reported as errors and events but never change the
/// engine's state.
///
/// # Example
///
/// ```no_run
/// use cubesonic::*;
///
/// let desc = CubeSonicPlaybackDesc::default();
/// let backend = CpalBackend::new(desc.clone());
/// let asset = AudioAsset::from_path("assets/sound.wav");
/// let mut playback = CubeSonicPlayback::new(desc, backend, asset)?;
///
/// playback.set_listener_position(Vec3::new(0.0, 1.05, 0.0))?;
/// playback.set_listener_rotation(-std::f32::consts::PI)?;
/// playback.start()?;
/// # Ok::<(), CubeSonicError>(())
/// ```
pub struct CubeSonicPlayback<B: PlaybackBackend> {
    desc: CubeSonicPlaybackDesc,
    backend: B,
    asset: AudioAsset,
    source_position: Vec3,
    listener: ListenerPose,
    orientation: ListenerOrientation,
    state: VoiceState,
    was_interrupted: bool,
    session: Option<Arc<AudioSession>>,
    subscription: Option<SessionSubscription>,
    events: Vec<CubeSonicEvent>,
}

impl<B: PlaybackBackend> CubeSonicPlayback<B> {
    /// Creates the engine and allocates its voice.
    ///
    /// Source and listener start at the origin with zero rotation.
    ///
    /// # Errors
    ///
    /// Returns a fatal error if the asset cannot be decoded or has an
    /// unsupported format, or if the backend cannot allocate and configure the
    /// voice. No backend resources are held after a failure.
    pub fn new(desc: CubeSonicPlaybackDesc, backend: B, asset: AudioAsset) -> Result<Self> {
        let orientation = desc.orientation.orientation(0.0);
        let mut playback = Self {
            desc,
            backend,
            asset,
            source_position: Vec3::ZERO,
            listener: ListenerPose::default(),
            orientation,
            state: VoiceState::Idle,
            was_interrupted: false,
            session: None,
            subscription: None,
            events: Vec::new(),
        };
        playback.initialize()?;
        Ok(playback)
    }

    /// Like [`new`](Self::new), then subscribes to `session` for interruptions
    /// and activates it.
    pub fn with_session(
        desc: CubeSonicPlaybackDesc,
        backend: B,
        asset: AudioAsset,
        session: Arc<AudioSession>,
    ) -> Result<Self> {
        let mut playback = Self::new(desc, backend, asset)?;
        playback.session = Some(session);
        playback.subscribe()?;
        playback.activate_session();
        Ok(playback)
    }

    pub fn set_source_position(&mut self, position: Vec3) -> Result<()> {
        let previous = self.source_position;
        self.source_position = position;

        if self.state.has_voice() {
            if let Err(e) = self.backend.set_source_position(position) {
                self.source_position = previous;
                return Err(self.rejected("set_source_position", e));
            }
        }
        Ok(())
    }

    pub fn set_listener_position(&mut self, position: Vec3) -> Result<()> {
        let previous = self.listener.position;
        self.listener.position = position;

        if self.state.has_voice() {
            if let Err(e) = self.backend.set_listener_position(position) {
                self.listener.position = previous;
                return Err(self.rejected("set_listener_position", e));
            }
        }
        Ok(())
    }

    /// Sets the listener rotation in radians and rederives the orientation.
    ///
    /// With the default convention `at = (0, cos θ, sin θ)` and `up = (1, 0, 0)`.
    pub fn set_listener_rotation(&mut self, rotation: f32) -> Result<()> {
        let previous = (self.listener.rotation, self.orientation);
        self.listener.rotation = rotation;
        self.orientation = self.desc.orientation.orientation(rotation);

        if self.state.has_voice() {
            if let Err(e) = self.backend.set_listener_orientation(self.orientation) {
                (self.listener.rotation, self.orientation) = previous;
                return Err(self.rejected("set_listener_orientation", e));
            }
        }
        Ok(())
    }

    pub fn set_listener_pose(&mut self, pose: ListenerPose) -> Result<()> {
        self.set_listener_position(pose.position)?;
        self.set_listener_rotation(pose.rotation)
    }

    /// Starts the looping voice.
    ///
    /// Calling `start` while already playing does nothing.
    ///
    /// # Errors
    ///
    /// [`CubeSonicError::NoVoice`] while interrupted or torn down; a backend
    /// error if the play command is rejected, in which case the engine stays
    /// stopped.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            VoiceState::Idle => Err(CubeSonicError::NoVoice),
            VoiceState::Playing => {
                log::debug!("start() ignored, already playing");
                Ok(())
            }
            VoiceState::Initialized | VoiceState::Stopped => {
                if let Err(e) = self.backend.play() {
                    return Err(self.rejected("play", e));
                }
                self.state = VoiceState::Playing;
                self.events.push(CubeSonicEvent::PlaybackStarted);
                log::info!("Playback started");
                Ok(())
            }
        }
    }

    /// Stops the voice. Does nothing unless playing.
    pub fn stop(&mut self) -> Result<()> {
        if self.state != VoiceState::Playing {
            log::debug!("stop() ignored in state {:?}", self.state);
            return Ok(());
        }

        if let Err(e) = self.backend.stop() {
            return Err(self.rejected("stop", e));
        }
        self.state = VoiceState::Stopped;
        self.events.push(CubeSonicEvent::PlaybackStopped);
        log::info!("Playback stopped");
        Ok(())
    }

    /// Reacts to an external interruption.
    ///
    /// `Began` releases the voice and remembers whether it was playing.
    /// `Ended` reallocates the voice and restarts playback if, and only if,
    /// it was playing when the interruption began.
    ///
    /// # Errors
    ///
    /// Only `Ended` can fail: a fatal error if the voice cannot be reallocated,
    /// or the error from the automatic restart.
    pub fn handle_interruption(&mut self, phase: InterruptionPhase) -> Result<()> {
        match phase {
            InterruptionPhase::Began => {
                let was_playing = self.is_playing();
                self.release_voice();
                if was_playing {
                    self.was_interrupted = true;
                }
                self.events
                    .push(CubeSonicEvent::InterruptionBegan { was_playing });
                log::info!("Interruption began (was playing: {})", was_playing);
                Ok(())
            }
            InterruptionPhase::Ended => {
                self.activate_session();
                self.initialize()?;

                let resumed = self.was_interrupted;
                self.was_interrupted = false;
                self.events.push(CubeSonicEvent::InterruptionEnded { resumed });
                log::info!("Interruption ended (resuming: {})", resumed);

                if resumed {
                    self.start()?;
                }
                Ok(())
            }
        }
    }

    /// Subscribes to the session passed at construction. No-op without a
    /// session or when already subscribed.
    pub fn subscribe(&mut self) -> Result<()> {
        if self.subscription.is_some() {
            return Ok(());
        }
        if let Some(session) = &self.session {
            self.subscription = Some(session.subscribe()?);
        }
        Ok(())
    }

    pub fn unsubscribe(&mut self) -> Result<()> {
        match (&self.session, self.subscription.take()) {
            (Some(session), Some(subscription)) => session.unsubscribe(subscription),
            _ => Ok(()),
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Handles every interruption queued by the session, oldest first.
    pub fn poll_session(&mut self) -> Result<()> {
        let mut pending = Vec::new();
        if let Some(subscription) = &self.subscription {
            while let Some(phase) = subscription.try_next() {
                pending.push(phase);
            }
        }

        for phase in pending {
            self.handle_interruption(phase)?;
        }
        Ok(())
    }

    /// Releases the voice. The engine can no longer play until an
    /// interruption ends.
    pub fn teardown(&mut self) {
        self.release_voice();
        self.was_interrupted = false;
    }

    /// Playback parameters derived from the current poses.
    pub fn params(&self) -> PlaybackParams {
        PlaybackParams::compute(
            &Attenuation::from(&self.desc),
            self.source_position,
            self.listener.position,
            &self.orientation,
        )
    }

    pub fn poll_events(&mut self) -> Vec<CubeSonicEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn source_position(&self) -> Vec3 {
        self.source_position
    }

    pub fn listener_position(&self) -> Vec3 {
        self.listener.position
    }

    pub fn listener_rotation(&self) -> f32 {
        self.listener.rotation
    }

    pub fn listener_pose(&self) -> ListenerPose {
        self.listener
    }

    pub fn orientation(&self) -> ListenerOrientation {
        self.orientation
    }

    pub fn reference_distance(&self) -> f32 {
        self.desc.reference_distance
    }

    pub fn is_playing(&self) -> bool {
        self.state == VoiceState::Playing
    }

    pub fn was_interrupted(&self) -> bool {
        self.was_interrupted
    }

    pub fn voice_state(&self) -> VoiceState {
        self.state
    }

    pub fn config(&self) -> &CubeSonicPlaybackDesc {
        &self.desc
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn initialize(&mut self) -> Result<()> {
        if self.state.has_voice() {
            return Ok(());
        }

        let buffer = self.asset.decode()?;
        self.backend.allocate_voice()?;

        // The buffer moves into the backend and is freed when the upload returns
        if let Err(e) = self.configure_voice(buffer) {
            self.backend.release_voice();
            return Err(e);
        }

        self.state = VoiceState::Initialized;
        self.events.push(CubeSonicEvent::VoiceAllocated);
        log::debug!("Voice initialized for {}", self.asset.path());
        Ok(())
    }

    fn configure_voice(&mut self, buffer: PcmBuffer) -> Result<()> {
        self.backend.load_buffer(buffer)?;
        self.replay_state().map_err(|e| match e {
            CubeSonicError::Backend { command, reason } => CubeSonicError::AudioDevice(format!(
                "Failed to configure voice ({}): {}",
                command, reason
            )),
            other => other,
        })
    }

    fn replay_state(&mut self) -> Result<()> {
        self.backend.set_looping(self.desc.looping)?;
        self.backend.set_source_position(self.source_position)?;
        self.backend
            .set_reference_distance(self.desc.reference_distance)?;
        self.backend.set_listener_position(self.listener.position)?;
        self.backend.set_listener_orientation(self.orientation)
    }

    fn release_voice(&mut self) {
        if !self.state.has_voice() {
            return;
        }
        self.backend.release_voice();
        self.state = VoiceState::Idle;
        self.events.push(CubeSonicEvent::VoiceReleased);
        log::debug!("Voice released");
    }

    fn activate_session(&self) {
        if let Some(session) = &self.session {
            if let Err(e) = session.set_active(true) {
                log::error!("Error setting audio session active: {}", e);
            }
        }
    }

    fn rejected(&mut self, command: &'static str, error: CubeSonicError) -> CubeSonicError {
        log::warn!("{} failed: {}", command, error);
        self.events.push(CubeSonicEvent::CommandRejected {
            command,
            error: error.to_string(),
        });
        error
    }
}

impl<B: PlaybackBackend> Drop for CubeSonicPlayback<B> {
    fn drop(&mut self) {
        self.teardown();
        let _ = self.unsubscribe();
    }
}
