//! Orbit scene driver.
//!
//! Reproduces the sound stage the engine was built for: a listener walks a
//! ring around the sound source one degree per frame, while the scene cycles
//! through four modes that isolate what changes the perceived sound.
//!
//! | Mode | Source        | Listener facing     | What you hear            |
//! |------|---------------|---------------------|--------------------------|
//! | 1    | centre        | towards the source  | constant                 |
//! | 2    | centre        | fixed               | balance follows position |
//! | 3    | on the ring   | towards the source  | volume follows distance  |
//! | 4    | on the ring   | fixed               | both change              |
//!
//! # Example
//!
//! ```rust,ignore
//! let mut driver = OrbitDriver::new();
//! driver.apply_source(&mut playback)?;
//! loop {
//!     driver.tick(&mut playback)?;
//!     if tapped {
//!         driver.advance_mode(&mut playback)?;
//!     }
//! }
//! ```

use crate::backend::PlaybackBackend;
use crate::error::Result;
use crate::math::{ListenerPose, Vec3};
use crate::playback::CubeSonicPlayback;
use std::f32::consts::PI;

pub const INNER_RING_RADIUS: f32 = 1.0;
pub const OUTER_RING_RADIUS: f32 = 1.1;
/// The listener walks midway between the two rings.
pub const ORBIT_RADIUS: f32 = (INNER_RING_RADIUS + OUTER_RING_RADIUS) / 2.0;
/// Clockwise step of the listener per frame.
pub const DEGREES_PER_FRAME: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneMode {
    #[default]
    Constant,
    ListenerMoves,
    ListenerTurns,
    MovesAndTurns,
}

impl SceneMode {
    /// 1-based mode number as shown to users.
    pub fn number(&self) -> u8 {
        match self {
            Self::Constant => 1,
            Self::ListenerMoves => 2,
            Self::ListenerTurns => 3,
            Self::MovesAndTurns => 4,
        }
    }

    /// The mode a tap switches to; wraps from 4 back to 1.
    pub fn next(&self) -> Self {
        match self {
            Self::Constant => Self::ListenerMoves,
            Self::ListenerMoves => Self::ListenerTurns,
            Self::ListenerTurns => Self::MovesAndTurns,
            Self::MovesAndTurns => Self::Constant,
        }
    }

    pub fn source_position(&self) -> Vec3 {
        match self {
            Self::Constant | Self::ListenerMoves => Vec3::ZERO,
            Self::ListenerTurns | Self::MovesAndTurns => Vec3::new(0.0, ORBIT_RADIUS, 0.0),
        }
    }

    /// Whether the listener keeps turning towards the source.
    pub fn faces_source(&self) -> bool {
        matches!(self, Self::Constant | Self::ListenerTurns)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Constant => "constant sound",
            Self::ListenerMoves => "sound follows the listener's position",
            Self::ListenerTurns => "sound follows the listener's rotation",
            Self::MovesAndTurns => "sound follows the listener's position and rotation",
        }
    }
}

impl std::fmt::Display for SceneMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mode {} ({})", self.number(), self.description())
    }
}

/// Frame-driven pose generator for the orbit scene.
#[derive(Debug, Clone, Default)]
pub struct OrbitDriver {
    mode: SceneMode,
    angle_degrees: f32,
    frame: u64,
}

impl OrbitDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: SceneMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> SceneMode {
        self.mode
    }

    pub fn angle_degrees(&self) -> f32 {
        self.angle_degrees
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Listener pose at `angle_degrees` along the ring in the current mode.
    ///
    /// Facing modes point the listener at the source; the others keep a fixed
    /// facing. Either way the result is offset by half a turn, since the
    /// listener's zero rotation looks away from the centre of the ring.
    pub fn listener_pose_at(&self, angle_degrees: f32) -> ListenerPose {
        let (sin, cos) = angle_degrees.to_radians().sin_cos();
        let position = Vec3::new(0.0, cos * ORBIT_RADIUS, sin * ORBIT_RADIUS);

        let facing = if self.mode.faces_source() {
            let source = self.mode.source_position();
            (position.z - source.z).atan2(position.y - source.y)
        } else {
            0.0
        };

        ListenerPose::new(position, facing - PI)
    }

    /// Steps the listener one frame along the ring without touching an engine.
    pub fn advance(&mut self) -> ListenerPose {
        self.angle_degrees -= DEGREES_PER_FRAME;
        if self.angle_degrees <= -360.0 {
            self.angle_degrees += 360.0;
        }
        self.frame += 1;
        self.listener_pose_at(self.angle_degrees)
    }

    /// Advances one frame and pushes the new listener pose into `playback`.
    pub fn tick<B: PlaybackBackend>(
        &mut self,
        playback: &mut CubeSonicPlayback<B>,
    ) -> Result<ListenerPose> {
        let pose = self.advance();
        playback.set_listener_pose(pose)?;
        Ok(pose)
    }

    /// Switches to the next mode and moves the source accordingly.
    pub fn advance_mode<B: PlaybackBackend>(
        &mut self,
        playback: &mut CubeSonicPlayback<B>,
    ) -> Result<SceneMode> {
        self.mode = self.mode.next();
        log::info!("Scene switched to {}", self.mode);
        self.apply_source(playback)?;
        Ok(self.mode)
    }

    /// Places the source where the current mode wants it.
    pub fn apply_source<B: PlaybackBackend>(&self, playback: &mut CubeSonicPlayback<B>) -> Result<()> {
        playback.set_source_position(self.mode.source_position())
    }
}
