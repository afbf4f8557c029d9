pub mod audio_data;
pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod math;
pub mod playback;
pub mod scene;
pub mod session;
pub mod spatial;

pub use audio_data::{AudioAsset, AudioDataLoader, DefaultAudioLoader, PcmBuffer, PcmFormat};
pub use backend::{CpalBackend, Directive, DirectiveKind, PlaybackBackend, RecordingBackend};
pub use config::CubeSonicPlaybackDesc;
pub use error::{CubeSonicError, Result};
pub use events::CubeSonicEvent;
pub use math::{ListenerOrientation, ListenerPose, OrientationConvention, Vec3};
pub use playback::{CubeSonicPlayback, VoiceState};
pub use scene::{OrbitDriver, SceneMode};
pub use session::{AudioSession, InterruptionPhase, SessionSubscription};
pub use spatial::{Attenuation, DistanceModel, PlaybackParams};
