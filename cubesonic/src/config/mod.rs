mod playback_desc;

pub use playback_desc::CubeSonicPlaybackDesc;
