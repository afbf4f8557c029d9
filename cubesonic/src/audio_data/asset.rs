use crate::audio_data::{AudioDataLoader, DefaultAudioLoader, PcmBuffer};
use crate::error::Result;

/// Loader that hands out copies of a buffer already in memory.
pub struct InMemoryLoader {
    buffer: PcmBuffer,
}

impl InMemoryLoader {
    pub fn new(buffer: PcmBuffer) -> Self {
        Self { buffer }
    }
}

impl AudioDataLoader for InMemoryLoader {
    fn load(&self, _path: &str) -> Result<PcmBuffer> {
        Ok(self.buffer.clone())
    }
}

/// The sound a playback session plays: a path plus the loader that decodes it.
///
/// The asset is decoded again every time a voice is allocated, so the decoded
/// buffer only lives for the duration of the upload.
pub struct AudioAsset {
    path: String,
    loader: Box<dyn AudioDataLoader>,
}

impl AudioAsset {
    /// A WAV file decoded with [`DefaultAudioLoader`].
    pub fn from_path(path: impl Into<String>) -> Self {
        Self::with_loader(path, DefaultAudioLoader)
    }

    pub fn with_loader(path: impl Into<String>, loader: impl AudioDataLoader + 'static) -> Self {
        Self {
            path: path.into(),
            loader: Box::new(loader),
        }
    }

    pub fn in_memory(buffer: PcmBuffer) -> Self {
        Self::with_loader("<memory>", InMemoryLoader::new(buffer))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Decodes the asset and validates its format.
    pub fn decode(&self) -> Result<PcmBuffer> {
        let buffer = self.loader.load(&self.path)?;
        buffer.validate()?;
        log::debug!(
            "Decoded {}: {} frames, {} Hz, {} ch, {} bit",
            self.path,
            buffer.total_frames(),
            buffer.sample_rate(),
            buffer.format().channels,
            buffer.format().bits_per_sample
        );
        Ok(buffer)
    }
}

impl std::fmt::Debug for AudioAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioAsset").field("path", &self.path).finish()
    }
}
