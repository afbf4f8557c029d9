use crate::audio_data::PcmBuffer;
use crate::error::Result;

/// Trait for loading decoded PCM audio from file paths.
///
/// CubeSonic ships a Symphonia-backed [`DefaultAudioLoader`](super::DefaultAudioLoader)
/// for WAV files. Bring your own loader for other containers, as long as it
/// produces linear PCM that passes [`PcmFormat::validate`](super::PcmFormat::validate).
///
/// # Example
///
/// ```ignore
/// use cubesonic::audio_data::{AudioDataLoader, PcmBuffer};
/// use cubesonic::error::Result;
///
/// struct SilenceLoader;
///
/// impl AudioDataLoader for SilenceLoader {
///     fn load(&self, _path: &str) -> Result<PcmBuffer> {
///         Ok(PcmBuffer::from_i16(&[0; 4410], 1, 44100))
///     }
/// }
/// ```
pub trait AudioDataLoader: Send {
    /// Loads and decodes the audio at `path`.
    ///
    /// # Errors
    ///
    /// Returns a `CubeSonicError` if the file cannot be read, is not PCM, or
    /// uses a sample layout a voice cannot play.
    fn load(&self, path: &str) -> Result<PcmBuffer>;
}
