mod asset;
mod default_loader;
mod loader;
mod resampler;

use crate::error::{CubeSonicError, Result};
pub use asset::{AudioAsset, InMemoryLoader};
pub use default_loader::DefaultAudioLoader;
pub use loader::AudioDataLoader;
pub use resampler::AudioResampler;
use std::time::Duration;

/// Byte order of multi-byte samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    #[cfg(target_endian = "little")]
    pub const NATIVE: Self = Self::Little;
    #[cfg(target_endian = "big")]
    pub const NATIVE: Self = Self::Big;
}

/// How samples are encoded in the source asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleEncoding {
    LinearPcm,
    Float,
    /// Anything that is not raw PCM, named by its codec
    Compressed(String),
}

/// Format description of decoded PCM audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmFormat {
    pub encoding: SampleEncoding,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub endianness: Endianness,
}

impl PcmFormat {
    pub fn mono16() -> Self {
        Self {
            encoding: SampleEncoding::LinearPcm,
            channels: 1,
            bits_per_sample: 16,
            endianness: Endianness::NATIVE,
        }
    }

    pub fn stereo16() -> Self {
        Self {
            channels: 2,
            ..Self::mono16()
        }
    }

    /// Checks the format against what a voice can play: linear PCM, one or
    /// two channels, 8 or 16 bits per sample, native byte order.
    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 || self.channels > 2 {
            return Err(CubeSonicError::AudioFormat(format!(
                "Unsupported channel count {}, must be mono or stereo",
                self.channels
            )));
        }

        if self.encoding != SampleEncoding::LinearPcm {
            return Err(CubeSonicError::AudioFormat(format!(
                "Unsupported encoding {:?}, must be linear PCM",
                self.encoding
            )));
        }

        // 8-bit samples are single bytes, byte order does not apply
        if self.bits_per_sample > 8 && self.endianness != Endianness::NATIVE {
            return Err(CubeSonicError::AudioFormat(format!(
                "Unsupported byte order {:?}, must be native-endian PCM",
                self.endianness
            )));
        }

        if self.bits_per_sample != 8 && self.bits_per_sample != 16 {
            return Err(CubeSonicError::AudioFormat(format!(
                "Unsupported bit depth {}, must be 8 or 16 bit PCM",
                self.bits_per_sample
            )));
        }

        Ok(())
    }

    pub fn bytes_per_frame(&self) -> usize {
        self.channels as usize * (self.bits_per_sample as usize).div_ceil(8)
    }
}

/// Decoded audio ready to be uploaded into a voice.
///
/// # Data Format
/// `data` holds raw **INTERLEAVED** samples exactly as described by `format`:
/// unsigned bytes for 8-bit audio, native-endian `i16` for 16-bit audio.
/// A buffer is moved into [`PlaybackBackend::load_buffer`](crate::backend::PlaybackBackend::load_buffer)
/// and freed when that call returns.
#[derive(Debug, Clone)]
pub struct PcmBuffer {
    format: PcmFormat,
    sample_rate: u32,
    data: Vec<u8>,
}

impl PcmBuffer {
    /// Wraps raw sample bytes. The format is not checked here; voices call
    /// [`PcmFormat::validate`] before uploading.
    pub fn new(format: PcmFormat, sample_rate: u32, data: Vec<u8>) -> Self {
        Self {
            format,
            sample_rate,
            data,
        }
    }

    /// Builds a 16-bit buffer from interleaved samples.
    pub fn from_i16(samples: &[i16], channels: u16, sample_rate: u32) -> Self {
        let data = samples.iter().flat_map(|s| s.to_ne_bytes()).collect();
        let format = PcmFormat {
            channels,
            ..PcmFormat::mono16()
        };
        Self::new(format, sample_rate, data)
    }

    pub fn format(&self) -> &PcmFormat {
        &self.format
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn total_frames(&self) -> usize {
        match self.format.bytes_per_frame() {
            0 => 0,
            bytes => self.data.len() / bytes,
        }
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.total_frames() as f64 / self.sample_rate as f64)
    }

    /// Full validation: format, sample rate and whole frames.
    pub fn validate(&self) -> Result<()> {
        self.format.validate()?;

        if self.sample_rate == 0 {
            return Err(CubeSonicError::AudioFormat(
                "Sample rate must be greater than 0".to_string(),
            ));
        }

        if self.data.len() % self.format.bytes_per_frame() != 0 {
            return Err(CubeSonicError::AudioFormat(format!(
                "Data size {} is not a whole number of {}-byte frames",
                self.data.len(),
                self.format.bytes_per_frame()
            )));
        }

        Ok(())
    }

    /// Decodes to mono `f32` in `[-1, 1]` by averaging channels.
    pub fn to_mono_f32(&self) -> Result<Vec<f32>> {
        self.validate()?;

        let channels = self.format.channels as usize;
        let samples: Vec<f32> = match self.format.bits_per_sample {
            8 => self
                .data
                .iter()
                .map(|&b| (b as f32 - 128.0) / 128.0)
                .collect(),
            _ => self
                .data
                .chunks_exact(2)
                .map(|pair| i16::from_ne_bytes([pair[0], pair[1]]) as f32 / 32768.0)
                .collect(),
        };

        if channels == 1 {
            return Ok(samples);
        }

        Ok(samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_channels_rejected() {
        let format = PcmFormat {
            channels: 3,
            ..PcmFormat::mono16()
        };
        let err = format.validate().unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("channel count 3"));
    }

    #[test]
    fn test_bit_depth_and_encoding() {
        let eight = PcmFormat {
            bits_per_sample: 8,
            ..PcmFormat::stereo16()
        };
        assert!(eight.validate().is_ok());

        let twenty_four = PcmFormat {
            bits_per_sample: 24,
            ..PcmFormat::mono16()
        };
        assert!(twenty_four.validate().is_err());

        let float = PcmFormat {
            encoding: SampleEncoding::Float,
            bits_per_sample: 32,
            ..PcmFormat::mono16()
        };
        assert!(float.validate().is_err());

        let compressed = PcmFormat {
            encoding: SampleEncoding::Compressed("mp3".into()),
            ..PcmFormat::mono16()
        };
        assert!(compressed.validate().is_err());
    }

    #[test]
    fn test_foreign_endianness_rejected() {
        let foreign = match Endianness::NATIVE {
            Endianness::Little => Endianness::Big,
            Endianness::Big => Endianness::Little,
        };
        let format = PcmFormat {
            endianness: foreign,
            ..PcmFormat::mono16()
        };
        assert!(format.validate().is_err());

        // byte order is irrelevant for 8-bit samples
        let eight = PcmFormat {
            bits_per_sample: 8,
            endianness: foreign,
            ..PcmFormat::mono16()
        };
        assert!(eight.validate().is_ok());
    }

    #[test]
    fn test_frames_and_duration() {
        let buffer = PcmBuffer::from_i16(&[0; 48000 * 2], 2, 48000);
        assert_eq!(buffer.total_frames(), 48000);
        assert_eq!(buffer.duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_frame_rejected() {
        let buffer = PcmBuffer::new(PcmFormat::stereo16(), 44100, vec![0; 6]);
        assert!(buffer.validate().is_err());
    }

    #[test]
    fn test_to_mono_f32() {
        let buffer = PcmBuffer::from_i16(&[16384, -16384, 32767, 32767], 2, 44100);
        let mono = buffer.to_mono_f32().unwrap();
        assert_eq!(mono.len(), 2);
        assert!(mono[0].abs() < 1e-6);
        assert!((mono[1] - 32767.0 / 32768.0).abs() < 1e-6);

        let eight_bit = PcmBuffer::new(
            PcmFormat {
                bits_per_sample: 8,
                ..PcmFormat::mono16()
            },
            8000,
            vec![128, 0, 255],
        );
        let mono = eight_bit.to_mono_f32().unwrap();
        assert_eq!(mono[0], 0.0);
        assert_eq!(mono[1], -1.0);
        assert!((mono[2] - 127.0 / 128.0).abs() < 1e-6);
    }
}
