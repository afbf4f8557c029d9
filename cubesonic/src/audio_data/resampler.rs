use crate::error::{CubeSonicError, Result};
use rubato::{FftFixedIn, Resampler};

/// Offline sample-rate conversion of a mono voice buffer to the device rate.
pub struct AudioResampler {
    source_sample_rate: u32,
    target_sample_rate: u32,
    chunk_size: usize,
}

impl AudioResampler {
    pub fn new(
        source_sample_rate: u32,
        target_sample_rate: u32,
        chunk_size: Option<usize>,
    ) -> Result<Self> {
        if source_sample_rate == 0 || target_sample_rate == 0 {
            return Err(CubeSonicError::AudioFormat(
                "Sample rates must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            source_sample_rate,
            target_sample_rate,
            chunk_size: chunk_size.unwrap_or(1024),
        })
    }

    pub fn resample(&self, samples: &[f32]) -> Result<Vec<f32>> {
        if self.source_sample_rate == self.target_sample_rate {
            return Ok(samples.to_vec());
        }

        let mut resampler = FftFixedIn::<f32>::new(
            self.source_sample_rate as usize,
            self.target_sample_rate as usize,
            self.chunk_size,
            2, // sub_chunks
            1,
        )
        .map_err(|e| CubeSonicError::AudioLoading(format!("Failed to create resampler: {}", e)))?;

        let expected_len = (samples.len() as f64 * self.ratio()).round() as usize;
        if expected_len == 0 {
            return Ok(Vec::new());
        }

        // The FFT filter delays its output; skip that many leading samples
        let delay = resampler.output_delay();
        let mut output = Vec::with_capacity(delay + expected_len + self.chunk_size);
        let mut input_chunk = vec![0.0f32; self.chunk_size];
        let mut chunks = samples.chunks(self.chunk_size);

        // Keep feeding zero chunks after the input runs out to flush the tail
        while output.len() < delay + expected_len {
            input_chunk.fill(0.0);
            if let Some(chunk) = chunks.next() {
                input_chunk[..chunk.len()].copy_from_slice(chunk);
            }

            let waves_out = resampler
                .process(std::slice::from_ref(&input_chunk), None)
                .map_err(|e| CubeSonicError::AudioLoading(format!("Resampling error: {}", e)))?;

            match waves_out.first() {
                Some(channel) if !channel.is_empty() => output.extend_from_slice(channel),
                _ => {
                    return Err(CubeSonicError::AudioLoading(
                        "Resampler produced no output".to_string(),
                    ));
                }
            }
        }

        output.drain(..delay);
        output.truncate(expected_len);
        Ok(output)
    }

    pub fn target_sample_rate(&self) -> u32 {
        self.target_sample_rate
    }

    pub fn source_sample_rate(&self) -> u32 {
        self.source_sample_rate
    }

    pub fn ratio(&self) -> f64 {
        self.target_sample_rate as f64 / self.source_sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resampler_creation() {
        let resampler = AudioResampler::new(44100, 48000, None).unwrap();
        assert_eq!(resampler.source_sample_rate(), 44100);
        assert_eq!(resampler.target_sample_rate(), 48000);
    }

    #[test]
    fn test_no_resampling_needed() {
        let resampler = AudioResampler::new(44100, 44100, None).unwrap();
        let samples = vec![0.1, 0.2, 0.3, 0.4];
        assert_eq!(resampler.resample(&samples).unwrap(), samples);
    }

    #[test]
    fn test_output_length_follows_ratio() {
        let resampler = AudioResampler::new(24000, 48000, Some(512)).unwrap();
        let samples = vec![0.0f32; 24000];
        let output = resampler.resample(&samples).unwrap();
        assert_eq!(output.len(), 48000);
    }

    #[test]
    fn test_constant_signal_has_no_leading_silence() {
        let resampler = AudioResampler::new(24000, 48000, Some(512)).unwrap();
        let samples = vec![1.0f32; 24000];
        let output = resampler.resample(&samples).unwrap();
        assert_eq!(output.len(), 48000);

        // Allow a few samples of edge ringing at each end
        assert!(output[16] > 0.8, "start is silent: {}", output[16]);
        assert!(output[24000] > 0.8);
        assert!(output[48000 - 16] > 0.8, "tail is cut: {}", output[48000 - 16]);
    }

    #[test]
    fn test_downsampled_sine_stays_aligned() {
        let resampler = AudioResampler::new(48000, 24000, Some(1024)).unwrap();
        let samples: Vec<f32> = (0..48000)
            .map(|i| (2.0 * std::f32::consts::PI * 100.0 * i as f32 / 48000.0).sin())
            .collect();
        let output = resampler.resample(&samples).unwrap();
        assert_eq!(output.len(), 24000);

        // Quarter period of 100 Hz at 24 kHz is sample 60
        for i in [60usize, 6060, 12060] {
            assert!((output[i] - 1.0).abs() < 0.05, "sample {} = {}", i, output[i]);
        }
    }

    #[test]
    fn test_invalid_sample_rates() {
        assert!(AudioResampler::new(0, 48000, None).is_err());
        assert!(AudioResampler::new(44100, 0, None).is_err());
    }
}
