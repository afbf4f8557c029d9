use crate::{
    audio_data::{AudioDataLoader, Endianness, PcmBuffer, PcmFormat, SampleEncoding},
    error::{CubeSonicError, Result},
};
use std::fs::File;
use std::path::Path;
use symphonia::{
    core::{
        audio::SampleBuffer,
        codecs::{
            CODEC_TYPE_PCM_F32BE, CODEC_TYPE_PCM_F32LE, CODEC_TYPE_PCM_F64BE, CODEC_TYPE_PCM_F64LE,
            CODEC_TYPE_PCM_S8, CODEC_TYPE_PCM_S16BE, CODEC_TYPE_PCM_S16LE, CODEC_TYPE_PCM_S24BE,
            CODEC_TYPE_PCM_S24LE, CODEC_TYPE_PCM_S32BE, CODEC_TYPE_PCM_S32LE, CODEC_TYPE_PCM_U8,
            CodecParameters, CodecType, DecoderOptions,
        },
        errors::Error,
        formats::FormatOptions,
        io::MediaSourceStream,
        meta::MetadataOptions,
        probe::Hint,
    },
    default::{get_codecs, get_probe},
};

/// Default audio loader implementation using the Symphonia decoder library.
///
/// Accepts uncompressed linear PCM only (8 or 16 bit, mono or stereo, in the
/// host's byte order) and returns the samples unconverted.
///
/// # Examples
///
/// ```ignore
/// use cubesonic::audio_data::{AudioDataLoader, DefaultAudioLoader};
///
/// let buffer = DefaultAudioLoader.load("assets/sound.wav")?;
/// ```
pub struct DefaultAudioLoader;

impl AudioDataLoader for DefaultAudioLoader {
    fn load(&self, path: &str) -> Result<PcmBuffer> {
        let file = File::open(path)?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = Path::new(path).extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| {
                CubeSonicError::AudioLoading(format!("Failed to probe audio format: {:?}", e))
            })?;

        let mut format = probed.format;

        let track = format.default_track().ok_or_else(|| {
            CubeSonicError::AudioLoading("No default audio track found".to_string())
        })?;
        let track_id = track.id;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| CubeSonicError::AudioLoading("Sample rate not found".to_string()))?;

        // Reject before decoding anything
        let pcm_format = pcm_format_of(&track.codec_params)?;
        pcm_format.validate()?;

        let mut decoder = get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| {
                CubeSonicError::AudioLoading(format!("Failed to create decoder: {:?}", e))
            })?;

        let mut data: Vec<u8> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(Error::IoError(_)) => break, // end-of-file
                Err(e) => {
                    return Err(CubeSonicError::AudioLoading(format!(
                        "Error reading packet: {:?}",
                        e
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(Error::IoError(_)) => break,
                Err(Error::DecodeError(_)) => continue, // recoverable corruption
                Err(e) => {
                    return Err(CubeSonicError::AudioLoading(format!(
                        "Error decoding packet: {:?}",
                        e
                    )));
                }
            };

            let spec = *decoded.spec();
            let capacity = decoded.capacity() as u64;

            // Keep the source bit depth, the voice uploads raw PCM
            if pcm_format.bits_per_sample == 8 {
                let mut tmp = SampleBuffer::<u8>::new(capacity, spec);
                tmp.copy_interleaved_ref(decoded);
                data.extend_from_slice(tmp.samples());
            } else {
                let mut tmp = SampleBuffer::<i16>::new(capacity, spec);
                tmp.copy_interleaved_ref(decoded);
                data.extend(tmp.samples().iter().flat_map(|s| s.to_ne_bytes()));
            }
        }

        // Decoded samples are already in host order
        let pcm_format = PcmFormat {
            endianness: Endianness::NATIVE,
            ..pcm_format
        };

        Ok(PcmBuffer::new(pcm_format, sample_rate, data))
    }
}

fn pcm_format_of(params: &CodecParameters) -> Result<PcmFormat> {
    let channels = params
        .channels
        .ok_or_else(|| CubeSonicError::AudioLoading("Channel count not found".to_string()))?
        .count() as u16;

    let (encoding, bits, endianness) = classify_codec(params.codec);
    let bits_per_sample = params
        .bits_per_sample
        .map(|b| b as u16)
        .unwrap_or(bits);

    Ok(PcmFormat {
        encoding,
        channels,
        bits_per_sample,
        endianness,
    })
}

fn classify_codec(codec: CodecType) -> (SampleEncoding, u16, Endianness) {
    use Endianness::{Big, Little};

    match codec {
        CODEC_TYPE_PCM_U8 | CODEC_TYPE_PCM_S8 => (SampleEncoding::LinearPcm, 8, Endianness::NATIVE),
        CODEC_TYPE_PCM_S16LE => (SampleEncoding::LinearPcm, 16, Little),
        CODEC_TYPE_PCM_S16BE => (SampleEncoding::LinearPcm, 16, Big),
        CODEC_TYPE_PCM_S24LE => (SampleEncoding::LinearPcm, 24, Little),
        CODEC_TYPE_PCM_S24BE => (SampleEncoding::LinearPcm, 24, Big),
        CODEC_TYPE_PCM_S32LE => (SampleEncoding::LinearPcm, 32, Little),
        CODEC_TYPE_PCM_S32BE => (SampleEncoding::LinearPcm, 32, Big),
        CODEC_TYPE_PCM_F32LE => (SampleEncoding::Float, 32, Little),
        CODEC_TYPE_PCM_F32BE => (SampleEncoding::Float, 32, Big),
        CODEC_TYPE_PCM_F64LE => (SampleEncoding::Float, 64, Little),
        CODEC_TYPE_PCM_F64BE => (SampleEncoding::Float, 64, Big),
        other => (
            SampleEncoding::Compressed(format!("{:?}", other)),
            0,
            Endianness::NATIVE,
        ),
    }
}
