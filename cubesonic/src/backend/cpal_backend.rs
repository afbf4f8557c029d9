use crate::audio_data::{AudioResampler, PcmBuffer};
use crate::backend::{PlaybackBackend, VoiceCommand, VoiceRenderer};
use crate::config::CubeSonicPlaybackDesc;
use crate::error::{CubeSonicError, Result};
use crate::math::{ListenerOrientation, Vec3};
use crate::spatial::Attenuation;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Software-rendering backend on the default cpal output device.
///
/// Directives are queued on a bounded channel and applied by a
/// [`VoiceRenderer`] at the start of the next audio callback, in the order
/// they were sent.
pub struct CpalBackend {
    desc: CubeSonicPlaybackDesc,
    stream: Option<cpal::Stream>,
    sender: Option<Sender<VoiceCommand>>,
    frames_processed: Arc<AtomicUsize>,
}

impl CpalBackend {
    pub fn new(desc: CubeSonicPlaybackDesc) -> Self {
        Self {
            desc,
            stream: None,
            sender: None,
            frames_processed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of audio frames rendered since the voice was allocated
    pub fn frames_processed(&self) -> usize {
        self.frames_processed.load(Ordering::Relaxed)
    }

    pub fn is_allocated(&self) -> bool {
        self.stream.is_some()
    }

    fn send(&self, command: &'static str, voice_command: VoiceCommand) -> Result<()> {
        let sender = self.sender.as_ref().ok_or(CubeSonicError::NoVoice)?;
        sender.try_send(voice_command).map_err(|e| match e {
            TrySendError::Full(_) => CubeSonicError::backend(command, "directive queue is full"),
            TrySendError::Disconnected(_) => {
                CubeSonicError::backend(command, "audio callback is gone")
            }
        })
    }

    /// Create a typed audio stream
    fn create_stream<T>(
        &self,
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        receiver: Receiver<VoiceCommand>,
    ) -> Result<cpal::Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let channels = config.channels;
        let frames_processed = self.frames_processed.clone();
        let mut renderer = VoiceRenderer::new(Attenuation::from(&self.desc));
        let mut mix_buffer: Vec<f32> = Vec::new();

        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    for command in receiver.try_iter() {
                        renderer.apply(command);
                    }

                    mix_buffer.clear();
                    mix_buffer.resize(data.len(), 0.0);
                    let frames_filled = renderer.render(&mut mix_buffer, channels);

                    for (out, &sample) in data.iter_mut().zip(mix_buffer.iter()) {
                        *out = T::from_sample(sample);
                    }

                    frames_processed.fetch_add(frames_filled, Ordering::Relaxed);
                },
                move |err| {
                    log::error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| CubeSonicError::AudioDevice(format!("Failed to build stream: {}", e)))
    }
}

impl PlaybackBackend for CpalBackend {
    fn allocate_voice(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or_else(|| {
            CubeSonicError::AudioDevice("No default output device available".into())
        })?;

        let config = cpal::StreamConfig {
            channels: self.desc.channels,
            sample_rate: cpal::SampleRate(self.desc.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(self.desc.block_size as u32),
        };

        let default_config = device.default_output_config().map_err(|e| {
            CubeSonicError::AudioDevice(format!("Failed to get default config: {}", e))
        })?;

        let (sender, receiver) = crossbeam_channel::bounded(self.desc.command_capacity);

        let stream = match default_config.sample_format() {
            cpal::SampleFormat::F32 => self.create_stream::<f32>(&device, &config, receiver)?,
            cpal::SampleFormat::I16 => self.create_stream::<i16>(&device, &config, receiver)?,
            cpal::SampleFormat::U16 => self.create_stream::<u16>(&device, &config, receiver)?,
            other => {
                return Err(CubeSonicError::AudioDevice(format!(
                    "Unsupported sample format {:?}",
                    other
                )));
            }
        };

        stream.play().map_err(|e| {
            CubeSonicError::AudioDevice(format!("Failed to start stream: {}", e))
        })?;

        log::info!(
            "Allocated voice on {} ({} Hz, {} ch)",
            device.name().unwrap_or_else(|_| "unknown device".to_string()),
            self.desc.sample_rate,
            self.desc.channels
        );

        self.frames_processed.store(0, Ordering::Relaxed);
        self.sender = Some(sender);
        self.stream = Some(stream);
        Ok(())
    }

    fn release_voice(&mut self) {
        self.sender = None;
        if let Some(stream) = self.stream.take() {
            drop(stream); // This stops the stream
            log::info!("Released voice");
        }
    }

    fn load_buffer(&mut self, buffer: PcmBuffer) -> Result<()> {
        let samples = buffer.to_mono_f32()?;
        let resampler = AudioResampler::new(buffer.sample_rate(), self.desc.sample_rate, None)?;
        let samples = resampler.resample(&samples)?;

        self.send("load_buffer", VoiceCommand::Load(samples))
            .map_err(|e| CubeSonicError::AudioDevice(format!("Failed to upload buffer: {}", e)))
    }

    fn set_looping(&mut self, looping: bool) -> Result<()> {
        self.send("set_looping", VoiceCommand::SetLooping(looping))
    }

    fn set_reference_distance(&mut self, distance: f32) -> Result<()> {
        self.send(
            "set_reference_distance",
            VoiceCommand::SetReferenceDistance(distance),
        )
    }

    fn set_source_position(&mut self, position: Vec3) -> Result<()> {
        self.send(
            "set_source_position",
            VoiceCommand::SetSourcePosition(position),
        )
    }

    fn set_listener_position(&mut self, position: Vec3) -> Result<()> {
        self.send(
            "set_listener_position",
            VoiceCommand::SetListenerPosition(position),
        )
    }

    fn set_listener_orientation(&mut self, orientation: ListenerOrientation) -> Result<()> {
        self.send(
            "set_listener_orientation",
            VoiceCommand::SetListenerOrientation(orientation),
        )
    }

    fn play(&mut self) -> Result<()> {
        self.send("play", VoiceCommand::Play)
    }

    fn stop(&mut self) -> Result<()> {
        self.send("stop", VoiceCommand::Stop)
    }
}

impl Drop for CpalBackend {
    fn drop(&mut self) {
        self.release_voice();
    }
}
