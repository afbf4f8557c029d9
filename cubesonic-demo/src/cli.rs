use anyhow::Result;
use cubesonic::{
    AudioAsset, AudioSession, CpalBackend, CubeSonicPlayback, CubeSonicPlaybackDesc,
    InterruptionPhase, OrbitDriver, PcmBuffer, PlaybackBackend, RecordingBackend,
};
use std::sync::Arc;
use std::time::Duration;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const REPORT_EVERY: u64 = 30;

#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub headless: bool,
    pub frames: u64,
    /// Switch scene mode every N frames; 0 never switches
    pub tap_every: u64,
    pub asset: Option<String>,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            headless: false,
            frames: 720,
            tap_every: 180,
            asset: None,
        }
    }
}

/// Runs the orbit scene against a recording backend as fast as possible,
/// with a simulated interruption halfway through.
pub fn run_headless(options: &DemoOptions) -> Result<()> {
    let desc = CubeSonicPlaybackDesc::default();
    let asset = match &options.asset {
        Some(path) => AudioAsset::from_path(path.clone()),
        None => AudioAsset::in_memory(sine_tone(440.0, 22050, 1.0)),
    };
    log::info!("Running headless orbit scene with {:?}", asset);

    let session = Arc::new(AudioSession::new());
    let mut playback =
        CubeSonicPlayback::with_session(desc, RecordingBackend::new(), asset, session.clone())?;

    let interrupt_at = options.frames / 2;
    run_scene(&mut playback, options, None, |frame| {
        if frame == interrupt_at {
            session.interrupt(InterruptionPhase::Began)?;
        } else if frame == interrupt_at + 10 {
            session.interrupt(InterruptionPhase::Ended)?;
        }
        Ok(())
    })?;

    log::info!(
        "Backend received {} directives",
        playback.backend().directives().len()
    );
    Ok(())
}

/// Plays the asset on the default output device while the listener orbits.
pub fn run_device(options: &DemoOptions) -> Result<()> {
    let path = options
        .asset
        .clone()
        .ok_or_else(|| anyhow::anyhow!("--asset is required for device playback"))?;

    let desc = CubeSonicPlaybackDesc::default();
    let backend = CpalBackend::new(desc.clone());
    let asset = AudioAsset::from_path(path);
    let session = Arc::new(AudioSession::new());

    log::info!("Opening output device for {:?}", asset);
    let mut playback = CubeSonicPlayback::with_session(desc, backend, asset, session)?;

    run_scene(&mut playback, options, Some(FRAME_INTERVAL), |_| Ok(()))?;

    log::info!(
        "Rendered {} frames",
        playback.backend().frames_processed()
    );
    Ok(())
}

fn run_scene<B, F>(
    playback: &mut CubeSonicPlayback<B>,
    options: &DemoOptions,
    frame_interval: Option<Duration>,
    mut on_frame: F,
) -> Result<()>
where
    B: PlaybackBackend,
    F: FnMut(u64) -> cubesonic::Result<()>,
{
    let mut driver = OrbitDriver::new();
    tolerate(driver.apply_source(playback), "placing the source")?;
    tolerate(playback.start(), "starting playback")?;
    log::info!("Scene started in {}", driver.mode());

    for frame in 1..=options.frames {
        tolerate(on_frame(frame), "signalling the session")?;
        tolerate(playback.poll_session(), "handling an interruption")?;

        if options.tap_every > 0 && frame % options.tap_every == 0 {
            tolerate(driver.advance_mode(playback), "switching scene mode")?;
        }

        tolerate(driver.tick(playback), "moving the listener")?;

        for event in playback.poll_events() {
            if event.is_error() {
                log::warn!("{:?}", event);
            } else if event.is_interruption() {
                log::info!("{:?}", event);
            } else {
                log::debug!("{:?}", event);
            }
        }

        if frame % REPORT_EVERY == 0 {
            let pose = playback.listener_pose();
            let params = playback.params();
            log::info!(
                "frame {:4} | {} | listener ({:+.3}, {:+.3}) rot {:+.3} | dist {:.3} gain {:.3} pan {:+.3}",
                frame,
                driver.mode().number(),
                pose.position.y,
                pose.position.z,
                pose.rotation,
                params.distance,
                params.attenuation,
                params.pan
            );
        }

        if let Some(interval) = frame_interval {
            std::thread::sleep(interval);
        }
    }

    tolerate(playback.stop(), "stopping playback")?;
    playback.teardown();
    log::info!("Scene finished after {} frames", driver.frame());
    Ok(())
}

/// Logs non-fatal errors and carries on; only fatal ones end the scene.
fn tolerate<T>(result: cubesonic::Result<T>, action: &str) -> cubesonic::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if !e.is_fatal() => {
            log::warn!("Error {}, continuing: {}", action, e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn sine_tone(frequency: f32, sample_rate: u32, seconds: f32) -> PcmBuffer {
    let frames = (sample_rate as f32 * seconds) as usize;
    let samples: Vec<i16> = (0..frames)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            ((2.0 * std::f32::consts::PI * frequency * t).sin() * 0.5 * i16::MAX as f32) as i16
        })
        .collect();
    PcmBuffer::from_i16(&samples, 1, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubesonic::{CubeSonicError, DirectiveKind};

    fn options(frames: u64) -> DemoOptions {
        DemoOptions {
            headless: true,
            frames,
            tap_every: 3,
            asset: None,
        }
    }

    fn playback() -> CubeSonicPlayback<RecordingBackend> {
        CubeSonicPlayback::new(
            CubeSonicPlaybackDesc::default(),
            RecordingBackend::new(),
            AudioAsset::in_memory(sine_tone(440.0, 8000, 0.1)),
        )
        .unwrap()
    }

    #[test]
    fn test_tolerate_passes_non_fatal_errors() {
        let result: cubesonic::Result<()> = Err(CubeSonicError::NoVoice);
        assert!(matches!(tolerate(result, "testing"), Ok(None)));
        assert!(matches!(tolerate(Ok(5), "testing"), Ok(Some(5))));

        let fatal: cubesonic::Result<()> = Err(CubeSonicError::AudioDevice("gone".into()));
        assert!(tolerate(fatal, "testing").is_err());
    }

    #[test]
    fn test_scene_survives_rejected_directives() {
        let mut playback = playback();
        playback
            .backend_mut()
            .reject(DirectiveKind::SetListenerPosition);
        playback
            .backend_mut()
            .reject(DirectiveKind::SetSourcePosition);

        run_scene(&mut playback, &options(10), None, |_| Ok(())).unwrap();
        assert_eq!(playback.backend().count(DirectiveKind::SetListenerPosition), 1);
    }

    #[test]
    fn test_scene_survives_rejected_play() {
        let mut playback = playback();
        playback.backend_mut().reject(DirectiveKind::Play);

        run_scene(&mut playback, &options(5), None, |_| Ok(())).unwrap();
        assert!(!playback.is_playing());
    }

    fn session_playback(session: &Arc<AudioSession>) -> CubeSonicPlayback<RecordingBackend> {
        CubeSonicPlayback::with_session(
            CubeSonicPlaybackDesc::default(),
            RecordingBackend::new(),
            AudioAsset::in_memory(sine_tone(440.0, 8000, 0.1)),
            session.clone(),
        )
        .unwrap()
    }

    fn interrupt_at(session: &AudioSession, frame: u64) -> cubesonic::Result<()> {
        match frame {
            2 => session.interrupt(InterruptionPhase::Began),
            3 => session.interrupt(InterruptionPhase::Ended),
            _ => Ok(()),
        }
    }

    #[test]
    fn test_scene_resumes_after_interruption() {
        let session = Arc::new(AudioSession::new());
        let mut playback = session_playback(&session);

        run_scene(&mut playback, &options(10), None, |frame| {
            interrupt_at(&session, frame)
        })
        .unwrap();
        assert_eq!(playback.backend().count(DirectiveKind::AllocateVoice), 2);
        assert_eq!(playback.backend().count(DirectiveKind::Play), 2);
    }

    #[test]
    fn test_failed_reallocation_ends_scene() {
        let session = Arc::new(AudioSession::new());
        let mut playback = session_playback(&session);
        playback
            .backend_mut()
            .reject(DirectiveKind::AllocateVoice);

        let result = run_scene(&mut playback, &options(10), None, |frame| {
            interrupt_at(&session, frame)
        });
        assert!(result.is_err());
        assert!(!playback.is_playing());
    }
}
