//! Error types for CubeSonic

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CubeSonicError {
    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("Audio format error: {0}")]
    AudioFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Audio loading error: {0}")]
    AudioLoading(String),

    /// The backend rejected a runtime command (play, stop, pose update).
    #[error("Backend rejected {command}: {reason}")]
    Backend {
        command: &'static str,
        reason: String,
    },

    #[error("No voice is allocated")]
    NoVoice,

    #[error("Audio session error: {0}")]
    Session(String),
}

impl CubeSonicError {
    /// Returns true for errors that abort session setup.
    ///
    /// Device, format and loading failures leave nothing to play. Rejected
    /// runtime commands and a missing voice can be retried.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::AudioDevice(_) | Self::AudioFormat(_) | Self::AudioLoading(_) | Self::Io(_)
        )
    }

    pub(crate) fn backend(command: &'static str, reason: impl Into<String>) -> Self {
        Self::Backend {
            command,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CubeSonicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(CubeSonicError::AudioDevice("no device".into()).is_fatal());
        assert!(CubeSonicError::AudioFormat("3 channels".into()).is_fatal());
        assert!(!CubeSonicError::backend("play", "busy").is_fatal());
        assert!(!CubeSonicError::NoVoice.is_fatal());
    }

    #[test]
    fn test_backend_error_message() {
        let err = CubeSonicError::backend("stop", "device lost");
        assert_eq!(err.to_string(), "Backend rejected stop: device lost");
    }
}
