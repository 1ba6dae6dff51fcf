//! Error types for the sound manager.
//!
//! [`SoundError`] is the taxonomy callers see. The collaborator boundaries
//! have their own error types ([`StoreError`], [`MixerError`]) which are
//! translated on the way out, so nothing from a backend leaks through
//! untranslated.

use thiserror::Error;

use crate::ids::{MusicId, SoundId};

/// Errors reported by [`SoundManager`](crate::SoundManager) operations.
#[derive(Debug, Error)]
pub enum SoundError {
    /// Channel index outside `0..max`.
    #[error("Invalid sound channel {channel} (channels: 0..{max})")]
    InvalidChannel {
        /// Requested channel.
        channel: u8,
        /// Number of channels.
        max: usize,
    },

    /// Unknown sound or music id, an unresolvable sound name, or a file
    /// that could not be opened.
    #[error("Sound resource not found: {0}")]
    ResourceNotFound(String),

    /// Resource data is corrupt or in an unsupported format.
    #[error("Failed to decode sound resource: {0}")]
    DecodeError(String),

    /// The audio device or mixer service is not ready.
    #[error("Mixer unavailable: {0}")]
    MixerUnavailable(String),
}

/// Result type for sound manager operations.
pub type SoundResult<T> = Result<T, SoundError>;

/// Errors reported by a [`SoundStore`](crate::SoundStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// No sound registered under this name.
    #[error("No sound named '{0}'")]
    UnknownName(String),

    /// No sound registered under this id.
    #[error("No data for {0}")]
    UnknownSound(SoundId),

    /// No track registered under this id.
    #[error("No data for {0}")]
    UnknownMusic(MusicId),

    /// The data could not be decoded.
    #[error("Failed to decode '{resource}': {message}")]
    Decode {
        /// Resource that failed.
        resource: String,
        /// Decoder message.
        message: String,
    },

    /// IO error while reading a resource.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by a [`Mixer`](crate::Mixer).
#[derive(Debug, Error)]
pub enum MixerError {
    /// No output device is available.
    #[error("No audio output device available")]
    Unavailable,

    /// The device exists but playback could not be started.
    #[error("Failed to start playback: {0}")]
    StartFailed(String),

    /// The mixer could not decode the data it was given.
    #[error("Mixer could not decode data: {0}")]
    Decode(String),
}

impl From<StoreError> for SoundError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownName(_) | StoreError::UnknownSound(_) | StoreError::UnknownMusic(_) => {
                Self::ResourceNotFound(err.to_string())
            },
            // Only data problems count as decode errors; a file that cannot be
            // opened at all is as good as missing.
            StoreError::Io(ref io)
                if matches!(
                    io.kind(),
                    std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof
                ) =>
            {
                Self::DecodeError(err.to_string())
            },
            StoreError::Io(_) => Self::ResourceNotFound(err.to_string()),
            StoreError::Decode { .. } => Self::DecodeError(err.to_string()),
        }
    }
}

impl From<MixerError> for SoundError {
    fn from(err: MixerError) -> Self {
        match err {
            MixerError::Decode(_) => Self::DecodeError(err.to_string()),
            MixerError::Unavailable | MixerError::StartFailed(_) => {
                Self::MixerUnavailable(err.to_string())
            },
        }
    }
}
