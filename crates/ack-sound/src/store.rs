//! Sound resource store.
//!
//! The store owns decoded sample data and hands out shared references to
//! it. The manager never copies samples; it keeps a [`SampleData`] clone
//! (an `Arc`) for as long as it considers a sound loaded.
//!
//! Short sound effects are decoded up front ([`SampleData::Decoded`]).
//! Music stays encoded ([`SampleData::Encoded`]) and is decoded by the
//! mixer while it streams.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::StoreError;
use crate::ids::{MusicId, SoundId};

/// Decoded PCM samples.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSamples {
    /// Interleaved sample data.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of channels (1 = mono, 2 = stereo).
    pub channels: u16,
}

impl DecodedSamples {
    /// Creates a new sample block.
    #[must_use]
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Duration of the audio.
    #[must_use]
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 || self.channels == 0 {
            return Duration::ZERO;
        }
        let frames = self.samples.len() / self.channels as usize;
        Duration::from_secs_f64(frames as f64 / f64::from(self.sample_rate))
    }

    /// Size of the sample data in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.samples.len() * std::mem::size_of::<f32>()
    }
}

/// Shared reference to sound data held by the store.
#[derive(Debug, Clone)]
pub enum SampleData {
    /// Fully decoded samples, ready for low-latency playback.
    Decoded(Arc<DecodedSamples>),
    /// Encoded file bytes, decoded while streaming.
    Encoded(Arc<[u8]>),
}

impl SampleData {
    /// Wraps decoded samples.
    #[must_use]
    pub fn decoded(samples: DecodedSamples) -> Self {
        Self::Decoded(Arc::new(samples))
    }

    /// Wraps encoded bytes.
    #[must_use]
    pub fn encoded(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Encoded(bytes.into())
    }

    /// Returns true if the data is streamed rather than pre-decoded.
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        matches!(self, Self::Encoded(_))
    }

    /// Returns true if both values reference the same underlying buffer.
    #[must_use]
    pub fn same_buffer(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Decoded(a), Self::Decoded(b)) => Arc::ptr_eq(a, b),
            (Self::Encoded(a), Self::Encoded(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Resource layer consumed by the sound manager.
///
/// Reference counting, caching and streaming policy all live behind this
/// trait; the manager only tracks which ids it has asked for.
pub trait SoundStore {
    /// Resolves a sound name to its id.
    fn resolve(&self, name: &str) -> Result<SoundId, StoreError>;

    /// Loads (or returns the cached) data for a sound.
    fn load(&mut self, id: SoundId) -> Result<SampleData, StoreError>;

    /// Releases the data for a sound. Unknown or unloaded ids are ignored.
    fn unload(&mut self, id: SoundId);

    /// Checks whether a sound's data is currently held.
    fn is_loaded(&self, id: SoundId) -> bool;

    /// Returns the resource for a music track.
    fn music(&mut self, id: MusicId) -> Result<SampleData, StoreError>;
}

/// Sound store backed by data registered in memory.
///
/// Registered data is always available; `load`/`unload` only toggle
/// whether the store considers it loaded.
#[derive(Debug, Default)]
pub struct MemorySoundStore {
    names: HashMap<String, SoundId>,
    sounds: HashMap<SoundId, SampleData>,
    music: HashMap<MusicId, SampleData>,
    corrupt: HashSet<SoundId>,
    loaded: HashSet<SoundId>,
    load_calls: usize,
}

impl MemorySoundStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a sound effect under a name and id.
    pub fn insert_sound(&mut self, name: &str, id: SoundId, data: SampleData) {
        self.names.insert(name.to_string(), id);
        self.sounds.insert(id, data);
        self.corrupt.remove(&id);
    }

    /// Registers a sound whose data fails to decode.
    pub fn insert_corrupt(&mut self, name: &str, id: SoundId) {
        self.names.insert(name.to_string(), id);
        self.corrupt.insert(id);
    }

    /// Registers a music track.
    pub fn insert_music(&mut self, id: MusicId, data: SampleData) {
        self.music.insert(id, data);
    }

    /// Number of loads that reached the backing data.
    #[must_use]
    pub const fn load_calls(&self) -> usize {
        self.load_calls
    }

    /// Number of sounds currently loaded.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }
}

impl SoundStore for MemorySoundStore {
    fn resolve(&self, name: &str) -> Result<SoundId, StoreError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| StoreError::UnknownName(name.to_string()))
    }

    fn load(&mut self, id: SoundId) -> Result<SampleData, StoreError> {
        if self.corrupt.contains(&id) {
            return Err(StoreError::Decode {
                resource: id.to_string(),
                message: "corrupt sample data".to_string(),
            });
        }
        let data = self
            .sounds
            .get(&id)
            .cloned()
            .ok_or(StoreError::UnknownSound(id))?;
        self.load_calls += 1;
        self.loaded.insert(id);
        debug!("Loaded {} from memory", id);
        Ok(data)
    }

    fn unload(&mut self, id: SoundId) {
        if self.loaded.remove(&id) {
            debug!("Unloaded {} from memory", id);
        }
    }

    fn is_loaded(&self, id: SoundId) -> bool {
        self.loaded.contains(&id)
    }

    fn music(&mut self, id: MusicId) -> Result<SampleData, StoreError> {
        self.music.get(&id).cloned().ok_or(StoreError::UnknownMusic(id))
    }
}
