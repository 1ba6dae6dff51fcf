//! Sound store that reads audio files listed in the configuration manifest.
//!
//! - Sound effects are decoded in full on load and cached until unloaded.
//! - Music is read as encoded bytes and decoded by the mixer while it
//!   plays. The bytes are probed once so a broken file fails here rather
//!   than inside the mixer.

use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use rodio::{Decoder, Source};
use tracing::{debug, info, warn};

use crate::config::SoundConfig;
use crate::error::StoreError;
use crate::ids::{MusicId, SoundId};
use crate::store::{DecodedSamples, SampleData, SoundStore};

/// Statistics for the file store.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of files decoded from disk.
    pub loads: u64,
    /// Number of loads answered from the cache.
    pub cache_hits: u64,
    /// Number of requests for files that do not exist.
    pub missing_files: u64,
    /// Bytes of decoded samples currently cached.
    pub cached_bytes: usize,
}

/// File-backed sound store.
#[derive(Debug)]
pub struct FileSoundStore {
    root: PathBuf,
    names: HashMap<String, SoundId>,
    files: HashMap<SoundId, PathBuf>,
    music: HashMap<MusicId, PathBuf>,
    cache: HashMap<SoundId, SampleData>,
    stats: StoreStats,
}

impl FileSoundStore {
    /// Builds a store from the manifest in a configuration.
    #[must_use]
    pub fn from_config(config: &SoundConfig) -> Self {
        let mut names = HashMap::new();
        let mut files = HashMap::new();
        for (name, entry) in &config.sounds {
            names.insert(name.clone(), entry.id);
            if let Some(previous) = files.insert(entry.id, entry.file.clone()) {
                warn!(
                    "{} listed twice; '{}' replaces {}",
                    entry.id,
                    name,
                    previous.display()
                );
            }
        }

        let mut music = HashMap::new();
        for (key, file) in &config.music {
            match key.parse::<u32>() {
                Ok(raw) => {
                    music.insert(MusicId::new(raw), file.clone());
                },
                Err(_) => warn!("Ignoring music entry with non-numeric id '{}'", key),
            }
        }

        info!(
            "Sound store at {:?}: {} sounds, {} music tracks",
            config.asset_root,
            names.len(),
            music.len()
        );

        Self {
            root: config.asset_root.clone(),
            names,
            files,
            music,
            cache: HashMap::new(),
            stats: StoreStats::default(),
        }
    }

    /// Returns the asset root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the store statistics.
    #[must_use]
    pub const fn stats(&self) -> &StoreStats {
        &self.stats
    }

    fn read(&mut self, relative: &Path) -> Result<Vec<u8>, StoreError> {
        let path = self.root.join(relative);
        fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                self.stats.missing_files += 1;
                warn!("Sound file not found: {}", path.display());
            }
            StoreError::Io(e)
        })
    }
}

fn decode(resource: &Path, bytes: Vec<u8>) -> Result<DecodedSamples, StoreError> {
    let decoder = Decoder::new(Cursor::new(bytes)).map_err(|e| StoreError::Decode {
        resource: resource.display().to_string(),
        message: e.to_string(),
    })?;

    let sample_rate = decoder.sample_rate();
    let channels = decoder.channels();
    let samples: Vec<f32> = decoder.convert_samples::<f32>().collect();

    Ok(DecodedSamples::new(samples, sample_rate, channels))
}

impl SoundStore for FileSoundStore {
    fn resolve(&self, name: &str) -> Result<SoundId, StoreError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| StoreError::UnknownName(name.to_string()))
    }

    fn load(&mut self, id: SoundId) -> Result<SampleData, StoreError> {
        if let Some(data) = self.cache.get(&id) {
            self.stats.cache_hits += 1;
            return Ok(data.clone());
        }

        let file = self.files.get(&id).cloned().ok_or(StoreError::UnknownSound(id))?;
        let bytes = self.read(&file)?;
        let decoded = decode(&file, bytes)?;

        self.stats.loads += 1;
        self.stats.cached_bytes += decoded.size_bytes();
        debug!(
            "Decoded {} from {} ({:?})",
            id,
            file.display(),
            decoded.duration()
        );

        let data = SampleData::decoded(decoded);
        self.cache.insert(id, data.clone());
        Ok(data)
    }

    fn unload(&mut self, id: SoundId) {
        if let Some(SampleData::Decoded(samples)) = self.cache.remove(&id) {
            self.stats.cached_bytes = self.stats.cached_bytes.saturating_sub(samples.size_bytes());
            debug!("Released {}", id);
        }
    }

    fn is_loaded(&self, id: SoundId) -> bool {
        self.cache.contains_key(&id)
    }

    fn music(&mut self, id: MusicId) -> Result<SampleData, StoreError> {
        let file = self.music.get(&id).cloned().ok_or(StoreError::UnknownMusic(id))?;
        let bytes = self.read(&file)?;

        Decoder::new(Cursor::new(bytes.clone())).map_err(|e| StoreError::Decode {
            resource: file.display().to_string(),
            message: e.to_string(),
        })?;

        debug!("Opened {} from {}", id, file.display());
        Ok(SampleData::encoded(bytes))
    }
}
