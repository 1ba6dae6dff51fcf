//! Sound configuration.
//!
//! Holds the master volume, music looping policy and the asset manifest
//! used by [`FileSoundStore`](crate::FileSoundStore). Configuration can be
//! loaded from and saved to a TOML file.
//!
//! ```toml
//! master_volume = 0.8
//! loop_music = true
//! asset_root = "assets/sounds"
//!
//! [sounds]
//! door = { id = 7, file = "sfx/door.wav" }
//!
//! [music]
//! 1 = "music/theme.ogg"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::ids::{MusicId, SoundId};
use crate::volume::Volume;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "ack-sound.toml";

/// Default asset root relative to the working directory.
pub const DEFAULT_ASSET_ROOT: &str = "assets/sounds";

/// Errors that can occur while reading or writing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the file.
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Manifest entry for a sound effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundEntry {
    /// Numeric id used by game logic.
    pub id: SoundId,
    /// File path relative to the asset root.
    pub file: PathBuf,
}

/// Sound manager configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    /// Initial master volume (0.0 - 1.0).
    pub master_volume: Volume,
    /// Whether music tracks loop until stopped.
    pub loop_music: bool,
    /// Directory that manifest paths are relative to.
    pub asset_root: PathBuf,
    /// Sound effects by name.
    pub sounds: BTreeMap<String, SoundEntry>,
    /// Music files keyed by track id. TOML keys are strings, so ids are stored as text.
    pub music: BTreeMap<String, PathBuf>,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            master_volume: Volume::MAX,
            loop_music: true,
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            sounds: BTreeMap::new(),
            music: BTreeMap::new(),
        }
    }
}

impl SoundConfig {
    /// Load configuration from a path.
    /// Returns the default config if the file is missing or invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Sound config {} not found, using defaults", path.display());
            return Self::default();
        }

        match Self::try_load_from(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load sound config: {e}");
                Self::default()
            },
        }
    }

    /// Load configuration from a path, reporting any failure.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)?;
        config.validate();
        info!("Loaded sound config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a path, creating parent directories.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        info!("Saved sound config to {}", path.display());
        Ok(())
    }

    /// Clamp values to their valid ranges.
    pub fn validate(&mut self) {
        self.master_volume = Volume::new(self.master_volume.level());
    }

    /// Add a sound effect to the manifest.
    #[must_use]
    pub fn with_sound(mut self, name: &str, id: SoundId, file: impl Into<PathBuf>) -> Self {
        self.sounds.insert(
            name.to_string(),
            SoundEntry {
                id,
                file: file.into(),
            },
        );
        self
    }

    /// Add a music track to the manifest.
    #[must_use]
    pub fn with_music(mut self, id: MusicId, file: impl Into<PathBuf>) -> Self {
        self.music.insert(id.raw().to_string(), file.into());
        self
    }

    /// Look up the music file for a track id.
    #[must_use]
    pub fn music_file(&self, id: MusicId) -> Option<&Path> {
        self.music.get(&id.raw().to_string()).map(PathBuf::as_path)
    }

    /// Look up a sound effect entry by id.
    #[must_use]
    pub fn sound_entry(&self, id: SoundId) -> Option<(&str, &SoundEntry)> {
        self.sounds
            .iter()
            .find(|(_, entry)| entry.id == id)
            .map(|(name, entry)| (name.as_str(), entry))
    }

    /// Set the asset root.
    #[must_use]
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    /// Set the initial master volume.
    #[must_use]
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.master_volume = Volume::new(volume);
        self
    }
}
