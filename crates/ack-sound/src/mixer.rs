//! Mixer abstraction.
//!
//! A mixer owns the real playback channels. Control calls return
//! immediately; rendering happens elsewhere (rodio renders on its own
//! thread), so a handle can stop being active at any time without the
//! caller being told. Callers poll [`Mixer::is_active`] instead.

use std::collections::HashMap;

use crate::error::MixerError;
use crate::ids::{HandleGenerator, MixerHandle};
use crate::store::SampleData;

/// Playback service consumed by the sound manager.
pub trait Mixer {
    /// Starts playing `data` on a fresh mixer channel.
    fn start_channel(&mut self, data: &SampleData, looping: bool) -> Result<MixerHandle, MixerError>;

    /// Stops a playback instance. Stopping an inactive or unknown handle is a no-op.
    fn stop(&mut self, handle: MixerHandle);

    /// Checks whether a playback instance is still producing audio.
    fn is_active(&self, handle: MixerHandle) -> bool;

    /// Sets the volume (`0.0..=1.0`) of a playback instance.
    fn set_volume(&mut self, handle: MixerHandle, level: f32);
}

/// State of one playback instance in the mock mixer.
#[derive(Debug, Clone)]
pub struct MockVoice {
    /// Data the voice was started with.
    pub data: SampleData,
    /// Whether the voice loops.
    pub looping: bool,
    /// Current volume.
    pub volume: f32,
    /// Whether the voice is still producing audio.
    pub active: bool,
    /// Number of times `stop` was called while the voice was active.
    pub stops: u32,
}

/// Deterministic mixer for testing.
///
/// Voices never finish on their own; call [`MockMixer::finish`] to simulate
/// a sound reaching its end.
#[derive(Debug, Default)]
pub struct MockMixer {
    voices: HashMap<MixerHandle, MockVoice>,
    handles: HandleGenerator,
    unavailable: bool,
    redundant_stops: u32,
}

impl MockMixer {
    /// Creates a mixer with a working "device".
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mixer that behaves as if no device were present.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Plugs or unplugs the "device". Voices already started are unaffected.
    pub fn set_available(&mut self, available: bool) {
        self.unavailable = !available;
    }

    /// Marks a voice as having finished naturally.
    pub fn finish(&mut self, handle: MixerHandle) {
        if let Some(voice) = self.voices.get_mut(&handle) {
            voice.active = false;
        }
    }

    /// Returns the voice for a handle.
    #[must_use]
    pub fn voice(&self, handle: MixerHandle) -> Option<&MockVoice> {
        self.voices.get(&handle)
    }

    /// Number of voices currently active.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.voices.values().filter(|v| v.active).count()
    }

    /// Total number of voices ever started.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.voices.len()
    }

    /// Number of `stop` calls made on handles that were already inactive.
    #[must_use]
    pub const fn redundant_stops(&self) -> u32 {
        self.redundant_stops
    }
}

impl<M: Mixer + ?Sized> Mixer for &mut M {
    fn start_channel(&mut self, data: &SampleData, looping: bool) -> Result<MixerHandle, MixerError> {
        (**self).start_channel(data, looping)
    }

    fn stop(&mut self, handle: MixerHandle) {
        (**self).stop(handle);
    }

    fn is_active(&self, handle: MixerHandle) -> bool {
        (**self).is_active(handle)
    }

    fn set_volume(&mut self, handle: MixerHandle, level: f32) {
        (**self).set_volume(handle, level);
    }
}

impl Mixer for MockMixer {
    fn start_channel(&mut self, data: &SampleData, looping: bool) -> Result<MixerHandle, MixerError> {
        if self.unavailable {
            return Err(MixerError::Unavailable);
        }
        let handle = self.handles.next_handle();
        self.voices.insert(
            handle,
            MockVoice {
                data: data.clone(),
                looping,
                volume: 1.0,
                active: true,
                stops: 0,
            },
        );
        Ok(handle)
    }

    fn stop(&mut self, handle: MixerHandle) {
        match self.voices.get_mut(&handle) {
            Some(voice) if voice.active => {
                voice.active = false;
                voice.stops += 1;
            },
            _ => self.redundant_stops += 1,
        }
    }

    fn is_active(&self, handle: MixerHandle) -> bool {
        self.voices.get(&handle).is_some_and(|v| v.active)
    }

    fn set_volume(&mut self, handle: MixerHandle, level: f32) {
        if let Some(voice) = self.voices.get_mut(&handle) {
            voice.volume = level.clamp(0.0, 1.0);
        }
    }
}
