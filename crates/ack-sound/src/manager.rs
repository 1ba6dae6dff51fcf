//! Sound manager.
//!
//! Owns playback state for [`NUM_CHANNELS`] sound-effect channels and one
//! music stream, on top of an injected [`Mixer`] and [`SoundStore`].
//!
//! # Channels
//!
//! ```text
//!  channel:   0        1        2        3        music
//!          ┌────────┬────────┬────────┬────────┐ ┌────────┐
//!  slot    │ handle │ handle │  ----  │ handle │ │ handle │
//!          │ sound  │ sound  │        │ sound  │ │ track  │
//!          └────────┴────────┴────────┴────────┘ └────────┘
//! ```
//!
//! Effects finish on their own without telling anyone, so a slot is only
//! trusted after asking the mixer ([`SoundManager::update`] does this for
//! every slot once per tick; the channel operations do it lazily for the
//! slot they touch). Music is only ever started and stopped through the
//! manager, so its state is tracked authoritatively.
//!
//! # Threading
//!
//! All methods take `&mut self` and never block. Hosts that share a
//! manager between threads must serialize access themselves.
//!
//! # Example
//!
//! ```ignore
//! use ack_sound::{MusicId, SoundConfig, SoundManager};
//!
//! let mut sound = SoundManager::new(mixer, store, &SoundConfig::default());
//! sound.play_sound("door", 1)?;
//! sound.play_music(MusicId::new(3))?;
//! sound.set_volume(0.5);
//!
//! // once per frame
//! sound.update();
//! ```

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::config::SoundConfig;
use crate::error::{SoundError, SoundResult};
use crate::ids::{MixerHandle, MusicId, SoundId};
use crate::mixer::Mixer;
use crate::store::{SampleData, SoundStore};
use crate::volume::Volume;

/// Number of sound-effect channels.
pub const NUM_CHANNELS: usize = 4;

/// One sound-effect channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelSlot {
    /// Mixer playback instance, if the channel is playing.
    pub handle: Option<MixerHandle>,
    /// Sound assigned to the channel.
    pub sound: Option<SoundId>,
}

impl ChannelSlot {
    /// Returns true if nothing is assigned to the channel.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.handle.is_none()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Music playback state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct MusicState {
    playing: bool,
    current: Option<MusicId>,
    handle: Option<MixerHandle>,
}

/// Multi-channel sound effect and music manager.
#[derive(Debug)]
pub struct SoundManager<M: Mixer, S: SoundStore> {
    mixer: M,
    store: S,
    channels: [ChannelSlot; NUM_CHANNELS],
    music: MusicState,
    /// Sounds this manager has loaded, with its reference to their data.
    loaded: HashMap<SoundId, SampleData>,
    volume: Volume,
    loop_music: bool,
}

impl<M: Mixer, S: SoundStore> SoundManager<M, S> {
    /// Creates a manager bound to a mixer and a sound store.
    ///
    /// All channels start empty and no music is playing.
    pub fn new(mixer: M, store: S, config: &SoundConfig) -> Self {
        debug!(
            "Created sound manager ({} channels, volume {:.2})",
            NUM_CHANNELS,
            config.master_volume.level()
        );
        Self {
            mixer,
            store,
            channels: [ChannelSlot::default(); NUM_CHANNELS],
            music: MusicState::default(),
            loaded: HashMap::new(),
            volume: config.master_volume,
            loop_music: config.loop_music,
        }
    }

    /// Returns the mixer.
    pub fn mixer(&self) -> &M {
        &self.mixer
    }

    /// Returns the mixer mutably.
    pub fn mixer_mut(&mut self) -> &mut M {
        &mut self.mixer
    }

    /// Returns the sound store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ============================================
    // Resource management
    // ============================================

    /// Loads a sound so it can be played without delay.
    ///
    /// Loading an already-loaded sound does nothing.
    pub fn load_sound(&mut self, id: SoundId) -> SoundResult<()> {
        self.ensure_loaded(id).map(|_| ())
    }

    /// Releases a sound.
    ///
    /// Any channel still playing it is stopped first, so the data is never
    /// released under a live mixer channel. Unloading a sound that is not
    /// loaded does nothing.
    pub fn unload_sound(&mut self, id: SoundId) {
        for index in 0..NUM_CHANNELS {
            if self.channels[index].sound == Some(id) {
                self.release_channel(index);
                debug!("Stopped channel {} before unloading {}", index, id);
            }
        }

        if self.loaded.remove(&id).is_some() {
            self.store.unload(id);
            debug!("Unloaded {}", id);
        }
    }

    /// Checks whether the manager holds a sound.
    #[must_use]
    pub fn is_loaded(&self, id: SoundId) -> bool {
        self.loaded.contains_key(&id)
    }

    /// Number of sounds the manager holds.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    fn ensure_loaded(&mut self, id: SoundId) -> SoundResult<SampleData> {
        if let Some(data) = self.loaded.get(&id) {
            return Ok(data.clone());
        }

        let data = self.store.load(id).map_err(|e| {
            warn!("Failed to load {}: {}", id, e);
            SoundError::from(e)
        })?;
        self.loaded.insert(id, data.clone());
        debug!("Loaded {}", id);
        Ok(data)
    }

    // ============================================
    // Sound effects
    // ============================================

    /// Plays a named sound on a channel.
    ///
    /// The sound is loaded first if needed. Whatever the channel was
    /// playing is cut off; channels never queue.
    pub fn play_sound(&mut self, name: &str, channel: u8) -> SoundResult<()> {
        let index = Self::channel_index(channel)?;

        let id = self.store.resolve(name).map_err(|e| {
            warn!("Cannot play '{}': {}", name, e);
            SoundError::from(e)
        })?;
        let data = self.ensure_loaded(id)?;

        // The old sound keeps playing until the new one has actually started.
        let handle = self.mixer.start_channel(&data, false).map_err(|e| {
            warn!("Mixer refused {} on channel {}: {}", id, channel, e);
            SoundError::from(e)
        })?;
        self.mixer.set_volume(handle, self.volume.level());

        self.release_channel(index);
        self.channels[index] = ChannelSlot {
            handle: Some(handle),
            sound: Some(id),
        };
        debug!("Playing '{}' ({}) on channel {}", name, id, channel);
        Ok(())
    }

    /// Stops a channel. Stopping an empty or finished channel does nothing.
    pub fn stop_sound(&mut self, channel: u8) -> SoundResult<()> {
        let index = Self::channel_index(channel)?;
        if !self.channels[index].is_empty() {
            self.release_channel(index);
            debug!("Stopped channel {}", channel);
        }
        Ok(())
    }

    /// Returns the sound a channel is actively playing.
    pub fn channel_sound(&mut self, channel: u8) -> SoundResult<Option<SoundId>> {
        let index = Self::channel_index(channel)?;
        self.reconcile(index);
        Ok(self.channels[index].sound)
    }

    /// Checks whether a channel is actively playing.
    pub fn is_channel_playing(&mut self, channel: u8) -> SoundResult<bool> {
        Ok(self.channel_sound(channel)?.is_some())
    }

    /// Returns the slot table as last reconciled.
    #[must_use]
    pub fn channels(&self) -> &[ChannelSlot; NUM_CHANNELS] {
        &self.channels
    }

    fn channel_index(channel: u8) -> SoundResult<usize> {
        let index = usize::from(channel);
        if index < NUM_CHANNELS {
            Ok(index)
        } else {
            Err(SoundError::InvalidChannel {
                channel,
                max: NUM_CHANNELS,
            })
        }
    }

    /// Clears a slot whose playback has finished on its own.
    fn reconcile(&mut self, index: usize) {
        let slot = &mut self.channels[index];
        if let Some(handle) = slot.handle {
            if !self.mixer.is_active(handle) {
                debug!("Channel {} finished ({:?})", index, slot.sound);
                slot.clear();
            }
        }
    }

    /// Stops a slot's playback if it is still running and empties it.
    fn release_channel(&mut self, index: usize) {
        if let Some(handle) = self.channels[index].handle {
            if self.mixer.is_active(handle) {
                self.mixer.stop(handle);
            }
        }
        self.channels[index].clear();
    }

    // ============================================
    // Music
    // ============================================

    /// Starts a music track, replacing any track already playing.
    ///
    /// Requesting the track that is already playing does nothing. The old
    /// track is stopped before the new one is looked up, so if this call
    /// fails no music is playing afterwards.
    pub fn play_music(&mut self, id: MusicId) -> SoundResult<()> {
        let still_playing = self.music.handle.is_some_and(|h| self.mixer.is_active(h));
        if self.music.playing && self.music.current == Some(id) && still_playing {
            debug!("{} already playing", id);
            return Ok(());
        }

        self.stop_music();

        let data = self.store.music(id).map_err(|e| {
            warn!("Failed to open {}: {}", id, e);
            SoundError::from(e)
        })?;
        let handle = self.mixer.start_channel(&data, self.loop_music).map_err(|e| {
            warn!("Mixer refused {}: {}", id, e);
            SoundError::from(e)
        })?;
        self.mixer.set_volume(handle, self.volume.level());

        self.music = MusicState {
            playing: true,
            current: Some(id),
            handle: Some(handle),
        };
        info!("Playing {}", id);
        Ok(())
    }

    /// Stops the music. Does nothing if no music is playing.
    pub fn stop_music(&mut self) {
        if !self.music.playing {
            return;
        }
        if let Some(handle) = self.music.handle {
            if self.mixer.is_active(handle) {
                self.mixer.stop(handle);
            }
        }
        debug!("Stopped {:?}", self.music.current);
        self.music = MusicState::default();
    }

    /// Checks whether music is playing.
    #[must_use]
    pub const fn is_music_playing(&self) -> bool {
        self.music.playing
    }

    /// Returns the track that is playing.
    #[must_use]
    pub const fn current_music(&self) -> Option<MusicId> {
        if self.music.playing {
            self.music.current
        } else {
            None
        }
    }

    // ============================================
    // Volume
    // ============================================

    /// Sets the master volume.
    ///
    /// Out-of-range values are clamped. The level applies to every active
    /// channel and the music right away, and to everything started later.
    pub fn set_volume(&mut self, volume: impl Into<Volume>) {
        self.volume = volume.into();
        let level = self.volume.level();

        for index in 0..NUM_CHANNELS {
            self.reconcile(index);
            if let Some(handle) = self.channels[index].handle {
                self.mixer.set_volume(handle, level);
            }
        }
        if let Some(handle) = self.music.handle {
            self.mixer.set_volume(handle, level);
        }
        debug!("Master volume set to {:.2}", level);
    }

    /// Returns the master volume.
    #[must_use]
    pub const fn volume(&self) -> Volume {
        self.volume
    }

    // ============================================
    // Update
    // ============================================

    /// Reconciles every channel with the mixer (call once per frame).
    pub fn update(&mut self) {
        for index in 0..NUM_CHANNELS {
            self.reconcile(index);
        }
    }

    /// Stops every channel and the music.
    pub fn stop_all(&mut self) {
        for index in 0..NUM_CHANNELS {
            self.release_channel(index);
        }
        self.stop_music();
        debug!("Stopped all sounds");
    }
}

impl<M: Mixer, S: SoundStore> Drop for SoundManager<M, S> {
    fn drop(&mut self) {
        self.stop_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::MockMixer;
    use crate::store::{DecodedSamples, MemorySoundStore};
    use proptest::prelude::*;

    type TestManager = SoundManager<MockMixer, MemorySoundStore>;

    fn samples(len: usize) -> SampleData {
        SampleData::decoded(DecodedSamples::new(vec![0.1; len], 22050, 1))
    }

    fn test_store() -> MemorySoundStore {
        let mut store = MemorySoundStore::new();
        store.insert_sound("door", SoundId::new(7), samples(100));
        store.insert_sound("step", SoundId::new(8), samples(50));
        store.insert_corrupt("static", SoundId::new(9));
        store.insert_music(MusicId::new(1), SampleData::encoded(vec![1u8; 16]));
        store.insert_music(MusicId::new(2), SampleData::encoded(vec![2u8; 16]));
        store
    }

    fn manager() -> TestManager {
        SoundManager::new(MockMixer::new(), test_store(), &SoundConfig::default())
    }

    fn handle_of(manager: &TestManager, channel: usize) -> MixerHandle {
        manager.channels()[channel].handle.expect("channel should hold a handle")
    }

    #[test]
    fn test_new_manager_is_idle() {
        let manager = manager();
        assert!(manager.channels().iter().all(ChannelSlot::is_empty));
        assert!(!manager.is_music_playing());
        assert_eq!(manager.current_music(), None);
        assert_eq!(manager.loaded_count(), 0);
        assert_eq!(manager.volume(), Volume::MAX);
    }

    #[test]
    fn test_play_then_stop_every_channel() {
        let mut manager = manager();
        for channel in 0..NUM_CHANNELS as u8 {
            manager.play_sound("door", channel).expect("play door");
            let handle = handle_of(&manager, usize::from(channel));
            assert!(manager.mixer().is_active(handle));

            manager.stop_sound(channel).expect("stop");
            assert!(manager.channels()[usize::from(channel)].is_empty());
            assert!(!manager.mixer().is_active(handle));
        }
    }

    #[test]
    fn test_invalid_channel() {
        let mut manager = manager();
        let err = manager.play_sound("door", 4).expect_err("channel 4 is out of range");
        assert!(matches!(err, SoundError::InvalidChannel { channel: 4, max: 4 }));
        assert!(matches!(
            manager.stop_sound(200),
            Err(SoundError::InvalidChannel { .. })
        ));
        assert!(manager.channel_sound(4).is_err());
        assert_eq!(manager.mixer().started_count(), 0);
    }

    #[test]
    fn test_play_preempts_busy_channel() {
        let mut manager = manager();
        manager.play_sound("door", 2).expect("play door");
        let first = handle_of(&manager, 2);

        manager.play_sound("step", 2).expect("play step");
        let second = handle_of(&manager, 2);

        assert_ne!(first, second);
        assert!(!manager.mixer().is_active(first));
        assert!(manager.mixer().is_active(second));
        assert_eq!(manager.mixer().active_count(), 1);
        assert_eq!(manager.channel_sound(2).expect("channel 2"), Some(SoundId::new(8)));
    }

    #[test]
    fn test_play_implicitly_loads() {
        let mut manager = manager();
        assert!(!manager.is_loaded(SoundId::new(7)));

        manager.play_sound("door", 0).expect("play door");
        assert!(manager.is_loaded(SoundId::new(7)));
        assert!(manager.store().is_loaded(SoundId::new(7)));

        manager.play_sound("door", 1).expect("play door again");
        assert_eq!(manager.store().load_calls(), 1);
    }

    #[test]
    fn test_play_failure_leaves_channel_untouched() {
        let mut manager = manager();
        manager.play_sound("door", 0).expect("play door");
        let handle = handle_of(&manager, 0);

        let err = manager.play_sound("missing", 0).expect_err("unknown name");
        assert!(matches!(err, SoundError::ResourceNotFound(_)));

        let err = manager.play_sound("static", 0).expect_err("corrupt data");
        assert!(matches!(err, SoundError::DecodeError(_)));
        assert!(!manager.is_loaded(SoundId::new(9)));

        assert_eq!(manager.channels()[0].handle, Some(handle));
        assert!(manager.mixer().is_active(handle));
    }

    #[test]
    fn test_play_with_unavailable_mixer() {
        let mut manager =
            SoundManager::new(MockMixer::unavailable(), test_store(), &SoundConfig::default());
        let err = manager.play_sound("door", 0).expect_err("no device");
        assert!(matches!(err, SoundError::MixerUnavailable(_)));
        assert!(manager.channels()[0].is_empty());

        let err = manager.play_music(MusicId::new(1)).expect_err("no device");
        assert!(matches!(err, SoundError::MixerUnavailable(_)));
        assert!(!manager.is_music_playing());
    }

    #[test]
    fn test_mixer_failure_keeps_busy_channel() {
        let mut manager = manager();
        manager.play_sound("door", 0).expect("play door");
        let handle = handle_of(&manager, 0);

        manager.mixer_mut().set_available(false);
        let err = manager.play_sound("step", 0).expect_err("device lost");
        assert!(matches!(err, SoundError::MixerUnavailable(_)));

        assert_eq!(
            manager.channels()[0],
            ChannelSlot {
                handle: Some(handle),
                sound: Some(SoundId::new(7)),
            }
        );
        assert!(manager.mixer().is_active(handle));
        assert_eq!(manager.mixer().voice(handle).map(|v| v.stops), Some(0));
    }

    #[test]
    fn test_stop_empty_channel_is_noop() {
        let mut manager = manager();
        manager.stop_sound(3).expect("stop empty");
        assert_eq!(manager.mixer().redundant_stops(), 0);
    }

    #[test]
    fn test_stop_finished_channel_does_not_double_stop() {
        let mut manager = manager();
        manager.play_sound("door", 1).expect("play door");
        let handle = handle_of(&manager, 1);

        manager.mixer_mut().finish(handle);
        manager.stop_sound(1).expect("stop finished");

        assert!(manager.channels()[1].is_empty());
        assert_eq!(manager.mixer().redundant_stops(), 0);
        assert_eq!(manager.mixer().voice(handle).map(|v| v.stops), Some(0));
    }

    #[test]
    fn test_natural_completion_detected() {
        let mut manager = manager();
        manager.play_sound("door", 0).expect("play door");
        manager.play_sound("step", 1).expect("play step");
        let handle = handle_of(&manager, 0);

        manager.mixer_mut().finish(handle);
        assert!(!manager.is_channel_playing(0).expect("channel 0"));
        assert!(manager.is_channel_playing(1).expect("channel 1"));

        let handle = handle_of(&manager, 1);
        manager.mixer_mut().finish(handle);
        manager.update();
        assert!(manager.channels().iter().all(ChannelSlot::is_empty));
    }

    #[test]
    fn test_unload_stops_channels_playing_sound() {
        let mut manager = manager();
        manager.play_sound("door", 0).expect("play door");
        manager.play_sound("step", 1).expect("play step");
        manager.play_sound("door", 2).expect("play door");
        let door_a = handle_of(&manager, 0);
        let step = handle_of(&manager, 1);
        let door_b = handle_of(&manager, 2);

        manager.unload_sound(SoundId::new(7));

        assert!(!manager.mixer().is_active(door_a));
        assert!(!manager.mixer().is_active(door_b));
        assert!(manager.mixer().is_active(step));
        assert!(manager
            .channels()
            .iter()
            .all(|slot| slot.sound != Some(SoundId::new(7))));
        assert!(!manager.is_loaded(SoundId::new(7)));
        assert!(!manager.store().is_loaded(SoundId::new(7)));
    }

    #[test]
    fn test_load_unload_idempotent() {
        let mut manager = manager();
        manager.load_sound(SoundId::new(7)).expect("load");
        manager.load_sound(SoundId::new(7)).expect("load again");
        assert_eq!(manager.loaded_count(), 1);
        assert_eq!(manager.store().load_calls(), 1);

        manager.unload_sound(SoundId::new(7));
        manager.unload_sound(SoundId::new(7));
        assert_eq!(manager.loaded_count(), 0);
        assert!(!manager.store().is_loaded(SoundId::new(7)));

        manager.unload_sound(SoundId::new(99));
    }

    #[test]
    fn test_load_failures() {
        let mut manager = manager();
        assert!(matches!(
            manager.load_sound(SoundId::new(40)),
            Err(SoundError::ResourceNotFound(_))
        ));
        assert!(matches!(
            manager.load_sound(SoundId::new(9)),
            Err(SoundError::DecodeError(_))
        ));
        assert_eq!(manager.loaded_count(), 0);
    }

    #[test]
    fn test_same_sound_on_two_channels() {
        let mut manager = manager();
        manager.load_sound(SoundId::new(7)).expect("load");
        manager.play_sound("door", 1).expect("play on 1");
        manager.play_sound("door", 3).expect("play on 3");

        assert_eq!(manager.channel_sound(1).expect("ch1"), Some(SoundId::new(7)));
        assert_eq!(manager.channel_sound(3).expect("ch3"), Some(SoundId::new(7)));
        assert_eq!(manager.mixer().active_count(), 2);

        let first = handle_of(&manager, 1);
        let second = handle_of(&manager, 3);
        let data_a = &manager.mixer().voice(first).expect("voice 1").data;
        let data_b = &manager.mixer().voice(second).expect("voice 3").data;
        assert!(data_a.same_buffer(data_b));

        manager.stop_sound(1).expect("stop 1");
        assert_eq!(manager.channel_sound(1).expect("ch1"), None);
        assert_eq!(manager.channel_sound(3).expect("ch3"), Some(SoundId::new(7)));

        manager.stop_sound(3).expect("stop 3");
        assert_eq!(manager.channel_sound(3).expect("ch3"), None);
    }

    #[test]
    fn test_music_switch() {
        let mut manager = manager();
        manager.play_music(MusicId::new(1)).expect("play track 1");
        let first = manager.music.handle.expect("music handle");

        manager.play_music(MusicId::new(2)).expect("play track 2");
        let second = manager.music.handle.expect("music handle");

        assert!(manager.is_music_playing());
        assert_eq!(manager.current_music(), Some(MusicId::new(2)));
        assert!(!manager.mixer().is_active(first));
        assert!(manager.mixer().is_active(second));
        assert!(manager.mixer().voice(second).is_some_and(|v| v.looping));
    }

    #[test]
    fn test_music_same_track_is_noop() {
        let mut manager = manager();
        manager.play_music(MusicId::new(1)).expect("play");
        let handle = manager.music.handle.expect("music handle");

        manager.play_music(MusicId::new(1)).expect("play again");
        assert_eq!(manager.music.handle, Some(handle));
        assert!(manager.mixer().is_active(handle));
        assert_eq!(manager.mixer().started_count(), 1);
    }

    #[test]
    fn test_finished_track_can_be_replayed() {
        let mut config = SoundConfig::default();
        config.loop_music = false;
        let mut manager = SoundManager::new(MockMixer::new(), test_store(), &config);

        manager.play_music(MusicId::new(1)).expect("play");
        let first = manager.music.handle.expect("music handle");
        manager.mixer_mut().finish(first);

        manager.play_music(MusicId::new(1)).expect("replay");
        let second = manager.music.handle.expect("music handle");
        assert_ne!(first, second);
        assert!(manager.mixer().is_active(second));
        assert_eq!(manager.mixer().started_count(), 2);
        assert_eq!(manager.mixer().redundant_stops(), 0);
        assert_eq!(manager.current_music(), Some(MusicId::new(1)));
    }

    #[test]
    fn test_music_invalid_track_stops_current() {
        let mut manager = manager();
        manager.play_music(MusicId::new(1)).expect("play");
        let handle = manager.music.handle.expect("music handle");

        let err = manager.play_music(MusicId::new(77)).expect_err("unknown track");
        assert!(matches!(err, SoundError::ResourceNotFound(_)));
        assert!(!manager.is_music_playing());
        assert_eq!(manager.current_music(), None);
        assert!(!manager.mixer().is_active(handle));
    }

    #[test]
    fn test_stop_music() {
        let mut manager = manager();
        manager.stop_music();
        assert_eq!(manager.mixer().redundant_stops(), 0);

        manager.play_music(MusicId::new(2)).expect("play");
        let handle = manager.music.handle.expect("music handle");
        manager.stop_music();
        assert!(!manager.is_music_playing());
        assert!(!manager.mixer().is_active(handle));

        manager.stop_music();
        assert_eq!(manager.mixer().redundant_stops(), 0);
    }

    #[test]
    fn test_music_does_not_use_effect_channels() {
        let mut manager = manager();
        manager.play_music(MusicId::new(1)).expect("play music");
        assert!(manager.channels().iter().all(ChannelSlot::is_empty));

        manager.play_sound("door", 0).expect("play door");
        manager.stop_sound(0).expect("stop door");
        assert!(manager.is_music_playing());
    }

    #[test]
    fn test_music_loop_policy_from_config() {
        let mut config = SoundConfig::default();
        config.loop_music = false;
        let mut manager = SoundManager::new(MockMixer::new(), test_store(), &config);

        manager.play_music(MusicId::new(1)).expect("play");
        let handle = manager.music.handle.expect("music handle");
        assert!(manager.mixer().voice(handle).is_some_and(|v| !v.looping));
    }

    #[test]
    fn test_set_volume_updates_active_channels_only() {
        let mut manager = manager();
        manager.play_sound("door", 2).expect("play door");
        manager.play_music(MusicId::new(1)).expect("play music");
        let channel = handle_of(&manager, 2);
        let music = manager.music.handle.expect("music handle");

        manager.set_volume(0.25);

        let level = |h| manager.mixer().voice(h).map(|v| v.volume);
        assert_eq!(level(channel), Some(0.25));
        assert_eq!(level(music), Some(0.25));
        assert!(manager.channels()[0].is_empty());
        assert_eq!(manager.mixer().started_count(), 2);
    }

    #[test]
    fn test_volume_applies_to_future_playback() {
        let mut manager = manager();
        manager.set_volume(Volume::from_byte(51));
        manager.play_sound("step", 0).expect("play step");
        manager.play_music(MusicId::new(2)).expect("play music");

        let expected = Volume::from_byte(51).level();
        let sfx = handle_of(&manager, 0);
        let music = manager.music.handle.expect("music handle");
        assert_eq!(manager.mixer().voice(sfx).map(|v| v.volume), Some(expected));
        assert_eq!(manager.mixer().voice(music).map(|v| v.volume), Some(expected));
    }

    #[test]
    fn test_volume_clamped() {
        let mut manager = manager();
        manager.set_volume(4.0);
        assert_eq!(manager.volume(), Volume::MAX);
        manager.set_volume(-1.0);
        assert_eq!(manager.volume(), Volume::MUTE);
    }

    #[test]
    fn test_initial_volume_from_config() {
        let config = SoundConfig::default().with_volume(0.5);
        let mut manager = SoundManager::new(MockMixer::new(), test_store(), &config);
        manager.play_sound("door", 0).expect("play");
        let handle = handle_of(&manager, 0);
        assert_eq!(manager.mixer().voice(handle).map(|v| v.volume), Some(0.5));
    }

    #[test]
    fn test_stop_all() {
        let mut manager = manager();
        manager.play_sound("door", 0).expect("play");
        manager.play_sound("step", 3).expect("play");
        manager.play_music(MusicId::new(1)).expect("play music");

        manager.stop_all();
        assert_eq!(manager.mixer().active_count(), 0);
        assert!(manager.channels().iter().all(ChannelSlot::is_empty));
        assert!(!manager.is_music_playing());
    }

    #[test]
    fn test_drop_stops_everything() {
        let mut mixer = MockMixer::new();
        {
            let mut manager = SoundManager::new(&mut mixer, test_store(), &SoundConfig::default());
            manager.play_sound("door", 0).expect("play");
            manager.play_sound("step", 2).expect("play");
            manager.play_music(MusicId::new(1)).expect("play music");
            assert_eq!(manager.mixer().active_count(), 3);
        }

        assert_eq!(mixer.started_count(), 3);
        assert_eq!(mixer.active_count(), 0);
        assert_eq!(mixer.redundant_stops(), 0);
    }

    proptest! {
        #[test]
        fn prop_play_stop_leaves_channel_empty(channel in 0u8..NUM_CHANNELS as u8, pick in 0usize..2) {
            let mut manager = manager();
            let name = ["door", "step"][pick];
            manager.play_sound(name, channel).expect("play");
            let handle = handle_of(&manager, usize::from(channel));

            manager.stop_sound(channel).expect("stop");
            prop_assert!(manager.channels()[usize::from(channel)].is_empty());
            prop_assert!(!manager.mixer().is_active(handle));
            prop_assert_eq!(manager.mixer().active_count(), 0);
        }

        #[test]
        fn prop_out_of_range_channel_rejected(channel in NUM_CHANNELS as u8..=u8::MAX) {
            let mut manager = manager();
            let is_invalid = matches!(
                manager.play_sound("door", channel),
                Err(SoundError::InvalidChannel { .. })
            );
            prop_assert!(is_invalid);
            prop_assert_eq!(manager.mixer().started_count(), 0);
        }

        #[test]
        fn prop_volume_always_in_range(level in proptest::num::f32::ANY) {
            let mut manager = manager();
            manager.play_sound("door", 1).expect("play");
            manager.set_volume(level);

            let volume = manager.volume().level();
            prop_assert!((0.0..=1.0).contains(&volume));
            let handle = handle_of(&manager, 1);
            prop_assert_eq!(manager.mixer().voice(handle).map(|v| v.volume), Some(volume));
        }

        #[test]
        fn prop_at_most_one_voice_per_channel(plays in proptest::collection::vec((0u8..NUM_CHANNELS as u8, 0usize..2), 1..32)) {
            let mut manager = manager();
            for (channel, pick) in plays {
                manager.play_sound(["door", "step"][pick], channel).expect("play");
            }
            let occupied = manager.channels().iter().filter(|slot| !slot.is_empty()).count();
            prop_assert_eq!(manager.mixer().active_count(), occupied);
        }
    }
}
