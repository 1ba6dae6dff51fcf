//! Mixer backed by rodio.
//!
//! Every playback instance gets its own rodio `Sink`; the sink's queue
//! running dry is what "no longer active" means. Rodio renders on its own
//! thread, so a sink can drain between two calls.
//!
//! If no output device can be opened the mixer is created disabled: every
//! `start_channel` fails with [`MixerError::Unavailable`] and everything
//! else is a no-op, so a game without audio hardware keeps running.

use std::collections::HashMap;
use std::io::Cursor;

use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, info, warn};

use crate::error::MixerError;
use crate::ids::{HandleGenerator, MixerHandle};
use crate::mixer::Mixer;
use crate::store::SampleData;

/// Rodio output stream and the handle used to create sinks.
struct Output {
    /// Must be kept alive; dropping it silences every sink.
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

/// Mixer that plays through the default rodio output device.
pub struct RodioMixer {
    output: Option<Output>,
    sinks: HashMap<MixerHandle, Sink>,
    handles: HandleGenerator,
}

impl std::fmt::Debug for RodioMixer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioMixer")
            .field("available", &self.is_available())
            .field("sinks", &self.sinks.len())
            .finish_non_exhaustive()
    }
}

impl RodioMixer {
    /// Opens the default output device.
    pub fn open_default() -> Result<Self, MixerError> {
        let (stream, handle) = OutputStream::try_default().map_err(|e| {
            warn!("Failed to open audio output: {}", e);
            MixerError::Unavailable
        })?;

        info!("Audio device initialized");

        Ok(Self {
            output: Some(Output {
                _stream: stream,
                handle,
            }),
            sinks: HashMap::new(),
            handles: HandleGenerator::new(),
        })
    }

    /// Opens the default output device, falling back to a disabled mixer.
    #[must_use]
    pub fn open_or_disabled() -> Self {
        Self::open_default().unwrap_or_else(|_| {
            warn!("Audio will be disabled");
            Self::disabled()
        })
    }

    /// Creates a mixer with no output device.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            output: None,
            sinks: HashMap::new(),
            handles: HandleGenerator::new(),
        }
    }

    /// Checks whether an output device is open.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.output.is_some()
    }

    /// Number of sinks still holding queued audio.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.sinks.values().filter(|sink| !sink.empty()).count()
    }

    fn prune_finished(&mut self) {
        self.sinks.retain(|_, sink| !sink.empty());
    }
}

impl Mixer for RodioMixer {
    fn start_channel(&mut self, data: &SampleData, looping: bool) -> Result<MixerHandle, MixerError> {
        self.prune_finished();

        let output = self.output.as_ref().ok_or(MixerError::Unavailable)?;
        let sink =
            Sink::try_new(&output.handle).map_err(|e| MixerError::StartFailed(e.to_string()))?;

        match data {
            SampleData::Decoded(decoded) => {
                let source = SamplesBuffer::new(
                    decoded.channels,
                    decoded.sample_rate,
                    decoded.samples.clone(),
                );
                if looping {
                    sink.append(source.repeat_infinite());
                } else {
                    sink.append(source);
                }
            },
            SampleData::Encoded(bytes) => {
                let decoder = Decoder::new(Cursor::new(bytes.to_vec()))
                    .map_err(|e| MixerError::Decode(e.to_string()))?;
                if looping {
                    sink.append(decoder.repeat_infinite());
                } else {
                    sink.append(decoder);
                }
            },
        }
        sink.play();

        let handle = self.handles.next_handle();
        self.sinks.insert(handle, sink);
        debug!("Started sink {:?} (looping: {})", handle, looping);
        Ok(handle)
    }

    fn stop(&mut self, handle: MixerHandle) {
        if let Some(sink) = self.sinks.remove(&handle) {
            sink.stop();
            debug!("Stopped sink {:?}", handle);
        }
    }

    fn is_active(&self, handle: MixerHandle) -> bool {
        self.sinks.get(&handle).is_some_and(|sink| !sink.empty())
    }

    fn set_volume(&mut self, handle: MixerHandle, level: f32) {
        if let Some(sink) = self.sinks.get(&handle) {
            sink.set_volume(level.clamp(0.0, 1.0));
        }
    }
}
