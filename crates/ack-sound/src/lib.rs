//! # ACK Sound
//!
//! Sound effect and music manager for the ACK engine.
//!
//! Game logic talks to a [`SoundManager`], which owns four sound-effect
//! channels and one music stream. The manager sits on top of two
//! collaborators it is given at construction:
//!
//! - a [`Mixer`], which owns the real playback channels
//!   ([`RodioMixer`] in the game, [`MockMixer`] in tests)
//! - a [`SoundStore`], which maps names and ids to sample data
//!   ([`FileSoundStore`] reading the configured manifest, or
//!   [`MemorySoundStore`])
//!
//! ## Channels
//!
//! Each channel plays at most one sound. Playing on a busy channel cuts off
//! the previous sound. Sounds finish on their own without notification, so
//! the manager asks the mixer before trusting a channel's state; call
//! [`SoundManager::update`] once per frame to reconcile all of them.
//!
//! ## Music
//!
//! One track at a time. Starting a track stops the previous one first, and
//! a failed start leaves no music playing.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod file_store;
pub mod ids;
pub mod manager;
pub mod mixer;
pub mod rodio_mixer;
pub mod store;
pub mod volume;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::error::*;
    pub use crate::file_store::*;
    pub use crate::ids::*;
    pub use crate::manager::*;
    pub use crate::mixer::*;
    pub use crate::rodio_mixer::*;
    pub use crate::store::*;
    pub use crate::volume::*;
}

pub use prelude::*;
