//! # ACK Player
//!
//! Command-line host for the ACK sound manager. Loads a sound
//! configuration, opens the default audio device and runs a list of
//! playback commands in order:
//!
//! ```text
//! ack-player --config ack-sound.toml play door 1 music 3 wait 2000 volume 0.5 wait 1000
//! ```
//!
//! A failing command is logged and the rest still run, the way a game
//! keeps going when a sound is missing.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod script;

use std::path::PathBuf;
use std::time::Duration;

use ack_sound::{FileSoundStore, RodioMixer, SoundConfig, SoundManager, CONFIG_FILE};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::script::Command;

/// Frame interval used while waiting, so finished channels are reconciled.
const TICK: Duration = Duration::from_millis(16);

#[derive(Parser)]
#[command(name = "ack-player", about = "Play sounds and music through the ACK sound manager")]
struct Cli {
    /// Path to the sound configuration file.
    #[arg(long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Fail instead of falling back to defaults when the config cannot be read.
    #[arg(long)]
    strict: bool,

    /// Commands: load <id>, unload <id>, play <name> <channel>, stop <channel>,
    /// music <id>, stop-music, volume <0.0-1.0>, wait <ms>.
    #[arg(trailing_var_arg = true)]
    commands: Vec<String>,
}

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("ack=info".parse()?))
        .init();

    let cli = Cli::parse();
    let commands = script::parse(&cli.commands).context("Invalid command list")?;

    let config = if cli.strict {
        SoundConfig::try_load_from(&cli.config)
            .with_context(|| format!("Failed to load {}", cli.config.display()))?
    } else {
        SoundConfig::load_from(&cli.config)
    };

    let store = FileSoundStore::from_config(&config);
    let mixer = RodioMixer::open_or_disabled();
    let mut sound = SoundManager::new(mixer, store, &config);

    info!("Running {} sound commands", commands.len());
    for command in &commands {
        if let Err(e) = run(&mut sound, command) {
            warn!("{:?} failed: {}", command, e);
        }
    }

    sound.stop_all();
    info!("ACK player finished");
    Ok(())
}

fn run(sound: &mut SoundManager<RodioMixer, FileSoundStore>, command: &Command) -> ack_sound::SoundResult<()> {
    match command {
        Command::Load(id) => sound.load_sound(*id)?,
        Command::Unload(id) => sound.unload_sound(*id),
        Command::Play { name, channel } => sound.play_sound(name, *channel)?,
        Command::Stop(channel) => sound.stop_sound(*channel)?,
        Command::Music(id) => sound.play_music(*id)?,
        Command::StopMusic => sound.stop_music(),
        Command::Volume(volume) => sound.set_volume(*volume),
        Command::Wait(duration) => wait(sound, *duration),
    }
    Ok(())
}

fn wait(sound: &mut SoundManager<RodioMixer, FileSoundStore>, duration: Duration) {
    let mut remaining = duration;
    while !remaining.is_zero() {
        let step = remaining.min(TICK);
        std::thread::sleep(step);
        remaining -= step;
        sound.update();
    }
}
