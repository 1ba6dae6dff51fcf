//! Parsing of the playback command list.

use std::time::Duration;

use ack_sound::{MusicId, SoundId, Volume};
use thiserror::Error;

/// One playback command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Load a sound by id.
    Load(SoundId),
    /// Unload a sound by id.
    Unload(SoundId),
    /// Play a named sound on a channel.
    Play {
        /// Sound name.
        name: String,
        /// Channel index.
        channel: u8,
    },
    /// Stop a channel.
    Stop(u8),
    /// Start a music track.
    Music(MusicId),
    /// Stop the music.
    StopMusic,
    /// Set the master volume.
    Volume(Volume),
    /// Keep playing for a while.
    Wait(Duration),
}

/// Errors in a command list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    /// Unknown command word.
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    /// A command is missing an argument.
    #[error("'{command}' expects {expected}")]
    MissingArgument {
        /// Command name.
        command: String,
        /// Description of the missing argument.
        expected: &'static str,
    },

    /// An argument could not be parsed.
    #[error("Invalid argument '{value}' for '{command}'")]
    InvalidArgument {
        /// Command name.
        command: String,
        /// Offending value.
        value: String,
    },
}

/// Parses a flat list of words into commands.
pub fn parse(words: &[String]) -> Result<Vec<Command>, ScriptError> {
    let mut commands = Vec::new();
    let mut words = words.iter().map(String::as_str);

    while let Some(word) = words.next() {
        let mut arg = |expected: &'static str| {
            words.next().ok_or_else(|| ScriptError::MissingArgument {
                command: word.to_string(),
                expected,
            })
        };

        let command = match word {
            "load" => Command::Load(SoundId::new(number(word, arg("a sound id")?)?)),
            "unload" => Command::Unload(SoundId::new(number(word, arg("a sound id")?)?)),
            "play" => {
                let name = arg("a sound name and a channel")?.to_string();
                let channel = number(word, arg("a channel")?)?;
                Command::Play { name, channel }
            },
            "stop" => Command::Stop(number(word, arg("a channel")?)?),
            "music" => Command::Music(MusicId::new(number(word, arg("a music id")?)?)),
            "stop-music" => Command::StopMusic,
            "volume" => Command::Volume(Volume::new(number(word, arg("a volume")?)?)),
            "wait" => Command::Wait(Duration::from_millis(number(word, arg("milliseconds")?)?)),
            other => return Err(ScriptError::UnknownCommand(other.to_string())),
        };
        commands.push(command);
    }

    Ok(commands)
}

fn number<T: std::str::FromStr>(command: &str, value: &str) -> Result<T, ScriptError> {
    value.parse().map_err(|_| ScriptError::InvalidArgument {
        command: command.to_string(),
        value: value.to_string(),
    })
}
