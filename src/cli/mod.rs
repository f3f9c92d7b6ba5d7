use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::command::Command;
use crate::controller::{ErrorPolicy, NavControl};
use crate::engine::{EffectKind, FilterKind};

pub mod status;
pub use status::StatusDisplay;

/// Largest offset `parse_offset` accepts in seconds form
const MAX_OFFSET_SECS: f64 = u32::MAX as f64 / 1000.0;

/// Equalizer music player
#[derive(Debug, Parser)]
#[command(name = "eqplay")]
#[command(about = "Interactive music player with a four-unit equalizer")]
#[command(version)]
pub struct CliApp {
    /// Configuration file to use instead of ~/.config/eq-player/config.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// What to do when an engine call fails (overrides the config file)
    #[arg(long, value_enum)]
    pub policy: Option<ErrorPolicy>,

    /// Log level: trace, debug, info, warn, error or off
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// One-shot subcommands; without one the interactive loop starts
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the interactive loop with this file already playing
    Play {
        path: PathBuf,
    },
    /// Print the stream length of a file and exit
    Probe {
        path: PathBuf,
    },
}

/// A parsed interactive line
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Forwarded to the dispatcher
    Control(Command),
    List,
    Status,
    /// One-line status
    Now,
    History,
    Equalizer,
    /// Switch the error policy and save it to the config file
    SetPolicy(ErrorPolicy),
    ShowConfig,
    /// Change one setting and save it to the config file
    Set(Setting),
    ResetConfig,
    Help,
    About,
    Exit,
}

/// A config setting changed with `set`
#[derive(Debug, Clone, PartialEq)]
pub enum Setting {
    SeekStep(u32),
    MediaExtension(String),
    ConfirmExit(bool),
}

impl CliApp {
    /// Parse command line arguments
    pub fn parse() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Expand tilde (~) in path to home directory
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            match dirs::home_dir() {
                Some(home_dir) => home_dir.join(rest),
                None => PathBuf::from(path),
            }
        } else if path == "~" {
            dirs::home_dir().unwrap_or_else(|| PathBuf::from(path))
        } else {
            PathBuf::from(path)
        }
    }

    /// Parse an interactive line. `seek_step_ms` is used by `forward`/`back`
    /// when no offset is given.
    pub fn parse_command(input: &str, seek_step_ms: u32) -> Result<Action, ParseError> {
        let args: Vec<&str> = input.split_whitespace().collect();
        let Some(&name) = args.first() else {
            return Err(ParseError::EmptyCommand);
        };
        let rest = &args[1..];

        let control = |command: Command| -> Result<Action, ParseError> { Ok(Action::Control(command)) };

        match name.to_lowercase().as_str() {
            "add" => control(Command::AddTrack {
                path: Self::path_argument("add", rest)?,
            }),
            "list" | "ls" => Ok(Action::List),
            "select" => control(Command::SelectTrack {
                index: Self::track_number(rest)?,
            }),
            "play" => control(Command::Play {
                path: Self::path_argument("play", rest)?,
            }),
            "pause" => control(Command::TogglePause),
            "stop" => control(Command::Stop),
            "forward" | "ff" => control(Command::SeekForward {
                ms: Self::offset_or(rest, seek_step_ms)?,
            }),
            "back" | "rew" => control(Command::SeekBackward {
                ms: Self::offset_or(rest, seek_step_ms)?,
            }),
            "start" => control(Command::SeekToStart),
            "goto" => {
                let value = Self::required("goto", "percent", rest)?;
                let percent = Self::bounded(value, "percent", 0.0, 100.0)?;
                control(Command::SeekToFraction {
                    percent: percent / 100.0,
                })
            }
            "vol+" => control(Command::IncreaseVolume),
            "vol-" => control(Command::DecreaseVolume),
            "mute" => control(Command::Mute),
            "volume" => {
                let value = Self::required("volume", "level", rest)?;
                let level = Self::bounded(value, "volume level", 0.0, 100.0)?;
                control(Command::SetVolume {
                    level: level / 100.0,
                })
            }
            "volume-by" => {
                let value = Self::required("volume-by", "delta", rest)?;
                let delta = Self::bounded(value, "volume delta", -100.0, 100.0)?;
                control(Command::ChangeVolumeBy {
                    delta: delta / 100.0,
                })
            }
            "echo" | "flange" | "lowpass" | "highpass" => {
                let effect = EffectKind::parse(name).ok_or_else(|| ParseError::UnknownCommand {
                    command: name.to_string(),
                })?;
                control(Command::ToggleBypass { effect })
            }
            "cutoff" => {
                let filter_name = Self::required("cutoff", "filter", rest)?;
                let filter = FilterKind::parse(filter_name).ok_or_else(|| {
                    ParseError::InvalidArgument {
                        argument: "filter".to_string(),
                        value: filter_name.to_string(),
                        expected: "lowpass or highpass".to_string(),
                    }
                })?;
                let hz = Self::frequency("cutoff", &rest[1..])?;
                control(Command::SetCutoff { filter, hz })
            }
            "cut-low" => control(Command::CutLow {
                hz: Self::frequency("cut-low", rest)?,
            }),
            "cut-high" => control(Command::CutHigh {
                hz: Self::frequency("cut-high", rest)?,
            }),
            "next" => control(Command::Navigate {
                control: NavControl::Next,
            }),
            "prev" | "previous" => control(Command::Navigate {
                control: NavControl::Previous,
            }),
            "replay" => control(Command::Navigate {
                control: NavControl::Replay,
            }),
            "eq" | "equalizer" => Ok(Action::Equalizer),
            "policy" => {
                let value = Self::required("policy", "policy", rest)?;
                let policy = <ErrorPolicy as clap::ValueEnum>::from_str(value, true).map_err(|_| {
                    ParseError::InvalidArgument {
                        argument: "policy".to_string(),
                        value: value.to_string(),
                        expected: "ignore or propagate".to_string(),
                    }
                })?;
                Ok(Action::SetPolicy(policy))
            }
            "status" => Ok(Action::Status),
            "now" | "np" => Ok(Action::Now),
            "history" => Ok(Action::History),
            "config" => Ok(Action::ShowConfig),
            "set" => Self::setting(rest).map(Action::Set),
            "reset-config" => Ok(Action::ResetConfig),
            "help" | "?" => Ok(Action::Help),
            "about" => Ok(Action::About),
            "exit" | "quit" | "q" => Ok(Action::Exit),
            _ => Err(ParseError::UnknownCommand {
                command: name.to_string(),
            }),
        }
    }

    fn setting(rest: &[&str]) -> Result<Setting, ParseError> {
        let key = Self::required("set", "setting", rest)?;
        let value = Self::required("set", key, &rest[1..])?;
        match key.to_lowercase().as_str() {
            "step" => match Self::parse_offset(value)? {
                0 => Err(ParseError::InvalidArgument {
                    argument: "step".to_string(),
                    value: value.to_string(),
                    expected: "an offset above zero".to_string(),
                }),
                ms => Ok(Setting::SeekStep(ms)),
            },
            "extension" | "ext" => {
                let extension = value.trim_start_matches('.');
                if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(ParseError::InvalidArgument {
                        argument: "extension".to_string(),
                        value: value.to_string(),
                        expected: "a file extension such as mp3".to_string(),
                    });
                }
                Ok(Setting::MediaExtension(extension.to_lowercase()))
            }
            "confirm" => match value.to_lowercase().as_str() {
                "on" | "yes" | "true" => Ok(Setting::ConfirmExit(true)),
                "off" | "no" | "false" => Ok(Setting::ConfirmExit(false)),
                _ => Err(ParseError::InvalidArgument {
                    argument: "confirm".to_string(),
                    value: value.to_string(),
                    expected: "on or off".to_string(),
                }),
            },
            _ => Err(ParseError::InvalidArgument {
                argument: "setting".to_string(),
                value: key.to_string(),
                expected: "step, extension or confirm".to_string(),
            }),
        }
    }

    fn required<'a>(command: &str, argument: &str, rest: &[&'a str]) -> Result<&'a str, ParseError> {
        rest.first().copied().ok_or_else(|| ParseError::MissingArgument {
            command: command.to_string(),
            argument: argument.to_string(),
        })
    }

    /// Paths may contain spaces, so the whole remainder is the path
    fn path_argument(command: &str, rest: &[&str]) -> Result<PathBuf, ParseError> {
        if rest.is_empty() {
            return Err(ParseError::MissingArgument {
                command: command.to_string(),
                argument: "path".to_string(),
            });
        }
        Ok(Self::expand_path(&rest.join(" ")))
    }

    /// `select` is 1-based on the command line
    fn track_number(rest: &[&str]) -> Result<usize, ParseError> {
        let value = Self::required("select", "track number", rest)?;
        match value.parse::<usize>() {
            Ok(number) if number >= 1 => Ok(number - 1),
            _ => Err(ParseError::InvalidArgument {
                argument: "track number".to_string(),
                value: value.to_string(),
                expected: "a number from 'list'".to_string(),
            }),
        }
    }

    fn offset_or(rest: &[&str], default_ms: u32) -> Result<u32, ParseError> {
        match rest.first() {
            Some(value) => Self::parse_offset(value),
            None => Ok(default_ms),
        }
    }

    fn bounded(value: &str, argument: &str, min: f32, max: f32) -> Result<f32, ParseError> {
        match value.parse::<f32>() {
            Ok(number) if (min..=max).contains(&number) => Ok(number),
            _ => Err(ParseError::InvalidArgument {
                argument: argument.to_string(),
                value: value.to_string(),
                expected: format!("{} to {}", min, max),
            }),
        }
    }

    fn frequency(command: &str, rest: &[&str]) -> Result<f32, ParseError> {
        let value = Self::required(command, "hz", rest)?;
        let value = value.trim_end_matches("hz").trim_end_matches("Hz");
        match value.parse::<f32>() {
            Ok(hz) if hz.is_finite() && hz > 0.0 => Ok(hz),
            _ => Err(ParseError::InvalidArgument {
                argument: "frequency".to_string(),
                value: value.to_string(),
                expected: "a positive number of Hz".to_string(),
            }),
        }
    }

    /// Parse a seek offset in milliseconds.
    ///
    /// Accepts plain milliseconds (`1500`), seconds (`90s`, `2.5s`) and
    /// `MM:SS` (`1:30`).
    pub fn parse_offset(input: &str) -> Result<u32, ParseError> {
        let trimmed = input.trim();
        let invalid = || ParseError::InvalidTimeFormat {
            input: input.to_string(),
        };

        let ms = if let Some((minutes, seconds)) = trimmed.split_once(':') {
            let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
            let seconds: f64 = seconds.parse().map_err(|_| invalid())?;
            if !(0.0..60.0).contains(&seconds) {
                return Err(invalid());
            }
            let whole_secs = minutes.checked_mul(60).ok_or_else(invalid)?;
            Duration::from_secs(whole_secs)
                .saturating_add(Duration::from_secs_f64(seconds))
                .as_millis()
        } else if let Some(seconds) = trimmed.strip_suffix('s') {
            let seconds: f64 = seconds.parse().map_err(|_| invalid())?;
            if !seconds.is_finite() || !(0.0..=MAX_OFFSET_SECS).contains(&seconds) {
                return Err(invalid());
            }
            Duration::from_secs_f64(seconds).as_millis()
        } else {
            trimmed.parse::<u128>().map_err(|_| invalid())?
        };

        u32::try_from(ms).map_err(|_| invalid())
    }

    /// Display help information
    pub fn display_help() {
        println!("Equalizer Player - Available Commands:");
        println!();
        println!("Songs:");
        println!("  add <path>          - Add a file to the song list");
        println!("  list                - Show the song list");
        println!("  select <n>          - Play song number n from the list");
        println!("  play <path>         - Play a file directly");
        println!();
        println!("Transport:");
        println!("  pause               - Pause or resume");
        println!("  stop                - Pause playback (position is kept)");
        println!("  forward [offset]    - Seek forward (ms, '10s' or '1:30')");
        println!("  back [offset]       - Seek backward");
        println!("  start               - Go back to the beginning");
        println!("  goto <percent>      - Jump to a point of the track (0-100)");
        println!("  next, prev, replay  - Navigation buttons");
        println!();
        println!("Volume:");
        println!("  vol+, vol-          - Volume up 5% / down 10%");
        println!("  mute                - Volume to zero");
        println!("  volume <0-100>      - Set the volume");
        println!("  volume-by <delta>   - Change the volume by delta percent");
        println!();
        println!("Equalizer:");
        println!("  echo, flange        - Toggle an effect");
        println!("  lowpass, highpass   - Toggle a filter");
        println!("  cutoff <filter> <hz> - Set a filter's cutoff frequency");
        println!("  cut-low <hz>        - Cut frequencies below hz");
        println!("  cut-high <hz>       - Cut frequencies above hz");
        println!("  eq                  - Show the equalizer panel");
        println!();
        println!("General:");
        println!("  status              - Show current player status");
        println!("  now                 - One-line status");
        println!("  history             - Show recent player events");
        println!("  policy <name>       - 'ignore' or 'propagate' engine failures");
        println!();
        println!("Settings:");
        println!("  config              - Show the current settings");
        println!("  set step <offset>   - Default step of forward/back");
        println!("  set extension <ext> - File type accepted by add");
        println!("  set confirm <on|off> - Ask before exiting");
        println!("  reset-config        - Restore the default settings");
        println!();
        println!("Session:");
        println!("  about               - About this player");
        println!("  help                - Show this help message");
        println!("  exit, quit          - Exit the player");
    }

    pub fn display_about() {
        println!("eqplay {}", env!("CARGO_PKG_VERSION"));
        println!("A small music player with low-pass, high-pass, echo and flange units.");
    }
}

/// Command parsing errors
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Empty command")]
    EmptyCommand,

    #[error("Unknown command: {command}")]
    UnknownCommand { command: String },

    #[error("Missing argument for {command}: {argument}")]
    MissingArgument { command: String, argument: String },

    #[error("Invalid argument {argument}: got '{value}', expected {expected}")]
    InvalidArgument {
        argument: String,
        value: String,
        expected: String,
    },

    #[error("Invalid time format: {input}")]
    InvalidTimeFormat { input: String },
}
