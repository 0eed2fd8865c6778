//! Administrative command parsing and dispatch.
//!
//! Commands are the words after the command prefix, e.g. `["set", "grace", "600"]`.
//! Parsing is pure; [`CommandDispatcher`] applies a parsed command to the shared
//! scheduler and writes accepted settings back to the config file.

use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use shrinkborder_types::{ScheduleStatus, Setting, SettingsError};

use crate::persistence::SettingsSink;
use crate::shared::SharedScheduler;
use crate::world::World;

#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub usage: &'static str,
    pub description: &'static str,
}

const COMMAND_SPECS: &[CommandSpec] = &[
    CommandSpec {
        usage: "start",
        description: "Start the shrink sequence after the grace period",
    },
    CommandSpec {
        usage: "pause",
        description: "Freeze the countdown",
    },
    CommandSpec {
        usage: "resume",
        description: "Continue a paused countdown",
    },
    CommandSpec {
        usage: "stop",
        description: "End the sequence, keeping the current size",
    },
    CommandSpec {
        usage: "status",
        description: "Show shrinking/paused state and time until the next step",
    },
    CommandSpec {
        usage: "set <option> <value...>",
        description: "Change a setting: center, size, interval, amount, grace, broadcast, teleport, sound",
    },
    CommandSpec {
        usage: "help",
        description: "Show available commands",
    },
];

#[must_use]
pub fn command_specs() -> &'static [CommandSpec] {
    COMMAND_SPECS
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),
    #[error("unknown setting '{0}'")]
    UnknownSetting(String),
    #[error("'{0}' is not a number")]
    InvalidNumber(String),
    #[error("'{0}' is not a boolean (use true or false)")]
    InvalidBool(String),
    #[error(transparent)]
    Rejected(#[from] SettingsError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Pause,
    Resume,
    Stop,
    Status,
    Help,
    Set(Setting),
}

impl Command {
    /// Parse whitespace-split words. Keywords are case-insensitive.
    pub fn parse(words: &[&str]) -> Result<Self, CommandError> {
        let Some(first) = words.first() else {
            return Err(CommandError::Usage("<start|pause|resume|stop|status|set|help>"));
        };
        match first.to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "stop" => Ok(Self::Stop),
            "status" => Ok(Self::Status),
            "help" => Ok(Self::Help),
            "set" => parse_setting(&words[1..]).map(Self::Set),
            _ => Err(CommandError::UnknownCommand((*first).to_string())),
        }
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        Self::parse(&words)
    }
}

fn parse_setting(args: &[&str]) -> Result<Setting, CommandError> {
    let (option, values) = match args {
        [option, values @ ..] if !values.is_empty() => (option.to_ascii_lowercase(), values),
        _ => return Err(CommandError::Usage("set <option> <value...>")),
    };

    let setting = match option.as_str() {
        "center" => match values {
            [x, z, ..] => Setting::Center {
                x: parse_float(x)?,
                z: parse_float(z)?,
            },
            _ => return Err(CommandError::Usage("set center <x> <z>")),
        },
        "size" => match values {
            [initial, final_size, ..] => Setting::Size {
                initial: parse_float(initial)?,
                final_size: parse_float(final_size)?,
            },
            _ => return Err(CommandError::Usage("set size <initial> <final>")),
        },
        "interval" => Setting::Interval(parse_ticks(values[0])?),
        "amount" => Setting::Amount(parse_float(values[0])?),
        "grace" => Setting::Grace(parse_ticks(values[0])?),
        "broadcast" => Setting::Broadcast(parse_bool(values[0])?),
        "teleport" => Setting::Teleport(parse_bool(values[0])?),
        "sound" => {
            let id = values[0];
            if id.eq_ignore_ascii_case("none") {
                Setting::Sound(None)
            } else {
                Setting::Sound(Some(id.to_string()))
            }
        }
        _ => return Err(CommandError::UnknownSetting(option)),
    };

    setting.validate()?;
    Ok(setting)
}

fn parse_float(raw: &str) -> Result<f64, CommandError> {
    raw.parse::<f64>()
        .map_err(|_| CommandError::InvalidNumber(raw.to_string()))
}

fn parse_ticks(raw: &str) -> Result<u64, CommandError> {
    raw.parse::<u64>()
        .map_err(|_| CommandError::InvalidNumber(raw.to_string()))
}

fn parse_bool(raw: &str) -> Result<bool, CommandError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" => Ok(true),
        "false" | "off" | "no" => Ok(false),
        _ => Err(CommandError::InvalidBool(raw.to_string())),
    }
}

/// Result of a successfully executed command.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Started { grace_ticks: u64 },
    AlreadyShrinking,
    Paused,
    NotShrinking,
    Resumed,
    NotPaused,
    Stopped,
    AlreadyStopped,
    Status(ScheduleStatus),
    Help,
    /// `persisted` is false when the config file could not be written; the
    /// in-memory setting still applies.
    Updated {
        setting: &'static str,
        persisted: bool,
    },
}

pub struct CommandDispatcher<W> {
    scheduler: SharedScheduler<W>,
    settings_sink: Arc<dyn SettingsSink + Send + Sync>,
    /// Held across apply and save so config writes land in apply order.
    /// Separate from the scheduler lock so ticks never wait on the disk.
    settings_write: Arc<Mutex<()>>,
}

impl<W> Clone for CommandDispatcher<W> {
    fn clone(&self) -> Self {
        Self {
            scheduler: self.scheduler.clone(),
            settings_sink: Arc::clone(&self.settings_sink),
            settings_write: Arc::clone(&self.settings_write),
        }
    }
}

impl<W: World> CommandDispatcher<W> {
    pub fn new(
        scheduler: SharedScheduler<W>,
        settings_sink: Arc<dyn SettingsSink + Send + Sync>,
    ) -> Self {
        Self {
            scheduler,
            settings_sink,
            settings_write: Arc::new(Mutex::new(())),
        }
    }

    /// Parse and execute one input line.
    pub fn execute_line(&self, line: &str) -> Result<Response, CommandError> {
        let command = line.parse::<Command>()?;
        self.execute(command)
    }

    pub fn execute(&self, command: Command) -> Result<Response, CommandError> {
        let response = match command {
            Command::Start => {
                let mut scheduler = self.scheduler.lock();
                if scheduler.start() {
                    Response::Started {
                        grace_ticks: scheduler.settings().grace_ticks(),
                    }
                } else {
                    Response::AlreadyShrinking
                }
            }
            Command::Pause => {
                if self.scheduler.lock().pause() {
                    Response::Paused
                } else {
                    Response::NotShrinking
                }
            }
            Command::Resume => {
                if self.scheduler.lock().resume() {
                    Response::Resumed
                } else {
                    Response::NotPaused
                }
            }
            Command::Stop => {
                if self.scheduler.lock().stop() {
                    Response::Stopped
                } else {
                    Response::AlreadyStopped
                }
            }
            Command::Status => Response::Status(self.scheduler.status()),
            Command::Help => Response::Help,
            Command::Set(setting) => {
                let name = setting.name();
                let _write = self
                    .settings_write
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                let settings = {
                    let mut scheduler = self.scheduler.lock();
                    scheduler.apply_setting(setting)?;
                    scheduler.settings().clone()
                };
                let persisted = match self.settings_sink.save_settings(&settings) {
                    Ok(()) => true,
                    Err(err) => {
                        tracing::warn!(setting = name, "Setting applied but not saved: {err}");
                        false
                    }
                };
                Response::Updated {
                    setting: name,
                    persisted,
                }
            }
        };
        Ok(response)
    }
}
