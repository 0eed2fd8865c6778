//! Raw TOML table -> [`BorderSettings`].

use std::fmt;

use shrinkborder_types::{BorderSettings, Setting};

pub(crate) const BORDER: &str = "border";
pub(crate) const MESSAGES: &str = "messages";
pub(crate) const SOUNDS: &str = "sounds";

pub(crate) const CENTER_X: &str = "center_x";
pub(crate) const CENTER_Z: &str = "center_z";
pub(crate) const INITIAL_SIZE: &str = "initial_size";
pub(crate) const FINAL_SIZE: &str = "final_size";
pub(crate) const STEP: &str = "shrink_amount_per_step";
pub(crate) const INTERVAL: &str = "shrink_interval_ticks";
pub(crate) const GRACE: &str = "grace_period_ticks";
pub(crate) const ENABLED: &str = "enabled";
pub(crate) const SHRINK_SOUND: &str = "shrink_sound";
pub(crate) const TELEPORT: &str = "teleport_outside_players";

/// A field that could not be used and was replaced by its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub message: String,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config key `{}`: {}; using default", self.key, self.message)
    }
}

struct Reader<'a> {
    root: &'a toml::Table,
    warnings: Vec<ConfigWarning>,
}

impl<'a> Reader<'a> {
    fn value(&mut self, section: Option<&str>, key: &str) -> Option<&'a toml::Value> {
        let root = self.root;
        let table = match section {
            None => root,
            Some(name) => match root.get(name)? {
                toml::Value::Table(table) => table,
                _ => {
                    self.warn(name, "expected a table");
                    return None;
                }
            },
        };
        table.get(key)
    }

    fn warn(&mut self, key: impl Into<String>, message: impl Into<String>) {
        let key = key.into();
        if self.warnings.iter().any(|w| w.key == key) {
            return;
        }
        self.warnings.push(ConfigWarning {
            key,
            message: message.into(),
        });
    }

    fn float(&mut self, section: &str, key: &str, default: f64) -> f64 {
        match self.value(Some(section), key) {
            None => default,
            Some(toml::Value::Float(v)) => *v,
            Some(toml::Value::Integer(v)) => *v as f64,
            Some(other) => {
                self.warn(
                    dotted(section, key),
                    format!("expected a number, found {}", other.type_str()),
                );
                default
            }
        }
    }

    fn ticks(&mut self, section: &str, key: &str, default: u64) -> u64 {
        match self.value(Some(section), key) {
            None => default,
            Some(toml::Value::Integer(v)) => match u64::try_from(*v) {
                Ok(ticks) => ticks,
                Err(_) => {
                    self.warn(dotted(section, key), format!("must not be negative (got {v})"));
                    default
                }
            },
            Some(other) => {
                self.warn(
                    dotted(section, key),
                    format!("expected an integer tick count, found {}", other.type_str()),
                );
                default
            }
        }
    }

    fn boolean(&mut self, section: Option<&str>, key: &str, default: bool) -> bool {
        match self.value(section, key) {
            None => default,
            Some(toml::Value::Boolean(v)) => *v,
            Some(other) => {
                let name = section.map_or_else(|| key.to_string(), |s| dotted(s, key));
                self.warn(name, format!("expected a boolean, found {}", other.type_str()));
                default
            }
        }
    }

    fn string(&mut self, section: &str, key: &str) -> Option<Option<String>> {
        match self.value(Some(section), key)? {
            toml::Value::String(v) => Some(Some(v.clone())),
            other => {
                self.warn(
                    dotted(section, key),
                    format!("expected a string, found {}", other.type_str()),
                );
                None
            }
        }
    }

    fn apply(&mut self, settings: &mut BorderSettings, key: &str, setting: Setting) {
        if let Err(err) = settings.apply(setting) {
            self.warn(key, err.to_string());
        }
    }
}

fn dotted(section: &str, key: &str) -> String {
    format!("{section}.{key}")
}

/// Resolve a parsed config table, falling back to defaults field by field.
///
/// `initial_size` and `final_size` are validated as a pair and fall back
/// together.
#[must_use]
pub fn resolve_settings(table: &toml::Table) -> crate::LoadedConfig {
    let defaults = BorderSettings::default();
    let mut reader = Reader {
        root: table,
        warnings: Vec::new(),
    };
    let mut settings = defaults.clone();

    let (default_x, default_z) = defaults.center();
    let x = reader.float(BORDER, CENTER_X, default_x);
    let z = reader.float(BORDER, CENTER_Z, default_z);
    reader.apply(&mut settings, "border.center", Setting::Center { x, z });

    let initial = reader.float(BORDER, INITIAL_SIZE, defaults.initial_size());
    let final_size = reader.float(BORDER, FINAL_SIZE, defaults.final_size());
    reader.apply(
        &mut settings,
        "border.initial_size/final_size",
        Setting::Size {
            initial,
            final_size,
        },
    );

    let step = reader.float(BORDER, STEP, defaults.step_amount());
    reader.apply(&mut settings, &dotted(BORDER, STEP), Setting::Amount(step));

    let interval = reader.ticks(BORDER, INTERVAL, defaults.interval_ticks());
    reader.apply(&mut settings, &dotted(BORDER, INTERVAL), Setting::Interval(interval));
    let grace = reader.ticks(BORDER, GRACE, defaults.grace_ticks());
    reader.apply(&mut settings, &dotted(BORDER, GRACE), Setting::Grace(grace));

    let broadcast = reader.boolean(Some(MESSAGES), ENABLED, defaults.broadcast_enabled());
    reader.apply(&mut settings, &dotted(MESSAGES, ENABLED), Setting::Broadcast(broadcast));
    // Top-level key, so its name is already fully qualified.
    let teleport = reader.boolean(None, TELEPORT, defaults.teleport_enabled());
    reader.apply(&mut settings, TELEPORT, Setting::Teleport(teleport));

    if let Some(sound) = reader.string(SOUNDS, SHRINK_SOUND) {
        reader.apply(&mut settings, &dotted(SOUNDS, SHRINK_SOUND), Setting::Sound(sound));
    }

    crate::LoadedConfig {
        settings,
        warnings: reader.warnings,
    }
}
