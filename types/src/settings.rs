//! Resolved border configuration.
//!
//! Raw TOML lives in `shrinkborder-config`; the loader resolves it into
//! [`BorderSettings`] at the parse boundary. Every mutation after that goes
//! through [`Setting`], so a `BorderSettings` value is always valid:
//! `step_amount > 0`, `0 <= final_size <= initial_size`, finite floats.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("{field} must not be negative (got {value})")]
    NegativeSize { field: &'static str, value: f64 },
    #[error("final size {final_size} exceeds initial size {initial}")]
    FinalExceedsInitial { initial: f64, final_size: f64 },
    #[error("shrink amount must be greater than zero (got {0})")]
    StepNotPositive(f64),
}

/// One validated change to [`BorderSettings`].
#[derive(Debug, Clone, PartialEq)]
pub enum Setting {
    Center { x: f64, z: f64 },
    Size { initial: f64, final_size: f64 },
    Interval(u64),
    Amount(f64),
    Grace(u64),
    Broadcast(bool),
    Teleport(bool),
    /// `None` (or an empty id) disables the shrink sound.
    Sound(Option<String>),
}

impl Setting {
    /// Command keyword for this setting.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Center { .. } => "center",
            Self::Size { .. } => "size",
            Self::Interval(_) => "interval",
            Self::Amount(_) => "amount",
            Self::Grace(_) => "grace",
            Self::Broadcast(_) => "broadcast",
            Self::Teleport(_) => "teleport",
            Self::Sound(_) => "sound",
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        match *self {
            Self::Center { x, z } => {
                finite("center_x", x)?;
                finite("center_z", z)
            }
            Self::Size {
                initial,
                final_size,
            } => {
                finite("initial_size", initial)?;
                finite("final_size", final_size)?;
                if final_size < 0.0 {
                    return Err(SettingsError::NegativeSize {
                        field: "final_size",
                        value: final_size,
                    });
                }
                if final_size > initial {
                    return Err(SettingsError::FinalExceedsInitial {
                        initial,
                        final_size,
                    });
                }
                Ok(())
            }
            Self::Amount(step) => {
                finite("shrink_amount_per_step", step)?;
                if step <= 0.0 {
                    return Err(SettingsError::StepNotPositive(step));
                }
                Ok(())
            }
            Self::Interval(_)
            | Self::Grace(_)
            | Self::Broadcast(_)
            | Self::Teleport(_)
            | Self::Sound(_) => Ok(()),
        }
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), SettingsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::NonFinite { field })
    }
}

/// Validated, immutable-between-`set` border parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderSettings {
    center_x: f64,
    center_z: f64,
    initial_size: f64,
    final_size: f64,
    step_amount: f64,
    interval_ticks: u64,
    grace_ticks: u64,
    broadcast_enabled: bool,
    teleport_enabled: bool,
    shrink_sound: Option<String>,
}

impl Default for BorderSettings {
    fn default() -> Self {
        Self {
            center_x: 0.0,
            center_z: 0.0,
            initial_size: 1000.0,
            final_size: 100.0,
            step_amount: 50.0,
            interval_ticks: 1200,
            grace_ticks: 6000,
            broadcast_enabled: true,
            teleport_enabled: true,
            shrink_sound: Some("entity.ender_dragon.growl".to_string()),
        }
    }
}

impl BorderSettings {
    /// Apply a setting, leaving `self` untouched if it is rejected.
    pub fn apply(&mut self, setting: Setting) -> Result<(), SettingsError> {
        setting.validate()?;
        match setting {
            Setting::Center { x, z } => {
                self.center_x = x;
                self.center_z = z;
            }
            Setting::Size {
                initial,
                final_size,
            } => {
                self.initial_size = initial;
                self.final_size = final_size;
            }
            Setting::Interval(ticks) => self.interval_ticks = ticks,
            Setting::Amount(step) => self.step_amount = step,
            Setting::Grace(ticks) => self.grace_ticks = ticks,
            Setting::Broadcast(enabled) => self.broadcast_enabled = enabled,
            Setting::Teleport(enabled) => self.teleport_enabled = enabled,
            Setting::Sound(sound) => {
                self.shrink_sound = sound.filter(|id| !id.trim().is_empty());
            }
        }
        Ok(())
    }

    /// Builder-style [`apply`](Self::apply).
    pub fn with(mut self, setting: Setting) -> Result<Self, SettingsError> {
        self.apply(setting)?;
        Ok(self)
    }

    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.center_x, self.center_z)
    }

    #[must_use]
    pub fn initial_size(&self) -> f64 {
        self.initial_size
    }

    #[must_use]
    pub fn final_size(&self) -> f64 {
        self.final_size
    }

    #[must_use]
    pub fn step_amount(&self) -> f64 {
        self.step_amount
    }

    #[must_use]
    pub fn interval_ticks(&self) -> u64 {
        self.interval_ticks
    }

    #[must_use]
    pub fn grace_ticks(&self) -> u64 {
        self.grace_ticks
    }

    #[must_use]
    pub fn broadcast_enabled(&self) -> bool {
        self.broadcast_enabled
    }

    #[must_use]
    pub fn teleport_enabled(&self) -> bool {
        self.teleport_enabled
    }

    #[must_use]
    pub fn shrink_sound(&self) -> Option<&str> {
        self.shrink_sound.as_deref()
    }
}
