//! Shrink schedule state and its persisted form.

use serde::{Deserialize, Serialize};

use crate::ticks_to_seconds;

/// Mutable schedule state.
///
/// Invariant: `paused` implies `shrinking`. The only way to set `paused` is
/// [`pause`](Self::pause), which refuses while stopped, and [`stop`](Self::stop)
/// clears both flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleState {
    shrinking: bool,
    paused: bool,
    ticks_until_next_shrink: u64,
}

impl ScheduleState {
    /// A stopped schedule with the given countdown.
    #[must_use]
    pub const fn stopped(ticks_until_next_shrink: u64) -> Self {
        Self {
            shrinking: false,
            paused: false,
            ticks_until_next_shrink,
        }
    }

    /// Restore from a persisted record, repairing a `paused` flag without `shrinking`.
    #[must_use]
    pub fn from_record(record: &ScheduleRecord, default_ticks: u64) -> Self {
        Self {
            shrinking: record.shrinking,
            paused: record.shrinking && record.paused,
            ticks_until_next_shrink: record.ticks_until_next_shrink.unwrap_or(default_ticks),
        }
    }

    #[must_use]
    pub const fn is_shrinking(&self) -> bool {
        self.shrinking
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub const fn ticks_until_next_shrink(&self) -> u64 {
        self.ticks_until_next_shrink
    }

    /// Whether tick effects apply.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.shrinking && !self.paused
    }

    /// Enter a new sequence with `grace_ticks` on the clock.
    ///
    /// Returns `false` (and changes nothing) if a sequence is already active.
    pub fn begin(&mut self, grace_ticks: u64) -> bool {
        if self.shrinking {
            return false;
        }
        self.shrinking = true;
        self.paused = false;
        self.ticks_until_next_shrink = grace_ticks;
        true
    }

    /// Returns `true` if the state changed.
    pub fn pause(&mut self) -> bool {
        if !self.shrinking || self.paused {
            return false;
        }
        self.paused = true;
        true
    }

    /// Returns `true` if the state changed.
    pub fn resume(&mut self) -> bool {
        if !self.shrinking || !self.paused {
            return false;
        }
        self.paused = false;
        true
    }

    /// Returns `true` if the state changed.
    pub fn stop(&mut self) -> bool {
        if !self.shrinking && !self.paused {
            return false;
        }
        self.shrinking = false;
        self.paused = false;
        true
    }

    /// Count down one tick, saturating at zero. Returns the new countdown.
    pub fn count_down(&mut self) -> u64 {
        self.ticks_until_next_shrink = self.ticks_until_next_shrink.saturating_sub(1);
        self.ticks_until_next_shrink
    }

    pub fn reset_countdown(&mut self, ticks: u64) {
        self.ticks_until_next_shrink = ticks;
    }

    #[must_use]
    pub fn to_record(&self, boundary_size: Option<f64>) -> ScheduleRecord {
        ScheduleRecord {
            shrinking: self.shrinking,
            paused: self.paused,
            ticks_until_next_shrink: Some(self.ticks_until_next_shrink),
            boundary_size,
        }
    }
}

/// On-disk schedule record.
///
/// `ticks_until_next_shrink` is optional so that a record written by hand (or
/// by an older build) falls back to the configured interval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    #[serde(default)]
    pub shrinking: bool,
    #[serde(default)]
    pub paused: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticks_until_next_shrink: Option<u64>,
    /// Live boundary size when the record was written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary_size: Option<f64>,
}

/// Coarse lifecycle position of the scheduler, derived for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Stopped,
    /// Counting down the grace period before the first step.
    Waiting,
    Shrinking,
    Paused,
    /// The final size has been reached; no further steps until restarted.
    Finalized,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Waiting => "waiting",
            Self::Shrinking => "shrinking",
            Self::Paused => "paused",
            Self::Finalized => "finalized",
        }
    }
}

/// Snapshot returned by `status()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleStatus {
    pub shrinking: bool,
    pub paused: bool,
    pub ticks_until_next_shrink: u64,
    pub phase: Phase,
    pub boundary_size: f64,
}

impl ScheduleStatus {
    /// `(isShrinking, isPaused, ticksUntilNextShrink)`.
    #[must_use]
    pub const fn as_tuple(&self) -> (bool, bool, u64) {
        (self.shrinking, self.paused, self.ticks_until_next_shrink)
    }

    #[must_use]
    pub const fn seconds_remaining(&self) -> u64 {
        ticks_to_seconds(self.ticks_until_next_shrink)
    }
}
