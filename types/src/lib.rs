//! Core domain types for the shrinking border.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

mod geometry;
mod schedule;
mod settings;

pub use geometry::{BlockPos, Position, block_coord};
pub use schedule::{Phase, ScheduleRecord, ScheduleState, ScheduleStatus};
pub use settings::{BorderSettings, Setting, SettingsError};

/// Simulation ticks per wall-clock second.
pub const TICKS_PER_SECOND: u64 = 20;

/// Convert a tick count into whole seconds, rounding down.
#[must_use]
pub const fn ticks_to_seconds(ticks: u64) -> u64 {
    ticks / TICKS_PER_SECOND
}
