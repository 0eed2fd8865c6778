//! Callbacks from the scheduler to whatever renders progress.
//!
//! The scheduler hands over raw values only. Turning them into chat lines,
//! boss bars, or sounds is the observer's job.

use shrinkborder_types::Position;

use crate::world::OccupantId;

pub trait ShrinkObserver {
    /// A sequence was started; the grace countdown begins.
    fn on_countdown_started(&mut self, _seconds_remaining: u64) {}

    /// Countdown advanced. `fraction` is in `[0, 1]`.
    fn on_progress(&mut self, _fraction: f64, _seconds_remaining: u64) {}

    fn on_shrink_step(&mut self, _new_size: f64, _sound_id: Option<&str>) {}

    fn on_finalized(&mut self) {}

    fn on_occupant_relocated(&mut self, _occupant: OccupantId, _position: Position) {}
}
