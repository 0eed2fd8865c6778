//! The shrink scheduler: a tick-driven state machine.
//!
//! ```text
//!            start                 countdown hits 0         size <= final
//! Stopped ---------> Waiting(grace) ----------------> Shrinking ------------> Finalized
//!    ^                  |    ^                           |    ^
//!    |            pause |    | resume              pause |    | resume
//!    |                  v    |                           v    |
//!    +---- stop ------ Paused (countdown frozen) ------- Paused
//! ```
//!
//! `stop()` returns to Stopped from anywhere. Finalized keeps `shrinking`
//! set, so leaving it takes `stop()` then `start()`.
//!
//! There is no internal timer: an external fixed-period clock calls
//! [`ShrinkScheduler::on_tick`]. Every transition that changes schedule state
//! is handed to the [`StateSink`] immediately; plain countdown ticks are
//! batched to once every [`SAVE_EVERY_TICKS`].

use shrinkborder_types::{
    BorderSettings, Phase, ScheduleRecord, ScheduleState, ScheduleStatus, Setting, SettingsError,
    ticks_to_seconds,
};

use crate::boundary::Boundary;
use crate::containment::contain_occupants;
use crate::observer::ShrinkObserver;
use crate::persistence::StateSink;
use crate::world::World;

/// Countdown ticks between routine saves (one second at 20 TPS).
///
/// A crash loses at most this many decrements, so a restart over-counts by
/// less than one interval and never shrinks early.
pub const SAVE_EVERY_TICKS: u64 = 20;

/// Whether the ticking loop is live. Separate from [`ScheduleState`]: a
/// finalized sequence is still "shrinking" but never ticks again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Loop {
    Idle,
    Armed,
    Finalized,
}

/// What one call to [`ShrinkScheduler::on_tick`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Not running; nothing happened.
    Idle,
    CountedDown { remaining: u64 },
    Shrunk { new_size: f64, relocated: usize },
    Finalized { size: f64 },
}

pub struct ShrinkScheduler<W> {
    settings: BorderSettings,
    state: ScheduleState,
    boundary: Boundary,
    world: W,
    observer: Box<dyn ShrinkObserver + Send>,
    sink: Box<dyn StateSink + Send>,
    ticking: Loop,
    in_grace: bool,
    ticks_since_save: u64,
}

impl<W: World> ShrinkScheduler<W> {
    /// Restore from a persisted record.
    ///
    /// The boundary is centered from `settings` and sized from the record's
    /// `boundary_size`, falling back to `initial_size`. If the record says
    /// shrinking and not paused, the loop is armed straight away.
    pub fn new(
        settings: BorderSettings,
        record: &ScheduleRecord,
        world: W,
        observer: Box<dyn ShrinkObserver + Send>,
        sink: Box<dyn StateSink + Send>,
    ) -> Self {
        let state = ScheduleState::from_record(record, settings.interval_ticks());

        let restored = record
            .boundary_size
            .and_then(|size| Boundary::new(settings.center(), size).ok());
        let boundary = match restored {
            Some(boundary) => boundary,
            None => {
                if let Some(size) = record.boundary_size {
                    tracing::warn!(size, "Ignoring invalid persisted boundary size");
                }
                initial_boundary(&settings)
            }
        };

        let ticking = if state.is_running() {
            tracing::info!(
                ticks = state.ticks_until_next_shrink(),
                size = boundary.size(),
                "Resuming shrink sequence from saved state"
            );
            Loop::Armed
        } else {
            Loop::Idle
        };
        let in_grace = state.is_shrinking() && boundary.size() >= settings.initial_size();

        Self {
            settings,
            state,
            boundary,
            world,
            observer,
            sink,
            ticking,
            in_grace,
            ticks_since_save: 0,
        }
    }

    /// Begin a sequence with the grace period on the clock.
    ///
    /// No-op while already shrinking. The boundary keeps its current size.
    pub fn start(&mut self) -> bool {
        let grace = self.settings.grace_ticks();
        if !self.state.begin(grace) {
            return false;
        }
        self.ticking = Loop::Armed;
        self.in_grace = true;
        tracing::info!(grace_ticks = grace, size = self.boundary.size(), "Shrink sequence started");
        self.observer.on_countdown_started(ticks_to_seconds(grace));
        self.persist();
        true
    }

    /// Freeze the countdown. No-op unless shrinking.
    pub fn pause(&mut self) -> bool {
        if !self.state.pause() {
            return false;
        }
        tracing::info!(
            ticks = self.state.ticks_until_next_shrink(),
            "Shrink sequence paused"
        );
        self.persist();
        true
    }

    /// Continue from the exact countdown value. No-op unless paused.
    pub fn resume(&mut self) -> bool {
        if !self.state.resume() {
            return false;
        }
        if self.ticking != Loop::Finalized {
            self.ticking = Loop::Armed;
        }
        tracing::info!(
            ticks = self.state.ticks_until_next_shrink(),
            "Shrink sequence resumed"
        );
        self.persist();
        true
    }

    /// End the sequence. The boundary keeps its current size.
    pub fn stop(&mut self) -> bool {
        if !self.state.stop() {
            return false;
        }
        self.ticking = Loop::Idle;
        self.in_grace = false;
        tracing::info!(size = self.boundary.size(), "Shrink sequence stopped");
        self.persist();
        true
    }

    #[must_use]
    pub fn status(&self) -> ScheduleStatus {
        let phase = if !self.state.is_shrinking() {
            Phase::Stopped
        } else if self.state.is_paused() {
            Phase::Paused
        } else if self.ticking == Loop::Finalized {
            Phase::Finalized
        } else if self.in_grace {
            Phase::Waiting
        } else {
            Phase::Shrinking
        };
        ScheduleStatus {
            shrinking: self.state.is_shrinking(),
            paused: self.state.is_paused(),
            ticks_until_next_shrink: self.state.ticks_until_next_shrink(),
            phase,
            boundary_size: self.boundary.size(),
        }
    }

    /// Advance one clock tick.
    pub fn on_tick(&mut self) -> TickOutcome {
        if self.ticking != Loop::Armed {
            return TickOutcome::Idle;
        }
        if !self.state.is_running() {
            // Paused or stopped since the last tick.
            self.ticking = Loop::Idle;
            return TickOutcome::Idle;
        }

        if self.state.ticks_until_next_shrink() > 0 {
            let remaining = self.state.count_down();
            self.observer
                .on_progress(self.progress(remaining), ticks_to_seconds(remaining));
            self.ticks_since_save += 1;
            if self.ticks_since_save >= SAVE_EVERY_TICKS {
                self.persist();
            }
            return TickOutcome::CountedDown { remaining };
        }

        let current = self.boundary.size();
        let final_size = self.settings.final_size();
        if current <= final_size {
            self.resize(final_size);
            self.ticking = Loop::Finalized;
            self.in_grace = false;
            tracing::info!(size = final_size, "Boundary reached final size");
            self.observer.on_finalized();
            self.persist();
            return TickOutcome::Finalized { size: final_size };
        }

        let new_size = final_size.max(current - self.settings.step_amount());
        self.resize(new_size);
        self.in_grace = false;
        tracing::info!(from = current, to = new_size, "Boundary shrank");

        if self.settings.broadcast_enabled() {
            self.observer
                .on_shrink_step(new_size, self.settings.shrink_sound());
        }
        let relocated = if self.settings.teleport_enabled() {
            contain_occupants(&mut self.world, &self.boundary, self.observer.as_mut()).len()
        } else {
            0
        };

        self.state.reset_countdown(self.settings.interval_ticks());
        self.persist();
        TickOutcome::Shrunk {
            new_size,
            relocated,
        }
    }

    /// Apply a validated setting. `center` also moves the live boundary.
    pub fn apply_setting(&mut self, setting: Setting) -> Result<(), SettingsError> {
        let center = match setting {
            Setting::Center { x, z } => Some((x, z)),
            _ => None,
        };
        let name = setting.name();
        self.settings.apply(setting)?;
        if let Some((x, z)) = center
            && let Err(err) = self.boundary.set_center(x, z)
        {
            tracing::warn!("Boundary center not moved: {err}");
        }
        tracing::info!(setting = name, "Setting updated");
        Ok(())
    }

    /// Hand the current state to the sink now, e.g. at shutdown.
    pub fn flush(&mut self) {
        self.persist();
    }

    #[must_use]
    pub fn settings(&self) -> &BorderSettings {
        &self.settings
    }

    #[must_use]
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    #[must_use]
    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    #[must_use]
    pub fn record(&self) -> ScheduleRecord {
        self.state.to_record(Some(self.boundary.size()))
    }

    fn progress(&self, remaining: u64) -> f64 {
        let interval = self.settings.interval_ticks();
        if interval == 0 {
            return 0.0;
        }
        (remaining as f64 / interval as f64).clamp(0.0, 1.0)
    }

    fn resize(&mut self, size: f64) {
        if let Err(err) = self.boundary.set_size(size) {
            tracing::warn!("Boundary not resized: {err}");
        }
    }

    fn persist(&mut self) {
        self.ticks_since_save = 0;
        if let Err(err) = self.sink.save(self.record()) {
            tracing::warn!("Failed to persist schedule state: {err}");
        }
    }
}

fn initial_boundary(settings: &BorderSettings) -> Boundary {
    Boundary::new(settings.center(), settings.initial_size()).unwrap_or_else(|err| {
        tracing::warn!("Invalid configured boundary: {err}");
        Boundary::default()
    })
}
