//! Shared handle serializing the tick path against command handlers.

use std::sync::{Arc, Mutex, MutexGuard};

use shrinkborder_types::ScheduleStatus;

use crate::scheduler::{ShrinkScheduler, TickOutcome};
use crate::world::World;

/// Cloneable handle to one [`ShrinkScheduler`].
///
/// The clock task and the command handler each hold a clone; every call takes
/// the lock for its whole duration, so a command never observes a half-applied
/// tick and a tick never sees a half-applied command.
pub struct SharedScheduler<W> {
    inner: Arc<Mutex<ShrinkScheduler<W>>>,
}

impl<W> Clone for SharedScheduler<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W: World> SharedScheduler<W> {
    #[must_use]
    pub fn new(scheduler: ShrinkScheduler<W>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(scheduler)),
        }
    }

    /// Lock the scheduler. A panic in an earlier holder does not wedge the
    /// clock: the state is still structurally valid, so the guard is recovered.
    pub fn lock(&self) -> MutexGuard<'_, ShrinkScheduler<W>> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn tick(&self) -> TickOutcome {
        self.lock().on_tick()
    }

    #[must_use]
    pub fn status(&self) -> ScheduleStatus {
        self.lock().status()
    }
}
