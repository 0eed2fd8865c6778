//! Shared test utilities and fixtures
//!
//! Schedulers here are driven by calling `on_tick()` directly, so every test is
//! deterministic and independent of wall-clock time.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use shrinkborder_core::{
    GridWorld, OccupantId, PersistError, ShrinkObserver, ShrinkScheduler, StateSink, TickOutcome,
};
use shrinkborder_types::{BorderSettings, Position, ScheduleRecord, Setting};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    CountdownStarted(u64),
    Progress(f64, u64),
    Step(f64, Option<String>),
    Finalized,
    Relocated(OccupantId, Position),
}

/// Observer that records every callback; clones share one log.
#[derive(Clone, Default)]
pub struct RecordingObserver(Arc<Mutex<Vec<Event>>>);

impl RecordingObserver {
    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Event) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|e| matches(e)).count()
    }

    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }
}

impl ShrinkObserver for RecordingObserver {
    fn on_countdown_started(&mut self, seconds_remaining: u64) {
        self.push(Event::CountdownStarted(seconds_remaining));
    }

    fn on_progress(&mut self, fraction: f64, seconds_remaining: u64) {
        self.push(Event::Progress(fraction, seconds_remaining));
    }

    fn on_shrink_step(&mut self, new_size: f64, sound_id: Option<&str>) {
        self.push(Event::Step(new_size, sound_id.map(str::to_string)));
    }

    fn on_finalized(&mut self) {
        self.push(Event::Finalized);
    }

    fn on_occupant_relocated(&mut self, occupant: OccupantId, position: Position) {
        self.push(Event::Relocated(occupant, position));
    }
}

/// In-memory state sink; clones share one history.
#[derive(Clone, Default)]
pub struct MemorySink(Arc<Mutex<Vec<ScheduleRecord>>>);

impl MemorySink {
    pub fn last(&self) -> Option<ScheduleRecord> {
        self.0.lock().unwrap().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

impl StateSink for MemorySink {
    fn save(&mut self, record: ScheduleRecord) -> Result<(), PersistError> {
        self.0.lock().unwrap().push(record);
        Ok(())
    }
}

pub fn settings(initial: f64, final_size: f64, step: f64, interval: u64, grace: u64) -> BorderSettings {
    BorderSettings::default()
        .with(Setting::Size {
            initial,
            final_size,
        })
        .and_then(|s| s.with(Setting::Amount(step)))
        .and_then(|s| s.with(Setting::Interval(interval)))
        .and_then(|s| s.with(Setting::Grace(grace)))
        .expect("test settings are valid")
}

pub struct Harness {
    pub scheduler: ShrinkScheduler<GridWorld>,
    pub observer: RecordingObserver,
    pub sink: MemorySink,
}

impl Harness {
    pub fn new(settings: BorderSettings, world: GridWorld) -> Self {
        Self::restored(settings, &ScheduleRecord::default(), world)
    }

    pub fn restored(settings: BorderSettings, record: &ScheduleRecord, world: GridWorld) -> Self {
        let observer = RecordingObserver::default();
        let sink = MemorySink::default();
        let scheduler = ShrinkScheduler::new(
            settings,
            record,
            world,
            Box::new(observer.clone()),
            Box::new(sink.clone()),
        );
        Self {
            scheduler,
            observer,
            sink,
        }
    }

    pub fn advance(&mut self, ticks: usize) -> Vec<TickOutcome> {
        (0..ticks).map(|_| self.scheduler.on_tick()).collect()
    }

    pub fn size(&self) -> f64 {
        self.scheduler.boundary().size()
    }

    pub fn remaining(&self) -> u64 {
        self.scheduler.status().ticks_until_next_shrink
    }
}

pub fn flat_world() -> GridWorld {
    GridWorld::flat(0, 256, 63)
}
