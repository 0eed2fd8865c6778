//! Restart safety: state written during a run is what the next run resumes from.

use std::fs;
use std::sync::Arc;

use shrinkborder_config::ConfigFile;
use shrinkborder_core::{
    AsyncStateWriter, CommandDispatcher, GridWorld, SAVE_EVERY_TICKS, ScheduleStore,
    SharedScheduler, ShrinkScheduler, TickOutcome,
};
use shrinkborder_types::{Phase, ScheduleRecord};
use tempfile::tempdir;

use crate::common::{MemorySink, RecordingObserver, flat_world, settings};

fn durable(store: &ScheduleStore, record: &ScheduleRecord) -> ShrinkScheduler<GridWorld> {
    ShrinkScheduler::new(
        settings(1000.0, 200.0, 50.0, 100, 200),
        record,
        flat_world(),
        Box::new(RecordingObserver::default()),
        Box::new(store.clone()),
    )
}

#[test]
fn crash_mid_countdown_resumes_without_shrinking_early() {
    let dir = tempdir().unwrap();
    let store = ScheduleStore::new(dir.path().join("schedule.toml"));

    let mut first = durable(&store, &ScheduleRecord::default());
    first.start();
    for _ in 0..(200 + 1 + 57) {
        first.on_tick();
    }
    assert_eq!(first.boundary().size(), 950.0);
    let actual_remaining = first.status().ticks_until_next_shrink;
    // Simulated crash: no flush.
    drop(first);

    let record = store.load().unwrap().expect("record written");
    let second = durable(&store, &record);
    let restored = second.status();

    assert_eq!(restored.phase, Phase::Shrinking);
    assert_eq!(restored.boundary_size, 950.0);
    assert!(restored.ticks_until_next_shrink >= actual_remaining);
    assert!(restored.ticks_until_next_shrink - actual_remaining < SAVE_EVERY_TICKS);
}

#[test]
fn restored_sequence_keeps_ticking() {
    let dir = tempdir().unwrap();
    let store = ScheduleStore::new(dir.path().join("schedule.toml"));

    let mut first = durable(&store, &ScheduleRecord::default());
    first.start();
    for _ in 0..201 {
        first.on_tick();
    }
    drop(first);

    let record = store.load_or_default();
    let mut second = durable(&store, &record);
    let mut shrunk = false;
    for _ in 0..=100 {
        if matches!(second.on_tick(), TickOutcome::Shrunk { new_size, .. } if new_size == 900.0) {
            shrunk = true;
        }
    }
    assert!(shrunk);
}

#[test]
fn paused_state_survives_restart_and_waits_for_resume() {
    let dir = tempdir().unwrap();
    let store = ScheduleStore::new(dir.path().join("schedule.toml"));

    let mut first = durable(&store, &ScheduleRecord::default());
    first.start();
    for _ in 0..45 {
        first.on_tick();
    }
    first.pause();
    drop(first);

    let mut second = durable(&store, &store.load_or_default());
    assert_eq!(second.status().as_tuple(), (true, true, 155));
    assert_eq!(second.on_tick(), TickOutcome::Idle);

    second.resume();
    second.on_tick();
    assert_eq!(second.status().ticks_until_next_shrink, 154);
}

#[test]
fn stopped_state_stays_stopped_after_restart() {
    let dir = tempdir().unwrap();
    let store = ScheduleStore::new(dir.path().join("schedule.toml"));

    let mut first = durable(&store, &ScheduleRecord::default());
    first.start();
    first.stop();
    drop(first);

    let mut second = durable(&store, &store.load_or_default());
    assert_eq!(second.status().phase, Phase::Stopped);
    assert_eq!(second.on_tick(), TickOutcome::Idle);
}

#[test]
fn hand_written_record_without_countdown_uses_interval() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("schedule.toml");
    fs::write(&path, "shrinking = true\npaused = true\n").unwrap();
    let store = ScheduleStore::new(&path);

    let scheduler = durable(&store, &store.load_or_default());

    assert_eq!(scheduler.status().as_tuple(), (true, true, 100));
    assert_eq!(scheduler.boundary().size(), 1000.0);
}

#[test]
fn corrupt_record_starts_fresh() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("schedule.toml");
    fs::write(&path, "\u{0}\u{0}garbage").unwrap();
    let store = ScheduleStore::new(&path);

    let scheduler = durable(&store, &store.load_or_default());

    assert_eq!(scheduler.status().phase, Phase::Stopped);
}

#[tokio::test]
async fn async_writer_persists_final_state_on_flush() {
    let dir = tempdir().unwrap();
    let store = ScheduleStore::new(dir.path().join("schedule.toml"));
    let (writer, _task) = AsyncStateWriter::spawn(store.clone());

    let mut scheduler = ShrinkScheduler::new(
        settings(1000.0, 200.0, 50.0, 100, 200),
        &ScheduleRecord::default(),
        flat_world(),
        Box::new(RecordingObserver::default()),
        Box::new(writer.clone()),
    );
    scheduler.start();
    for _ in 0..333 {
        scheduler.on_tick();
    }
    scheduler.flush();
    writer.flush().await.unwrap();

    let record = store.load().unwrap().unwrap();
    assert_eq!(record, scheduler.record());
    assert_eq!(record.boundary_size, Some(900.0));
}

#[test]
fn settings_written_by_set_are_loaded_next_run() {
    let dir = tempdir().unwrap();
    let config = ConfigFile::new(dir.path().join("config.toml"));
    fs::write(
        config.path(),
        "# operator notes\n[border]\ninitial_size = 600.0 # keep\n",
    )
    .unwrap();

    let scheduler = SharedScheduler::new(ShrinkScheduler::new(
        config.load_or_default(),
        &ScheduleRecord::default(),
        flat_world(),
        Box::new(RecordingObserver::default()),
        Box::new(MemorySink::default()),
    ));
    let dispatcher = CommandDispatcher::new(scheduler, Arc::new(config.clone()));
    dispatcher.execute_line("set interval 40").unwrap();
    dispatcher.execute_line("set sound none").unwrap();

    let reloaded = config.load().unwrap();
    assert!(reloaded.warnings.is_empty());
    assert_eq!(reloaded.settings.interval_ticks(), 40);
    assert_eq!(reloaded.settings.initial_size(), 600.0);
    assert_eq!(reloaded.settings.shrink_sound(), None);
    assert!(fs::read_to_string(config.path()).unwrap().contains("# operator notes"));
}
