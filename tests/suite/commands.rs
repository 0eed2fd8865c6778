//! The command surface against a shared scheduler and a real config file.

use std::sync::Arc;
use std::thread;

use shrinkborder_config::ConfigFile;
use shrinkborder_core::{
    CommandDispatcher, CommandError, GridWorld, Response, SharedScheduler, ShrinkScheduler,
};
use shrinkborder_types::{Phase, ScheduleRecord, SettingsError};
use tempfile::tempdir;

use crate::common::{MemorySink, RecordingObserver, flat_world, settings};

fn setup(config: &ConfigFile) -> (CommandDispatcher<GridWorld>, SharedScheduler<GridWorld>) {
    let shared = SharedScheduler::new(ShrinkScheduler::new(
        settings(1000.0, 200.0, 50.0, 100, 200),
        &ScheduleRecord::default(),
        flat_world(),
        Box::new(RecordingObserver::default()),
        Box::new(MemorySink::default()),
    ));
    let dispatcher = CommandDispatcher::new(shared.clone(), Arc::new(config.clone()));
    (dispatcher, shared)
}

#[test]
fn every_set_option_is_written_to_config() {
    let dir = tempdir().unwrap();
    let config = ConfigFile::new(dir.path().join("nested").join("config.toml"));
    let (dispatcher, _) = setup(&config);

    for line in [
        "set center 12.5 -40",
        "set size 800 150",
        "set interval 300",
        "set amount 25",
        "set grace 60",
        "set broadcast false",
        "set teleport off",
        "set sound block.bell.use",
    ] {
        let response = dispatcher.execute_line(line).unwrap();
        assert!(
            matches!(response, Response::Updated { persisted: true, .. }),
            "{line}: {response:?}"
        );
    }

    let loaded = config.load().unwrap();
    assert!(loaded.warnings.is_empty(), "{:?}", loaded.warnings);
    let s = loaded.settings;
    assert_eq!(s.center(), (12.5, -40.0));
    assert_eq!((s.initial_size(), s.final_size()), (800.0, 150.0));
    assert_eq!(s.interval_ticks(), 300);
    assert_eq!(s.step_amount(), 25.0);
    assert_eq!(s.grace_ticks(), 60);
    assert!(!s.broadcast_enabled());
    assert!(!s.teleport_enabled());
    assert_eq!(s.shrink_sound(), Some("block.bell.use"));
}

#[test]
fn rejected_set_leaves_memory_and_disk_untouched() {
    let dir = tempdir().unwrap();
    let config = ConfigFile::new(dir.path().join("config.toml"));
    let (dispatcher, shared) = setup(&config);

    assert_eq!(
        dispatcher.execute_line("set amount -3"),
        Err(CommandError::Rejected(SettingsError::StepNotPositive(-3.0)))
    );
    assert!(matches!(
        dispatcher.execute_line("set grace ten"),
        Err(CommandError::InvalidNumber(_))
    ));

    assert_eq!(shared.lock().settings().step_amount(), 50.0);
    assert!(!config.path().exists());
}

#[test]
fn status_command_reports_tuple_and_phase() {
    let dir = tempdir().unwrap();
    let (dispatcher, shared) = setup(&ConfigFile::new(dir.path().join("config.toml")));

    dispatcher.execute_line("start").unwrap();
    for _ in 0..30 {
        shared.tick();
    }
    dispatcher.execute_line("pause").unwrap();

    let Ok(Response::Status(status)) = dispatcher.execute_line("status") else {
        panic!("expected status");
    };
    assert_eq!(status.as_tuple(), (true, true, 170));
    assert_eq!(status.phase, Phase::Paused);
    assert_eq!(status.seconds_remaining(), 8);
}

/// Commands racing a ticking clock never observe `paused` without `shrinking`,
/// and the boundary never grows.
#[test]
fn commands_interleave_safely_with_ticks() {
    let dir = tempdir().unwrap();
    let config = ConfigFile::new(dir.path().join("config.toml"));
    let (dispatcher, shared) = setup(&config);
    dispatcher.execute_line("set interval 0").unwrap();
    dispatcher.execute_line("set grace 0").unwrap();

    let clock = {
        let shared = shared.clone();
        thread::spawn(move || {
            for _ in 0..2_000 {
                shared.tick();
            }
        })
    };

    let mut last_size = f64::INFINITY;
    for round in 0..400 {
        let line = ["start", "pause", "resume", "status", "stop"][round % 5];
        dispatcher.execute_line(line).unwrap();
        let status = shared.status();
        assert!(!status.paused || status.shrinking);
        assert!(status.boundary_size <= last_size);
        last_size = status.boundary_size;
    }
    clock.join().unwrap();

    let status = shared.status();
    assert!((200.0..=1000.0).contains(&status.boundary_size));
}
