//! shrinkborder - console host for the shrink scheduler.
//!
//! # Architecture
//!
//! ```text
//!  stdin ──> CommandDispatcher ──┐
//!                                ├──> SharedScheduler ──> AsyncStateWriter ──> schedule.toml
//!  clock (50ms) ── on_tick() ────┘         │
//!                                          └──> ConsoleObserver ──> stdout
//! ```
//!
//! One clock task ticks the scheduler at 20 TPS. Commands typed on stdin are
//! serialized against it by the scheduler lock. Logs go to a file so they do
//! not interleave with console output.
//!
//! The world is an in-memory [`GridWorld`] seeded with a few occupants; a
//! real host would implement [`shrinkborder_core::World`] over its own state.

mod render;

use anyhow::{Context, Result, bail};
use std::{
    env,
    fs::{self, OpenOptions},
    io::stdout,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use shrinkborder_config::ConfigFile;
use shrinkborder_core::{
    AsyncStateWriter, CommandDispatcher, GridWorld, ScheduleStore, SharedScheduler,
    ShrinkScheduler, World,
};
use shrinkborder_types::{BlockPos, Position, TICKS_PER_SECOND};

use render::{ConsoleObserver, help_text, render_error, render_response};

const TICK_PERIOD: Duration = Duration::from_millis(1000 / TICKS_PER_SECOND);

fn init_tracing(config: &ConfigFile) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file(config);

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: keep the console clean rather than mixing logs into it.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file(config: &ConfigFile) -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates(config) {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates(config: &ConfigFile) -> Vec<PathBuf> {
    vec![
        // Primary: beside the config file
        config.data_dir().join("logs").join("shrinkborder.log"),
        // Fallback: ./.shrinkborder/logs/shrinkborder.log
        PathBuf::from(".shrinkborder")
            .join("logs")
            .join("shrinkborder.log"),
    ]
}

/// `--config <path>` or `--config=<path>`; anything else is an error.
fn config_arg(args: impl IntoIterator<Item = String>) -> Result<Option<PathBuf>> {
    let mut args = args.into_iter();
    let mut config = None;
    while let Some(arg) = args.next() {
        if let Some(path) = arg.strip_prefix("--config=") {
            config = Some(PathBuf::from(path));
        } else if arg == "--config" {
            let path = args.next().context("--config requires a path")?;
            config = Some(PathBuf::from(path));
        } else {
            bail!("unrecognized argument '{arg}' (usage: shrinkborder [--config <path>])");
        }
    }
    Ok(config)
}

fn resolve_config_file() -> Result<ConfigFile> {
    if let Some(path) = config_arg(env::args().skip(1))? {
        return Ok(ConfigFile::new(path));
    }
    Ok(ConfigFile::default_location()
        .unwrap_or_else(|| ConfigFile::new(PathBuf::from(".shrinkborder").join("config.toml"))))
}

/// Flat ground at y=63 with a ridge to the east and a few occupants scattered
/// well outside a typical final size.
fn simulated_world() -> GridWorld {
    let mut world = GridWorld::flat(0, 256, 63);
    for z in -20..=20 {
        for y in 64..=70 {
            world.set_solid(BlockPos::new(120, y, z), true);
        }
    }
    for (x, z) in [(0.5, 0.5), (121.5, 4.5), (-300.0, 250.0), (480.0, -480.0)] {
        world.spawn(Position::new(x, 64.0, z));
    }
    world
}

async fn run_clock<W: World>(scheduler: SharedScheduler<W>) {
    let mut ticks = tokio::time::interval(TICK_PERIOD);
    ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        ticks.tick().await;
        scheduler.tick();
    }
}

fn is_quit(line: &str) -> bool {
    matches!(line.to_ascii_lowercase().as_str(), "q" | "quit" | "exit")
}

/// Execute one line off the runtime: `set` writes the config file with fsyncs.
async fn dispatch<W: World + Send + 'static>(
    dispatcher: &CommandDispatcher<W>,
    line: String,
) -> Result<String> {
    let dispatcher = dispatcher.clone();
    tokio::task::spawn_blocking(move || match dispatcher.execute_line(&line) {
        Ok(response) => render_response(&response),
        Err(err) => render_error(&err),
    })
    .await
    .context("command task failed")
}

/// Read commands until `quit`, Ctrl-C, or (after stdin closes) Ctrl-C.
async fn run_console<W: World + Send + 'static>(
    dispatcher: &CommandDispatcher<W>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    tracing::info!("stdin closed; running until interrupted");
                    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;
                    return Ok(());
                };
                let line = line.trim().trim_start_matches('/');
                if line.is_empty() {
                    continue;
                }
                if is_quit(line) {
                    return Ok(());
                }
                println!("{}", dispatch(dispatcher, line.to_string()).await?);
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl-C")?;
                tracing::info!("Interrupted");
                return Ok(());
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_file = resolve_config_file()?;
    init_tracing(&config_file);

    let settings = config_file.load_or_default();
    let store = ScheduleStore::new(config_file.schedule_path());
    let record = store.load_or_default();
    let (writer, _writer_task) = AsyncStateWriter::spawn(store);

    let scheduler = SharedScheduler::new(ShrinkScheduler::new(
        settings,
        &record,
        simulated_world(),
        Box::new(ConsoleObserver::new(stdout())),
        Box::new(writer.clone()),
    ));
    let dispatcher = CommandDispatcher::new(scheduler.clone(), Arc::new(config_file.clone()));

    println!("shrinkborder: config at {}", config_file.path().display());
    println!("{}", help_text());
    println!("{}", render_response(&shrinkborder_core::Response::Status(scheduler.status())));

    let clock = tokio::spawn(run_clock(scheduler.clone()));
    let console_result = run_console(&dispatcher).await;

    clock.abort();
    let _ = clock.await;
    scheduler.lock().flush();
    if let Err(e) = writer.flush().await {
        eprintln!("Failed to save schedule state: {e}");
    }

    console_result
}
