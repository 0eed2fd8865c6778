//! Console rendering of scheduler events and command responses.

use std::fmt::Write as _;
use std::io::Write;

use shrinkborder_core::{CommandError, OccupantId, Response, ShrinkObserver, command_specs};
use shrinkborder_types::{Position, ScheduleStatus, ticks_to_seconds};

/// `m:ss`, minutes unbounded.
#[must_use]
pub fn format_countdown(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Text progress bar, `width` cells wide.
fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Renders scheduler callbacks as console lines.
///
/// Progress arrives every tick; only whole-second changes at a few
/// announcement points are printed, so the console stays readable.
pub struct ConsoleObserver<Out> {
    out: Out,
    last_announced: Option<u64>,
}

impl<Out: Write> ConsoleObserver<Out> {
    pub fn new(out: Out) -> Self {
        Self {
            out,
            last_announced: None,
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> Out {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{text}") {
            tracing::debug!("Console write failed: {err}");
        }
    }
}

fn is_announcement_point(seconds: u64) -> bool {
    seconds % 60 == 0 || seconds == 30 || seconds == 10 || seconds <= 5
}

impl<Out: Write> ShrinkObserver for ConsoleObserver<Out> {
    fn on_countdown_started(&mut self, seconds_remaining: u64) {
        self.last_announced = Some(seconds_remaining);
        self.line(&format!(
            "Shrinking will begin in {}",
            format_countdown(seconds_remaining)
        ));
    }

    fn on_progress(&mut self, fraction: f64, seconds_remaining: u64) {
        if self.last_announced == Some(seconds_remaining) || !is_announcement_point(seconds_remaining)
        {
            return;
        }
        self.last_announced = Some(seconds_remaining);
        self.line(&format!(
            "{} Border shrinking in {}",
            progress_bar(fraction, 10),
            format_countdown(seconds_remaining)
        ));
    }

    fn on_shrink_step(&mut self, new_size: f64, sound_id: Option<&str>) {
        self.last_announced = None;
        self.line(&format!(
            "The world border is shrinking! New size: {} blocks.",
            new_size as i64
        ));
        if let Some(sound) = sound_id {
            self.line(&format!("(sound: {sound})"));
        }
    }

    fn on_finalized(&mut self) {
        self.line("The world border has reached its final size.");
    }

    fn on_occupant_relocated(&mut self, occupant: OccupantId, position: Position) {
        self.line(&format!(
            "Occupant {occupant} was outside the border and was moved to ({:.1}, {:.1}, {:.1}).",
            position.x, position.y, position.z
        ));
    }
}

#[must_use]
pub fn render_status(status: &ScheduleStatus) -> String {
    format!(
        "Shrinking: {}, Paused: {}, Time until next: {} ({}, size {:.1})",
        status.shrinking,
        status.paused,
        format_countdown(status.seconds_remaining()),
        status.phase.as_str(),
        status.boundary_size,
    )
}

#[must_use]
pub fn help_text() -> String {
    let width = command_specs()
        .iter()
        .map(|spec| spec.usage.len())
        .max()
        .unwrap_or(0);
    let mut text = String::from("Commands:");
    for spec in command_specs() {
        let _ = write!(text, "\n  {:<width$}  {}", spec.usage, spec.description);
    }
    let _ = write!(text, "\n  {:<width$}  Save state and exit", "quit");
    text
}

#[must_use]
pub fn render_response(response: &Response) -> String {
    match response {
        Response::Started { grace_ticks } => format!(
            "Shrink sequence started; first step in {}.",
            format_countdown(ticks_to_seconds(*grace_ticks))
        ),
        Response::AlreadyShrinking => "Already shrinking.".to_string(),
        Response::Paused => "Shrinking paused.".to_string(),
        Response::NotShrinking => "Not shrinking; nothing to pause.".to_string(),
        Response::Resumed => "Shrinking resumed.".to_string(),
        Response::NotPaused => "Not paused; nothing to resume.".to_string(),
        Response::Stopped => "Shrinking stopped.".to_string(),
        Response::AlreadyStopped => "Already stopped.".to_string(),
        Response::Status(status) => render_status(status),
        Response::Help => help_text(),
        Response::Updated {
            setting,
            persisted: true,
        } => format!("Setting '{setting}' updated."),
        Response::Updated {
            setting,
            persisted: false,
        } => format!("Setting '{setting}' updated for this session, but the config file could not be saved."),
    }
}

#[must_use]
pub fn render_error(err: &CommandError) -> String {
    match err {
        CommandError::Rejected(_) | CommandError::InvalidNumber(_) | CommandError::InvalidBool(_) => {
            format!("Invalid value: {err}")
        }
        _ => err.to_string(),
    }
}
