//! Shrink scheduler core.
//!
//! - [`ShrinkScheduler`]: tick-driven state machine owning the live boundary.
//! - [`contain_occupants`] / [`find_safe_position`]: pull stragglers back inside.
//! - [`ScheduleStore`] / [`AsyncStateWriter`]: durable, ordered schedule writes.
//! - [`CommandDispatcher`]: the administrative command surface.
//!
//! The world itself is abstract ([`World`]); [`GridWorld`] is an in-memory
//! implementation.

mod boundary;
mod command;
mod containment;
mod observer;
mod persistence;
mod safe_position;
mod scheduler;
mod shared;
mod world;

pub use boundary::{Boundary, BoundaryError};
pub use command::{
    Command, CommandDispatcher, CommandError, CommandSpec, Response, command_specs,
};
pub use containment::{Relocation, contain_occupants};
pub use observer::ShrinkObserver;
pub use persistence::{AsyncStateWriter, PersistError, ScheduleStore, SettingsSink, StateSink};
pub use safe_position::{SEARCH_RADIUS, SafePosition, find_safe_position};
pub use scheduler::{SAVE_EVERY_TICKS, ShrinkScheduler, TickOutcome};
pub use shared::SharedScheduler;
pub use world::{GridWorld, OccupantId, World, WorldError};
