//! Moving occupants back inside a freshly shrunk boundary.

use shrinkborder_types::Position;

use crate::boundary::Boundary;
use crate::observer::ShrinkObserver;
use crate::safe_position::find_safe_position;
use crate::world::{OccupantId, World};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Relocation {
    pub occupant: OccupantId,
    pub from: Position,
    pub to: Position,
    /// The scan window had no ledge and the column surface was used.
    pub surface_fallback: bool,
}

/// Relocate every occupant outside `boundary` to a safe spot just inside it.
///
/// An occupant is outside when either horizontal axis is more than half the
/// size away from the center. Occupants inside are untouched. A failed
/// relocation is logged and skipped; the rest are still processed.
pub fn contain_occupants<W: World + ?Sized>(
    world: &mut W,
    boundary: &Boundary,
    observer: &mut dyn ShrinkObserver,
) -> Vec<Relocation> {
    let mut relocations = Vec::new();

    for occupant in world.occupants() {
        let Some(from) = world.occupant_position(occupant) else {
            tracing::debug!(%occupant, "Occupant vanished before containment check");
            continue;
        };
        if boundary.contains(from.x, from.z) {
            continue;
        }

        let (x, z) = boundary.clamp_inside(from.x, from.z);
        let safe = find_safe_position(&*world, x, from.y, z);
        let to = safe.position();

        if let Err(err) = world.relocate(occupant, to) {
            tracing::warn!(%occupant, "Skipping relocation: {err}");
            continue;
        }
        if safe.is_fallback() {
            tracing::debug!(%occupant, y = to.y, "No ledge near occupant; used column surface");
        }
        tracing::info!(
            %occupant,
            x = to.x,
            y = to.y,
            z = to.z,
            "Relocated occupant inside boundary"
        );
        observer.on_occupant_relocated(occupant, to);
        relocations.push(Relocation {
            occupant,
            from,
            to,
            surface_fallback: safe.is_fallback(),
        });
    }

    relocations
}
