//! Finding somewhere an occupant can stand.

use shrinkborder_types::{BlockPos, Position, block_coord};

use crate::world::World;

/// Blocks scanned below and above the altitude hint.
pub const SEARCH_RADIUS: i32 = 5;

/// Outcome of [`find_safe_position`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SafePosition {
    /// Solid floor with two passable blocks above, within the scan window.
    Ledge(Position),
    /// Nothing in the window; one above the column's highest solid block.
    Surface(Position),
}

impl SafePosition {
    #[must_use]
    pub fn position(self) -> Position {
        match self {
            Self::Ledge(position) | Self::Surface(position) => position,
        }
    }

    #[must_use]
    pub fn is_fallback(self) -> bool {
        matches!(self, Self::Surface(_))
    }
}

/// Scan offsets `-SEARCH_RADIUS..=SEARCH_RADIUS` around `y_hint`, in that
/// order, and return the first Y whose block and the block above are passable
/// and whose block below is solid. Y values within one block of the world's
/// floor or two of its ceiling are skipped.
///
/// Never fails: with no candidate it falls back to the surface of the column.
/// Horizontal coordinates are returned unchanged.
pub fn find_safe_position<W: World + ?Sized>(
    world: &W,
    x: f64,
    y_hint: f64,
    z: f64,
) -> SafePosition {
    let block_x = block_coord(x);
    let block_z = block_coord(z);
    let base_y = block_coord(y_hint);
    let lowest = world.min_height() + 1;
    let highest = world.max_height() - 2;

    for offset in -SEARCH_RADIUS..=SEARCH_RADIUS {
        let y = base_y.saturating_add(offset);
        if y < lowest || y > highest {
            continue;
        }
        let feet = BlockPos::new(block_x, y, block_z);
        if world.is_passable(feet)
            && world.is_passable(feet.above())
            && !world.is_passable(feet.below())
        {
            return SafePosition::Ledge(Position::new(x, f64::from(y), z));
        }
    }

    let surface = world.highest_solid_y(block_x, block_z);
    SafePosition::Surface(Position::new(x, f64::from(surface + 1), z))
}
