//! The world the boundary lives in.
//!
//! The scheduler only needs a narrow query/mutation surface: who is in the
//! world, where they are, moving them, and whether a block can be stood in.
//! [`GridWorld`] is a self-contained block grid implementing it, used by the
//! binary's simulation and by tests.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use shrinkborder_types::{BlockPos, Position};

/// Opaque handle to a tracked occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OccupantId(pub u64);

impl fmt::Display for OccupantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    #[error("occupant {0} is no longer in the world")]
    UnknownOccupant(OccupantId),
    #[error("cannot relocate occupant {occupant}: {reason}")]
    RelocationRefused {
        occupant: OccupantId,
        reason: String,
    },
}

pub trait World {
    fn occupants(&self) -> Vec<OccupantId>;

    fn occupant_position(&self, occupant: OccupantId) -> Option<Position>;

    fn relocate(&mut self, occupant: OccupantId, to: Position) -> Result<(), WorldError>;

    /// Whether an occupant can occupy `block` (air, water, tall grass...).
    fn is_passable(&self, block: BlockPos) -> bool;

    /// Y of the highest non-passable block in the column.
    fn highest_solid_y(&self, x: i32, z: i32) -> i32;

    /// Exclusive upper build limit.
    fn max_height(&self) -> i32;

    /// Lowest block Y.
    fn min_height(&self) -> i32 {
        0
    }
}

/// In-memory block grid: flat ground up to `ground_level`, plus per-block overrides.
#[derive(Debug, Clone)]
pub struct GridWorld {
    min_height: i32,
    max_height: i32,
    ground_level: Option<i32>,
    overrides: HashMap<BlockPos, bool>,
    occupants: BTreeMap<OccupantId, Position>,
    next_id: u64,
}

impl GridWorld {
    /// Empty world (all air) with the given vertical bounds.
    #[must_use]
    pub fn new(min_height: i32, max_height: i32) -> Self {
        Self {
            min_height,
            max_height,
            ground_level: None,
            overrides: HashMap::new(),
            occupants: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Solid everywhere at and below `ground_level`.
    #[must_use]
    pub fn flat(min_height: i32, max_height: i32, ground_level: i32) -> Self {
        Self {
            ground_level: Some(ground_level),
            ..Self::new(min_height, max_height)
        }
    }

    pub fn set_solid(&mut self, block: BlockPos, solid: bool) {
        self.overrides.insert(block, solid);
    }

    pub fn spawn(&mut self, position: Position) -> OccupantId {
        let id = OccupantId(self.next_id);
        self.next_id += 1;
        self.occupants.insert(id, position);
        id
    }

    pub fn despawn(&mut self, occupant: OccupantId) -> bool {
        self.occupants.remove(&occupant).is_some()
    }

    fn is_solid(&self, block: BlockPos) -> bool {
        if block.y < self.min_height || block.y >= self.max_height {
            return false;
        }
        match self.overrides.get(&block) {
            Some(solid) => *solid,
            None => self.ground_level.is_some_and(|ground| block.y <= ground),
        }
    }
}

impl World for GridWorld {
    fn occupants(&self) -> Vec<OccupantId> {
        self.occupants.keys().copied().collect()
    }

    fn occupant_position(&self, occupant: OccupantId) -> Option<Position> {
        self.occupants.get(&occupant).copied()
    }

    fn relocate(&mut self, occupant: OccupantId, to: Position) -> Result<(), WorldError> {
        let slot = self
            .occupants
            .get_mut(&occupant)
            .ok_or(WorldError::UnknownOccupant(occupant))?;
        *slot = to;
        Ok(())
    }

    fn is_passable(&self, block: BlockPos) -> bool {
        !self.is_solid(block)
    }

    fn highest_solid_y(&self, x: i32, z: i32) -> i32 {
        (self.min_height..self.max_height)
            .rev()
            .find(|&y| self.is_solid(BlockPos::new(x, y, z)))
            .unwrap_or(self.min_height)
    }

    fn max_height(&self) -> i32 {
        self.max_height
    }

    fn min_height(&self) -> i32 {
        self.min_height
    }
}
