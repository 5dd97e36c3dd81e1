use std::collections::{BTreeMap, HashMap};

use log::{debug, info};
use rogue_chase_core::{
    ActorId, Coordinate, GameOracle, InteractOutcome, MoveEffect, ObjectKind, PassabilityGrid,
};

/// Hit points removed by a trapped box.
pub const TRAP_DAMAGE: u32 = 30;

const STARTING_HITPOINTS: u32 = 100;

/// Contents of a dungeon cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    /// Solid rock.
    Wall,
    /// Walkable floor.
    Floor,
    /// Floor holding an unopened box.
    Box,
}

impl Tile {
    /// Character used to draw the tile.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Wall => ' ',
            Self::Floor => '.',
            Self::Box => '*',
        }
    }
}

/// Per-actor counters kept by the dungeon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActorStats {
    /// Remaining hit points; never drops below zero.
    pub hitpoints: u32,
    /// Hit points the actor started with.
    pub max_hitpoints: u32,
    /// Number of committed moves.
    pub moves: u32,
}

impl Default for ActorStats {
    fn default() -> Self {
        Self {
            hitpoints: STARTING_HITPOINTS,
            max_hitpoints: STARTING_HITPOINTS,
            moves: 0,
        }
    }
}

/// Game oracle backed by a dug dungeon.
///
/// Floor and box cells are passable. Opening the prize box reports the prize;
/// every other box is a trap. Opened boxes become floor.
#[derive(Clone, Debug)]
pub struct Dungeon {
    grid: PassabilityGrid,
    boxes: HashMap<Coordinate, ObjectKind>,
    stats: BTreeMap<ActorId, ActorStats>,
    prize_found: bool,
}

impl Dungeon {
    /// Creates a dungeon with no map loaded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grid: PassabilityGrid::blocked(0, 0),
            boxes: HashMap::new(),
            stats: BTreeMap::new(),
            prize_found: false,
        }
    }

    /// Contents of the cell.
    #[must_use]
    pub fn tile(&self, cell: Coordinate) -> Tile {
        if self.boxes.contains_key(&cell) {
            Tile::Box
        } else if self.grid.is_passable(cell) {
            Tile::Floor
        } else {
            Tile::Wall
        }
    }

    /// Counters for an actor; actors that never acted report fresh stats.
    #[must_use]
    pub fn stats(&self, actor: ActorId) -> ActorStats {
        self.stats.get(&actor).copied().unwrap_or_default()
    }

    /// Number of unopened boxes.
    #[must_use]
    pub fn boxes_remaining(&self) -> usize {
        self.boxes.len()
    }

    /// Reports whether the prize box was opened.
    #[must_use]
    pub const fn prize_found(&self) -> bool {
        self.prize_found
    }

    /// Loaded passability grid.
    #[must_use]
    pub fn grid(&self) -> &PassabilityGrid {
        &self.grid
    }

    fn stats_mut(&mut self, actor: ActorId) -> &mut ActorStats {
        self.stats.entry(actor).or_default()
    }
}

impl Default for Dungeon {
    fn default() -> Self {
        Self::new()
    }
}

impl GameOracle for Dungeon {
    fn load_map(&mut self, grid: &PassabilityGrid) {
        self.grid = grid.clone();
        self.boxes.clear();
        self.prize_found = false;
    }

    fn is_passable(&self, cell: Coordinate) -> bool {
        self.grid.is_passable(cell)
    }

    fn apply_move(&mut self, actor: ActorId, _from: Coordinate, _to: Coordinate) -> MoveEffect {
        let stats = self.stats_mut(actor);
        stats.moves = stats.moves.saturating_add(1);
        MoveEffect::default()
    }

    fn place_object(&mut self, cell: Coordinate, kind: ObjectKind) {
        if !self.grid.is_passable(cell) {
            debug!(target: "session", "refusing to place {kind:?} inside rock at {cell}");
            return;
        }
        let _ = self.boxes.insert(cell, kind);
    }

    fn interact(&mut self, actor: ActorId, at: Coordinate) -> InteractOutcome {
        let Some(kind) = self.boxes.remove(&at) else {
            return InteractOutcome::NothingHere;
        };

        match kind {
            ObjectKind::Prize => {
                info!(target: "session", "{actor} found the prize at {at}");
                self.prize_found = true;
                InteractOutcome::PrizeFound
            }
            ObjectKind::Box => {
                let stats = self.stats_mut(actor);
                stats.hitpoints = stats.hitpoints.saturating_sub(TRAP_DAMAGE);
                info!(
                    target: "session",
                    "{actor} sprung a trap at {at}; {} hit points left",
                    stats.hitpoints
                );
                InteractOutcome::Trap {
                    damage: TRAP_DAMAGE,
                }
            }
        }
    }
}
