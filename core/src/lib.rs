#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Rogue Chase engine.
//!
//! This crate defines the vocabulary that connects the authoritative world,
//! the turn systems, and the adapters. Strategies propose moves through the
//! world's arbiter, the arbiter consults a [`GameOracle`] before committing,
//! and every committed change is broadcast as an [`Event`] to the registered
//! [`EventObserver`] values in registration order.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Rogue Chase. Find the prize before the Borrowmir finds you.";

/// Location of a single map cell expressed as signed column and row offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    x: i32,
    y: i32,
}

impl Coordinate {
    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the cell; grows toward the east.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the cell; grows toward the south.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the neighbouring coordinate one step in the provided direction.
    #[must_use]
    pub const fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: Coordinate) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Eight-way movement directions available to the human actor.
///
/// Variants are listed clockwise starting from north, which is also the order
/// of [`Direction::ALL`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing rows.
    North,
    /// Toward decreasing rows and increasing columns.
    NorthEast,
    /// Toward increasing columns.
    East,
    /// Toward increasing rows and increasing columns.
    SouthEast,
    /// Toward increasing rows.
    South,
    /// Toward increasing rows and decreasing columns.
    SouthWest,
    /// Toward decreasing columns.
    West,
    /// Toward decreasing rows and decreasing columns.
    NorthWest,
}

impl Direction {
    /// Every direction in clockwise order starting from north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Column and row delta applied by a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::NorthEast => (1, -1),
            Self::East => (1, 0),
            Self::SouthEast => (1, 1),
            Self::South => (0, 1),
            Self::SouthWest => (-1, 1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, -1),
        }
    }
}

/// Unique identifier assigned to an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Distinguishes the human-controlled actor from autonomous pursuers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// Actor driven by player input.
    Human,
    /// Actor that chases the tracked human position.
    Pursuer,
}

/// Visual appearance applied to an actor glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl ActorColor {
    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Parses `#rgb` or `#rrggbb` notation.
    #[must_use]
    pub fn from_hex(value: &str) -> Option<Self> {
        let digits = value.strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }
        match digits.len() {
            3 => {
                let mut channels = [0_u8; 3];
                for (slot, digit) in channels.iter_mut().zip(digits.chars()) {
                    let nibble = u8::try_from(digit.to_digit(16)?).ok()?;
                    *slot = nibble * 0x11;
                }
                Some(Self::from_rgb(channels[0], channels[1], channels[2]))
            }
            6 => {
                let red = u8::from_str_radix(&digits[0..2], 16).ok()?;
                let green = u8::from_str_radix(&digits[2..4], 16).ok()?;
                let blue = u8::from_str_radix(&digits[4..6], 16).ok()?;
                Some(Self::from_rgb(red, green, blue))
            }
            _ => None,
        }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

impl fmt::Display for ActorColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

/// Objects the session scatters across the map before the chase begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Closed box that may hide a trap.
    Box,
    /// The single box holding the prize.
    Prize,
}

/// Result of an arbitrated move attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// The move was applied and broadcast.
    Committed,
    /// The move was refused; nothing changed.
    Rejected {
        /// First check that failed.
        reason: RejectReason,
    },
}

impl MoveOutcome {
    /// Reports whether the move was applied.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// Reasons a move attempt may be refused by the arbiter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    /// The oracle reports the target cell as impassable.
    Blocked,
    /// Another live actor stands on the target cell.
    Occupied,
}

/// Secondary effects the oracle reports after applying a move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MoveEffect {
    /// Whether the mover was promoted by reaching the target cell.
    pub promoted: bool,
}

/// Result of an actor interacting with the cell it stands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractOutcome {
    /// Nothing to interact with at the actor's position.
    NothingHere,
    /// The actor opened the prize box.
    PrizeFound,
    /// The actor opened a trapped box.
    Trap {
        /// Hit points removed from the actor.
        damage: u32,
    },
}

/// Player intent distilled from raw host input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// Step one cell in the provided direction.
    Move(Direction),
    /// Interact with whatever occupies the actor's cell.
    Interact,
}

/// Raw input forwarded by the host before it is mapped to an [`Intent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawInput {
    /// Browser-style numeric key code.
    KeyCode(u32),
    /// Printable character typed on a terminal.
    Char(char),
}

/// Events broadcast to observers as the session progresses.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// Announces that an actor entered the map.
    ActorSpawned {
        /// Identifier assigned to the actor.
        actor: ActorId,
        /// Role of the actor.
        kind: ActorKind,
        /// Cell the actor occupies after spawning.
        at: Coordinate,
        /// Glyph drawn for the actor.
        glyph: char,
        /// Color applied to the glyph.
        color: ActorColor,
    },
    /// Announces that an object was placed on the map.
    ObjectPlaced {
        /// Cell holding the object.
        at: Coordinate,
        /// Kind of object placed.
        kind: ObjectKind,
    },
    /// Confirms that an actor moved between two cells.
    PieceMoved {
        /// Identifier of the actor that moved.
        actor: ActorId,
        /// Cell the actor occupied before moving.
        from: Coordinate,
        /// Cell the actor occupies after the move.
        to: Coordinate,
    },
    /// Reports that the oracle promoted an actor after a move.
    ActorPromoted {
        /// Identifier of the promoted actor.
        actor: ActorId,
        /// Cell where the promotion happened.
        at: Coordinate,
    },
    /// Reports the result of an interaction.
    Interacted {
        /// Identifier of the interacting actor.
        actor: ActorId,
        /// Cell the actor interacted with.
        at: Coordinate,
        /// What the oracle reported.
        outcome: InteractOutcome,
    },
    /// A pursuer reached the tracked human position.
    Captured {
        /// Identifier of the capturing pursuer.
        actor: ActorId,
        /// Position of the pursuer at the time of capture.
        at: Coordinate,
    },
    /// Terminal notification emitted once when the session ends.
    GameOver {
        /// Human actor that was captured, if it is still known.
        captured: Option<ActorId>,
        /// Pursuer that made the capture.
        by: ActorId,
    },
}

/// Dense passability grid produced by a [`MapGenerator`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassabilityGrid {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl PassabilityGrid {
    /// Creates a grid of the provided dimensions with every cell blocked.
    #[must_use]
    pub fn blocked(width: u32, height: u32) -> Self {
        let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            cells: vec![false; capacity],
        }
    }

    /// Creates a grid of the provided dimensions with every cell passable.
    #[must_use]
    pub fn open(width: u32, height: u32) -> Self {
        let mut grid = Self::blocked(width, height);
        grid.cells.fill(true);
        grid
    }

    /// Builds a grid from text rows where `#` marks a wall.
    ///
    /// Rows shorter than the longest row are padded with walls.
    #[must_use]
    pub fn from_rows(rows: &[&str]) -> Self {
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        let width = u32::try_from(width).unwrap_or(0);
        let height = u32::try_from(rows.len()).unwrap_or(0);
        let mut grid = Self::blocked(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, symbol) in row.chars().enumerate() {
                let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) else {
                    continue;
                };
                grid.set_passable(Coordinate::new(x, y), symbol != '#');
            }
        }
        grid
    }

    /// Width of the grid in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the grid in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub fn contains(&self, cell: Coordinate) -> bool {
        self.index(cell).is_some()
    }

    /// Reports whether the cell is inside the grid and passable.
    #[must_use]
    pub fn is_passable(&self, cell: Coordinate) -> bool {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Marks a cell as passable or blocked. Cells outside the grid are ignored.
    pub fn set_passable(&mut self, cell: Coordinate, passable: bool) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = passable;
            }
        }
    }

    /// Iterates over passable cells in row-major order.
    pub fn passable_cells(&self) -> impl Iterator<Item = Coordinate> + '_ {
        let width = self.width.max(1);
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, passable)| **passable)
            .filter_map(move |(index, _)| {
                let index = u32::try_from(index).ok()?;
                let x = i32::try_from(index % width).ok()?;
                let y = i32::try_from(index / width).ok()?;
                Some(Coordinate::new(x, y))
            })
    }

    fn index(&self, cell: Coordinate) -> Option<usize> {
        let x = u32::try_from(cell.x()).ok()?;
        let y = u32::try_from(cell.y()).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let row = usize::try_from(y).ok()?;
        let column = usize::try_from(x).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

/// Output of a [`MapGenerator`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedMap {
    /// Passable and blocked cells of the map.
    pub grid: PassabilityGrid,
    /// Passable, unoccupied cells discovered during generation.
    pub free_cells: Vec<Coordinate>,
}

/// Game-state engine that owns passability and move-application semantics.
///
/// The oracle is invoked synchronously from inside a turn and must not call
/// back into the scheduler.
pub trait GameOracle {
    /// Replaces the oracle's terrain with the generated map.
    fn load_map(&mut self, grid: &PassabilityGrid);

    /// Reports whether an actor may stand on the provided cell.
    fn is_passable(&self, cell: Coordinate) -> bool;

    /// Applies a move that the arbiter already validated.
    fn apply_move(&mut self, actor: ActorId, from: Coordinate, to: Coordinate) -> MoveEffect;

    /// Places an object on the provided cell.
    fn place_object(&mut self, cell: Coordinate, kind: ObjectKind);

    /// Lets an actor interact with the cell it stands on.
    fn interact(&mut self, actor: ActorId, at: Coordinate) -> InteractOutcome;
}

/// Produces the terrain for a new session.
pub trait MapGenerator {
    /// Generates a map with the provided dimensions.
    fn generate(&mut self, height: u32, width: u32) -> GeneratedMap;
}

/// Receives events at the moment they occur.
pub trait EventObserver {
    /// Handles a single event. Failures are logged by the caller and ignored.
    fn notify(&mut self, event: &Event) -> Result<(), ObserverError>;
}

/// Failure reported by an [`EventObserver`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("observer failed: {message}")]
pub struct ObserverError {
    message: String,
}

impl ObserverError {
    /// Creates a new observer failure with a human readable message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Message describing the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
