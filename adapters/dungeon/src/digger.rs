use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rogue_chase_core::{Coordinate, GeneratedMap, MapGenerator, PassabilityGrid};

const ROOM_ATTEMPTS: u32 = 60;
const ROOM_WIDTH: (i32, i32) = (3, 9);
const ROOM_HEIGHT: (i32, i32) = (3, 5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Room {
    left: i32,
    top: i32,
    width: i32,
    height: i32,
}

impl Room {
    const fn right(&self) -> i32 {
        self.left + self.width - 1
    }

    const fn bottom(&self) -> i32 {
        self.top + self.height - 1
    }

    const fn center(&self) -> Coordinate {
        Coordinate::new(self.left + self.width / 2, self.top + self.height / 2)
    }

    /// Rooms must keep at least one wall cell between them.
    const fn touches(&self, other: &Room) -> bool {
        self.left <= other.right() + 1
            && other.left <= self.right() + 1
            && self.top <= other.bottom() + 1
            && other.top <= self.bottom() + 1
    }
}

/// Seeded rooms-and-corridors map generator.
///
/// Rectangular rooms are scattered without overlapping and each room is
/// joined to the previous one by an L-shaped corridor, so every floor cell is
/// reachable from every other. The outer border is always rock.
#[derive(Clone, Debug)]
pub struct Digger {
    rng: ChaCha8Rng,
    room_attempts: u32,
}

impl Digger {
    /// Creates a digger whose layouts are fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            room_attempts: ROOM_ATTEMPTS,
        }
    }

    /// Overrides how many room placements are tried per map.
    #[must_use]
    pub fn with_room_attempts(mut self, attempts: u32) -> Self {
        self.room_attempts = attempts;
        self
    }

    fn random_room(&mut self, width: i32, height: i32) -> Option<Room> {
        let max_width = ROOM_WIDTH.1.min(width - 2);
        let max_height = ROOM_HEIGHT.1.min(height - 2);
        if max_width < ROOM_WIDTH.0 || max_height < ROOM_HEIGHT.0 {
            return None;
        }

        let room_width = self.rng.gen_range(ROOM_WIDTH.0..=max_width);
        let room_height = self.rng.gen_range(ROOM_HEIGHT.0..=max_height);
        let left = self.rng.gen_range(1..=width - room_width - 1);
        let top = self.rng.gen_range(1..=height - room_height - 1);
        Some(Room {
            left,
            top,
            width: room_width,
            height: room_height,
        })
    }

    fn dig_corridor(&mut self, grid: &mut PassabilityGrid, from: Coordinate, to: Coordinate) {
        let corner = if self.rng.gen_bool(0.5) {
            Coordinate::new(to.x(), from.y())
        } else {
            Coordinate::new(from.x(), to.y())
        };
        dig_line(grid, from, corner);
        dig_line(grid, corner, to);
    }
}

impl MapGenerator for Digger {
    fn generate(&mut self, height: u32, width: u32) -> GeneratedMap {
        let mut grid = PassabilityGrid::blocked(width, height);
        let (Ok(columns), Ok(rows)) = (i32::try_from(width), i32::try_from(height)) else {
            return GeneratedMap {
                grid,
                free_cells: Vec::new(),
            };
        };

        let mut rooms: Vec<Room> = Vec::new();
        for _ in 0..self.room_attempts {
            let Some(room) = self.random_room(columns, rows) else {
                break;
            };
            if rooms.iter().any(|placed| placed.touches(&room)) {
                continue;
            }
            dig_room(&mut grid, room);
            if let Some(previous) = rooms.last().copied() {
                self.dig_corridor(&mut grid, previous.center(), room.center());
            }
            rooms.push(room);
        }

        if rooms.is_empty() {
            let fallback = Room {
                left: i32::from(columns > 2),
                top: i32::from(rows > 2),
                width: if columns > 2 { columns - 2 } else { columns },
                height: if rows > 2 { rows - 2 } else { rows },
            };
            dig_room(&mut grid, fallback);
        }

        debug!(target: "session", "dug {} rooms into a {width}x{height} map", rooms.len());
        let free_cells = grid.passable_cells().collect();
        GeneratedMap { grid, free_cells }
    }
}

fn dig_room(grid: &mut PassabilityGrid, room: Room) {
    for y in room.top..room.top + room.height {
        for x in room.left..room.left + room.width {
            grid.set_passable(Coordinate::new(x, y), true);
        }
    }
}

fn dig_line(grid: &mut PassabilityGrid, from: Coordinate, to: Coordinate) {
    let (mut x, mut y) = (from.x(), from.y());
    grid.set_passable(Coordinate::new(x, y), true);
    while (x, y) != (to.x(), to.y()) {
        x += (to.x() - x).signum();
        y += (to.y() - y).signum();
        grid.set_passable(Coordinate::new(x, y), true);
    }
}
