//! Pool of unoccupied cells used when placing objects and spawning actors.

use std::collections::HashSet;

use rand::Rng;
use rogue_chase_core::Coordinate;
use thiserror::Error;

/// Failures reported by [`FreeCellPool`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    /// No free cells remain to hand out.
    #[error("no free cells remain")]
    Empty,
    /// Strict insertion of a cell that is already free.
    #[error("cell {0} is already in the free cell pool")]
    DuplicateCell(Coordinate),
}

/// Set of currently unoccupied coordinates.
///
/// Iteration follows insertion order so that seeded random selection replays
/// identically across runs.
#[derive(Clone, Debug, Default)]
pub struct FreeCellPool {
    cells: Vec<Coordinate>,
    members: HashSet<Coordinate>,
}

impl FreeCellPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a cell, silently ignoring duplicates.
    ///
    /// Returns `true` when the cell was not already present.
    pub fn insert(&mut self, cell: Coordinate) -> bool {
        if !self.members.insert(cell) {
            return false;
        }
        self.cells.push(cell);
        true
    }

    /// Adds a cell, failing if it is already present.
    pub fn insert_strict(&mut self, cell: Coordinate) -> Result<(), PoolError> {
        if self.insert(cell) {
            Ok(())
        } else {
            Err(PoolError::DuplicateCell(cell))
        }
    }

    /// Adds every cell yielded by the iterator and returns how many were new.
    pub fn extend<I>(&mut self, cells: I) -> usize
    where
        I: IntoIterator<Item = Coordinate>,
    {
        cells.into_iter().filter(|cell| self.insert(*cell)).count()
    }

    /// Removes and returns a uniformly selected member.
    pub fn pop_random<R>(&mut self, rng: &mut R) -> Result<Coordinate, PoolError>
    where
        R: Rng,
    {
        if self.cells.is_empty() {
            return Err(PoolError::Empty);
        }

        let index = rng.gen_range(0..self.cells.len());
        let cell = self.cells.remove(index);
        let _ = self.members.remove(&cell);
        Ok(cell)
    }

    /// Removes a specific cell. Returns `true` when it was present.
    pub fn remove(&mut self, cell: Coordinate) -> bool {
        if !self.members.remove(&cell) {
            return false;
        }
        if let Some(position) = self.cells.iter().position(|candidate| *candidate == cell) {
            let _ = self.cells.remove(position);
        }
        true
    }

    /// Reports whether the cell is currently free.
    #[must_use]
    pub fn contains(&self, cell: Coordinate) -> bool {
        self.members.contains(&cell)
    }

    /// Number of free cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the pool is exhausted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterates over free cells in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.cells.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pool_of(cells: &[(i32, i32)]) -> FreeCellPool {
        let mut pool = FreeCellPool::new();
        let added = pool.extend(cells.iter().map(|&(x, y)| Coordinate::new(x, y)));
        assert_eq!(added, cells.len());
        pool
    }

    #[test]
    fn insert_dedupes_silently() {
        let mut pool = FreeCellPool::new();
        assert!(pool.insert(Coordinate::new(1, 1)));
        assert!(!pool.insert(Coordinate::new(1, 1)));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn strict_insert_reports_duplicates() {
        let mut pool = pool_of(&[(2, 3)]);
        assert_eq!(
            pool.insert_strict(Coordinate::new(2, 3)),
            Err(PoolError::DuplicateCell(Coordinate::new(2, 3)))
        );
        assert_eq!(pool.insert_strict(Coordinate::new(3, 3)), Ok(()));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn pop_random_drains_each_cell_once() {
        let cells = [(0, 0), (1, 0), (2, 0), (0, 1), (1, 1)];
        let mut pool = pool_of(&cells);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut seen = HashSet::new();

        for remaining in (0..cells.len()).rev() {
            let cell = pool.pop_random(&mut rng).expect("pool not yet empty");
            assert!(cells.contains(&(cell.x(), cell.y())));
            assert!(seen.insert(cell), "cell {cell} yielded twice");
            assert!(!pool.contains(cell));
            assert_eq!(pool.len(), remaining);
        }

        assert_eq!(pool.pop_random(&mut rng), Err(PoolError::Empty));
    }

    #[test]
    fn popped_cell_can_be_reinserted() {
        let mut pool = pool_of(&[(4, 4)]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let cell = pool.pop_random(&mut rng).expect("one cell");
        assert!(pool.is_empty());
        assert!(pool.insert(cell));
        assert_eq!(pool.pop_random(&mut rng), Ok(cell));
    }

    #[test]
    fn seeded_selection_is_reproducible() {
        let cells: Vec<_> = (0..20).map(|index| (index % 5, index / 5)).collect();
        let mut first = pool_of(&cells);
        let mut second = pool_of(&cells);
        let mut first_rng = ChaCha8Rng::seed_from_u64(99);
        let mut second_rng = ChaCha8Rng::seed_from_u64(99);

        for _ in 0..cells.len() {
            assert_eq!(
                first.pop_random(&mut first_rng),
                second.pop_random(&mut second_rng)
            );
        }
    }

    #[test]
    fn remove_keeps_insertion_order() {
        let mut pool = pool_of(&[(0, 0), (1, 0), (2, 0)]);
        assert!(pool.remove(Coordinate::new(1, 0)));
        assert!(!pool.remove(Coordinate::new(1, 0)));
        let order: Vec<_> = pool.iter().collect();
        assert_eq!(order, vec![Coordinate::new(0, 0), Coordinate::new(2, 0)]);
    }
}
