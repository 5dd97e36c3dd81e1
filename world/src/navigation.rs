//! Shortest-path search used by pursuing actors.

use std::{cmp::Reverse, collections::BinaryHeap};

use rogue_chase_core::Coordinate;

/// Computes a shortest 4-connected path from `start` to `goal`.
///
/// The search runs A* over a `width × height` grid with unit step cost and a
/// Manhattan heuristic. Neighbours expand in north, east, south, west order
/// and open-set ties resolve by lowest estimate, then lowest heuristic, then
/// discovery order, so identical inputs always yield identical paths.
///
/// The returned waypoints exclude `start` and end with `goal`. An empty path
/// means `start == goal`; `None` means the goal is unreachable.
#[must_use]
pub fn find_path<F>(
    start: Coordinate,
    goal: Coordinate,
    width: u32,
    height: u32,
    mut is_passable: F,
) -> Option<Vec<Coordinate>>
where
    F: FnMut(Coordinate) -> bool,
{
    if start == goal {
        return Some(Vec::new());
    }

    let width_usize = usize::try_from(width).ok()?;
    let height_usize = usize::try_from(height).ok()?;
    let cell_count = width_usize.checked_mul(height_usize)?;
    let start_index = index(width, height, start)?;
    let goal_index = index(width, height, goal)?;

    if !is_passable(goal) {
        return None;
    }

    let mut cost = vec![u32::MAX; cell_count];
    let mut came_from: Vec<Option<usize>> = vec![None; cell_count];
    let mut closed = vec![false; cell_count];
    let mut open = BinaryHeap::new();
    let mut discovered: u64 = 0;

    cost[start_index] = 0;
    open.push(Reverse(OpenNode {
        estimate: start.manhattan_distance(goal),
        heuristic: start.manhattan_distance(goal),
        discovered,
        cell: start,
    }));

    while let Some(Reverse(node)) = open.pop() {
        let Some(current_index) = index(width, height, node.cell) else {
            continue;
        };
        if closed[current_index] {
            continue;
        }
        closed[current_index] = true;

        if current_index == goal_index {
            return Some(reconstruct(&came_from, width, goal_index, start_index));
        }

        let next_cost = cost[current_index].saturating_add(1);
        for neighbor in neighbors(node.cell) {
            let Some(neighbor_index) = index(width, height, neighbor) else {
                continue;
            };
            if closed[neighbor_index] || next_cost >= cost[neighbor_index] {
                continue;
            }
            if !is_passable(neighbor) {
                continue;
            }

            cost[neighbor_index] = next_cost;
            came_from[neighbor_index] = Some(current_index);
            discovered += 1;
            let heuristic = neighbor.manhattan_distance(goal);
            open.push(Reverse(OpenNode {
                estimate: next_cost.saturating_add(heuristic),
                heuristic,
                discovered,
                cell: neighbor,
            }));
        }
    }

    None
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    estimate: u32,
    heuristic: u32,
    discovered: u64,
    cell: Coordinate,
}

fn neighbors(cell: Coordinate) -> [Coordinate; 4] {
    [
        Coordinate::new(cell.x(), cell.y() - 1),
        Coordinate::new(cell.x() + 1, cell.y()),
        Coordinate::new(cell.x(), cell.y() + 1),
        Coordinate::new(cell.x() - 1, cell.y()),
    ]
}

fn reconstruct(
    came_from: &[Option<usize>],
    width: u32,
    goal_index: usize,
    start_index: usize,
) -> Vec<Coordinate> {
    let mut path = Vec::new();
    let mut cursor = goal_index;
    while cursor != start_index {
        if let Some(cell) = coordinate(width, cursor) {
            path.push(cell);
        }
        match came_from[cursor] {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    path.reverse();
    path
}

fn index(width: u32, height: u32, cell: Coordinate) -> Option<usize> {
    let column = u32::try_from(cell.x()).ok()?;
    let row = u32::try_from(cell.y()).ok()?;
    if column >= width || row >= height {
        return None;
    }
    let width = usize::try_from(width).ok()?;
    let column = usize::try_from(column).ok()?;
    let row = usize::try_from(row).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

fn coordinate(width: u32, index: usize) -> Option<Coordinate> {
    let width = usize::try_from(width).ok()?;
    if width == 0 {
        return None;
    }
    let x = i32::try_from(index % width).ok()?;
    let y = i32::try_from(index / width).ok()?;
    Some(Coordinate::new(x, y))
}
