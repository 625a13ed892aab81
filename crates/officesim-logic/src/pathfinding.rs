//! Pure pathfinding over the 4-connected walkable grid.
//!
//! Breadth-first search with unit step cost, so any returned path is a
//! shortest one by step count. Neighbors are expanded in the fixed order
//! up, down, left, right ([`Direction::SEARCH_ORDER`]); among equally short
//! paths the one that order discovers first wins, on every platform.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::grid::{Direction, GridPos};
use crate::tilemap::{is_walkable, TileMap};

/// Find a path from `start` (exclusive) to `end` (inclusive).
///
/// Returns an empty vec if `start == end`, if `end` is not walkable, or if
/// no route exists. The start cell itself need not be walkable, so a
/// character standing on a freshly placed footprint can still walk off it.
pub fn find_path(
    start: GridPos,
    end: GridPos,
    map: &TileMap,
    blocked: &HashSet<GridPos>,
) -> Vec<GridPos> {
    if start == end || !is_walkable(map, blocked, end) {
        return Vec::new();
    }

    let mut came_from: HashMap<GridPos, GridPos> = HashMap::new();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for dir in Direction::SEARCH_ORDER {
            let next = current.step(dir);
            if !visited.insert(next) || !is_walkable(map, blocked, next) {
                continue;
            }
            came_from.insert(next, current);
            if next == end {
                return reconstruct(&came_from, start, end);
            }
            queue.push_back(next);
        }
    }

    Vec::new()
}

fn reconstruct(
    came_from: &HashMap<GridPos, GridPos>,
    start: GridPos,
    end: GridPos,
) -> Vec<GridPos> {
    let mut path = vec![end];
    let mut node = end;
    while let Some(&prev) = came_from.get(&node) {
        if prev == start {
            break;
        }
        path.push(prev);
        node = prev;
    }
    path.reverse();
    path
}

/// Every cell reachable from `start`, including `start` when walkable.
/// Used for connectivity checks on edited layouts.
pub fn reachable_from(
    start: GridPos,
    map: &TileMap,
    blocked: &HashSet<GridPos>,
) -> HashSet<GridPos> {
    let mut visited = HashSet::new();
    if !is_walkable(map, blocked, start) {
        return visited;
    }
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);
    while let Some(current) = queue.pop_front() {
        for dir in Direction::SEARCH_ORDER {
            let next = current.step(dir);
            if is_walkable(map, blocked, next) && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    visited
}
