#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Constrained shortest-path search over the tile graph.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use rps_tactics_core::{TileCoord, TileGraphView};

/// Finds the cheapest route from `origin` to `destination` restricted to the
/// permitted tile set.
///
/// The search is A* with a Manhattan heuristic and unit step cost. Expanded
/// tiles must belong to `permitted`; blocked terrain is impassable, and
/// occupied tiles are impassable except for the destination itself, so a
/// caller can still resolve a route that ends next to a standing target.
///
/// The returned path runs from just-after-origin through the destination. An
/// empty result means no route exists within the constraints; a
/// single-element result means the destination is directly adjacent, which
/// callers treat as "attack, don't move" when the destination is occupied.
///
/// Ties on cost are broken by accumulated cost and then coordinate order, so
/// a fixed input always yields the same path.
#[must_use]
pub fn find_path(
    graph: &TileGraphView<'_>,
    origin: TileCoord,
    destination: TileCoord,
    permitted: &HashSet<TileCoord>,
) -> Vec<TileCoord> {
    if origin == destination || !graph.contains(origin) || !graph.contains(destination) {
        return Vec::new();
    }

    let mut open = BinaryHeap::new();
    let mut came_from: HashMap<TileCoord, TileCoord> = HashMap::new();
    let mut best_cost: HashMap<TileCoord, u32> = HashMap::new();

    let _ = best_cost.insert(origin, 0);
    open.push(Node {
        coord: origin,
        cost: 0,
        estimate: origin.manhattan_distance(destination),
    });

    while let Some(current) = open.pop() {
        if current.coord == destination {
            return reconstruct(&came_from, origin, destination);
        }

        if best_cost
            .get(&current.coord)
            .map_or(true, |&cost| cost < current.cost)
        {
            continue;
        }

        for neighbor in graph.neighbors(current.coord) {
            if !permitted.contains(&neighbor) {
                continue;
            }

            let Some(tile) = graph.tile(neighbor) else {
                continue;
            };
            if tile.blocked() {
                continue;
            }
            if tile.occupant().is_some() && neighbor != destination {
                continue;
            }

            let step_cost = current.cost + 1;
            if best_cost
                .get(&neighbor)
                .map_or(true, |&cost| step_cost < cost)
            {
                let _ = best_cost.insert(neighbor, step_cost);
                let _ = came_from.insert(neighbor, current.coord);
                open.push(Node {
                    coord: neighbor,
                    cost: step_cost,
                    estimate: neighbor.manhattan_distance(destination),
                });
            }
        }
    }

    Vec::new()
}

fn reconstruct(
    came_from: &HashMap<TileCoord, TileCoord>,
    origin: TileCoord,
    destination: TileCoord,
) -> Vec<TileCoord> {
    let mut path = vec![destination];
    let mut cursor = destination;
    while let Some(&previous) = came_from.get(&cursor) {
        if previous == origin {
            break;
        }
        path.push(previous);
        cursor = previous;
    }
    path.reverse();
    path
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Node {
    coord: TileCoord,
    cost: u32,
    estimate: u32,
}

impl Node {
    fn priority(&self) -> (u32, u32, TileCoord) {
        (self.cost + self.estimate, self.cost, self.coord)
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the binary heap pops the lowest-priority node first.
        other.priority().cmp(&self.priority())
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
