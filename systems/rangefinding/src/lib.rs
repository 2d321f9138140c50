#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bounded breadth-first range expansion over the tile graph.

use std::collections::HashSet;

use rps_tactics_core::{TileCoord, TileGraphView};

/// Collects every tile reachable from `origin` within `budget` successive
/// neighbor expansions, the origin included.
///
/// Range is about reachability for planning, so occupancy and blocked
/// terrain are deliberately ignored; the path finder applies those
/// constraints when an actual route is requested. The result is sorted by
/// coordinate so callers observe a deterministic order.
#[must_use]
pub fn tiles_in_range(graph: &TileGraphView<'_>, origin: TileCoord, budget: u32) -> Vec<TileCoord> {
    if !graph.contains(origin) {
        return Vec::new();
    }

    let mut seen: HashSet<TileCoord> = HashSet::new();
    let _ = seen.insert(origin);
    let mut frontier = vec![origin];

    for _ in 0..budget {
        if frontier.is_empty() {
            break;
        }

        let mut next = Vec::new();
        for tile in frontier {
            for neighbor in graph.neighbors(tile) {
                if seen.insert(neighbor) {
                    next.push(neighbor);
                }
            }
        }
        frontier = next;
    }

    let mut tiles: Vec<TileCoord> = seen.into_iter().collect();
    tiles.sort();
    tiles
}

#[cfg(test)]
mod tests {
    use super::tiles_in_range;
    use rps_tactics_core::{TileCoord, TileGraphView, TileState};
    use std::collections::HashMap;

    fn flat_grid(columns: i32, rows: i32) -> HashMap<TileCoord, TileState> {
        let mut tiles = HashMap::new();
        for column in 0..columns {
            for row in 0..rows {
                let _ = tiles.insert(TileCoord::new(column, row), TileState::new(0, false));
            }
        }
        tiles
    }

    #[test]
    fn range_matches_graph_distance_bound() {
        let tiles = flat_grid(5, 5);
        let view = TileGraphView::new(&tiles);
        let origin = TileCoord::new(2, 2);

        let in_range = tiles_in_range(&view, origin, 2);

        for (coord, _) in view.iter() {
            let expected = origin.manhattan_distance(coord) <= 2;
            assert_eq!(
                in_range.contains(&coord),
                expected,
                "tile {coord:?} membership mismatch"
            );
        }
    }

    #[test]
    fn origin_is_always_included() {
        let tiles = flat_grid(3, 3);
        let view = TileGraphView::new(&tiles);
        let origin = TileCoord::new(0, 0);

        assert_eq!(tiles_in_range(&view, origin, 0), vec![origin]);
    }

    #[test]
    fn expansion_stops_at_elevation_cliffs() {
        let mut tiles = HashMap::new();
        let _ = tiles.insert(TileCoord::new(0, 0), TileState::new(0, false));
        let _ = tiles.insert(TileCoord::new(1, 0), TileState::new(1, false));
        let _ = tiles.insert(TileCoord::new(2, 0), TileState::new(5, false));
        let view = TileGraphView::new(&tiles);

        let in_range = tiles_in_range(&view, TileCoord::new(0, 0), 4);

        assert!(in_range.contains(&TileCoord::new(1, 0)));
        assert!(!in_range.contains(&TileCoord::new(2, 0)));
    }

    #[test]
    fn occupancy_does_not_shrink_the_range() {
        let mut tiles = flat_grid(3, 1);
        tiles
            .get_mut(&TileCoord::new(1, 0))
            .expect("tile exists")
            .set_occupant(Some(rps_tactics_core::AgentId::new(7)));
        let view = TileGraphView::new(&tiles);

        let in_range = tiles_in_range(&view, TileCoord::new(0, 0), 2);

        assert!(in_range.contains(&TileCoord::new(1, 0)));
        assert!(in_range.contains(&TileCoord::new(2, 0)));
    }

    #[test]
    fn unknown_origin_yields_nothing() {
        let tiles = flat_grid(2, 2);
        let view = TileGraphView::new(&tiles);

        assert!(tiles_in_range(&view, TileCoord::new(9, 9), 3).is_empty());
    }
}
