use std::collections::{HashMap, HashSet};

use rps_tactics_core::{TileCoord, TileGraphView, TileState};
use rps_tactics_system_pathfinding::find_path;
use rps_tactics_system_rangefinding::tiles_in_range;

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
fn routes_stay_within_the_planning_range() {
    let tiles = flat_grid(9, 9);
    let view = TileGraphView::new(&tiles);
    let origin = TileCoord::new(4, 4);
    let budget = 3;

    let range: HashSet<TileCoord> = tiles_in_range(&view, origin, budget).into_iter().collect();

    for destination in range.iter().copied() {
        if destination == origin {
            continue;
        }

        let path = find_path(&view, origin, destination, &range);
        assert!(
            !path.is_empty(),
            "destination {destination:?} inside the range must be reachable"
        );
        assert!(path.len() as u32 <= budget);
        for tile in &path {
            assert!(range.contains(tile), "path escaped the permitted set");
        }
    }
}

#[test]
fn destinations_beyond_the_range_are_unreachable() {
    let tiles = flat_grid(9, 9);
    let view = TileGraphView::new(&tiles);
    let origin = TileCoord::new(0, 0);

    let range: HashSet<TileCoord> = tiles_in_range(&view, origin, 2).into_iter().collect();

    let path = find_path(&view, origin, TileCoord::new(5, 5), &range);
    assert!(path.is_empty());
}
