#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Translates route tiles into directional cue symbols for presentation.

use rps_tactics_core::{GridDelta, TileCoord};

/// Directional cue selected for a single route tile.
///
/// Straight arrows indicate the route passes through unchanged, corner
/// arrows name the two open sides of the bend, and stop arrows mark the
/// route's final tile oriented by the incoming step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArrowKind {
    /// No cue; the tile is isolated from any route.
    None,
    /// Straight cue pointing toward increasing rows.
    Up,
    /// Straight cue pointing toward decreasing rows.
    Down,
    /// Straight cue pointing toward decreasing columns.
    Left,
    /// Straight cue pointing toward increasing columns.
    Right,
    /// Bend opening toward the top and left sides.
    TopLeft,
    /// Bend opening toward the top and right sides.
    TopRight,
    /// Bend opening toward the bottom and left sides.
    BottomLeft,
    /// Bend opening toward the bottom and right sides.
    BottomRight,
    /// Terminal cue for a route ending on an upward step.
    UpStop,
    /// Terminal cue for a route ending on a downward step.
    DownStop,
    /// Terminal cue for a route ending on a leftward step.
    LeftStop,
    /// Terminal cue for a route ending on a rightward step.
    RightStop,
}

/// Selects the cue for `current` given the flanking route tiles.
///
/// `previous` is absent on the first tile of a route and `next` on the last;
/// a tile with neither neighbor carries no cue at all.
#[must_use]
pub fn translate(
    previous: Option<TileCoord>,
    current: TileCoord,
    next: Option<TileCoord>,
) -> ArrowKind {
    let incoming = previous.map(|tile| GridDelta::between(tile, current));
    let outgoing = next.map(|tile| GridDelta::between(current, tile));

    match (incoming, outgoing) {
        (None, None) => ArrowKind::None,
        (Some(delta), None) => stop_arrow(delta),
        (None, Some(delta)) => straight_arrow(delta),
        (Some(incoming), Some(outgoing)) => {
            if incoming == outgoing {
                straight_arrow(outgoing)
            } else {
                corner_arrow(incoming, outgoing)
            }
        }
    }
}

/// Produces the cue overlay for a whole route, pairing each route tile with
/// its arrow. `origin` is the tile the agent stands on; it receives no cue
/// itself but orients the first arrow.
#[must_use]
pub fn path_overlay(origin: TileCoord, path: &[TileCoord]) -> Vec<(TileCoord, ArrowKind)> {
    path.iter()
        .enumerate()
        .map(|(index, tile)| {
            let previous = if index > 0 { path[index - 1] } else { origin };
            let next = path.get(index + 1).copied();
            (*tile, translate(Some(previous), *tile, next))
        })
        .collect()
}

fn straight_arrow(delta: GridDelta) -> ArrowKind {
    match (delta.dx(), delta.dy()) {
        (0, 1) => ArrowKind::Up,
        (0, -1) => ArrowKind::Down,
        (1, 0) => ArrowKind::Right,
        (-1, 0) => ArrowKind::Left,
        _ => ArrowKind::None,
    }
}

fn stop_arrow(delta: GridDelta) -> ArrowKind {
    match (delta.dx(), delta.dy()) {
        (0, 1) => ArrowKind::UpStop,
        (0, -1) => ArrowKind::DownStop,
        (1, 0) => ArrowKind::RightStop,
        (-1, 0) => ArrowKind::LeftStop,
        _ => ArrowKind::None,
    }
}

fn corner_arrow(incoming: GridDelta, outgoing: GridDelta) -> ArrowKind {
    // The bend opens toward the side the route came from and the side it
    // leaves through; one of the two deltas is horizontal, the other
    // vertical.
    let open_left = incoming.dx() == 1 || outgoing.dx() == -1;
    let open_top = incoming.dy() == -1 || outgoing.dy() == 1;

    match (open_top, open_left) {
        (true, true) => ArrowKind::TopLeft,
        (true, false) => ArrowKind::TopRight,
        (false, true) => ArrowKind::BottomLeft,
        (false, false) => ArrowKind::BottomRight,
    }
}
