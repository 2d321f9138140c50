//! Tile graph storage and occupancy bookkeeping used by the world crate.

use std::collections::HashMap;

use rps_tactics_core::{AgentId, GraphError, TileCoord, TileDescriptor, TileGraphView, TileState};

/// Conflicts detected when an agent tries to claim a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OccupyConflict {
    /// The coordinate names no tile.
    Missing,
    /// The tile is blocked terrain.
    Blocked,
    /// Another agent already stands on the tile.
    Occupied,
}

/// Coordinate-keyed tile map plus the derived edge set.
///
/// Topology is immutable after construction; only per-tile occupancy
/// changes during play.
#[derive(Clone, Debug, Default)]
pub(crate) struct TileGraph {
    tiles: HashMap<TileCoord, TileState>,
    edge_tiles: Vec<TileCoord>,
}

impl TileGraph {
    /// Builds a graph from the map collaborator's descriptors and derives
    /// the edge set. Fails loudly on empty input, duplicate coordinates,
    /// or a graph without edge tiles, since spawning would be undefined.
    pub(crate) fn from_descriptors(descriptors: &[TileDescriptor]) -> Result<Self, GraphError> {
        if descriptors.is_empty() {
            return Err(GraphError::Empty);
        }

        let mut tiles = HashMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let state = TileState::new(descriptor.elevation, descriptor.blocked);
            if tiles.insert(descriptor.coord, state).is_some() {
                return Err(GraphError::DuplicateTile(descriptor.coord));
            }
        }

        let mut edge_tiles: Vec<TileCoord> = {
            let view = TileGraphView::new(&tiles);
            tiles
                .keys()
                .copied()
                .filter(|coord| view.is_edge(*coord))
                .collect()
        };
        edge_tiles.sort();

        if edge_tiles.is_empty() {
            return Err(GraphError::NoEdgeTiles);
        }

        Ok(Self { tiles, edge_tiles })
    }

    pub(crate) fn view(&self) -> TileGraphView<'_> {
        TileGraphView::new(&self.tiles)
    }

    pub(crate) fn len(&self) -> usize {
        self.tiles.len()
    }

    pub(crate) fn is_configured(&self) -> bool {
        !self.tiles.is_empty()
    }

    /// Edge tiles in coordinate order, so random draws replay under a
    /// fixed seed.
    pub(crate) fn edge_tiles(&self) -> &[TileCoord] {
        &self.edge_tiles
    }

    /// Claims a tile for an agent. Conflicts are reported instead of
    /// silently overwriting the previous occupant.
    pub(crate) fn occupy(&mut self, coord: TileCoord, agent: AgentId) -> Result<(), OccupyConflict> {
        let Some(tile) = self.tiles.get_mut(&coord) else {
            return Err(OccupyConflict::Missing);
        };
        if tile.blocked() {
            return Err(OccupyConflict::Blocked);
        }
        if tile.occupant().is_some() {
            return Err(OccupyConflict::Occupied);
        }
        tile.set_occupant(Some(agent));
        Ok(())
    }

    /// Releases a tile. Paired with [`TileGraph::occupy`] by every mover.
    pub(crate) fn vacate(&mut self, coord: TileCoord) {
        if let Some(tile) = self.tiles.get_mut(&coord) {
            tile.set_occupant(None);
        }
    }
}
