#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the rps-tactics engine.
//!
//! Every mutation of the game state is expressed as a [`Command`] and every
//! observable consequence as an [`Event`]. Adapters and systems never touch
//! world state directly: they submit commands, the world's `apply` entry
//! point executes them, and the resulting event stream plus the read-only
//! views defined here are all anyone else gets to see. The vocabulary types
//! for tiles, agents, and weapons live in this crate so the systems stay
//! free of dependencies on each other.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum elevation difference an agent can climb in a single step.
pub const MAX_CLIMB: i32 = 1;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Installs the tile graph handed over by the map-construction collaborator.
    ConfigureTileGraph {
        /// Descriptors for every tile the painted map produced.
        tiles: Vec<TileDescriptor>,
        /// Seed for the session RNG that shuffles weapon sequences and
        /// picks spawn tiles.
        rng_seed: u64,
    },
    /// Installs the stat profiles used when agents of each kind spawn.
    ConfigureAgentProfiles {
        /// Profile applied to the controlled agent.
        player: AgentProfile,
        /// Profile applied to autonomous agents.
        enemy: AgentProfile,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that an agent of the given kind be placed on the graph.
    PlaceAgent {
        /// Kind of agent to create.
        kind: AgentKind,
        /// Explicit starting tile, or `None` to draw a random free edge tile.
        tile: Option<TileCoord>,
    },
    /// Queues a walk route for an agent, front tile first.
    SetAgentPath {
        /// Identifier of the agent receiving the route.
        agent: AgentId,
        /// Ordered tiles from just-after-origin through the destination.
        path: Vec<TileCoord>,
    },
    /// Requests that an agent advance one tile along its queued route.
    AdvanceAgent {
        /// Identifier of the agent attempting to step.
        agent: AgentId,
    },
    /// Declares an attack from one agent against another.
    Attack {
        /// Agent initiating the attack.
        attacker: AgentId,
        /// Agent being attacked.
        target: AgentId,
    },
    /// Applies combat damage to an agent.
    ApplyDamage {
        /// Agent receiving the damage.
        target: AgentId,
        /// Amount of life to remove.
        amount: i32,
    },
    /// Enables or disables player-originated movement commands.
    SetPlayerControl {
        /// Whether the player may issue commands.
        enabled: bool,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a tile graph was installed.
    GraphConfigured {
        /// Number of tiles in the graph.
        tiles: usize,
        /// Number of tiles in the derived edge set.
        edge_tiles: usize,
    },
    /// Reports that a tile graph hand-over was rejected.
    GraphRejected {
        /// Specific reason the graph was refused.
        reason: GraphError,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an agent was placed on a tile for the first time.
    AgentSpawned {
        /// Identifier assigned to the agent.
        agent: AgentId,
        /// Kind of the spawned agent.
        kind: AgentKind,
        /// Tile the agent occupies after spawning.
        tile: TileCoord,
    },
    /// Reports that an agent placement request was rejected.
    SpawnRejected {
        /// Kind of agent requested.
        kind: AgentKind,
        /// Specific reason the placement failed.
        reason: SpawnError,
    },
    /// Confirms that an agent advanced one tile along its route.
    AgentStepped {
        /// Identifier of the agent that stepped.
        agent: AgentId,
        /// Tile the agent vacated.
        from: TileCoord,
        /// Tile the agent now occupies.
        to: TileCoord,
    },
    /// Confirms that an agent finished walking its queued route.
    AgentMoved {
        /// Identifier of the agent that settled.
        agent: AgentId,
        /// Kind of the settled agent.
        kind: AgentKind,
        /// Tile the agent settled on.
        tile: TileCoord,
    },
    /// Reports that a queued route or step was rejected.
    MoveRejected {
        /// Identifier of the agent whose move failed.
        agent: AgentId,
        /// Specific reason the move failed.
        reason: MoveError,
    },
    /// Announces that an agent's weapon changed after a completed move.
    WeaponRotated {
        /// Identifier of the agent holding the weapon.
        agent: AgentId,
        /// Weapon held after the rotation.
        weapon: Weapon,
    },
    /// Declares that one agent attacked another.
    AgentAttacked {
        /// Agent that initiated the attack.
        attacker: AgentId,
        /// Kind of the attacking agent.
        attacker_kind: AgentKind,
        /// Agent that was attacked.
        target: AgentId,
    },
    /// Confirms that damage was applied to an agent.
    AgentDamaged {
        /// Agent that received the damage.
        target: AgentId,
        /// Life remaining after the damage.
        life_left: i32,
    },
    /// Announces that an agent's life reached zero and it left the graph.
    AgentDied {
        /// Identifier of the removed agent.
        agent: AgentId,
        /// Kind of the removed agent.
        kind: AgentKind,
    },
    /// Announces that player-originated commands were enabled or disabled.
    PlayerControlChanged {
        /// Whether the player may now issue commands.
        enabled: bool,
    },
}

impl Event {
    /// Collapses the event into the agent-action record driving turn logic,
    /// if the event represents one of the four agent actions.
    #[must_use]
    pub fn action_record(&self) -> Option<ActionRecord> {
        match self {
            Event::AgentSpawned { agent, kind, .. } => {
                Some(ActionRecord::new(*agent, *kind, ActionKind::Spawn))
            }
            Event::AgentMoved { agent, kind, .. } => {
                Some(ActionRecord::new(*agent, *kind, ActionKind::Move))
            }
            Event::AgentAttacked {
                attacker,
                attacker_kind,
                ..
            } => Some(ActionRecord::new(
                *attacker,
                *attacker_kind,
                ActionKind::Attack,
            )),
            Event::AgentDied { agent, kind } => {
                Some(ActionRecord::new(*agent, *kind, ActionKind::Die))
            }
            _ => None,
        }
    }
}

/// Unique identifier assigned to an agent.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
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

/// Distinguishes the controlled agent from autonomous agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// The single player-controlled agent.
    Player,
    /// An autonomous agent hunting the player.
    Enemy,
}

/// The four agent actions that drive turn-state transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// First placement on a tile.
    Spawn,
    /// Completion of a queued route.
    Move,
    /// Declaration of an attack.
    Attack,
    /// Removal after life reached zero.
    Die,
}

/// Immutable record of a single agent action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActionRecord {
    /// Agent that acted.
    pub agent: AgentId,
    /// Kind of the acting agent.
    pub kind: AgentKind,
    /// Action that occurred.
    pub action: ActionKind,
}

impl ActionRecord {
    /// Creates a new action record.
    #[must_use]
    pub const fn new(agent: AgentId, kind: AgentKind, action: ActionKind) -> Self {
        Self { agent, kind, action }
    }
}

/// The three weapon kinds cycled by movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weapon {
    /// Beats scissors, loses to paper.
    Rock,
    /// Beats rock, loses to scissors.
    Paper,
    /// Beats paper, loses to rock.
    Scissors,
}

impl Weapon {
    /// All weapon kinds in declaration order.
    pub const ALL: [Weapon; 3] = [Weapon::Rock, Weapon::Paper, Weapon::Scissors];

    /// Reports whether this weapon defeats the other under the standard
    /// rock-paper-scissors relation.
    #[must_use]
    pub const fn beats(self, other: Weapon) -> bool {
        matches!(
            (self, other),
            (Weapon::Rock, Weapon::Scissors)
                | (Weapon::Scissors, Weapon::Paper)
                | (Weapon::Paper, Weapon::Rock)
        )
    }
}

/// Result of resolving two weapons against each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatOutcome {
    /// Equal weapons; nobody takes damage.
    Draw,
    /// The attacker's weapon wins.
    AttackerWins,
    /// The defender's weapon wins.
    DefenderWins,
}

/// The four weapons surrounding a given weapon on the movement compass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeaponCompass {
    /// Weapon held after stepping one tile up.
    pub up: Weapon,
    /// Weapon held after stepping one tile down.
    pub down: Weapon,
    /// Weapon held after stepping one tile left.
    pub left: Weapon,
    /// Weapon held after stepping one tile right.
    pub right: Weapon,
}

/// Location of a single tile expressed as column and row coordinates.
///
/// Painted map layers may anchor anywhere, so both components are signed.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TileCoord {
    column: i32,
    row: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Column index of the tile.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index of the tile.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Returns the coordinate shifted by the provided delta.
    #[must_use]
    pub const fn translated(self, delta: GridDelta) -> TileCoord {
        TileCoord::new(self.column + delta.dx, self.row + delta.dy)
    }
}

/// Signed per-step movement delta between two tiles.
///
/// Always derived as a pure function of the two coordinates involved; tiles
/// carry no back-links.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDelta {
    dx: i32,
    dy: i32,
}

impl GridDelta {
    /// The zero delta; rotating by it leaves a weapon unchanged.
    pub const ZERO: GridDelta = GridDelta::new(0, 0);

    /// Creates a delta from explicit axis components.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Derives the delta that carries `from` onto `to`.
    #[must_use]
    pub const fn between(from: TileCoord, to: TileCoord) -> GridDelta {
        GridDelta::new(to.column() - from.column(), to.row() - from.row())
    }

    /// Horizontal component of the delta.
    #[must_use]
    pub const fn dx(&self) -> i32 {
        self.dx
    }

    /// Vertical component of the delta.
    #[must_use]
    pub const fn dy(&self) -> i32 {
        self.dy
    }

    /// Reports whether both components are zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Stat profile applied to agents of one kind when they spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    max_life: i32,
    damage: i32,
    movement_range: u32,
    awareness: u32,
}

impl AgentProfile {
    /// Creates a profile from explicit stats.
    ///
    /// `awareness` is the step budget used when the agent's reachable range
    /// is recomputed; autonomous agents traditionally plan over a wider
    /// budget than they walk.
    #[must_use]
    pub const fn new(max_life: i32, damage: i32, movement_range: u32, awareness: u32) -> Self {
        Self {
            max_life,
            damage,
            movement_range,
            awareness,
        }
    }

    /// Life total an agent starts with.
    #[must_use]
    pub const fn max_life(&self) -> i32 {
        self.max_life
    }

    /// Damage dealt when the agent wins a combat round.
    #[must_use]
    pub const fn damage(&self) -> i32 {
        self.damage
    }

    /// Steps the agent may walk per completed move.
    #[must_use]
    pub const fn movement_range(&self) -> u32 {
        self.movement_range
    }

    /// Step budget used when recomputing the agent's reachable range.
    #[must_use]
    pub const fn awareness(&self) -> u32 {
        self.awareness
    }
}

/// Construction record for a single tile, handed over by the external
/// map-construction collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDescriptor {
    /// Grid coordinate of the tile.
    pub coord: TileCoord,
    /// Elevation derived from the tile's placement layer.
    pub elevation: i32,
    /// Whether the tile refuses all traversal.
    pub blocked: bool,
}

impl TileDescriptor {
    /// Creates a descriptor for an unblocked tile at the given elevation.
    #[must_use]
    pub const fn new(coord: TileCoord, elevation: i32) -> Self {
        Self {
            coord,
            elevation,
            blocked: false,
        }
    }

    /// Creates a descriptor for a blocked tile.
    #[must_use]
    pub const fn blocked_at(coord: TileCoord, elevation: i32) -> Self {
        Self {
            coord,
            elevation,
            blocked: true,
        }
    }
}

/// Mutable per-tile state owned by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileState {
    elevation: i32,
    blocked: bool,
    occupant: Option<AgentId>,
}

impl TileState {
    /// Creates an unoccupied tile with the provided terrain attributes.
    #[must_use]
    pub const fn new(elevation: i32, blocked: bool) -> Self {
        Self {
            elevation,
            blocked,
            occupant: None,
        }
    }

    /// Elevation of the tile.
    #[must_use]
    pub const fn elevation(&self) -> i32 {
        self.elevation
    }

    /// Whether the tile refuses all traversal.
    #[must_use]
    pub const fn blocked(&self) -> bool {
        self.blocked
    }

    /// Agent currently standing on the tile, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<AgentId> {
        self.occupant
    }

    /// Replaces the tile's occupant record.
    pub fn set_occupant(&mut self, occupant: Option<AgentId>) {
        self.occupant = occupant;
    }
}

/// Read-only view of the tile graph shared by the path finder, the range
/// finder, and the turn orchestrator.
#[derive(Clone, Copy, Debug)]
pub struct TileGraphView<'a> {
    tiles: &'a HashMap<TileCoord, TileState>,
}

impl<'a> TileGraphView<'a> {
    /// Captures a new view backed by the provided tile map.
    #[must_use]
    pub fn new(tiles: &'a HashMap<TileCoord, TileState>) -> Self {
        Self { tiles }
    }

    /// Number of tiles in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether the graph holds no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Retrieves the state of the tile at the provided coordinate.
    #[must_use]
    pub fn tile(&self, coord: TileCoord) -> Option<&'a TileState> {
        self.tiles.get(&coord)
    }

    /// Reports whether the graph contains a tile at the coordinate.
    #[must_use]
    pub fn contains(&self, coord: TileCoord) -> bool {
        self.tiles.contains_key(&coord)
    }

    /// Returns the agent occupying the provided tile, if any.
    #[must_use]
    pub fn occupant(&self, coord: TileCoord) -> Option<AgentId> {
        self.tiles.get(&coord).and_then(TileState::occupant)
    }

    /// Reports whether an agent could settle on the tile: it exists, is not
    /// blocked terrain, and carries no occupant.
    #[must_use]
    pub fn is_free(&self, coord: TileCoord) -> bool {
        self.tiles
            .get(&coord)
            .map_or(false, |tile| !tile.blocked() && tile.occupant().is_none())
    }

    /// Orthogonal neighbors whose elevation differs from the origin's by at
    /// most [`MAX_CLIMB`]. Blocked and occupied tiles are still neighbors;
    /// traversal constraints are applied by the path finder.
    #[must_use]
    pub fn neighbors(&self, coord: TileCoord) -> NeighborIter {
        let mut neighbors = NeighborIter::default();
        let Some(origin) = self.tiles.get(&coord) else {
            return neighbors;
        };

        const SIDES: [GridDelta; 4] = [
            GridDelta::new(1, 0),
            GridDelta::new(-1, 0),
            GridDelta::new(0, 1),
            GridDelta::new(0, -1),
        ];

        for delta in SIDES {
            let candidate = coord.translated(delta);
            if let Some(tile) = self.tiles.get(&candidate) {
                if (tile.elevation() - origin.elevation()).abs() <= MAX_CLIMB {
                    neighbors.push(candidate);
                }
            }
        }

        neighbors
    }

    /// Reports whether the tile sits on the graph's edge: it has fewer than
    /// four elevation-compatible neighbors.
    #[must_use]
    pub fn is_edge(&self, coord: TileCoord) -> bool {
        self.contains(coord) && self.neighbors(coord).count() < 4
    }

    /// Iterator over all tiles in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, &'a TileState)> {
        self.tiles.iter().map(|(coord, tile)| (*coord, tile))
    }
}

/// Fixed-capacity iterator over the up-to-four neighbors of a tile.
#[derive(Clone, Debug, Default)]
pub struct NeighborIter {
    buffer: [Option<TileCoord>; 4],
    len: usize,
    cursor: usize,
}

impl NeighborIter {
    fn push(&mut self, coord: TileCoord) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(coord);
            self.len += 1;
        }
    }
}

impl Iterator for NeighborIter {
    type Item = TileCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}

/// Immutable representation of a single agent's state used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentSnapshot {
    /// Unique identifier assigned to the agent.
    pub id: AgentId,
    /// Kind of the agent.
    pub kind: AgentKind,
    /// Tile currently occupied by the agent.
    pub tile: TileCoord,
    /// Weapon the agent currently holds.
    pub weapon: Weapon,
    /// Life remaining.
    pub life: i32,
    /// Life the agent started with.
    pub max_life: i32,
    /// Damage the agent deals when it wins combat.
    pub damage: i32,
    /// Steps the agent may walk per completed move.
    pub movement_range: u32,
    /// Head of the queued route, if any.
    pub next_hop: Option<TileCoord>,
    /// Indicates whether the agent accrued enough time to advance.
    pub ready_for_step: bool,
    /// Duration accumulated toward the next step.
    pub accumulated: Duration,
}

/// Read-only snapshot describing all agents on the graph.
#[derive(Clone, Debug, Default)]
pub struct AgentView {
    snapshots: Vec<AgentSnapshot>,
}

impl AgentView {
    /// Creates a new agent view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AgentSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter()
    }

    /// Retrieves the snapshot for a specific agent.
    #[must_use]
    pub fn get(&self, agent: AgentId) -> Option<&AgentSnapshot> {
        self.snapshots
            .binary_search_by_key(&agent, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Retrieves the controlled agent's snapshot, if it is alive.
    #[must_use]
    pub fn player(&self) -> Option<&AgentSnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.kind == AgentKind::Player)
    }

    /// Iterator over the autonomous agents in identifier order.
    pub fn enemies(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.kind == AgentKind::Enemy)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AgentSnapshot> {
        self.snapshots
    }
}

/// Reasons a tile graph hand-over may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum GraphError {
    /// The descriptor list contained no tiles.
    #[error("tile graph contains no tiles")]
    Empty,
    /// Two descriptors named the same coordinate.
    #[error("duplicate tile descriptor at {0:?}")]
    DuplicateTile(TileCoord),
    /// No tile qualifies as an edge tile, so nothing could ever spawn.
    #[error("tile graph has no edge tiles")]
    NoEdgeTiles,
}

/// Reasons an agent placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum SpawnError {
    /// No tile graph has been configured yet.
    #[error("no tile graph configured")]
    GraphNotConfigured,
    /// Every edge tile already carries an occupant.
    #[error("no free edge tile available")]
    NoFreeEdgeTile,
    /// The requested tile does not exist in the graph.
    #[error("unknown tile {0:?}")]
    UnknownTile(TileCoord),
    /// The requested tile is blocked terrain.
    #[error("tile {0:?} is blocked")]
    TileBlocked(TileCoord),
    /// The requested tile already carries an occupant.
    #[error("tile {0:?} is occupied")]
    TileOccupied(TileCoord),
}

/// Reasons a queued route or step may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum MoveError {
    /// No agent with the provided identifier exists.
    #[error("unknown agent")]
    UnknownAgent,
    /// A route tile does not exist in the graph.
    #[error("tile {0:?} lies outside the graph")]
    OutsideGraph(TileCoord),
    /// Two consecutive route tiles are not climbable neighbors.
    #[error("no traversable step from {from:?} to {to:?}")]
    DisconnectedStep {
        /// Tile the step would leave.
        from: TileCoord,
        /// Tile the step would enter.
        to: TileCoord,
    },
    /// The next tile already carries an occupant.
    #[error("tile {0:?} is occupied")]
    DestinationOccupied(TileCoord),
    /// The next tile is blocked terrain.
    #[error("tile {0:?} is blocked")]
    Blocked(TileCoord),
}
