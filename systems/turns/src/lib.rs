#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn-orchestration state machine sequencing spawn, movement, and combat.
//!
//! The orchestrator reacts to agent action events and drives the
//! spawn → player-move → enemy-wave → combat cycle. Multi-step sequences are
//! expressed as pending actions carrying fire times on a simulated clock, so
//! tests advance time explicitly and assert states instead of waiting on
//! real delays.

use std::collections::BTreeSet;
use std::time::Duration;

use rps_tactics_core::{AgentId, AgentKind, Command, Event, TileCoord};
use rps_tactics_system_combat::damage_command;
use rps_tactics_system_pathfinding::find_path;
use rps_tactics_world::{query, World};

/// Configuration parameters required to construct the orchestrator.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    enemy_count: u32,
    action_delay: Duration,
}

impl Config {
    /// Creates a new configuration from the wave size and the base delay
    /// separating sequential agent actions.
    #[must_use]
    pub const fn new(enemy_count: u32, action_delay: Duration) -> Self {
        Self {
            enemy_count,
            action_delay,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// Named states of the turn cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnState {
    /// Waiting for the hosting collaborator to place the controlled agent.
    AwaitingPlacement,
    /// The controlled agent may move or skip.
    PlayerTurn,
    /// Autonomous agents are spawning or acting in sequence.
    EnemyWave,
    /// An attack is being resolved with its presentation delay.
    Combat,
    /// The controlled agent died; the cycle is over.
    GameOver,
}

/// Turn orchestrator reacting to world events with new command batches.
#[derive(Debug)]
pub struct Turns {
    config: Config,
    state: TurnState,
    resume: Option<TurnState>,
    clock: Duration,
    pending: Vec<Pending>,
    next_sequence: u64,
    wave: WaveTracker,
    walkers: BTreeSet<AgentId>,
}

impl Turns {
    /// Creates a new orchestrator using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: TurnState::AwaitingPlacement,
            resume: None,
            clock: Duration::ZERO,
            pending: Vec::new(),
            next_sequence: 0,
            wave: WaveTracker::default(),
            walkers: BTreeSet::new(),
        }
    }

    /// Current state of the turn cycle.
    #[must_use]
    pub const fn state(&self) -> TurnState {
        self.state
    }

    /// Consumes world events and emits the next command batch.
    pub fn handle(&mut self, events: &[Event], world: &World, out: &mut Vec<Command>) {
        if self.state == TurnState::GameOver {
            return;
        }

        for event in events {
            self.observe(event, out);
            if self.state == TurnState::GameOver {
                self.pending.clear();
                return;
            }
        }

        self.drain_due_tasks(world, out);
        self.drive_walkers(world, out);
        self.finish_wave_if_done(out);
    }

    /// Resolves a player move request into a queued walk or an immediate
    /// attack. Returns whether the request produced any action.
    ///
    /// Requests are refused outside the player's turn, while control is
    /// locked, while a walk is in flight, for destinations outside the
    /// current range set, and when no route exists.
    pub fn command_move(
        &mut self,
        world: &World,
        agent: AgentId,
        destination: TileCoord,
        out: &mut Vec<Command>,
    ) -> bool {
        if self.state != TurnState::PlayerTurn || self.walkers.contains(&agent) {
            return false;
        }
        if !query::player_control(world) {
            return false;
        }

        let view = query::agent_view(world);
        let Some(snapshot) = view.get(agent) else {
            return false;
        };
        if snapshot.kind != AgentKind::Player || snapshot.tile == destination {
            return false;
        }
        let Some(range) = query::agent_range(world, agent) else {
            return false;
        };
        if !range.contains(&destination) {
            return false;
        }

        let graph = query::tile_graph(world);
        let path = find_path(&graph, snapshot.tile, destination, range);
        if path.is_empty() {
            return false;
        }

        if let Some(target) = graph.occupant(destination) {
            if path.len() == 1 {
                out.push(Command::Attack {
                    attacker: agent,
                    target,
                });
                return true;
            }
            // An occupied destination can only be attacked from an
            // adjacent tile, never settled on.
            return false;
        }

        out.push(Command::SetAgentPath { agent, path });
        let _ = self.walkers.insert(agent);
        true
    }

    /// Forwards the player's turn without moving, handing the round to the
    /// enemy wave. Returns whether the skip was accepted.
    pub fn skip_turn(&mut self, world: &World, out: &mut Vec<Command>) -> bool {
        if self.state != TurnState::PlayerTurn || !self.walkers.is_empty() {
            return false;
        }
        if !query::player_control(world) {
            return false;
        }

        tracing::info!("player skipped the turn");
        self.begin_enemy_turn(out);
        true
    }

    fn begin_enemy_turn(&mut self, out: &mut Vec<Command>) {
        out.push(Command::SetPlayerControl { enabled: false });
        self.state = TurnState::EnemyWave;
        self.schedule(
            self.clock + self.config.action_delay * 3,
            Task::BeginWave,
        );
    }

    fn observe(&mut self, event: &Event, out: &mut Vec<Command>) {
        match event {
            Event::TimeAdvanced { dt } => {
                self.clock = self.clock.saturating_add(*dt);
            }
            Event::AgentSpawned {
                kind: AgentKind::Player,
                ..
            } => {
                if self.state == TurnState::AwaitingPlacement {
                    tracing::info!("player placed; dropping the enemy wave");
                    out.push(Command::SetPlayerControl { enabled: false });
                    self.state = TurnState::EnemyWave;
                    for index in 0..self.config.enemy_count {
                        self.schedule(
                            self.clock + self.config.action_delay * (index + 1),
                            Task::SpawnEnemy,
                        );
                    }
                    let spawns_done = self.config.action_delay * (self.config.enemy_count + 1);
                    self.schedule(
                        self.clock + spawns_done + self.config.action_delay * 3,
                        Task::BeginWave,
                    );
                }
            }
            Event::AgentMoved {
                agent,
                kind: AgentKind::Player,
                ..
            } => {
                let _ = self.walkers.remove(agent);
                if self.state == TurnState::PlayerTurn {
                    tracing::info!("player settled; enemy turn");
                    self.begin_enemy_turn(out);
                }
            }
            Event::AgentMoved {
                agent,
                kind: AgentKind::Enemy,
                ..
            } => {
                let _ = self.walkers.remove(agent);
                self.wave.complete(*agent);
            }
            Event::MoveRejected { agent, reason } => {
                tracing::debug!(agent = agent.get(), %reason, "move rejected");
                let _ = self.walkers.remove(agent);
                self.wave.complete(*agent);
            }
            Event::AgentAttacked {
                attacker, target, ..
            } => {
                if self.state != TurnState::Combat {
                    self.resume = Some(self.state);
                }
                self.state = TurnState::Combat;
                self.wave.complete(*attacker);
                self.schedule(
                    self.clock + self.config.action_delay * 2,
                    Task::ResolveCombat {
                        attacker: *attacker,
                        target: *target,
                    },
                );
            }
            Event::AgentDied { agent, kind } => match kind {
                AgentKind::Player => {
                    tracing::info!("player died; game over");
                    self.state = TurnState::GameOver;
                    self.pending.clear();
                    self.wave.reset();
                }
                AgentKind::Enemy => {
                    self.wave.complete(*agent);
                    self.pending.retain(|pending| {
                        !matches!(pending.task, Task::CommandEnemy { agent: id } if id == *agent)
                    });
                    let _ = self.walkers.remove(agent);
                }
            },
            _ => {}
        }
    }

    fn drain_due_tasks(&mut self, world: &World, out: &mut Vec<Command>) {
        loop {
            let due = self
                .pending
                .iter()
                .enumerate()
                .filter(|(_, pending)| pending.fire_at <= self.clock)
                .min_by_key(|(_, pending)| (pending.fire_at, pending.sequence))
                .map(|(index, _)| index);
            let Some(index) = due else {
                break;
            };

            let pending = self.pending.remove(index);
            self.run_task(pending.task, world, out);
        }
    }

    fn run_task(&mut self, task: Task, world: &World, out: &mut Vec<Command>) {
        match task {
            Task::SpawnEnemy => {
                out.push(Command::PlaceAgent {
                    kind: AgentKind::Enemy,
                    tile: None,
                });
            }
            Task::BeginWave => {
                let view = query::agent_view(world);
                let enemies: Vec<AgentId> = view.enemies().map(|snapshot| snapshot.id).collect();
                tracing::info!(enemies = enemies.len(), "enemy wave advancing");
                for (offset, agent) in enemies.iter().enumerate() {
                    self.schedule(
                        self.clock + self.config.action_delay * offset as u32,
                        Task::CommandEnemy { agent: *agent },
                    );
                }
                self.wave.begin(enemies);
            }
            Task::CommandEnemy { agent } => self.command_enemy(agent, world, out),
            Task::ResolveCombat { attacker, target } => {
                let view = query::agent_view(world);
                if let (Some(attacker), Some(defender)) = (view.get(attacker), view.get(target)) {
                    match damage_command(attacker, defender) {
                        Some(command) => out.push(command),
                        None => tracing::info!("combat drawn; no damage"),
                    }
                }

                // Stay in combat while further resolutions are queued.
                let more_combat = self
                    .pending
                    .iter()
                    .any(|pending| matches!(pending.task, Task::ResolveCombat { .. }));
                if !more_combat {
                    self.state = self.resume.take().unwrap_or(TurnState::PlayerTurn);
                }
            }
        }
    }

    /// Walks one enemy toward the player: adjacent targets are attacked,
    /// unreachable ones skip the round, everything else walks a truncated
    /// route that stops next to the player at the latest.
    fn command_enemy(&mut self, agent: AgentId, world: &World, out: &mut Vec<Command>) {
        let view = query::agent_view(world);
        let Some(enemy) = view.get(agent) else {
            self.wave.complete(agent);
            return;
        };
        let Some(player) = view.player() else {
            return;
        };
        let Some(range) = query::agent_range(world, agent) else {
            self.wave.complete(agent);
            return;
        };

        let graph = query::tile_graph(world);
        let path = find_path(&graph, enemy.tile, player.tile, range);

        if path.is_empty() {
            tracing::debug!(agent = agent.get(), "no route toward the player; turn skipped");
            self.wave.complete(agent);
        } else if path.len() == 1 {
            out.push(Command::Attack {
                attacker: agent,
                target: player.id,
            });
        } else {
            let steps = (path.len() - 1).min(enemy.movement_range as usize);
            if steps == 0 {
                // A zero-range profile leaves the enemy standing.
                self.wave.complete(agent);
                return;
            }
            let route: Vec<TileCoord> = path.into_iter().take(steps).collect();
            out.push(Command::SetAgentPath { agent, path: route });
            let _ = self.walkers.insert(agent);
        }
    }

    fn drive_walkers(&mut self, world: &World, out: &mut Vec<Command>) {
        if self.walkers.is_empty() {
            return;
        }

        let view = query::agent_view(world);
        let mut gone = Vec::new();
        for &agent in &self.walkers {
            match view.get(agent) {
                Some(snapshot) if snapshot.next_hop.is_some() && snapshot.ready_for_step => {
                    out.push(Command::AdvanceAgent { agent });
                }
                Some(_) => {}
                None => gone.push(agent),
            }
        }
        for agent in gone {
            let _ = self.walkers.remove(&agent);
        }
    }

    fn finish_wave_if_done(&mut self, out: &mut Vec<Command>) {
        if self.state == TurnState::EnemyWave && self.wave.is_done() {
            tracing::info!("wave complete; control returns to the player");
            self.wave.reset();
            self.state = TurnState::PlayerTurn;
            out.push(Command::SetPlayerControl { enabled: true });
        }
    }

    fn schedule(&mut self, fire_at: Duration, task: Task) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.pending.push(Pending {
            fire_at,
            sequence,
            task,
        });
    }
}

#[derive(Clone, Copy, Debug)]
struct Pending {
    fire_at: Duration,
    sequence: u64,
    task: Task,
}

#[derive(Clone, Copy, Debug)]
enum Task {
    SpawnEnemy,
    BeginWave,
    CommandEnemy { agent: AgentId },
    ResolveCombat { attacker: AgentId, target: AgentId },
}

#[derive(Debug, Default)]
struct WaveTracker {
    active: bool,
    outstanding: Vec<AgentId>,
}

impl WaveTracker {
    fn begin(&mut self, enemies: Vec<AgentId>) {
        self.active = true;
        self.outstanding = enemies;
    }

    fn complete(&mut self, agent: AgentId) {
        self.outstanding.retain(|entry| *entry != agent);
    }

    fn is_done(&self) -> bool {
        self.active && self.outstanding.is_empty()
    }

    fn reset(&mut self) {
        self.active = false;
        self.outstanding.clear();
    }
}
