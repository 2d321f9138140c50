#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a headless rps-tactics session.
//!
//! The adapter plays the roles the engine leaves to collaborators: it builds
//! a tile graph, places the controlled agent, steers it toward the nearest
//! enemy each round, and renders the event stream as text.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;

use rps_tactics_core::{
    AgentKind, AgentSnapshot, Command, Event, TileCoord, TileDescriptor,
};
use rps_tactics_system_arrows::{path_overlay, ArrowKind};
use rps_tactics_system_pathfinding::find_path;
use rps_tactics_system_turns::{Config, Turns, TurnState};
use rps_tactics_world::{self as world, query, World};

const TICK: Duration = Duration::from_millis(500);
const MAX_TICKS_PER_ROUND: usize = 200;

#[derive(Debug, Parser)]
#[command(name = "rps-tactics", about = "Headless rps-tactics demo session")]
struct Args {
    /// Columns in the generated tile graph.
    #[arg(long, default_value_t = 8)]
    columns: i32,

    /// Rows in the generated tile graph.
    #[arg(long, default_value_t = 8)]
    rows: i32,

    /// Autonomous agents dropped after the player places.
    #[arg(long, default_value_t = 3)]
    enemies: u32,

    /// Session seed; a random one is drawn when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Player rounds to play before stopping.
    #[arg(long, default_value_t = 6)]
    rounds: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    if args.columns < 2 || args.rows < 2 {
        bail!("the map needs at least two columns and two rows");
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    println!("session seed: {seed}");

    let mut session = Session::new(args, seed)?;
    session.run()
}

struct Session {
    world: World,
    turns: Turns,
    clock: Duration,
    rounds: u32,
}

impl Session {
    fn new(args: Args, seed: u64) -> Result<Self> {
        let mut session = Self {
            world: World::new(),
            turns: Turns::new(Config::new(args.enemies, TICK)),
            clock: Duration::ZERO,
            rounds: args.rounds,
        };

        session.submit(Command::ConfigureTileGraph {
            tiles: build_map(args.columns, args.rows),
            rng_seed: seed,
        });

        let start = TileCoord::new(args.columns / 2, args.rows / 2);
        let start = query::tile_graph(&session.world)
            .is_free(start)
            .then_some(start)
            .or_else(|| first_free_tile(&session.world))
            .context("the generated map has no free tile to place the player on")?;
        session.submit(Command::PlaceAgent {
            kind: AgentKind::Player,
            tile: Some(start),
        });

        Ok(session)
    }

    fn run(&mut self) -> Result<()> {
        for round in 1..=self.rounds {
            if !self.settle() {
                break;
            }

            println!("\n-- round {round} --");
            self.render();
            self.player_round();
        }

        let _ = self.settle();
        self.render();
        match self.turns.state() {
            TurnState::GameOver => println!("\nthe player fell; game over"),
            _ => println!("\nsession ended after {} rounds", self.rounds),
        }
        Ok(())
    }

    /// Advances simulated time until control returns to the player.
    /// Returns `false` once the session reached its terminal state.
    fn settle(&mut self) -> bool {
        for _ in 0..MAX_TICKS_PER_ROUND {
            match self.turns.state() {
                TurnState::PlayerTurn => return true,
                TurnState::GameOver => return false,
                _ => {}
            }
            self.clock += TICK;
            self.submit(Command::Tick { dt: TICK });
        }
        self.turns.state() == TurnState::PlayerTurn
    }

    /// Steers the player: attack an adjacent enemy, otherwise walk toward
    /// the nearest one, otherwise skip the round.
    fn player_round(&mut self) {
        let view = query::agent_view(&self.world);
        let Some(player) = view.player().cloned() else {
            return;
        };
        let Some(target) = nearest_enemy(&player, view.enemies()) else {
            println!("no enemies remain; the player rests");
            let mut commands = Vec::new();
            let _ = self.turns.skip_turn(&self.world, &mut commands);
            self.dispatch(commands);
            return;
        };

        let destination = if player.tile.manhattan_distance(target.tile) == 1 {
            Some(target.tile)
        } else {
            walk_destination(&self.world, &player, target.tile)
        };

        let mut commands = Vec::new();
        let accepted = match destination {
            Some(destination) => {
                self.print_route_preview(&player, destination);
                self.turns
                    .command_move(&self.world, player.id, destination, &mut commands)
            }
            None => false,
        };
        if !accepted {
            println!("no useful move available; skipping");
            let _ = self.turns.skip_turn(&self.world, &mut commands);
        }
        self.dispatch(commands);
    }

    fn print_route_preview(&self, player: &AgentSnapshot, destination: TileCoord) {
        let Some(range) = query::agent_range(&self.world, player.id) else {
            return;
        };
        let graph = query::tile_graph(&self.world);
        let path = find_path(&graph, player.tile, destination, range);
        if path.is_empty() {
            return;
        }

        let cues: Vec<String> = path_overlay(player.tile, &path)
            .into_iter()
            .map(|(tile, arrow)| {
                format!("({},{}) {}", tile.column(), tile.row(), arrow_glyph(arrow))
            })
            .collect();
        println!("route: {}", cues.join("  "));
    }

    fn submit(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.pump(events);
    }

    fn dispatch(&mut self, commands: Vec<Command>) {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        self.pump(events);
    }

    fn pump(&mut self, mut events: Vec<Event>) {
        loop {
            let mut commands = Vec::new();
            self.turns.handle(&events, &self.world, &mut commands);
            for event in &events {
                self.print_event(event);
            }
            if commands.is_empty() {
                break;
            }
            events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
    }

    fn print_event(&self, event: &Event) {
        if let Some(record) = event.action_record() {
            println!(
                "[{:>5.1}s] {:?} agent #{} -> {:?}",
                self.clock.as_secs_f32(),
                record.kind,
                record.agent.get(),
                record.action,
            );
        } else if let Event::AgentDamaged { target, life_left } = event {
            println!(
                "[{:>5.1}s] agent #{} took damage, {} life left",
                self.clock.as_secs_f32(),
                target.get(),
                life_left,
            );
        }
    }

    fn render(&self) {
        let graph = query::tile_graph(&self.world);
        let view = query::agent_view(&self.world);

        let coords: Vec<TileCoord> = graph.iter().map(|(coord, _)| coord).collect();
        let Some(min_column) = coords.iter().map(TileCoord::column).min() else {
            return;
        };
        let (max_column, min_row, max_row) = (
            coords.iter().map(TileCoord::column).max().unwrap_or(min_column),
            coords.iter().map(TileCoord::row).min().unwrap_or(0),
            coords.iter().map(TileCoord::row).max().unwrap_or(0),
        );

        let occupants: std::collections::HashMap<TileCoord, AgentKind> =
            view.iter().map(|agent| (agent.tile, agent.kind)).collect();

        for row in (min_row..=max_row).rev() {
            let mut line = String::new();
            for column in min_column..=max_column {
                let coord = TileCoord::new(column, row);
                let glyph = match occupants.get(&coord) {
                    Some(AgentKind::Player) => 'P',
                    Some(AgentKind::Enemy) => 'E',
                    None => match graph.tile(coord) {
                        Some(tile) if tile.blocked() => '#',
                        Some(_) => '.',
                        None => ' ',
                    },
                };
                line.push(glyph);
                line.push(' ');
            }
            println!("{line}");
        }

        if let Some(player) = view.player() {
            let compass = query::weapon_compass(&self.world, player.weapon);
            println!(
                "player holds {:?} (up {:?} / down {:?} / left {:?} / right {:?}), {} life",
                player.weapon, compass.up, compass.down, compass.left, compass.right, player.life,
            );
        }
    }
}

/// Lays out a rectangular graph with a climbable terrace along the east side
/// and a few scattered boulders.
fn build_map(columns: i32, rows: i32) -> Vec<TileDescriptor> {
    let terrace_start = columns - columns / 4 - 1;
    let mut descriptors = Vec::new();
    for column in 0..columns {
        for row in 0..rows {
            let coord = TileCoord::new(column, row);
            let elevation = if column >= terrace_start { 1 } else { 0 };
            let blocked = column % 4 == 1 && row % 3 == 2 && row != rows - 1;
            descriptors.push(TileDescriptor {
                coord,
                elevation,
                blocked,
            });
        }
    }
    descriptors
}

fn first_free_tile(world: &World) -> Option<TileCoord> {
    let graph = query::tile_graph(world);
    let mut coords: Vec<TileCoord> = graph.iter().map(|(coord, _)| coord).collect();
    coords.sort();
    coords.into_iter().find(|coord| graph.is_free(*coord))
}

fn nearest_enemy<'view>(
    player: &AgentSnapshot,
    enemies: impl Iterator<Item = &'view AgentSnapshot>,
) -> Option<&'view AgentSnapshot> {
    enemies.min_by_key(|enemy| (player.tile.manhattan_distance(enemy.tile), enemy.id))
}

/// Picks the free range tile closest to the target, preferring ones the
/// player can actually route to.
fn walk_destination(
    world: &World,
    player: &AgentSnapshot,
    target: TileCoord,
) -> Option<TileCoord> {
    let graph = query::tile_graph(world);
    let range: &HashSet<TileCoord> = query::agent_range(world, player.id)?;

    let mut candidates: Vec<TileCoord> = range
        .iter()
        .copied()
        .filter(|coord| *coord != player.tile && graph.is_free(*coord))
        .collect();
    candidates.sort();
    candidates.sort_by_key(|coord| coord.manhattan_distance(target));

    candidates
        .into_iter()
        .find(|coord| !find_path(&graph, player.tile, *coord, range).is_empty())
}

fn arrow_glyph(arrow: ArrowKind) -> &'static str {
    match arrow {
        ArrowKind::None => " ",
        ArrowKind::Up => "↑",
        ArrowKind::Down => "↓",
        ArrowKind::Left => "←",
        ArrowKind::Right => "→",
        ArrowKind::TopLeft => "⌐",
        ArrowKind::TopRight => "¬",
        ArrowKind::BottomLeft => "L",
        ArrowKind::BottomRight => "⌊",
        ArrowKind::UpStop => "⇑",
        ArrowKind::DownStop => "⇓",
        ArrowKind::LeftStop => "⇐",
        ArrowKind::RightStop => "⇒",
    }
}
