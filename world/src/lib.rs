#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Trap Labs.

mod grid;
mod player;
mod traps;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};
use trap_labs_core::{
    Command, Direction, Event, Level, MoveRejection, RunState, FULL_HEALTH, TRAP_DAMAGE,
    WELCOME_BANNER,
};

pub use grid::{GridError, LayoutError, LevelCatalogue, LevelDefinition, LevelLayout};
pub use player::Player;
pub use traps::{TrapPlacement, TrapTracker};

/// Seed used for trap placement when none is configured.
pub const DEFAULT_TRAP_SEED: u64 = 0x7a1b_5eed_c0de_2013;

/// Configuration used to construct a [`World`].
#[derive(Clone, Debug)]
pub struct Config {
    catalogue: LevelCatalogue,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration from a level catalogue and a trap placement seed.
    #[must_use]
    pub const fn new(catalogue: LevelCatalogue, rng_seed: u64) -> Self {
        Self {
            catalogue,
            rng_seed,
        }
    }

    /// Levels played by each run.
    #[must_use]
    pub const fn catalogue(&self) -> &LevelCatalogue {
        &self.catalogue
    }

    /// Seed driving trap placement.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(LevelCatalogue::standard(), DEFAULT_TRAP_SEED)
    }
}

/// Represents the authoritative Trap Labs world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    catalogue: LevelCatalogue,
    rng: ChaCha8Rng,
    state: RunState,
    steps_remaining: u32,
    health: u32,
    highest_level: Level,
    traps: TrapTracker,
    player: Player,
}

impl World {
    /// Creates a world waiting in the menu.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            banner: WELCOME_BANNER,
            catalogue: config.catalogue,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            state: RunState::Menu,
            steps_remaining: 0,
            health: FULL_HEALTH,
            highest_level: Level::default(),
            traps: TrapTracker::new(),
            player: Player::new(),
        }
    }

    fn introduce_level(&mut self, level: Level, out_events: &mut Vec<Event>) {
        let Some(step_budget) = self.catalogue.level(level).map(LevelDefinition::step_budget)
        else {
            debug!(%level, "level missing from catalogue");
            return;
        };

        self.state = RunState::LevelIntro { level };
        self.steps_remaining = step_budget;
        self.health = FULL_HEALTH;
        self.traps.reset();
        self.player.reset();
        info!(%level, step_budget, "level introduced");
        out_events.push(Event::LevelIntroduced { level, step_budget });
    }

    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let RunState::Playing { level } = self.state else {
            debug!(?direction, state = ?self.state, "move ignored outside of play");
            out_events.push(Event::MoveRejected {
                direction,
                reason: MoveRejection::NotPlaying,
            });
            return;
        };
        let Some(definition) = self.catalogue.level(level) else {
            debug!(%level, "level missing from catalogue");
            return;
        };
        let layout = definition.layout();

        let from = self.player.position();
        let to = match self.player.attempt_move(direction, layout) {
            Ok(to) => to,
            Err(reason) => {
                debug!(?direction, ?reason, "move rejected");
                out_events.push(Event::MoveRejected { direction, reason });
                return;
            }
        };
        out_events.push(Event::PlayerMoved {
            from,
            to,
            direction,
        });

        let placement = self.traps.place_random_trap(layout, &mut self.rng);
        out_events.push(Event::TrapPlaced {
            position: placement.placed,
        });
        if let Some(position) = placement.evicted {
            out_events.push(Event::TrapEvicted { position });
        }
        if let Some(position) = placement.armed {
            out_events.push(Event::TrapArmed { position });
        }

        if self.traps.is_armed_at(to) {
            self.health = self.health.saturating_sub(TRAP_DAMAGE);
            debug!(position = %to, health = self.health, "player hit an armed trap");
            out_events.push(Event::PlayerDamaged {
                position: to,
                health: self.health,
            });
        }

        self.steps_remaining = self.steps_remaining.saturating_sub(1);
        out_events.push(Event::StepsRemaining {
            steps: self.steps_remaining,
        });

        if self.health == 0 {
            info!(%level, "game over");
            self.state = RunState::GameOver { level };
            out_events.push(Event::GameOver { level });
            self.record_highest(level, out_events);
        } else if self.steps_remaining == 0 {
            info!(%level, "level completed");
            out_events.push(Event::LevelCompleted { level });
            if level >= self.catalogue.last_level() {
                info!(%level, "victory");
                self.state = RunState::Victory { level };
                out_events.push(Event::Victory { level });
                self.record_highest(level, out_events);
            } else {
                self.introduce_level(level.next(), out_events);
            }
        }
    }

    fn record_highest(&mut self, reached: Level, out_events: &mut Vec<Event>) {
        self.highest_level = self.highest_level.max(reached);
        out_events.push(Event::HighestLevelRecorded {
            level: self.highest_level,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::RestoreProgress { highest_level } => {
            world.highest_level = world.highest_level.max(highest_level);
        }
        Command::StartRun => {
            if world.state != RunState::Menu {
                debug!(state = ?world.state, "start ignored outside of menu");
                return;
            }
            info!("run started");
            out_events.push(Event::RunStarted);
            world.introduce_level(Level::FIRST, out_events);
        }
        Command::BeginLevel => {
            let RunState::LevelIntro { level } = world.state else {
                debug!(state = ?world.state, "begin ignored outside of level intro");
                return;
            };
            world.state = RunState::Playing { level };
            out_events.push(Event::LevelBegan { level });
        }
        Command::MovePlayer { direction } => world.move_player(direction, out_events),
        Command::AdvanceAnimation { steps } => {
            if steps == 0 {
                return;
            }
            world.traps.advance_animation(steps);
            if world.player.advance_animation(steps) {
                out_events.push(Event::MovementFinished {
                    position: world.player.position(),
                });
            }
        }
        Command::Acknowledge => {
            if !world.state.is_terminal() {
                debug!(state = ?world.state, "acknowledge ignored while run is active");
                return;
            }
            world.state = RunState::Menu;
            out_events.push(Event::ReturnedToMenu);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use trap_labs_core::{
        Level, PlayerSnapshot, Position, RunState, RunStats, TileKind, TrapView,
    };

    use super::{GridError, LevelCatalogue, LevelLayout, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Current lifecycle state of the run.
    #[must_use]
    pub fn run_state(world: &World) -> RunState {
        world.state
    }

    /// Counters describing the run in progress.
    #[must_use]
    pub fn stats(world: &World) -> RunStats {
        RunStats {
            level: world.state.level().unwrap_or_default(),
            steps_remaining: world.steps_remaining,
            health: world.health,
            highest_level: world.highest_level,
        }
    }

    /// Highest level reached across runs.
    #[must_use]
    pub fn highest_level(world: &World) -> Level {
        world.highest_level
    }

    /// Captures the player for rendering.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot()
    }

    /// Captures every trap oldest first.
    #[must_use]
    pub fn trap_view(world: &World) -> TrapView {
        TrapView::from_snapshots(world.traps.snapshots())
    }

    /// Provides read-only access to the level catalogue.
    #[must_use]
    pub fn catalogue(world: &World) -> &LevelCatalogue {
        &world.catalogue
    }

    /// Layout of the level currently loaded, if any.
    #[must_use]
    pub fn current_layout(world: &World) -> Option<&LevelLayout> {
        let level = world.state.level()?;
        world
            .catalogue
            .level(level)
            .map(|definition| definition.layout())
    }

    /// Kind of the tile at `position` on `level`.
    pub fn tile_at(world: &World, level: Level, position: Position) -> Result<TileKind, GridError> {
        world.catalogue.tile_at(level, position)
    }
}
