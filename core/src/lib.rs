#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Trap Labs engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams and immutable
//! snapshots; they never mutate the world directly.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "The Booby Trap Labs";

/// Number of tiles along each side of every level grid.
pub const GRID_SIZE: u32 = 10;

/// Maximum number of traps alive on a level at once.
pub const MAX_TRAPS: usize = 32;

/// Number of most recently placed traps that only warn and never damage.
pub const MAX_SHADOWS: usize = 2;

/// Health percentage removed by a single armed-trap collision.
pub const TRAP_DAMAGE: u32 = 20;

/// Health percentage the player starts each level with.
pub const FULL_HEALTH: u32 = 100;

/// Animation steps required to traverse a single tile.
///
/// Sprites are 64 pixels wide and advance 8 pixels per step.
pub const MOVEMENT_STEPS: u32 = 8;

/// Number of walking frames in the player sprite strip. Frame 0 is idle.
pub const PLAYER_WALK_FRAMES: u32 = 8;

/// Number of frames in the trap and shadow reveal strips.
pub const TRAP_REVEAL_FRAMES: u32 = 5;

/// Cell the player occupies when a level starts.
pub const START_POSITION: Position = Position::new(4, 4);

/// Direction the player faces when a level starts.
pub const START_FACING: Direction = Direction::Down;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Seeds the highest level reached from persistent storage.
    RestoreProgress {
        /// Highest level recorded by previous runs.
        highest_level: Level,
    },
    /// Starts a fresh run from the first level. Only honoured from the menu.
    StartRun,
    /// Dismisses the level introduction and starts accepting moves.
    BeginLevel,
    /// Requests that the player step one tile in the provided direction.
    MovePlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Advances player and trap animations by a number of discrete steps.
    AdvanceAnimation {
        /// Number of animation steps that elapsed since the previous tick.
        steps: u32,
    },
    /// Acknowledges a finished run and returns to the menu.
    Acknowledge,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Announces that a new run started.
    RunStarted,
    /// Announces that a level is ready and awaiting the player.
    LevelIntroduced {
        /// Level that was loaded.
        level: Level,
        /// Number of moves the player must survive to finish the level.
        step_budget: u32,
    },
    /// Confirms that the player dismissed the introduction.
    LevelBegan {
        /// Level that is now being played.
        level: Level,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: Position,
        /// Cell the player occupies after the move.
        to: Position,
        /// Direction the player travelled.
        direction: Direction,
    },
    /// Reports that a move request was refused without changing state.
    MoveRejected {
        /// Direction requested by the input.
        direction: Direction,
        /// Specific reason the move failed.
        reason: MoveRejection,
    },
    /// Announces that the player finished traversing into their cell.
    MovementFinished {
        /// Cell the player came to rest on.
        position: Position,
    },
    /// Confirms that a new shadow trap appeared.
    TrapPlaced {
        /// Cell holding the new trap.
        position: Position,
    },
    /// Announces that a trap left its shadow window and can now hurt.
    TrapArmed {
        /// Cell holding the armed trap.
        position: Position,
    },
    /// Reports that the oldest trap was removed to respect the cap.
    TrapEvicted {
        /// Cell the evicted trap occupied.
        position: Position,
    },
    /// Reports that the player stepped on an armed trap.
    PlayerDamaged {
        /// Cell where the collision happened.
        position: Position,
        /// Health remaining after the damage was applied.
        health: u32,
    },
    /// Reports the remaining step budget after an accepted move.
    StepsRemaining {
        /// Moves left before the level ends.
        steps: u32,
    },
    /// Announces that the player survived the whole step budget of a level.
    LevelCompleted {
        /// Level that was completed.
        level: Level,
    },
    /// Announces that the final level was completed.
    Victory {
        /// Level on which the run ended.
        level: Level,
    },
    /// Announces that the player ran out of health.
    GameOver {
        /// Level on which the run ended.
        level: Level,
    },
    /// Reports the highest level reached after a run ended.
    HighestLevelRecorded {
        /// Highest level reached across all runs.
        level: Level,
    },
    /// Confirms that the world returned to the menu.
    ReturnedToMenu,
}

/// One-based level number.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Level(u32);

impl Level {
    /// First level of every run.
    pub const FIRST: Level = Level(1);

    /// Creates a new level number. Zero denotes "no level reached".
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the level.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Level that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Location of a single grid tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    column: u32,
    row: u32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Reports whether the position lies inside a `GRID_SIZE` square grid.
    #[must_use]
    pub const fn in_bounds(&self) -> bool {
        self.column < GRID_SIZE && self.row < GRID_SIZE
    }

    /// Returns the adjacent position in `direction`.
    ///
    /// Yields `None` when the step would leave the grid.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Position> {
        let (column, row) = match direction {
            Direction::Up => (Some(self.column), self.row.checked_sub(1)),
            Direction::Down => (Some(self.column), self.row.checked_add(1)),
            Direction::Left => (self.column.checked_sub(1), Some(self.row)),
            Direction::Right => (self.column.checked_add(1), Some(self.row)),
        };
        let next = Position::new(column?, row?);
        next.in_bounds().then_some(next)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// All directions in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Lowercase name of the direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Unit offset of the direction as `(columns, rows)`.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(ParseDirectionError(s.to_owned())),
        }
    }
}

/// Error returned when a string does not name one of the four directions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseDirectionError(String);

impl fmt::Display for ParseDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a direction", self.0)
    }
}

impl std::error::Error for ParseDirectionError {}

/// Kind of tile composing a level layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Walkable tile that may hold a trap.
    Floor,
    /// Solid tile that can never be entered.
    Block,
}

/// Reasons a move request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRejection {
    /// The run is not in the playing state.
    NotPlaying,
    /// The previous move is still being animated.
    InProgress,
    /// The destination tile is a block.
    Blocked,
    /// The destination lies outside the grid.
    OutOfBounds,
}

/// Lifecycle state of the run controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunState {
    /// Waiting for the player to start a run.
    #[default]
    Menu,
    /// A level has been loaded and is being introduced.
    LevelIntro {
        /// Level being introduced.
        level: Level,
    },
    /// The player is moving through a level.
    Playing {
        /// Level being played.
        level: Level,
    },
    /// The final level was completed.
    Victory {
        /// Level on which the run ended.
        level: Level,
    },
    /// The player ran out of health.
    GameOver {
        /// Level on which the run ended.
        level: Level,
    },
}

impl RunState {
    /// Level associated with the state, if any.
    #[must_use]
    pub const fn level(&self) -> Option<Level> {
        match self {
            RunState::Menu => None,
            RunState::LevelIntro { level }
            | RunState::Playing { level }
            | RunState::Victory { level }
            | RunState::GameOver { level } => Some(*level),
        }
    }

    /// Returns `true` once a run has ended and awaits acknowledgement.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, RunState::Victory { .. } | RunState::GameOver { .. })
    }
}

/// Counters describing the progress of the current run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunStats {
    /// Level currently loaded, or zero while in the menu.
    pub level: Level,
    /// Moves left before the level ends.
    pub steps_remaining: u32,
    /// Health percentage in `0..=FULL_HEALTH`.
    pub health: u32,
    /// Highest level reached across runs.
    pub highest_level: Level,
}

/// In-flight traversal of the player between two tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Traversal {
    /// Tile the player is leaving.
    pub from: Position,
    /// Animation steps elapsed since the move was accepted.
    pub elapsed_steps: u32,
}

/// Immutable representation of the player used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlayerSnapshot {
    /// Logical tile the player occupies.
    pub position: Position,
    /// Direction the sprite faces.
    pub facing: Direction,
    /// Sprite frame to display; zero is the idle frame.
    pub frame: u32,
    /// Traversal in progress, if the movement lock is engaged.
    pub traversal: Option<Traversal>,
}

impl PlayerSnapshot {
    /// Returns `true` while the movement lock is engaged.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.traversal.is_some()
    }
}

/// Immutable representation of a single trap used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TrapSnapshot {
    /// Cell holding the trap.
    pub position: Position,
    /// Whether the trap damages the player.
    pub armed: bool,
    /// Reveal frame in `0..TRAP_REVEAL_FRAMES`.
    pub frame: u32,
}

/// Read-only snapshot describing all traps, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrapView {
    snapshots: Vec<TrapSnapshot>,
}

impl TrapView {
    /// Creates a new trap view from snapshots ordered oldest first.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<TrapSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured snapshots, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TrapSnapshot> {
        self.snapshots.iter()
    }

    /// Number of traps captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns `true` when no trap is on the grid.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TrapSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::{Command, Direction, Event, Level, MoveRejection, Position, RunState};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn step_moves_one_tile_in_each_direction() {
        let origin = Position::new(4, 4);
        assert_eq!(origin.step(Direction::Up), Some(Position::new(4, 3)));
        assert_eq!(origin.step(Direction::Down), Some(Position::new(4, 5)));
        assert_eq!(origin.step(Direction::Left), Some(Position::new(3, 4)));
        assert_eq!(origin.step(Direction::Right), Some(Position::new(5, 4)));
    }

    #[test]
    fn step_refuses_to_leave_the_grid() {
        assert_eq!(Position::new(0, 0).step(Direction::Up), None);
        assert_eq!(Position::new(0, 0).step(Direction::Left), None);
        assert_eq!(Position::new(9, 9).step(Direction::Down), None);
        assert_eq!(Position::new(9, 9).step(Direction::Right), None);
    }

    #[test]
    fn direction_parsing_accepts_only_cardinal_names() {
        assert_eq!("Up".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!(" right ".parse::<Direction>(), Ok(Direction::Right));
        assert!("north".parse::<Direction>().is_err());
        assert!("".parse::<Direction>().is_err());
    }

    #[test]
    fn delta_matches_step() {
        let origin = Position::new(5, 5);
        for direction in Direction::ALL {
            let (dx, dy) = direction.delta();
            let stepped = origin.step(direction).expect("interior step");
            assert_eq!(stepped.column() as i32 - origin.column() as i32, dx);
            assert_eq!(stepped.row() as i32 - origin.row() as i32, dy);
        }
    }

    #[test]
    fn run_state_reports_its_level() {
        assert_eq!(RunState::Menu.level(), None);
        let level = Level::new(2);
        assert_eq!(RunState::Playing { level }.level(), Some(level));
        assert!(RunState::GameOver { level }.is_terminal());
        assert!(!RunState::LevelIntro { level }.is_terminal());
    }

    #[test]
    fn messages_round_trip_through_bincode() {
        assert_round_trip(&Command::MovePlayer {
            direction: Direction::Left,
        });
        assert_round_trip(&Event::MoveRejected {
            direction: Direction::Up,
            reason: MoveRejection::Blocked,
        });
        assert_round_trip(&RunState::Victory {
            level: Level::new(3),
        });
    }
}
