#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Trap Labs adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use trap_labs_core::{
    Direction, Level, PlayerSnapshot, Position, RunState, RunStats, TileKind, TrapSnapshot,
    GRID_SIZE, MOVEMENT_STEPS,
};

/// Side length of a tile sprite in pixels.
pub const TILE_SIZE_PIXELS: f32 = 64.0;

/// Default side length of a single direction pad button in pixels.
pub const DEFAULT_PAD_BUTTON_PIXELS: f32 = 64.0;

const TILE_COUNT: usize = (GRID_SIZE * GRID_SIZE) as usize;

/// Top-left pixel of the tile at `position`.
#[must_use]
pub fn tile_origin(position: Position) -> Vec2 {
    Vec2::new(position.column() as f32, position.row() as f32) * TILE_SIZE_PIXELS
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Direction requested through the keyboard.
    pub direction: Option<Direction>,
    /// Pointer press expressed in pad pixel space.
    pub pointer: Option<Vec2>,
    /// Whether the adapter detected a confirmation on this frame.
    pub confirm: bool,
    /// Whether the adapter detected a mute toggle on this frame.
    pub toggle_mute: bool,
    /// Whether the player asked to leave.
    pub quit: bool,
}

impl FrameInput {
    /// Direction requested this frame, mapping pointer presses through `pad`.
    ///
    /// Keyboard directions take precedence over pointer presses.
    #[must_use]
    pub fn direction_with(&self, pad: &DirectionPad) -> Option<Direction> {
        self.direction
            .or_else(|| self.pointer.and_then(|point| pad.direction_at(point)))
    }

    /// Returns `true` when the frame carries no request at all.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// On-screen 2x2 button grid laid out as `Up Right` over `Left Down`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionPad {
    origin: Vec2,
    button_size: f32,
}

impl DirectionPad {
    /// Creates a pad whose top-left corner sits at `origin`.
    pub fn new(origin: Vec2, button_size: f32) -> Result<Self, RenderingError> {
        if !button_size.is_finite() || button_size <= 0.0 {
            return Err(RenderingError::InvalidButtonSize { button_size });
        }
        Ok(Self {
            origin,
            button_size,
        })
    }

    /// Direction of the button under `point`, if any.
    #[must_use]
    pub fn direction_at(&self, point: Vec2) -> Option<Direction> {
        let local = (point - self.origin) / self.button_size;
        if !(0.0..2.0).contains(&local.x) || !(0.0..2.0).contains(&local.y) {
            return None;
        }
        let column = local.x.floor() as u32;
        let row = local.y.floor() as u32;
        match (column, row) {
            (0, 0) => Some(Direction::Up),
            (1, 0) => Some(Direction::Right),
            (0, 1) => Some(Direction::Left),
            (1, 1) => Some(Direction::Down),
            _ => None,
        }
    }

    /// Centre of the button bound to `direction`.
    #[must_use]
    pub fn button_center(&self, direction: Direction) -> Vec2 {
        let cell = match direction {
            Direction::Up => Vec2::new(0.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
            Direction::Left => Vec2::new(0.0, 1.0),
            Direction::Down => Vec2::new(1.0, 1.0),
        };
        self.origin + (cell + Vec2::splat(0.5)) * self.button_size
    }
}

impl Default for DirectionPad {
    fn default() -> Self {
        Self {
            origin: Vec2::ZERO,
            button_size: DEFAULT_PAD_BUTTON_PIXELS,
        }
    }
}

/// Trap as drawn on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrapPresentation {
    /// Cell holding the trap.
    pub position: Position,
    /// Whether the trap is drawn with the armed strip instead of the shadow strip.
    pub armed: bool,
    /// Reveal frame to draw.
    pub frame: u32,
}

impl From<TrapSnapshot> for TrapPresentation {
    fn from(snapshot: TrapSnapshot) -> Self {
        Self {
            position: snapshot.position,
            armed: snapshot.armed,
            frame: snapshot.frame,
        }
    }
}

/// Player sprite placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerPresentation {
    /// Logical tile of the player.
    pub position: Position,
    /// Direction selecting the sprite row.
    pub facing: Direction,
    /// Walking frame; zero is idle.
    pub frame: u32,
    /// Pixel position of the sprite's top-left corner.
    pub pixel: Vec2,
}

impl From<PlayerSnapshot> for PlayerPresentation {
    fn from(snapshot: PlayerSnapshot) -> Self {
        let target = tile_origin(snapshot.position);
        let pixel = snapshot.traversal.map_or(target, |traversal| {
            let progress =
                (traversal.elapsed_steps.min(MOVEMENT_STEPS) as f32) / MOVEMENT_STEPS as f32;
            tile_origin(traversal.from).lerp(target, progress)
        });
        Self {
            position: snapshot.position,
            facing: snapshot.facing,
            frame: snapshot.frame,
            pixel,
        }
    }
}

/// Statistics board shown next to the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hud {
    /// Level being played.
    pub level: Level,
    /// Moves left before the level ends.
    pub steps_to_go: u32,
    /// Health percentage.
    pub health: u32,
    /// Highest level reached across runs.
    pub highest_level: Level,
}

impl From<RunStats> for Hud {
    fn from(stats: RunStats) -> Self {
        Self {
            level: stats.level,
            steps_to_go: stats.steps_remaining,
            health: stats.health,
            highest_level: stats.highest_level,
        }
    }
}

/// Scene description combining the level, its inhabitants and the HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    tiles: Vec<TileKind>,
    /// Traps ordered oldest first.
    pub traps: Vec<TrapPresentation>,
    /// Player sprite, absent while no level is loaded.
    pub player: Option<PlayerPresentation>,
    /// Statistics board.
    pub hud: Hud,
    /// Lifecycle state selecting the overlay to draw.
    pub run_state: RunState,
    /// Whether sound is muted.
    pub muted: bool,
    /// Transient messages to show on this frame.
    pub notes: Vec<String>,
}

impl Scene {
    /// Creates a scene from row-major tiles.
    ///
    /// `tiles` must be empty, when no level is loaded, or cover the whole grid.
    pub fn new(
        tiles: Vec<TileKind>,
        traps: Vec<TrapPresentation>,
        player: Option<PlayerPresentation>,
        hud: Hud,
        run_state: RunState,
    ) -> Result<Self, RenderingError> {
        if !tiles.is_empty() && tiles.len() != TILE_COUNT {
            return Err(RenderingError::TileCount { found: tiles.len() });
        }
        Ok(Self {
            tiles,
            traps,
            player,
            hud,
            run_state,
            muted: false,
            notes: Vec::new(),
        })
    }

    /// Scene shown before any level has been loaded.
    #[must_use]
    pub fn menu() -> Self {
        Self {
            tiles: Vec::new(),
            traps: Vec::new(),
            player: None,
            hud: Hud::default(),
            run_state: RunState::Menu,
            muted: false,
            notes: Vec::new(),
        }
    }

    /// Returns `true` when a level layout is part of the scene.
    #[must_use]
    pub fn has_grid(&self) -> bool {
        !self.tiles.is_empty()
    }

    /// Tile at `position`, if a level is loaded.
    #[must_use]
    pub fn tile(&self, position: Position) -> Option<TileKind> {
        if !position.in_bounds() {
            return None;
        }
        let index = (position.row() * GRID_SIZE + position.column()) as usize;
        self.tiles.get(index).copied()
    }

    /// Trap drawn at `position`, if any.
    #[must_use]
    pub fn trap_at(&self, position: Position) -> Option<&TrapPresentation> {
        self.traps.iter().find(|trap| trap.position == position)
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title shown by the backend.
    pub title: String,
    /// Scene content that should be displayed first.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(title: T, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
            scene,
        }
    }
}

/// Rendering backend capable of presenting Trap Labs scenes.
pub trait RenderingBackend {
    /// Runs the backend until the player quits or input is exhausted.
    ///
    /// The `update_scene` closure receives the input captured for each frame
    /// and refreshes the scene before it is drawn.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &mut Scene);
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum RenderingError {
    /// Pad buttons must have a positive finite size.
    #[error("direction pad buttons must be positive (received {button_size})")]
    InvalidButtonSize {
        /// Provided size that failed validation.
        button_size: f32,
    },
    /// Scenes carry either no tiles or a full grid.
    #[error("scene needs 0 or {expected} tiles (received {found})", expected = TILE_COUNT)]
    TileCount {
        /// Number of tiles supplied.
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use trap_labs_core::Traversal;

    #[test]
    fn pad_maps_quadrants_to_directions() {
        let pad = DirectionPad::new(Vec2::new(100.0, 50.0), 40.0).expect("valid pad");

        assert_eq!(pad.direction_at(Vec2::new(110.0, 60.0)), Some(Direction::Up));
        assert_eq!(pad.direction_at(Vec2::new(150.0, 60.0)), Some(Direction::Right));
        assert_eq!(pad.direction_at(Vec2::new(110.0, 100.0)), Some(Direction::Left));
        assert_eq!(pad.direction_at(Vec2::new(179.0, 129.0)), Some(Direction::Down));
        assert_eq!(pad.direction_at(Vec2::new(99.0, 60.0)), None);
        assert_eq!(pad.direction_at(Vec2::new(180.0, 60.0)), None);
    }

    #[test]
    fn button_centres_round_trip_through_the_pad() {
        let pad = DirectionPad::default();
        for direction in Direction::ALL {
            assert_eq!(pad.direction_at(pad.button_center(direction)), Some(direction));
        }
    }

    #[test]
    fn pad_rejects_degenerate_buttons() {
        assert_eq!(
            DirectionPad::new(Vec2::ZERO, 0.0),
            Err(RenderingError::InvalidButtonSize { button_size: 0.0 })
        );
        assert!(DirectionPad::new(Vec2::ZERO, f32::NAN).is_err());
    }

    #[test]
    fn non_finite_points_miss_the_pad() {
        let pad = DirectionPad::default();
        assert_eq!(pad.direction_at(Vec2::NAN), None);
        assert_eq!(pad.direction_at(Vec2::new(f32::NAN, 10.0)), None);
        assert_eq!(pad.direction_at(Vec2::new(10.0, f32::NAN)), None);
        assert_eq!(pad.direction_at(Vec2::splat(f32::INFINITY)), None);
    }

    #[test]
    fn keyboard_direction_wins_over_pointer() {
        let pad = DirectionPad::default();
        let input = FrameInput {
            direction: Some(Direction::Left),
            pointer: Some(pad.button_center(Direction::Up)),
            ..FrameInput::default()
        };
        assert_eq!(input.direction_with(&pad), Some(Direction::Left));

        let input = FrameInput {
            pointer: Some(pad.button_center(Direction::Down)),
            ..FrameInput::default()
        };
        assert_eq!(input.direction_with(&pad), Some(Direction::Down));
        assert!(FrameInput::default().is_idle());
    }

    #[test]
    fn traversing_player_is_drawn_between_tiles() {
        let snapshot = PlayerSnapshot {
            position: Position::new(5, 4),
            facing: Direction::Right,
            frame: 3,
            traversal: Some(Traversal {
                from: Position::new(4, 4),
                elapsed_steps: MOVEMENT_STEPS / 2,
            }),
        };
        let presentation = PlayerPresentation::from(snapshot);
        assert_eq!(presentation.pixel, Vec2::new(4.5, 4.0) * TILE_SIZE_PIXELS);

        let idle = PlayerPresentation::from(PlayerSnapshot {
            traversal: None,
            ..snapshot
        });
        assert_eq!(idle.pixel, tile_origin(Position::new(5, 4)));
    }

    #[test]
    fn scene_validates_tile_count() {
        let error = Scene::new(
            vec![TileKind::Floor; 3],
            Vec::new(),
            None,
            Hud::default(),
            RunState::Menu,
        )
        .expect_err("partial grids are rejected");
        assert_eq!(error, RenderingError::TileCount { found: 3 });

        let scene = Scene::new(
            vec![TileKind::Floor; TILE_COUNT],
            vec![TrapPresentation {
                position: Position::new(2, 3),
                armed: true,
                frame: 0,
            }],
            None,
            Hud::default(),
            RunState::Menu,
        )
        .expect("full grid");
        assert_eq!(scene.tile(Position::new(9, 9)), Some(TileKind::Floor));
        assert!(scene.trap_at(Position::new(2, 3)).is_some());
        assert!(!Scene::menu().has_grid());
    }
}
