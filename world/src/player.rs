//! Player position, facing and the movement lock.

use trap_labs_core::{
    Direction, MoveRejection, PlayerSnapshot, Position, TileKind, Traversal, MOVEMENT_STEPS,
    PLAYER_WALK_FRAMES, START_FACING, START_POSITION,
};

use crate::grid::LevelLayout;

/// Logical state of the player character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Player {
    position: Position,
    facing: Direction,
    traversal: Option<Traversal>,
}

impl Player {
    /// Creates a player standing on the level-start cell facing down.
    #[must_use]
    pub const fn new() -> Self {
        Self::at(START_POSITION)
    }

    /// Creates an idle player on `position` facing down.
    #[must_use]
    pub const fn at(position: Position) -> Self {
        Self {
            position,
            facing: START_FACING,
            traversal: None,
        }
    }

    /// Tile the player occupies.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Direction the player faces.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    /// Returns `true` while a traversal is being animated.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.traversal.is_some()
    }

    /// Attempts to step one tile in `direction` across `layout`.
    ///
    /// On success the logical position and facing change immediately and the
    /// movement lock engages until `MOVEMENT_STEPS` animation steps elapse.
    /// Rejected attempts leave the player untouched.
    pub fn attempt_move(
        &mut self,
        direction: Direction,
        layout: &LevelLayout,
    ) -> Result<Position, MoveRejection> {
        if self.is_moving() {
            return Err(MoveRejection::InProgress);
        }
        let destination = self
            .position
            .step(direction)
            .ok_or(MoveRejection::OutOfBounds)?;
        match layout.tile(destination) {
            Some(TileKind::Floor) => {}
            Some(TileKind::Block) => return Err(MoveRejection::Blocked),
            None => return Err(MoveRejection::OutOfBounds),
        }

        self.traversal = Some(Traversal {
            from: self.position,
            elapsed_steps: 0,
        });
        self.position = destination;
        self.facing = direction;
        Ok(destination)
    }

    /// Advances the traversal animation.
    ///
    /// Returns `true` when this call released the movement lock.
    pub fn advance_animation(&mut self, steps: u32) -> bool {
        let Some(traversal) = self.traversal.as_mut() else {
            return false;
        };
        traversal.elapsed_steps = traversal.elapsed_steps.saturating_add(steps);
        if traversal.elapsed_steps >= MOVEMENT_STEPS {
            self.traversal = None;
            true
        } else {
            false
        }
    }

    /// Returns the player to the level-start cell, idle and facing down.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Sprite frame for the current animation state; zero while idle.
    #[must_use]
    pub fn frame(&self) -> u32 {
        self.traversal
            .map_or(0, |traversal| 1 + traversal.elapsed_steps % PLAYER_WALK_FRAMES)
    }

    /// Captures the player for read-only consumers.
    #[must_use]
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.position,
            facing: self.facing,
            frame: self.frame(),
            traversal: self.traversal,
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}
