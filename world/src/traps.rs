//! Ordered trap queue with a trailing shadow window.

use std::collections::VecDeque;

use rand::Rng;
use trap_labs_core::{Position, TrapSnapshot, GRID_SIZE, MAX_SHADOWS, MAX_TRAPS, TRAP_REVEAL_FRAMES};

use crate::grid::LevelLayout;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Trap {
    position: Position,
    frame: u32,
}

impl Trap {
    const fn fresh(position: Position) -> Self {
        Self { position, frame: 0 }
    }
}

/// Outcome of placing a single trap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrapPlacement {
    /// Cell that received the new shadow trap.
    pub placed: Position,
    /// Cell of the oldest trap, if it was removed to respect the cap.
    pub evicted: Option<Position>,
    /// Cell of the trap that left the shadow window, if any.
    pub armed: Option<Position>,
}

/// Tracks traps oldest first. The newest `MAX_SHADOWS` entries are shadows.
#[derive(Clone, Debug, Default)]
pub struct TrapTracker {
    traps: VecDeque<Trap>,
}

impl TrapTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a shadow trap on a random unoccupied floor tile of `layout`.
    ///
    /// Positions are drawn uniformly over the whole grid and redrawn until
    /// they land on free floor. Layouts always hold more floor tiles than the
    /// trap cap, so a free tile exists whenever this is called.
    pub fn place_random_trap<R>(&mut self, layout: &LevelLayout, rng: &mut R) -> TrapPlacement
    where
        R: Rng + ?Sized,
    {
        let placed = loop {
            let candidate = Position::new(rng.gen_range(0..GRID_SIZE), rng.gen_range(0..GRID_SIZE));
            if layout.is_floor(candidate) && !self.is_occupied(candidate) {
                break candidate;
            }
        };

        self.traps.push_back(Trap::fresh(placed));
        let evicted = if self.traps.len() > MAX_TRAPS {
            self.traps.pop_front().map(|trap| trap.position)
        } else {
            None
        };

        let armed = self
            .traps
            .len()
            .checked_sub(MAX_SHADOWS + 1)
            .and_then(|index| self.traps.get_mut(index))
            .map(|trap| {
                trap.frame = 0;
                trap.position
            });

        TrapPlacement {
            placed,
            evicted,
            armed,
        }
    }

    /// Reports whether an armed trap occupies `position`.
    #[must_use]
    pub fn is_armed_at(&self, position: Position) -> bool {
        self.traps
            .iter()
            .take(self.armed_count())
            .any(|trap| trap.position == position)
    }

    /// Reports whether any trap, armed or shadow, occupies `position`.
    #[must_use]
    pub fn is_occupied(&self, position: Position) -> bool {
        self.traps.iter().any(|trap| trap.position == position)
    }

    /// Advances every trap's reveal animation, holding on the final frame.
    pub fn advance_animation(&mut self, steps: u32) {
        let last = TRAP_REVEAL_FRAMES - 1;
        for trap in &mut self.traps {
            trap.frame = trap.frame.saturating_add(steps).min(last);
        }
    }

    /// Removes every trap.
    pub fn reset(&mut self) {
        self.traps.clear();
    }

    /// Number of traps on the grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.traps.len()
    }

    /// Returns `true` when no trap is on the grid.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traps.is_empty()
    }

    /// Captures every trap oldest first.
    #[must_use]
    pub fn snapshots(&self) -> Vec<TrapSnapshot> {
        let armed = self.armed_count();
        self.traps
            .iter()
            .enumerate()
            .map(|(index, trap)| TrapSnapshot {
                position: trap.position,
                armed: index < armed,
                frame: trap.frame,
            })
            .collect()
    }

    fn armed_count(&self) -> usize {
        self.traps.len().saturating_sub(MAX_SHADOWS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::grid::LevelCatalogue;
    use trap_labs_core::Level;

    fn first_layout() -> LevelLayout {
        LevelCatalogue::standard()
            .level(Level::FIRST)
            .expect("standard level")
            .layout()
            .clone()
    }

    #[test]
    fn newest_traps_stay_in_shadow() {
        let layout = first_layout();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut tracker = TrapTracker::new();

        let first = tracker.place_random_trap(&layout, &mut rng);
        assert_eq!(first.armed, None);
        let second = tracker.place_random_trap(&layout, &mut rng);
        assert_eq!(second.armed, None);
        assert!(!tracker.is_armed_at(first.placed));

        let third = tracker.place_random_trap(&layout, &mut rng);
        assert_eq!(third.armed, Some(first.placed));
        assert!(tracker.is_armed_at(first.placed));
        assert!(!tracker.is_armed_at(second.placed));
        assert!(!tracker.is_armed_at(third.placed));
    }

    #[test]
    fn oldest_trap_is_evicted_past_the_cap() {
        let layout = first_layout();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut tracker = TrapTracker::new();

        let placements: Vec<TrapPlacement> = (0..MAX_TRAPS)
            .map(|_| tracker.place_random_trap(&layout, &mut rng))
            .collect();
        assert!(placements.iter().all(|placement| placement.evicted.is_none()));
        assert_eq!(tracker.len(), MAX_TRAPS);

        let overflow = tracker.place_random_trap(&layout, &mut rng);
        assert_eq!(overflow.evicted, Some(placements[0].placed));
        assert_eq!(tracker.len(), MAX_TRAPS);
        assert!(!tracker.is_occupied(placements[0].placed));
    }

    #[test]
    fn reveal_frames_restart_on_arming() {
        let layout = first_layout();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut tracker = TrapTracker::new();

        let _ = tracker.place_random_trap(&layout, &mut rng);
        tracker.advance_animation(2);
        let _ = tracker.place_random_trap(&layout, &mut rng);
        tracker.advance_animation(10);
        let frames: Vec<u32> = tracker.snapshots().iter().map(|s| s.frame).collect();
        assert_eq!(frames, vec![TRAP_REVEAL_FRAMES - 1, TRAP_REVEAL_FRAMES - 1]);

        let _ = tracker.place_random_trap(&layout, &mut rng);
        let snapshots = tracker.snapshots();
        assert!(snapshots[0].armed);
        assert_eq!(snapshots[0].frame, 0);
        assert_eq!(snapshots[1].frame, TRAP_REVEAL_FRAMES - 1);
        assert_eq!(snapshots[2].frame, 0);
    }

    #[test]
    fn reset_is_idempotent() {
        let layout = first_layout();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut tracker = TrapTracker::new();
        for _ in 0..4 {
            let _ = tracker.place_random_trap(&layout, &mut rng);
        }

        tracker.reset();
        let once = tracker.snapshots();
        tracker.reset();
        assert_eq!(tracker.snapshots(), once);
        assert!(tracker.is_empty());
    }
}
