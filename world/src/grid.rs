//! Static level layouts and the catalogue that indexes them.

use tracing::error;
use trap_labs_core::{Level, Position, TileKind, GRID_SIZE, MAX_TRAPS, START_POSITION};

const STANDARD_LEVELS: [(&[&str; 10], u32); 3] = [
    (
        &[
            "##########",
            "#........#",
            "#........#",
            "#........#",
            "#........#",
            "#........#",
            "#........#",
            "#........#",
            "#........#",
            "##########",
        ],
        35,
    ),
    (
        &[
            "##########",
            "#........#",
            "#........#",
            "#..#..#..#",
            "#........#",
            "#........#",
            "#..#..#..#",
            "#........#",
            "#........#",
            "##########",
        ],
        50,
    ),
    (
        &[
            "##########",
            "#........#",
            "#...#....#",
            "##.......#",
            "#.#......#",
            "#......#.#",
            "#.......##",
            "#....#...#",
            "#........#",
            "##########",
        ],
        65,
    ),
];

/// Errors reported when looking up a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// The position lies outside the grid.
    #[error("position {position} lies outside the {size}x{size} grid", size = GRID_SIZE)]
    OutOfBounds {
        /// Position that was requested.
        position: Position,
    },
    /// The catalogue holds no level with the requested number.
    #[error("level {level} does not exist")]
    UnknownLevel {
        /// Level that was requested.
        level: Level,
    },
}

/// Errors reported when an authored level layout is malformed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// The layout does not contain exactly `GRID_SIZE` rows.
    #[error("expected {expected} rows, found {found}", expected = GRID_SIZE)]
    RowCount {
        /// Number of rows supplied.
        found: usize,
    },
    /// A row does not contain exactly `GRID_SIZE` tiles.
    #[error("row {row} has {found} tiles, expected {expected}", expected = GRID_SIZE)]
    RowLength {
        /// Zero-based index of the offending row.
        row: usize,
        /// Number of tiles found in the row.
        found: usize,
    },
    /// A row contains a character other than `#` or `.`.
    #[error("unexpected glyph {glyph:?} at column {column} of row {row}")]
    UnknownGlyph {
        /// Zero-based row of the glyph.
        row: usize,
        /// Zero-based column of the glyph.
        column: usize,
        /// Offending character.
        glyph: char,
    },
    /// The level-start cell is not walkable.
    #[error("start cell {position} must be floor", position = START_POSITION)]
    BlockedStart,
    /// The layout has too few floor tiles to hold every trap.
    #[error("layout has {found} floor tiles, needs more than {limit}", limit = MAX_TRAPS)]
    NotEnoughFloor {
        /// Number of floor tiles in the layout.
        found: usize,
    },
    /// A level was declared with a step budget of zero.
    #[error("level {level} must allow at least one step")]
    ZeroStepBudget {
        /// Level with the empty budget.
        level: Level,
    },
    /// The catalogue contains no levels.
    #[error("a catalogue needs at least one level")]
    EmptyCatalogue,
}

/// Immutable `GRID_SIZE` square matrix of tile kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelLayout {
    tiles: Vec<TileKind>,
}

impl LevelLayout {
    /// Parses a layout from ASCII rows where `#` is a block and `.` is floor.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, LayoutError> {
        let size = GRID_SIZE as usize;
        if rows.len() != size {
            return Err(LayoutError::RowCount { found: rows.len() });
        }

        let mut tiles = Vec::with_capacity(size * size);
        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let length = row.chars().count();
            if length != size {
                return Err(LayoutError::RowLength {
                    row: row_index,
                    found: length,
                });
            }
            for (column, glyph) in row.chars().enumerate() {
                let tile = match glyph {
                    '#' => TileKind::Block,
                    '.' => TileKind::Floor,
                    _ => {
                        return Err(LayoutError::UnknownGlyph {
                            row: row_index,
                            column,
                            glyph,
                        })
                    }
                };
                tiles.push(tile);
            }
        }

        let layout = Self { tiles };
        if layout.tile(START_POSITION) != Some(TileKind::Floor) {
            return Err(LayoutError::BlockedStart);
        }
        let floor = layout.floor_count();
        if floor <= MAX_TRAPS {
            return Err(LayoutError::NotEnoughFloor { found: floor });
        }
        Ok(layout)
    }

    /// Kind of the tile at `position`, or `None` outside the grid.
    #[must_use]
    pub fn tile(&self, position: Position) -> Option<TileKind> {
        index(position).and_then(|index| self.tiles.get(index).copied())
    }

    /// Returns `true` when `position` is a walkable tile inside the grid.
    #[must_use]
    pub fn is_floor(&self, position: Position) -> bool {
        self.tile(position) == Some(TileKind::Floor)
    }

    /// Number of walkable tiles in the layout.
    #[must_use]
    pub fn floor_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|tile| **tile == TileKind::Floor)
            .count()
    }

    /// Iterates every position in row-major order alongside its tile kind.
    pub fn tiles(&self) -> impl Iterator<Item = (Position, TileKind)> + '_ {
        self.tiles.iter().enumerate().map(|(index, tile)| {
            let index = index as u32;
            (Position::new(index % GRID_SIZE, index / GRID_SIZE), *tile)
        })
    }
}

fn index(position: Position) -> Option<usize> {
    if !position.in_bounds() {
        return None;
    }
    let row = usize::try_from(position.row()).ok()?;
    let column = usize::try_from(position.column()).ok()?;
    Some(row * GRID_SIZE as usize + column)
}

/// Layout and step budget of a single level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelDefinition {
    layout: LevelLayout,
    step_budget: u32,
}

impl LevelDefinition {
    /// Pairs a layout with the number of moves the player must survive.
    #[must_use]
    pub const fn new(layout: LevelLayout, step_budget: u32) -> Self {
        Self {
            layout,
            step_budget,
        }
    }

    /// Tile layout of the level.
    #[must_use]
    pub const fn layout(&self) -> &LevelLayout {
        &self.layout
    }

    /// Moves required to complete the level.
    #[must_use]
    pub const fn step_budget(&self) -> u32 {
        self.step_budget
    }
}

/// Ordered set of levels available to a run, numbered from one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelCatalogue {
    levels: Vec<LevelDefinition>,
}

impl LevelCatalogue {
    /// Builds a catalogue from level definitions in play order.
    pub fn from_levels(levels: Vec<LevelDefinition>) -> Result<Self, LayoutError> {
        if levels.is_empty() {
            return Err(LayoutError::EmptyCatalogue);
        }
        for (index, definition) in levels.iter().enumerate() {
            if definition.step_budget == 0 {
                return Err(LayoutError::ZeroStepBudget {
                    level: level_number(index),
                });
            }
        }
        Ok(Self { levels })
    }

    /// The three built-in levels.
    #[must_use]
    pub fn standard() -> Self {
        let levels = STANDARD_LEVELS
            .iter()
            .enumerate()
            .filter_map(
                |(index, (rows, budget))| match LevelLayout::from_rows(rows.as_slice()) {
                    Ok(layout) => Some(LevelDefinition::new(layout, *budget)),
                    Err(err) => {
                        error!(level = index + 1, %err, "built-in level layout rejected");
                        debug_assert!(false, "built-in level {} is invalid: {err}", index + 1);
                        None
                    }
                },
            )
            .collect();
        Self { levels }
    }

    /// Looks up the definition of `level`.
    #[must_use]
    pub fn level(&self, level: Level) -> Option<&LevelDefinition> {
        let index = usize::try_from(level.get()).ok()?.checked_sub(1)?;
        self.levels.get(index)
    }

    /// Kind of the tile at `position` on `level`.
    pub fn tile_at(&self, level: Level, position: Position) -> Result<TileKind, GridError> {
        let definition = self
            .level(level)
            .ok_or(GridError::UnknownLevel { level })?;
        definition
            .layout
            .tile(position)
            .ok_or(GridError::OutOfBounds { position })
    }

    /// Number of levels in the catalogue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Returns `true` when the catalogue has no levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of the final level.
    #[must_use]
    pub fn last_level(&self) -> Level {
        level_number(self.levels.len().saturating_sub(1))
    }
}

impl Default for LevelCatalogue {
    fn default() -> Self {
        Self::standard()
    }
}

fn level_number(index: usize) -> Level {
    Level::new(u32::try_from(index).map_or(u32::MAX, |index| index.saturating_add(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_rows() -> Vec<String> {
        let mut rows = vec![".".repeat(10); 10];
        rows[0] = "#".repeat(10);
        rows
    }

    #[test]
    fn standard_catalogue_has_three_levels() {
        let catalogue = LevelCatalogue::standard();
        assert_eq!(catalogue.len(), 3);
        assert_eq!(catalogue.last_level(), Level::new(3));
        let budgets: Vec<u32> = (1..=3)
            .filter_map(|level| catalogue.level(Level::new(level)))
            .map(LevelDefinition::step_budget)
            .collect();
        assert_eq!(budgets, vec![35, 50, 65]);
    }

    #[test]
    fn every_built_in_layout_validates() {
        for (rows, budget) in STANDARD_LEVELS {
            assert!(budget > 0);
            assert!(LevelLayout::from_rows(rows.as_slice()).is_ok(), "{rows:?}");
        }
    }

    #[test]
    fn standard_layouts_match_authored_blocks() {
        let catalogue = LevelCatalogue::standard();
        assert_eq!(
            catalogue.tile_at(Level::new(1), Position::new(0, 0)),
            Ok(TileKind::Block)
        );
        assert_eq!(
            catalogue.tile_at(Level::new(1), START_POSITION),
            Ok(TileKind::Floor)
        );
        assert_eq!(
            catalogue.tile_at(Level::new(2), Position::new(3, 3)),
            Ok(TileKind::Block)
        );
        assert_eq!(
            catalogue.tile_at(Level::new(3), Position::new(2, 4)),
            Ok(TileKind::Block)
        );
        assert_eq!(
            catalogue.tile_at(Level::new(3), Position::new(8, 6)),
            Ok(TileKind::Block)
        );
    }

    #[test]
    fn tile_at_reports_lookup_failures() {
        let catalogue = LevelCatalogue::standard();
        assert_eq!(
            catalogue.tile_at(Level::new(1), Position::new(10, 0)),
            Err(GridError::OutOfBounds {
                position: Position::new(10, 0)
            })
        );
        assert_eq!(
            catalogue.tile_at(Level::new(4), Position::new(1, 1)),
            Err(GridError::UnknownLevel {
                level: Level::new(4)
            })
        );
        assert_eq!(
            catalogue.tile_at(Level::new(0), Position::new(1, 1)),
            Err(GridError::UnknownLevel {
                level: Level::new(0)
            })
        );
    }

    #[test]
    fn tiles_iterate_in_row_major_order() {
        let layout = LevelLayout::from_rows(&open_rows()).expect("valid layout");
        let first: Vec<Position> = layout.tiles().take(11).map(|(p, _)| p).collect();
        assert_eq!(first[1], Position::new(1, 0));
        assert_eq!(first[10], Position::new(0, 1));
        assert_eq!(layout.floor_count(), 90);
    }

    #[test]
    fn layout_rejects_wrong_shape() {
        let mut rows = open_rows();
        let _ = rows.pop();
        assert_eq!(
            LevelLayout::from_rows(&rows),
            Err(LayoutError::RowCount { found: 9 })
        );

        let mut rows = open_rows();
        rows[3] = ".........".to_owned();
        assert_eq!(
            LevelLayout::from_rows(&rows),
            Err(LayoutError::RowLength { row: 3, found: 9 })
        );
    }

    #[test]
    fn layout_rejects_unknown_glyphs() {
        let mut rows = open_rows();
        rows[2] = "....x.....".to_owned();
        assert_eq!(
            LevelLayout::from_rows(&rows),
            Err(LayoutError::UnknownGlyph {
                row: 2,
                column: 4,
                glyph: 'x'
            })
        );
    }

    #[test]
    fn layout_requires_walkable_start() {
        let mut rows = open_rows();
        rows[4] = "....#.....".to_owned();
        assert_eq!(
            LevelLayout::from_rows(&rows),
            Err(LayoutError::BlockedStart)
        );
    }

    #[test]
    fn layout_requires_room_for_every_trap() {
        let mut rows = vec!["##########".to_owned(); 10];
        rows[4] = "..........".to_owned();
        rows[5] = "..........".to_owned();
        rows[6] = "..........".to_owned();
        assert_eq!(
            LevelLayout::from_rows(&rows),
            Err(LayoutError::NotEnoughFloor { found: 30 })
        );
        rows[7] = "...#######".to_owned();
        assert!(LevelLayout::from_rows(&rows).is_ok());
    }

    #[test]
    fn catalogue_rejects_empty_and_zero_budgets() {
        assert_eq!(
            LevelCatalogue::from_levels(Vec::new()),
            Err(LayoutError::EmptyCatalogue)
        );
        let layout = LevelLayout::from_rows(&open_rows()).expect("valid layout");
        let levels = vec![
            LevelDefinition::new(layout.clone(), 3),
            LevelDefinition::new(layout, 0),
        ];
        assert_eq!(
            LevelCatalogue::from_levels(levels),
            Err(LayoutError::ZeroStepBudget {
                level: Level::new(2)
            })
        );
    }
}
