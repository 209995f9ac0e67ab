//! City grid model.
//!
//! The city is a rectangle of character cells: `0` is a block, `1` a street
//! and `2` grass. Tiles are addressed by `(column, row)`; rows grow towards
//! +Z in world space and columns towards +X. Every tile is a square "page"
//! of `page_size` world units.

use std::fmt;

use glam::Vec3;

use crate::error::{ConfigError, Result};

/// Default edge length of one tile in world units.
pub const DEFAULT_PAGE_SIZE: f32 = 16.0;

/// The built-in city layout.
pub const DEFAULT_CITY_MAP: &[&str] = &[
    "000000000000000000000000",
    "011111111111111111111110",
    "010010012210010010012210",
    "010010012210012210012210",
    "011111111111111111111110",
    "010010010010010010012210",
    "010012210010010012210010",
    "011111112212211111112210",
    "010010010012210010010010",
    "010010012212210010012210",
    "012211111111111111111110",
    "012210010012210210010010",
    "012210010010010210010010",
    "011111111111111111111110",
    "010010010012212210012210",
    "010010010010012210012210",
    "011111111111111111111110",
    "010210012212212210012210",
    "012010012210012210012210",
    "011111111111111111111110",
    "010010010012210010010010",
    "010012210012210012212210",
    "011111111111111111111110",
    "000000000000000000000000",
];

/// Contents of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Raised concrete block.
    Block,
    /// Drivable street; the only cells burglars walk on.
    Street,
    /// Grass lot.
    Grass,
}

impl Cell {
    /// Parse a map character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Block),
            '1' => Some(Self::Street),
            '2' => Some(Self::Grass),
            _ => None,
        }
    }
}

/// Integer tile coordinate.
///
/// Signed so that stepping off the grid is representable; lookups outside
/// the grid return `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    /// Column index (world +X).
    pub column: i32,
    /// Row index (world +Z).
    pub row: i32,
}

impl Tile {
    /// Create a tile coordinate.
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// The neighbouring tile one step in `heading`.
    #[must_use]
    pub const fn step(self, heading: Heading) -> Self {
        let (dc, dr) = heading.offset();
        Self::new(self.column + dc, self.row + dr)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Cardinal direction of travel on the grid.
///
/// `Up` moves towards row 0 (world -Z).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
}

impl Heading {
    /// All headings in the order candidates are collected.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// The opposite heading.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// `(column, row)` delta of one step.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Which of the four neighbours of a tile are streets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StreetNeighbours {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl StreetNeighbours {
    /// Whether the neighbour in `heading` is a street.
    pub const fn towards(&self, heading: Heading) -> bool {
        match heading {
            Heading::Up => self.up,
            Heading::Down => self.down,
            Heading::Left => self.left,
            Heading::Right => self.right,
        }
    }

    /// Number of street neighbours.
    pub fn count(&self) -> usize {
        [self.up, self.down, self.left, self.right]
            .iter()
            .filter(|s| **s)
            .count()
    }
}

/// Validated, rectangular city grid.
#[derive(Clone, Debug)]
pub struct CityGrid {
    cells: Vec<Cell>,
    columns: usize,
    rows: usize,
    page_size: f32,
}

impl CityGrid {
    /// Build a grid from rows of map characters.
    ///
    /// Rejects empty or ragged grids, unknown characters, streets on the
    /// border and street tiles without any street neighbour.
    pub fn parse<S: AsRef<str>>(rows: &[S], page_size: f32) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(ConfigError::EmptyGrid);
        };
        let columns = first.as_ref().chars().count();
        if columns == 0 {
            return Err(ConfigError::EmptyGrid);
        }

        let mut cells = Vec::with_capacity(columns * rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let len = row.chars().count();
            if len != columns {
                return Err(ConfigError::RaggedRow {
                    row: row_index,
                    expected: columns,
                    actual: len,
                });
            }
            for (column_index, c) in row.chars().enumerate() {
                let tile = tile_from_indices(column_index, row_index);
                let cell = Cell::from_char(c).ok_or(ConfigError::UnknownCell { tile, found: c })?;
                cells.push(cell);
            }
        }

        let grid = Self {
            cells,
            columns,
            rows: rows.len(),
            page_size,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Parse a grid from map text, one row per line.
    ///
    /// Blank lines and lines starting with `#` are ignored.
    pub fn from_text(text: &str, page_size: f32) -> Result<Self> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();
        Self::parse(&rows, page_size)
    }

    /// The built-in city.
    pub fn default_city() -> Result<Self> {
        Self::parse(DEFAULT_CITY_MAP, DEFAULT_PAGE_SIZE)
    }

    fn validate(&self) -> Result<()> {
        for (tile, cell) in self.tiles() {
            if cell != Cell::Street {
                continue;
            }
            let on_border = tile.column == 0
                || tile.row == 0
                || tile.column == self.last_column()
                || tile.row == self.last_row();
            if on_border {
                return Err(ConfigError::StreetOnBorder { tile });
            }
            if self.street_neighbours(tile).count() == 0 {
                return Err(ConfigError::IsolatedStreet { tile });
            }
        }
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn last_column(&self) -> i32 {
        self.columns as i32 - 1
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn last_row(&self) -> i32 {
        self.rows as i32 - 1
    }

    /// Number of columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Edge length of one tile in world units.
    pub fn page_size(&self) -> f32 {
        self.page_size
    }

    /// World extent along X.
    #[allow(clippy::cast_precision_loss)]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.page_size
    }

    /// World extent along Z.
    #[allow(clippy::cast_precision_loss)]
    pub fn depth(&self) -> f32 {
        self.rows as f32 * self.page_size
    }

    /// Cell at `tile`, or `None` outside the grid.
    pub fn cell(&self, tile: Tile) -> Option<Cell> {
        let column = usize::try_from(tile.column).ok()?;
        let row = usize::try_from(tile.row).ok()?;
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells.get(row * self.columns + column).copied()
    }

    /// Whether `tile` is a street. Tiles outside the grid are not.
    pub fn is_street(&self, tile: Tile) -> bool {
        self.cell(tile) == Some(Cell::Street)
    }

    /// Street pattern around `tile`.
    pub fn street_neighbours(&self, tile: Tile) -> StreetNeighbours {
        StreetNeighbours {
            up: self.is_street(tile.step(Heading::Up)),
            down: self.is_street(tile.step(Heading::Down)),
            left: self.is_street(tile.step(Heading::Left)),
            right: self.is_street(tile.step(Heading::Right)),
        }
    }

    /// World position of the centre of `tile` at height `y`.
    #[allow(clippy::cast_precision_loss)]
    pub fn tile_center(&self, tile: Tile, y: f32) -> Vec3 {
        let half = self.page_size * 0.5;
        Vec3::new(
            tile.column as f32 * self.page_size + half,
            y,
            tile.row as f32 * self.page_size + half,
        )
    }

    /// Iterate over every tile and its cell, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = (Tile, Cell)> + '_ {
        self.cells.iter().enumerate().map(|(index, cell)| {
            (
                tile_from_indices(index % self.columns, index / self.columns),
                *cell,
            )
        })
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn tile_from_indices(column: usize, row: usize) -> Tile {
    Tile::new(column as i32, row as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_city_is_valid() {
        let grid = CityGrid::default_city().unwrap();
        assert_eq!(grid.columns(), 24);
        assert_eq!(grid.rows(), 24);
        assert!((grid.width() - 384.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let err = CityGrid::parse(&["000", "00", "000"], 16.0).unwrap_err();
        assert_eq!(
            err,
            ConfigError::RaggedRow {
                row: 1,
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_rejects_unknown_cell() {
        let err = CityGrid::parse(&["000", "0x0", "000"], 16.0).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownCell {
                tile: Tile::new(1, 1),
                found: 'x'
            }
        );
    }

    #[test]
    fn test_rejects_street_on_border() {
        let err = CityGrid::parse(&["010", "010", "000"], 16.0).unwrap_err();
        assert_eq!(
            err,
            ConfigError::StreetOnBorder {
                tile: Tile::new(1, 0)
            }
        );
    }

    #[test]
    fn test_rejects_isolated_street() {
        let err = CityGrid::parse(&["000", "010", "000"], 16.0).unwrap_err();
        assert_eq!(
            err,
            ConfigError::IsolatedStreet {
                tile: Tile::new(1, 1)
            }
        );
    }

    #[test]
    fn test_rejects_empty() {
        let rows: [&str; 0] = [];
        assert_eq!(
            CityGrid::parse(&rows, 16.0).unwrap_err(),
            ConfigError::EmptyGrid
        );
    }

    #[test]
    fn test_from_text_skips_comments() {
        let text = "# tiny loop\n0000\n0110\n\n0110\n0000\n";
        let grid = CityGrid::from_text(text, 8.0).unwrap();
        assert_eq!(grid.rows(), 4);
        assert!(grid.is_street(Tile::new(2, 2)));
    }

    #[test]
    fn test_lookup_outside_grid() {
        let grid = CityGrid::default_city().unwrap();
        assert_eq!(grid.cell(Tile::new(-1, 0)), None);
        assert_eq!(grid.cell(Tile::new(0, 24)), None);
        assert!(!grid.is_street(Tile::new(24, 1)));
    }

    #[test]
    fn test_tile_center() {
        let grid = CityGrid::default_city().unwrap();
        let center = grid.tile_center(Tile::new(1, 2), 1.5);
        assert_eq!(center, Vec3::new(24.0, 1.5, 40.0));
    }

    #[test]
    fn test_neighbours_at_crossing() {
        let grid = CityGrid::default_city().unwrap();
        // (1, 4) joins the left avenue with row 4.
        let n = grid.street_neighbours(Tile::new(1, 4));
        assert!(n.up && n.down && n.right);
        assert!(!n.left);
        assert_eq!(n.count(), 3);
    }

    #[test]
    fn test_reverse_is_involution() {
        for heading in Heading::ALL {
            assert_eq!(heading.reverse().reverse(), heading);
            assert_ne!(heading.reverse(), heading);
        }
    }
}
