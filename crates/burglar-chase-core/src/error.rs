//! Error types for game configuration.

use std::fmt;

use crate::grid::{Heading, Tile};

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while building or running the city and its burglars.
///
/// All of these describe authoring mistakes (a bad map, a bad spawn point).
/// None of them are recoverable at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The grid has no rows or no columns.
    EmptyGrid,
    /// A row does not have the same length as the first row.
    RaggedRow {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        actual: usize,
    },
    /// A cell character is not one of `0`, `1` or `2`.
    UnknownCell {
        /// Location of the cell.
        tile: Tile,
        /// The character found.
        found: char,
    },
    /// A street tile lies on the outer border of the grid.
    StreetOnBorder {
        /// Location of the street tile.
        tile: Tile,
    },
    /// A street tile has no street neighbour, so nothing could ever leave it.
    IsolatedStreet {
        /// Location of the street tile.
        tile: Tile,
    },
    /// A burglar was placed where its first step does not lead along a street.
    InvalidSpawn {
        /// Spawn tile.
        tile: Tile,
        /// Initial heading.
        heading: Heading,
    },
    /// A burglar arrived at a tile with no street to continue on.
    DeadEnd {
        /// Tile the burglar is stuck on.
        tile: Tile,
    },
    /// No row offers a valid entry point on the requested column.
    NoEntryRows {
        /// Column that was searched.
        column: i32,
    },
    /// A line of the prop table could not be parsed.
    MalformedProp {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "city grid is empty"),
            Self::RaggedRow {
                row,
                expected,
                actual,
            } => write!(
                f,
                "city grid row {row} has {actual} cells, expected {expected}"
            ),
            Self::UnknownCell { tile, found } => {
                write!(f, "unknown cell '{found}' at {tile}")
            }
            Self::StreetOnBorder { tile } => write!(f, "street tile on grid border at {tile}"),
            Self::IsolatedStreet { tile } => {
                write!(f, "street tile at {tile} has no street neighbour")
            }
            Self::InvalidSpawn { tile, heading } => {
                write!(f, "cannot spawn burglar at {tile} heading {heading:?}")
            }
            Self::DeadEnd { tile } => write!(f, "burglar stuck at {tile} with nowhere to go"),
            Self::NoEntryRows { column } => {
                write!(f, "no street rows to enter the city from column {column}")
            }
            Self::MalformedProp { line, reason } => {
                write!(f, "prop table line {line}: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
