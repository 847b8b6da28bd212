//! Core types for the traffic simulation
//!
//! Identifiers, grid coordinates and continuous positions shared by the map,
//! the pathfinder and the cars.

use std::fmt;

use super::direction::Direction;

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimId(pub usize);

/// A wrapper type for car IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CarId(pub SimId);

/// Width and height of a single street tile in position units
pub const TILE_SIZE: f64 = 2.0;

/// A cell of the city grid.
///
/// Ordered row-major, so maps keyed by coordinate iterate row by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub row: i32,
    pub column: i32,
}

impl Coordinate {
    pub fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Position of the top left corner of this cell
    pub fn position(&self) -> Position {
        Position::new(
            self.column as f64 * TILE_SIZE,
            self.row as f64 * TILE_SIZE,
        )
    }

    /// The coordinate of the adjacent cell in a given direction
    pub fn step(&self, direction: Direction) -> Coordinate {
        match direction {
            Direction::Northbound => Coordinate::new(self.row - 1, self.column),
            Direction::Eastbound => Coordinate::new(self.row, self.column + 1),
            Direction::Southbound => Coordinate::new(self.row + 1, self.column),
            Direction::Westbound => Coordinate::new(self.row, self.column - 1),
        }
    }

    pub fn manhattan_distance(&self, other: &Coordinate) -> u32 {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[r={} c={}]", self.row, self.column)
    }
}

/// A 2D position on the city map
///
/// `x` grows eastwards and `y` grows southwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The direction to another position
    ///
    /// Horizontal displacement wins over vertical displacement. Equal
    /// positions report northbound.
    pub fn direction_to(&self, other: &Position) -> Direction {
        if self.x != other.x {
            if self.x < other.x {
                Direction::Eastbound
            } else {
                Direction::Westbound
            }
        } else if self.y < other.y {
            Direction::Southbound
        } else {
            Direction::Northbound
        }
    }

    /// This position moved by `distance` along a heading
    pub fn offset(&self, direction: Direction, distance: f64) -> Position {
        match direction {
            Direction::Northbound => Position::new(self.x, self.y - distance),
            Direction::Eastbound => Position::new(self.x + distance, self.y),
            Direction::Southbound => Position::new(self.x, self.y + distance),
            Direction::Westbound => Position::new(self.x - distance, self.y),
        }
    }
}
