//! Core types for the wireless network simulation
//!
//! Positions, distance metrics and the crate error type.

use std::fmt;

use super::key::Key;

/// Number of base stations in the map created on first access
pub const DEFAULT_BASE_STATIONS: usize = 16;

/// Number of users in the map created on first access
pub const DEFAULT_USERS: usize = 32;

/// Errors raised by the simulation core
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0} not found in graph")]
    KeyNotFound(Key),

    #[error("{0} is already present in graph")]
    DuplicateKey(Key),

    #[error("{0} is not a base station")]
    NotABaseStation(Key),

    #[error("{0} is not a user")]
    NotAUser(Key),

    #[error("Simulation thread was already started")]
    AlreadyStarted,

    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = std::result::Result<T, SimError>;

/// An integer position on the 2D map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move by the given offset, staying inside `[0, width] x [0, height]`.
    /// Negative bounds are treated as 0.
    pub fn offset_clamped(&self, dx: i32, dy: i32, width: i32, height: i32) -> Point {
        Point {
            x: self.x.saturating_add(dx).clamp(0, width.max(0)),
            y: self.y.saturating_add(dy).clamp(0, height.max(0)),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Straight-line distance between two points
pub fn euclidean_distance(p1: &Point, p2: &Point) -> f64 {
    let dx = p1.x as f64 - p2.x as f64;
    let dy = p1.y as f64 - p2.y as f64;
    dx.hypot(dy)
}

/// Chessboard distance: the larger of the two axis differences.
/// Saturates at `i32::MAX` for points at opposite ends of the `i32` range.
pub fn chebyshev_distance(p1: &Point, p2: &Point) -> i32 {
    let dx = p1.x.abs_diff(p2.x);
    let dy = p1.y.abs_diff(p2.y);
    i32::try_from(dx.max(dy)).unwrap_or(i32::MAX)
}
