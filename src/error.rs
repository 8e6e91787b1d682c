use crate::grid::{Cell, Position};
use std::fmt;
use thiserror::Error;

/// Why an endpoint was refused before searching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    OutOfBounds,
    NotWalkable(Cell),
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::OutOfBounds => write!(f, "outside the grid"),
            InvalidReason::NotWalkable(cell) => write!(f, "not walkable ({:?})", cell),
        }
    }
}

/// Failures of a single search call. "No path" is `Ok(None)`, not an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("invalid coordinate {position}: {reason}")]
    InvalidCoordinate {
        position: Position,
        reason: InvalidReason,
    },

    #[error("{algorithm} fault: {reason}")]
    AlgorithmFault {
        algorithm: &'static str,
        reason: String,
    },
}

impl SearchError {
    pub fn fault(algorithm: &'static str, reason: impl Into<String>) -> Self {
        SearchError::AlgorithmFault {
            algorithm,
            reason: reason.into(),
        }
    }
}

/// Failures while assembling a grid snapshot.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("grid has no cells")]
    Empty,

    #[error("floor {floor}, row {y}: expected {expected} cells, found {found}")]
    RaggedRow {
        floor: usize,
        y: usize,
        expected: usize,
        found: usize,
    },

    #[error("floor {floor}: expected {expected} rows, found {found}")]
    FloorMismatch {
        floor: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown cell glyph {glyph:?} at ({x}, {y}, {floor})")]
    UnknownGlyph {
        glyph: char,
        x: usize,
        y: usize,
        floor: usize,
    },

    #[error("failed to read grid: {0}")]
    Io(#[from] std::io::Error),
}
