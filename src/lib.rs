//! Multi-algorithm pathfinding over multi-floor building snapshots.
//!
//! A [`PathfindingEngine`] owns one [`GridSnapshot`] and dispatches to any
//! [`Algorithm`]; [`benchmark`] runs the whole roster side by side.

pub mod algorithms;
pub mod benchmark;
pub mod config;
pub mod cost;
pub mod engine;
pub mod error;
pub mod grid;

pub use algorithms::{Path, PathfindingAlgorithm, SearchResult, SearchSpace};
pub use benchmark::{BatchBenchmark, BenchmarkRecord, BenchmarkReport};
pub use config::SearchParams;
pub use cost::Heuristic;
pub use engine::{Algorithm, PathfindingEngine};
pub use error::{GridError, InvalidReason, SearchError};
pub use grid::{Cell, GridSnapshot, Position};
