use crate::algorithms::common::{PathfindingAlgorithm, SearchResult, SearchSpace};
use crate::cost::{scaled_cost, COST_SCALE};
use crate::grid::Position;
use pathfinding::prelude::fringe;

/// Fringe search: depth-first passes bounded by an `f` threshold that only
/// rises to the cheapest `f` that exceeded it.
///
/// Costs are scaled to integers and the heuristic is floored after scaling,
/// so an admissible estimate stays admissible and the result is optimal.
#[derive(Debug, Default)]
pub struct Fringe;

impl PathfindingAlgorithm for Fringe {
    fn find_path(&mut self, space: &SearchSpace<'_>, start: Position, goal: Position) -> SearchResult {
        let result = fringe(
            &start,
            |p| {
                space
                    .neighbors(*p)
                    .into_iter()
                    .map(|n| (n, scaled_cost(*p, n)))
                    .collect::<Vec<_>>()
            },
            |p| (space.estimate(*p, goal) * COST_SCALE).floor() as u64,
            |p| *p == goal,
        );
        log::debug!(
            "fringe: cost {:?}",
            result.as_ref().map(|(_, cost)| *cost as f64 / COST_SCALE)
        );
        Ok(result.map(|(path, _)| path))
    }
}
