use crate::algorithms::a_star::AStar;
use crate::algorithms::common::{PathfindingAlgorithm, SearchResult, SearchSpace};
use crate::grid::Position;

/// Incremental planners that are exposed by name but plan from scratch.
///
/// Snapshots are immutable, so there is no change set to repair against and
/// every call is a full A* search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replanner {
    DStar,
    DStarLite,
    LifelongPlanning,
}

impl Replanner {
    pub fn name(self) -> &'static str {
        match self {
            Replanner::DStar => "D*",
            Replanner::DStarLite => "D* Lite",
            Replanner::LifelongPlanning => "LPA*",
        }
    }
}

impl PathfindingAlgorithm for Replanner {
    fn find_path(&mut self, space: &SearchSpace<'_>, start: Position, goal: Position) -> SearchResult {
        log::warn!("{} has no incremental mode; planning from scratch with A*", self.name());
        AStar::new().find_path(space, start, goal)
    }
}
