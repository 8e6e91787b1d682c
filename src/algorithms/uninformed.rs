use crate::algorithms::common::{Path, PathfindingAlgorithm, SearchResult, SearchSpace};
use crate::grid::Position;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

// Frontier entries carry their whole prefix. That is O(path length) per entry,
// which is fine for building-sized grids.

/// Breadth-first search; shortest in step count, not in weighted cost.
#[derive(Debug, Default)]
pub struct BreadthFirst;

impl PathfindingAlgorithm for BreadthFirst {
    fn find_path(&mut self, space: &SearchSpace<'_>, start: Position, goal: Position) -> SearchResult {
        let mut queue: VecDeque<(Position, Path)> = VecDeque::from([(start, vec![start])]);
        let mut visited = FxHashSet::default();

        while let Some((current, path)) = queue.pop_front() {
            if current == goal {
                log::debug!("bfs: visited {} positions", visited.len());
                return Ok(Some(path));
            }
            if !visited.insert(current) {
                continue;
            }
            for neighbor in space.neighbors(current) {
                if !visited.contains(&neighbor) {
                    let mut next = path.clone();
                    next.push(neighbor);
                    queue.push_back((neighbor, next));
                }
            }
        }

        Ok(None)
    }
}

/// Depth-first search; finds some path, usually a long one.
#[derive(Debug, Default)]
pub struct DepthFirst;

impl PathfindingAlgorithm for DepthFirst {
    fn find_path(&mut self, space: &SearchSpace<'_>, start: Position, goal: Position) -> SearchResult {
        let mut stack: Vec<(Position, Path)> = vec![(start, vec![start])];
        let mut visited = FxHashSet::default();

        while let Some((current, path)) = stack.pop() {
            if current == goal {
                log::debug!("dfs: visited {} positions", visited.len());
                return Ok(Some(path));
            }
            if !visited.insert(current) {
                continue;
            }
            for neighbor in space.neighbors(current) {
                if !visited.contains(&neighbor) {
                    let mut next = path.clone();
                    next.push(neighbor);
                    stack.push((neighbor, next));
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::Heuristic;
    use crate::grid::GridSnapshot;

    fn rooms() -> GridSnapshot {
        GridSnapshot::from_ascii(
            "
            ....#....
            ....#....
            ....#....
            .........
            ",
        )
        .unwrap()
    }

    #[test]
    fn bfs_minimises_steps() {
        let grid = rooms();
        let space = SearchSpace::new(&grid, Heuristic::FloorWeighted);
        let path = BreadthFirst
            .find_path(&space, Position::new(0, 0, 0), Position::new(8, 0, 0))
            .unwrap()
            .unwrap();
        // Around the wall bottom: Chebyshev distance through (4, 3)
        assert_eq!(path.len(), 9);
        assert!(path.contains(&Position::new(4, 3, 0)));
    }

    #[test]
    fn dfs_returns_connected_path() {
        let grid = rooms();
        let space = SearchSpace::new(&grid, Heuristic::FloorWeighted);
        let path = DepthFirst
            .find_path(&space, Position::new(0, 0, 0), Position::new(8, 0, 0))
            .unwrap()
            .unwrap();
        assert_eq!(path.first(), Some(&Position::new(0, 0, 0)));
        assert_eq!(path.last(), Some(&Position::new(8, 0, 0)));
        assert!(path.windows(2).all(|w| grid.are_adjacent(w[0], w[1])));
    }

    #[test]
    fn sealed_goal_has_no_path() {
        let grid = GridSnapshot::from_ascii(
            "
            ..#..
            ..#..
            ",
        )
        .unwrap();
        let space = SearchSpace::new(&grid, Heuristic::FloorWeighted);
        let start = Position::new(0, 0, 0);
        let goal = Position::new(4, 1, 0);
        assert_eq!(BreadthFirst.find_path(&space, start, goal).unwrap(), None);
        assert_eq!(DepthFirst.find_path(&space, start, goal).unwrap(), None);
    }
}
