use crate::algorithms::common::{
    reconstruct_from_parents, OpenEntry, PathfindingAlgorithm, SearchResult, SearchSpace,
};
use crate::error::SearchError;
use crate::grid::Position;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BinaryHeap;

/// Dijkstra's algorithm over every walkable cell of the snapshot.
///
/// Tentative distances are seeded for the whole grid up front; the search
/// stops as soon as the goal is settled.
#[derive(Debug, Default)]
pub struct Dijkstra;

impl PathfindingAlgorithm for Dijkstra {
    fn find_path(&mut self, space: &SearchSpace<'_>, start: Position, goal: Position) -> SearchResult {
        let walkable = space.grid().walkable_positions();
        // Heap entries refer to positions by their index in `walkable`
        let index: FxHashMap<Position, usize> =
            walkable.iter().enumerate().map(|(i, &p)| (p, i)).collect();
        let mut distances = vec![f64::INFINITY; walkable.len()];
        let mut previous: FxHashMap<Position, Position> = FxHashMap::default();
        let mut settled: FxHashSet<Position> = FxHashSet::default();
        let mut heap = BinaryHeap::new();
        let mut sequence = 0u64;

        let &start_idx = index
            .get(&start)
            .ok_or_else(|| SearchError::fault("Dijkstra", format!("start {} is not walkable", start)))?;
        distances[start_idx] = 0.0;
        heap.push(OpenEntry {
            priority: 0.0,
            sequence,
            node: start_idx,
        });

        while let Some(entry) = heap.pop() {
            let current = walkable[entry.node];
            if !settled.insert(current) {
                continue;
            }
            if current == goal {
                log::debug!("dijkstra: settled {} of {} cells", settled.len(), walkable.len());
                return Ok(reconstruct_from_parents(&previous, start, goal));
            }

            let current_distance = distances[entry.node];
            for neighbor in space.neighbors(current) {
                if settled.contains(&neighbor) {
                    continue;
                }
                let Some(&ni) = index.get(&neighbor) else {
                    continue;
                };
                let candidate = current_distance + space.cost(current, neighbor);
                if candidate < distances[ni] {
                    distances[ni] = candidate;
                    previous.insert(neighbor, current);
                    sequence += 1;
                    heap.push(OpenEntry {
                        priority: candidate,
                        sequence,
                        node: ni,
                    });
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{path_cost, Heuristic};
    use crate::grid::GridSnapshot;

    #[test]
    fn prefers_cheaper_diagonals_over_fewer_axis_steps() {
        let grid = GridSnapshot::from_ascii(
            "
            .....
            .###.
            .....
            ",
        )
        .unwrap();
        let space = SearchSpace::new(&grid, Heuristic::FloorWeighted);
        let path = Dijkstra
            .find_path(&space, Position::new(0, 1, 0), Position::new(4, 1, 0))
            .unwrap()
            .unwrap();
        // Two diagonals and two straight steps around either side of the block
        let expected = 2.0 * std::f64::consts::SQRT_2 + 2.0;
        assert!((path_cost(&path) - expected).abs() < 1e-9);
    }

    #[test]
    fn crosses_floors_through_transit() {
        let grid = GridSnapshot::from_ascii(
            "
            S..
            ###

            S..
            ...
            ",
        )
        .unwrap();
        let space = SearchSpace::new(&grid, Heuristic::Admissible);
        let path = Dijkstra
            .find_path(&space, Position::new(2, 0, 0), Position::new(2, 1, 1))
            .unwrap()
            .unwrap();
        assert!(path.contains(&Position::new(0, 0, 0)));
        assert!(path.contains(&Position::new(0, 0, 1)));
    }

    #[test]
    fn unreachable_goal() {
        let grid = GridSnapshot::from_ascii(".#.\n").unwrap();
        let space = SearchSpace::new(&grid, Heuristic::FloorWeighted);
        let result = Dijkstra
            .find_path(&space, Position::new(0, 0, 0), Position::new(2, 0, 0))
            .unwrap();
        assert_eq!(result, None);
    }
}
