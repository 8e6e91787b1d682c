use crate::algorithms::a_star::{best_first_by, Priority};
use crate::algorithms::common::{Path, PathfindingAlgorithm, SearchResult, SearchSpace};
use crate::grid::Position;

const JUMP_DIRECTIONS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Simplified jump point search.
///
/// This is not canonical JPS: there is no neighbour pruning or forced-neighbour
/// detection. Each expansion offers the ordinary neighbours plus a two-cell jump
/// in each of the 8 directions, so it carries none of JPS's speedup guarantees.
/// A jump is only offered when the cell it passes over is walkable, and that
/// cell is put back into the returned path.
#[derive(Debug, Default)]
pub struct JumpPoint;

impl JumpPoint {
    fn candidates(space: &SearchSpace<'_>, pos: Position) -> Vec<(Position, f64)> {
        let grid = space.grid();
        let mut candidates = Vec::with_capacity(18);

        for &(dx, dy) in &JUMP_DIRECTIONS {
            let Some(over) = grid.offset(pos, dx, dy) else {
                continue;
            };
            let Some(landing) = grid.offset(pos, 2 * dx, 2 * dy) else {
                continue;
            };
            if grid.is_walkable(over) && grid.is_walkable(landing) {
                let cost = space.cost(pos, over) + space.cost(over, landing);
                candidates.push((landing, cost));
            }
        }

        candidates.extend(
            space
                .neighbors(pos)
                .into_iter()
                .map(|n| (n, space.cost(pos, n))),
        );
        candidates
    }

    /// Re-inserts the cell skipped by each two-cell jump.
    fn expand_jumps(path: Path) -> Path {
        let mut expanded = Vec::with_capacity(path.len() * 2);
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            expanded.push(a);
            if a.floor == b.floor && (a.x.abs_diff(b.x) == 2 || a.y.abs_diff(b.y) == 2) {
                expanded.push(Position::new((a.x + b.x) / 2, (a.y + b.y) / 2, a.floor));
            }
        }
        if let Some(&last) = path.last() {
            expanded.push(last);
        }
        expanded
    }
}

impl PathfindingAlgorithm for JumpPoint {
    fn find_path(&mut self, space: &SearchSpace<'_>, start: Position, goal: Position) -> SearchResult {
        let (path, expansions) = best_first_by(space, start, goal, Priority::Weighted(1.0), |pos| {
            Self::candidates(space, pos)
        });
        log::debug!("jump point: {} expansions, found={}", expansions, path.is_some());
        Ok(path.map(Self::expand_jumps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::Heuristic;
    use crate::grid::GridSnapshot;

    #[test]
    fn jumps_are_expanded_into_adjacent_steps() {
        let grid = GridSnapshot::filled(9, 9, 1, crate::grid::Cell::Open).unwrap();
        let space = SearchSpace::new(&grid, Heuristic::FloorWeighted);
        let path = JumpPoint
            .find_path(&space, Position::new(0, 0, 0), Position::new(8, 8, 0))
            .unwrap()
            .unwrap();
        assert_eq!(path.len(), 9);
        assert!(path.windows(2).all(|w| grid.are_adjacent(w[0], w[1])));
    }

    #[test]
    fn never_jumps_over_a_wall() {
        let grid = GridSnapshot::from_ascii(
            "
            .#.
            .#.
            ...
            ",
        )
        .unwrap();
        let space = SearchSpace::new(&grid, Heuristic::FloorWeighted);
        let path = JumpPoint
            .find_path(&space, Position::new(0, 0, 0), Position::new(2, 0, 0))
            .unwrap()
            .unwrap();
        assert!(!path.contains(&Position::new(1, 0, 0)));
        assert!(path.windows(2).all(|w| grid.are_adjacent(w[0], w[1])));
        assert!(path.contains(&Position::new(1, 2, 0)));
    }
}
