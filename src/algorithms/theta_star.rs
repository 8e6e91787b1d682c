use crate::algorithms::common::{
    Node, NodeArena, OpenEntry, Path, PathfindingAlgorithm, SearchResult, SearchSpace, Sequencer,
};
use crate::cost::euclidean_distance;
use crate::grid::{GridSnapshot, Position};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BinaryHeap;

/// Cells crossed by the segment `from → to` on `from`'s floor, both ends included.
///
/// Each step moves along exactly one axis, so consecutive cells are always adjacent.
pub fn line_cells(from: Position, to: Position) -> Vec<Position> {
    let (x1, y1) = (from.x as i64, from.y as i64);
    let (x2, y2) = (to.x as i64, to.y as i64);
    let mut dx = (x2 - x1).abs();
    let mut dy = (y2 - y1).abs();
    let steps = 1 + dx + dy;
    let x_inc = if x2 > x1 { 1 } else { -1 };
    let y_inc = if y2 > y1 { 1 } else { -1 };
    let mut error = dx - dy;
    dx *= 2;
    dy *= 2;

    let (mut x, mut y) = (x1, y1);
    let mut cells = Vec::with_capacity(steps as usize);
    for _ in 0..steps {
        cells.push(Position::new(x as usize, y as usize, from.floor));
        if x == x2 && y == y2 {
            break;
        }
        if error > 0 {
            x += x_inc;
            error -= dy;
        } else {
            y += y_inc;
            error += dx;
        }
    }
    cells
}

/// True when every rasterised cell between the two positions is walkable.
/// Never true across floors.
pub fn has_line_of_sight(grid: &GridSnapshot, from: Position, to: Position) -> bool {
    from.floor == to.floor
        && line_cells(from, to)
            .into_iter()
            .all(|cell| grid.is_walkable(cell))
}

/// Any-angle A*: a neighbour inherits the current node's parent whenever that
/// parent can see it, priced by straight-line distance.
#[derive(Debug, Default)]
pub struct ThetaStar;

impl ThetaStar {
    /// The raw any-angle path: consecutive waypoints are in line of sight but
    /// generally not adjacent.
    pub fn waypoints(&self, space: &SearchSpace<'_>, start: Position, goal: Position) -> Option<Path> {
        let grid = space.grid();
        let mut arena = NodeArena::default();
        let mut open = BinaryHeap::new();
        let mut sequencer = Sequencer::default();
        let mut best_g: FxHashMap<Position, f64> = FxHashMap::default();
        let mut closed: FxHashSet<Position> = FxHashSet::default();

        let h = space.estimate(start, goal);
        let root = arena.push(Node {
            position: start,
            parent: None,
            g: 0.0,
            h,
            f: h,
        });
        best_g.insert(start, 0.0);
        open.push(OpenEntry {
            priority: h,
            sequence: sequencer.next(),
            node: root,
        });

        while let Some(entry) = open.pop() {
            let current = *arena.get(entry.node);
            if closed.contains(&current.position) {
                continue;
            }
            if current.position == goal {
                log::debug!("theta*: {} nodes created", arena.len());
                return Some(arena.reconstruct(entry.node));
            }
            closed.insert(current.position);

            for neighbor in space.neighbors(current.position) {
                if closed.contains(&neighbor) {
                    continue;
                }
                let shortcut = current.parent.and_then(|pi| {
                    let parent = arena.get(pi);
                    has_line_of_sight(grid, parent.position, neighbor)
                        .then(|| (pi, parent.g + euclidean_distance(parent.position, neighbor)))
                });
                let (parent, g) = shortcut.unwrap_or_else(|| {
                    (entry.node, current.g + space.cost(current.position, neighbor))
                });

                if best_g.get(&neighbor).is_some_and(|&known| known <= g) {
                    continue;
                }
                best_g.insert(neighbor, g);

                let h = space.estimate(neighbor, goal);
                let node = arena.push(Node {
                    position: neighbor,
                    parent: Some(parent),
                    g,
                    h,
                    f: g + h,
                });
                open.push(OpenEntry {
                    priority: g + h,
                    sequence: sequencer.next(),
                    node,
                });
            }
        }

        None
    }

    /// Fills every any-angle segment with the cells its line-of-sight test covered.
    /// Waypoints that are already one move apart are kept as they are.
    pub fn densify(waypoints: &[Position]) -> Path {
        let mut path: Path = waypoints.first().copied().into_iter().collect();
        for pair in waypoints.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let one_move = a.x.abs_diff(b.x) <= 1 && a.y.abs_diff(b.y) <= 1;
            if a.floor != b.floor || one_move {
                path.push(b);
            } else {
                path.extend(line_cells(a, b).into_iter().skip(1));
            }
        }
        path
    }
}

impl PathfindingAlgorithm for ThetaStar {
    fn find_path(&mut self, space: &SearchSpace<'_>, start: Position, goal: Position) -> SearchResult {
        Ok(self
            .waypoints(space, start, goal)
            .map(|waypoints| Self::densify(&waypoints)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::Heuristic;
    use crate::grid::{Cell, GridSnapshot};

    #[test]
    fn raster_covers_both_ends() {
        let cells = line_cells(Position::new(0, 0, 0), Position::new(3, 1, 0));
        assert_eq!(cells.first(), Some(&Position::new(0, 0, 0)));
        assert_eq!(cells.last(), Some(&Position::new(3, 1, 0)));
        assert_eq!(cells.len(), 5);
        assert_eq!(line_cells(Position::new(2, 2, 0), Position::new(2, 2, 0)).len(), 1);
    }

    #[test]
    fn walls_and_floors_block_sight() {
        let grid = GridSnapshot::from_ascii(
            "
            .....
            ..#..
            .....

            .....
            .....
            .....
            ",
        )
        .unwrap();
        assert!(has_line_of_sight(&grid, Position::new(0, 0, 0), Position::new(4, 0, 0)));
        assert!(!has_line_of_sight(&grid, Position::new(0, 1, 0), Position::new(4, 1, 0)));
        assert!(!has_line_of_sight(&grid, Position::new(0, 0, 0), Position::new(0, 0, 1)));
    }

    #[test]
    fn open_room_collapses_to_two_waypoints() {
        let grid = GridSnapshot::filled(8, 8, 1, Cell::Open).unwrap();
        let space = SearchSpace::new(&grid, Heuristic::FloorWeighted);
        let start = Position::new(0, 0, 0);
        let goal = Position::new(7, 3, 0);
        let waypoints = ThetaStar.waypoints(&space, start, goal).unwrap();
        assert_eq!(waypoints, vec![start, goal]);

        let path = ThetaStar.find_path(&space, start, goal).unwrap().unwrap();
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert!(path.windows(2).all(|w| grid.are_adjacent(w[0], w[1])));
    }

    #[test]
    fn diagonal_steps_are_not_rasterised() {
        let waypoints = [Position::new(0, 0, 0), Position::new(1, 1, 0)];
        assert_eq!(ThetaStar::densify(&waypoints), waypoints.to_vec());

        let grid = GridSnapshot::from_ascii(
            "
            .#.
            #..
            ...
            ",
        )
        .unwrap();
        let space = SearchSpace::new(&grid, Heuristic::FloorWeighted);
        let path = ThetaStar
            .find_path(&space, Position::new(0, 0, 0), Position::new(2, 2, 0))
            .unwrap()
            .unwrap();
        assert!(path.iter().all(|&p| grid.is_walkable(p)));
    }
}
