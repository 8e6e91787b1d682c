use crate::algorithms::common::{
    Node, NodeArena, OpenEntry, Path, PathfindingAlgorithm, SearchResult, SearchSpace, Sequencer,
};
use crate::config::AnytimeParams;
use crate::cost::path_cost;
use crate::error::SearchError;
use crate::grid::Position;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// How the frontier is ordered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Priority {
    /// `h` only.
    Greedy,
    /// `g + weight·h`.
    Weighted(f64),
}

impl Priority {
    fn key(self, g: f64, h: f64) -> f64 {
        match self {
            Priority::Greedy => h,
            Priority::Weighted(weight) => g + weight * h,
        }
    }
}

fn best_first(
    space: &SearchSpace<'_>,
    start: Position,
    goal: Position,
    priority: Priority,
) -> (Option<Path>, usize) {
    best_first_by(space, start, goal, priority, |pos| {
        space
            .neighbors(pos)
            .into_iter()
            .map(|n| (n, space.cost(pos, n)))
            .collect()
    })
}

/// Shared best-first loop behind Greedy, A*, Weighted A* and jump point search.
///
/// `successors` yields each candidate with the cost of reaching it.
/// A position is settled when popped; settled positions are never re-opened,
/// even if a cheaper `g` turns up later. A `best_g` index replaces scanning the
/// open list for a cheaper duplicate.
pub(crate) fn best_first_by(
    space: &SearchSpace<'_>,
    start: Position,
    goal: Position,
    priority: Priority,
    successors: impl Fn(Position) -> Vec<(Position, f64)>,
) -> (Option<Path>, usize) {
    let mut arena = NodeArena::default();
    let mut open = BinaryHeap::new();
    let mut sequencer = Sequencer::default();
    let mut best_g: FxHashMap<Position, f64> = FxHashMap::default();
    let mut closed: FxHashSet<Position> = FxHashSet::default();
    let mut expansions = 0;

    let h = space.estimate(start, goal);
    let f = priority.key(0.0, h);
    let root = arena.push(Node {
        position: start,
        parent: None,
        g: 0.0,
        h,
        f,
    });
    best_g.insert(start, 0.0);
    open.push(OpenEntry {
        priority: f,
        sequence: sequencer.next(),
        node: root,
    });

    while let Some(entry) = open.pop() {
        let current = *arena.get(entry.node);
        if closed.contains(&current.position) {
            continue;
        }
        if current.position == goal {
            return (Some(arena.reconstruct(entry.node)), expansions);
        }
        closed.insert(current.position);
        expansions += 1;

        for (neighbor, step_cost) in successors(current.position) {
            if closed.contains(&neighbor) {
                continue;
            }
            let g = current.g + step_cost;
            let skip = match priority {
                // Greedy never improves on an h it has already queued
                Priority::Greedy => best_g.contains_key(&neighbor),
                Priority::Weighted(_) => best_g.get(&neighbor).is_some_and(|&known| known <= g),
            };
            if skip {
                continue;
            }
            best_g.insert(neighbor, g);

            let h = space.estimate(neighbor, goal);
            let f = priority.key(g, h);
            let node = arena.push(Node {
                position: neighbor,
                parent: Some(entry.node),
                g,
                h,
                f,
            });
            open.push(OpenEntry {
                priority: f,
                sequence: sequencer.next(),
                node,
            });
        }
    }

    (None, expansions)
}

/// Greedy best-first search: fast, not guaranteed shortest.
#[derive(Debug, Default)]
pub struct GreedyBestFirst;

impl PathfindingAlgorithm for GreedyBestFirst {
    fn find_path(&mut self, space: &SearchSpace<'_>, start: Position, goal: Position) -> SearchResult {
        let (path, expansions) = best_first(space, start, goal, Priority::Greedy);
        log::debug!("greedy: {} expansions, found={}", expansions, path.is_some());
        Ok(path)
    }
}

/// A* ordered by `f = g + h`; a settled position is never re-opened.
#[derive(Debug, Default)]
pub struct AStar;

impl AStar {
    pub fn new() -> Self {
        AStar
    }
}

impl PathfindingAlgorithm for AStar {
    fn find_path(&mut self, space: &SearchSpace<'_>, start: Position, goal: Position) -> SearchResult {
        let (path, expansions) = best_first(space, start, goal, Priority::Weighted(1.0));
        log::debug!("a*: {} expansions, found={}", expansions, path.is_some());
        Ok(path)
    }
}

/// A* with `f = g + weight·h`.
#[derive(Debug, Clone, Copy)]
pub struct WeightedAStar {
    pub weight: f64,
}

impl WeightedAStar {
    pub fn new(weight: f64) -> Self {
        WeightedAStar { weight }
    }
}

impl PathfindingAlgorithm for WeightedAStar {
    fn find_path(&mut self, space: &SearchSpace<'_>, start: Position, goal: Position) -> SearchResult {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(SearchError::fault(
                "Weighted A*",
                format!("invalid heuristic weight {}", self.weight),
            ));
        }
        let (path, expansions) = best_first(space, start, goal, Priority::Weighted(self.weight));
        log::debug!(
            "weighted a* (w={:.3}): {} expansions, found={}",
            self.weight,
            expansions,
            path.is_some()
        );
        Ok(path)
    }
}

/// Outcome of one Weighted A* round inside [`AnytimeAStar`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnytimeRound {
    pub weight: f64,
    pub cost: f64,
    /// Cost of the path the search would return if stopped after this round.
    pub best_cost: f64,
    pub elapsed: Duration,
}

/// Repeated Weighted A* with a shrinking weight until the budget runs out
/// or the weight reaches 1.
#[derive(Debug, Clone)]
pub struct AnytimeAStar {
    params: AnytimeParams,
    rounds: Vec<AnytimeRound>,
}

impl AnytimeAStar {
    pub fn new(params: AnytimeParams) -> Self {
        AnytimeAStar {
            params,
            rounds: Vec::new(),
        }
    }

    /// Rounds completed by the last call.
    pub fn rounds(&self) -> &[AnytimeRound] {
        &self.rounds
    }
}

impl PathfindingAlgorithm for AnytimeAStar {
    fn find_path(&mut self, space: &SearchSpace<'_>, start: Position, goal: Position) -> SearchResult {
        let AnytimeParams {
            initial_weight,
            decay,
            time_budget,
        } = self.params;
        if !(decay > 0.0 && decay < 1.0) || !initial_weight.is_finite() {
            return Err(SearchError::fault(
                "Anytime A*",
                format!("weight schedule {} x {} never reaches 1", initial_weight, decay),
            ));
        }

        self.rounds.clear();
        let started = Instant::now();
        let mut weight = initial_weight.max(1.0);
        let mut best: Option<(Path, f64)> = None;

        loop {
            let (path, _) = best_first(space, start, goal, Priority::Weighted(weight));
            // A failed round means the goal is unreachable at any weight
            let Some(path) = path else { break };

            let cost = path_cost(&path);
            if best.as_ref().map_or(true, |(_, best_cost)| cost < *best_cost) {
                best = Some((path, cost));
            }
            let best_cost = best.as_ref().map_or(cost, |(_, c)| *c);
            self.rounds.push(AnytimeRound {
                weight,
                cost,
                best_cost,
                elapsed: started.elapsed(),
            });

            if weight <= 1.0 || started.elapsed() >= time_budget {
                break;
            }
            weight = (weight * decay).max(1.0);
        }

        log::debug!(
            "anytime a*: {} rounds, best cost {:?}",
            self.rounds.len(),
            best.as_ref().map(|(_, c)| *c)
        );
        Ok(best.map(|(path, _)| path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::Heuristic;
    use crate::grid::GridSnapshot;

    fn maze() -> GridSnapshot {
        GridSnapshot::from_ascii(
            "
            ..........
            .########.
            .#......#.
            .#.####.#.
            .#.#..#.#.
            ...#..#...
            ##....####
            ..........
            ",
        )
        .unwrap()
    }

    #[test]
    fn a_star_matches_pathfinding_crate_on_one_floor() {
        let grid = maze();
        let space = SearchSpace::new(&grid, Heuristic::FloorWeighted);
        let start = Position::new(0, 0, 0);
        let goal = Position::new(4, 4, 0);

        let path = AStar.find_path(&space, start, goal).unwrap().unwrap();
        let reference = pathfinding::prelude::dijkstra(
            &start,
            |p| {
                grid.neighbors(*p)
                    .into_iter()
                    .map(|n| (n, (crate::cost::movement_cost(*p, n) * 1e6).round() as u64))
                    .collect::<Vec<_>>()
            },
            |p| *p == goal,
        )
        .unwrap();

        assert!((path_cost(&path) - reference.1 as f64 / 1e6).abs() < 1e-3);
    }

    #[test]
    fn a_star_is_deterministic() {
        let grid = GridSnapshot::filled(12, 12, 1, crate::grid::Cell::Open).unwrap();
        let space = SearchSpace::new(&grid, Heuristic::FloorWeighted);
        let start = Position::new(0, 0, 0);
        let goal = Position::new(11, 5, 0);
        let first = AStar.find_path(&space, start, goal).unwrap();
        let second = AStar.find_path(&space, start, goal).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn greedy_reaches_goal() {
        let grid = maze();
        let space = SearchSpace::new(&grid, Heuristic::FloorWeighted);
        let path = GreedyBestFirst
            .find_path(&space, Position::new(0, 0, 0), Position::new(9, 7, 0))
            .unwrap()
            .unwrap();
        assert_eq!(path.first(), Some(&Position::new(0, 0, 0)));
        assert_eq!(path.last(), Some(&Position::new(9, 7, 0)));
    }

    #[test]
    fn weighted_never_beats_plain_a_star() {
        let grid = maze();
        let space = SearchSpace::new(&grid, Heuristic::FloorWeighted);
        let start = Position::new(2, 2, 0);
        let goal = Position::new(9, 7, 0);
        let optimal = AStar.find_path(&space, start, goal).unwrap().unwrap();
        let weighted = WeightedAStar::new(3.0)
            .find_path(&space, start, goal)
            .unwrap()
            .unwrap();
        assert!(path_cost(&weighted) + 1e-9 >= path_cost(&optimal));
    }

    #[test]
    fn rejects_bad_weights() {
        let grid = maze();
        let space = SearchSpace::new(&grid, Heuristic::FloorWeighted);
        let result = WeightedAStar::new(f64::NAN).find_path(
            &space,
            Position::new(0, 0, 0),
            Position::new(9, 0, 0),
        );
        assert!(matches!(result, Err(SearchError::AlgorithmFault { .. })));
    }

    #[test]
    fn anytime_rounds_never_get_worse_and_end_at_weight_one() {
        let grid = maze();
        let space = SearchSpace::new(&grid, Heuristic::FloorWeighted);
        let mut anytime = AnytimeAStar::new(AnytimeParams {
            time_budget: Duration::from_secs(30),
            ..AnytimeParams::default()
        });
        let start = Position::new(0, 7, 0);
        let goal = Position::new(4, 4, 0);
        let path = anytime.find_path(&space, start, goal).unwrap().unwrap();

        let rounds = anytime.rounds();
        assert!(rounds.len() > 1);
        assert_eq!(rounds.last().map(|r| r.weight), Some(1.0));
        assert!(rounds.windows(2).all(|w| w[1].best_cost <= w[0].best_cost));
        assert!(rounds.windows(2).all(|w| w[1].weight < w[0].weight));
        let optimal = AStar.find_path(&space, start, goal).unwrap().unwrap();
        assert!((path_cost(&path) - path_cost(&optimal)).abs() < 1e-9);
    }

    #[test]
    fn anytime_with_zero_budget_still_returns_first_round() {
        let grid = maze();
        let space = SearchSpace::new(&grid, Heuristic::FloorWeighted);
        let mut anytime = AnytimeAStar::new(AnytimeParams {
            time_budget: Duration::ZERO,
            ..AnytimeParams::default()
        });
        let path = anytime
            .find_path(&space, Position::new(0, 0, 0), Position::new(9, 7, 0))
            .unwrap();
        assert!(path.is_some());
        assert_eq!(anytime.rounds().len(), 1);
    }
}
