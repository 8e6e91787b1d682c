use crate::algorithms::common::{Path, PathfindingAlgorithm, SearchResult, SearchSpace};
use crate::grid::Position;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// One BFS half: its queue and the parent of every position it has reached.
struct Frontier {
    queue: VecDeque<Position>,
    parents: FxHashMap<Position, Option<Position>>,
}

impl Frontier {
    fn new(root: Position) -> Self {
        let mut parents = FxHashMap::default();
        parents.insert(root, None);
        Frontier {
            queue: VecDeque::from([root]),
            parents,
        }
    }

    /// Walks parents from `pos` back to this frontier's root, `pos` first.
    fn chain(&self, pos: Position) -> Path {
        let mut chain = vec![pos];
        let mut current = pos;
        while let Some(&Some(parent)) = self.parents.get(&current) {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Pops one position. Returns it if the other side has already reached it,
    /// otherwise expands it.
    fn step(&mut self, space: &SearchSpace<'_>, other: &Frontier) -> Option<Position> {
        let current = self.queue.pop_front()?;
        if other.parents.contains_key(&current) {
            return Some(current);
        }
        for neighbor in space.neighbors(current) {
            if !self.parents.contains_key(&neighbor) {
                self.parents.insert(neighbor, Some(current));
                self.queue.push_back(neighbor);
            }
        }
        None
    }
}

/// Two breadth-first searches, from the start and from the goal, taking turns.
///
/// The frontiers are checked for a meeting when a position is popped, not when
/// it is discovered. The spliced path is always a valid chain from start to
/// goal, but it can be a few moves longer than a plain breadth-first path and
/// makes no cost guarantee.
#[derive(Debug, Default)]
pub struct Bidirectional;

impl Bidirectional {
    fn splice(forward: &Frontier, backward: &Frontier, meeting: Position) -> Path {
        let mut path = forward.chain(meeting);
        path.reverse();
        // `chain` starts at the meeting point, which is already in `path`
        path.extend(backward.chain(meeting).into_iter().skip(1));
        path
    }
}

impl PathfindingAlgorithm for Bidirectional {
    fn find_path(&mut self, space: &SearchSpace<'_>, start: Position, goal: Position) -> SearchResult {
        let mut forward = Frontier::new(start);
        let mut backward = Frontier::new(goal);

        // Neighbour relation is symmetric, so the backward search walks real edges in reverse
        while !forward.queue.is_empty() && !backward.queue.is_empty() {
            if let Some(meeting) = forward.step(space, &backward) {
                return Ok(Some(Self::splice(&forward, &backward, meeting)));
            }
            if let Some(meeting) = backward.step(space, &forward) {
                return Ok(Some(Self::splice(&forward, &backward, meeting)));
            }
        }

        log::debug!(
            "bidirectional: exhausted after {} + {} positions",
            forward.parents.len(),
            backward.parents.len()
        );
        Ok(None)
    }
}
