use crate::cost::{movement_cost, Heuristic};
use crate::error::SearchError;
use crate::grid::{GridSnapshot, Position};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;

/// Ordered positions from start to goal inclusive.
pub type Path = Vec<Position>;

pub type SearchResult = Result<Option<Path>, SearchError>;

pub trait PathfindingAlgorithm {
    /// Finds a path from `start` to `goal`.
    ///
    /// Endpoints are validated by the caller; `Ok(None)` means no path exists
    /// (or, for the stochastic searches, none was found).
    fn find_path(&mut self, space: &SearchSpace<'_>, start: Position, goal: Position) -> SearchResult;
}

/// The grid plus the heuristic in force for a call.
///
/// Every algorithm expands and prices moves through this type only.
#[derive(Debug, Clone, Copy)]
pub struct SearchSpace<'a> {
    grid: &'a GridSnapshot,
    heuristic: Heuristic,
}

impl<'a> SearchSpace<'a> {
    pub fn new(grid: &'a GridSnapshot, heuristic: Heuristic) -> Self {
        SearchSpace { grid, heuristic }
    }

    pub fn grid(&self) -> &'a GridSnapshot {
        self.grid
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        self.grid.neighbors(pos)
    }

    pub fn cost(&self, from: Position, to: Position) -> f64 {
        movement_cost(from, to)
    }

    pub fn estimate(&self, from: Position, to: Position) -> f64 {
        self.heuristic.estimate(from, to)
    }
}

/// Frontier entry for a min-ordered `BinaryHeap`.
///
/// Lower `priority` pops first; equal priorities pop in insertion order.
#[derive(Debug, Clone, Copy)]
pub struct OpenEntry {
    pub priority: f64,
    pub sequence: u64,
    pub node: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behaviour
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Issues monotonically increasing sequence numbers for tie-breaking.
#[derive(Debug, Default)]
pub struct Sequencer(u64);

impl Sequencer {
    pub fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Node {
    pub position: Position,
    pub parent: Option<usize>,
    pub g: f64,
    pub h: f64,
    pub f: f64,
}

/// Owns every node created during one search; parents are indices into it.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn get(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Follows parent links from `index` back to the root.
    pub fn reconstruct(&self, index: usize) -> Path {
        let mut path = Vec::new();
        let mut current = Some(index);
        while let Some(i) = current {
            path.push(self.nodes[i].position);
            current = self.nodes[i].parent;
        }
        path.reverse();
        path
    }
}

/// Rebuilds a path from a child-to-parent map. Returns `None` if the chain breaks.
pub fn reconstruct_from_parents(
    parents: &FxHashMap<Position, Position>,
    start: Position,
    goal: Position,
) -> Option<Path> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = *parents.get(&current)?;
        path.push(current);
        if path.len() > parents.len() + 1 {
            return None;
        }
    }
    path.reverse();
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;

    #[test]
    fn open_entries_pop_lowest_then_oldest() {
        let mut heap = BinaryHeap::new();
        heap.push(OpenEntry { priority: 2.0, sequence: 1, node: 10 });
        heap.push(OpenEntry { priority: 1.0, sequence: 2, node: 20 });
        heap.push(OpenEntry { priority: 1.0, sequence: 3, node: 30 });
        heap.push(OpenEntry { priority: 0.5, sequence: 4, node: 40 });

        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|e| e.node)).collect();
        assert_eq!(order, vec![40, 20, 30, 10]);
    }

    #[test]
    fn arena_reconstructs_root_first() {
        let mut arena = NodeArena::default();
        let node = |x, parent| Node {
            position: Position::new(x, 0, 0),
            parent,
            g: 0.0,
            h: 0.0,
            f: 0.0,
        };
        let root = arena.push(node(0, None));
        let mid = arena.push(node(1, Some(root)));
        let leaf = arena.push(node(2, Some(mid)));
        assert_eq!(
            arena.reconstruct(leaf),
            vec![Position::new(0, 0, 0), Position::new(1, 0, 0), Position::new(2, 0, 0)]
        );
    }

    #[test]
    fn broken_parent_chain_is_rejected() {
        let mut parents = FxHashMap::default();
        parents.insert(Position::new(2, 0, 0), Position::new(1, 0, 0));
        assert_eq!(
            reconstruct_from_parents(&parents, Position::new(0, 0, 0), Position::new(2, 0, 0)),
            None
        );
        parents.insert(Position::new(1, 0, 0), Position::new(0, 0, 0));
        assert_eq!(
            reconstruct_from_parents(&parents, Position::new(0, 0, 0), Position::new(2, 0, 0))
                .map(|p| p.len()),
            Some(3)
        );
    }
}
