use crate::algorithms::common::{Path, PathfindingAlgorithm, SearchResult, SearchSpace};
use crate::config::AntColonyParams;
use crate::error::SearchError;
use crate::grid::{GridSnapshot, Position};
use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::rngs::StdRng;
use rustc_hash::{FxHashMap, FxHashSet};

const NAME: &str = "Ant Colony";

/// Pheromone weight per position.
///
/// Owned by one engine and reshaped by every colony run on it; no other
/// algorithm reads it.
#[derive(Debug, Clone, Default)]
pub struct PheromoneField {
    levels: FxHashMap<Position, f64>,
}

impl PheromoneField {
    pub fn new() -> Self {
        PheromoneField::default()
    }

    /// Seeds every walkable cell not yet in the field. Existing levels are kept.
    pub fn ensure_initialized(&mut self, grid: &GridSnapshot, initial: f64) {
        for pos in grid.walkable_positions() {
            self.levels.entry(pos).or_insert(initial);
        }
    }

    pub fn level(&self, pos: Position) -> f64 {
        self.levels.get(&pos).copied().unwrap_or(0.0)
    }

    pub fn deposit(&mut self, path: &[Position], amount: f64) {
        for pos in path {
            if let Some(level) = self.levels.get_mut(pos) {
                *level += amount;
            }
        }
    }

    pub fn evaporate(&mut self, rate: f64) {
        for level in self.levels.values_mut() {
            *level *= 1.0 - rate;
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn clear(&mut self) {
        self.levels.clear();
    }
}

/// Ant colony optimisation over the engine's pheromone field.
pub struct AntColony<'f> {
    params: AntColonyParams,
    field: &'f mut PheromoneField,
    rng: StdRng,
}

impl<'f> AntColony<'f> {
    pub fn new(params: AntColonyParams, field: &'f mut PheromoneField, rng: StdRng) -> Self {
        AntColony { params, field, rng }
    }

    /// One ant's randomised walk. `None` when it runs into a dead end.
    fn walk(&mut self, space: &SearchSpace<'_>, start: Position, goal: Position) -> SearchResult {
        let mut current = start;
        let mut path = vec![start];
        let mut visited = FxHashSet::default();
        visited.insert(start);

        while current != goal {
            let candidates: Vec<Position> = space
                .neighbors(current)
                .into_iter()
                .filter(|n| !visited.contains(n))
                .collect();
            if candidates.is_empty() {
                return Ok(None);
            }

            let weights: Vec<f64> = candidates
                .iter()
                .map(|&n| self.field.level(n) / (space.estimate(n, goal) + 1.0))
                .collect();
            // Pheromone can evaporate to exactly zero; nothing left to follow
            let choice = match WeightedIndex::new(&weights) {
                Ok(choice) => choice,
                Err(WeightedError::AllWeightsZero) => return Ok(None),
                Err(e) => {
                    return Err(SearchError::fault(
                        NAME,
                        format!("bad step weights at {}: {}", current, e),
                    ))
                }
            };

            current = candidates[choice.sample(&mut self.rng)];
            path.push(current);
            visited.insert(current);
        }

        Ok(Some(path))
    }
}

impl PathfindingAlgorithm for AntColony<'_> {
    fn find_path(&mut self, space: &SearchSpace<'_>, start: Position, goal: Position) -> SearchResult {
        let rate = self.params.evaporation_rate;
        if !(0.0..1.0).contains(&rate) {
            return Err(SearchError::fault(NAME, format!("evaporation rate {} outside [0, 1)", rate)));
        }
        self.field
            .ensure_initialized(space.grid(), self.params.initial_pheromone);

        let mut best: Option<Path> = None;
        for iteration in 0..self.params.iterations {
            let mut successful = Vec::new();
            for _ in 0..self.params.ant_count {
                if let Some(path) = self.walk(space, start, goal)? {
                    successful.push(path);
                }
            }

            for path in &successful {
                if best.as_ref().map_or(true, |b| path.len() < b.len()) {
                    best = Some(path.clone());
                }
                self.field.deposit(path, 1.0 / path.len() as f64);
            }
            self.field.evaporate(rate);

            log::trace!(
                "ant colony iteration {}: {} of {} ants arrived",
                iteration,
                successful.len(),
                self.params.ant_count
            );
        }

        log::debug!("ant colony: best length {:?}", best.as_ref().map(Vec::len));
        Ok(best)
    }
}
