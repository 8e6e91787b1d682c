use crate::algorithms::a_star::AStar;
use crate::algorithms::common::{Path, PathfindingAlgorithm, SearchResult, SearchSpace};
use crate::config::GeneticParams;
use crate::error::SearchError;
use crate::grid::Position;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashSet;

/// Refill gives up after this many attempts per missing individual.
const REFILL_ATTEMPTS_PER_SLOT: usize = 4;

#[derive(Debug, Clone)]
struct Candidate {
    path: Path,
    fitness: f64,
}

/// Evolves a population of complete start-to-goal paths.
///
/// Individuals are seeded by random walks, recombined by splicing a parent
/// prefix onto an A* completion and mutated by re-planning a random segment.
pub struct GeneticSearch {
    params: GeneticParams,
    rng: StdRng,
}

impl GeneticSearch {
    pub fn new(params: GeneticParams, rng: StdRng) -> Self {
        GeneticSearch { params, rng }
    }

    /// Higher is better. Paths that miss the goal score zero.
    pub fn fitness(space: &SearchSpace<'_>, path: &[Position], goal: Position) -> f64 {
        if path.last() != Some(&goal) {
            return 0.0;
        }
        let bends = path
            .windows(3)
            .filter(|w| {
                let direct = space.estimate(w[0], w[2]);
                let via = space.estimate(w[0], w[1]) + space.estimate(w[1], w[2]);
                direct < via
            })
            .count();
        1.0 / (path.len() as f64 + 0.1 * bends as f64)
    }

    fn random_walk(&mut self, space: &SearchSpace<'_>, start: Position, goal: Position) -> Option<Path> {
        let mut path = vec![start];
        let mut visited = FxHashSet::default();
        visited.insert(start);
        let mut current = start;

        for _ in 0..self.params.max_walk_steps {
            if current == goal {
                return Some(path);
            }
            let options: Vec<Position> = space
                .neighbors(current)
                .into_iter()
                .filter(|n| !visited.contains(n))
                .collect();
            current = *options.choose(&mut self.rng)?;
            visited.insert(current);
            path.push(current);
        }

        (current == goal).then_some(path)
    }

    fn crossover(&self, space: &SearchSpace<'_>, first: &[Position], second: &[Position]) -> SearchResult {
        if first.len() < 2 || second.len() < 2 {
            return Ok(Some(first.to_vec()));
        }
        let mut child = first[..first.len() / 2].to_vec();
        let (Some(&joint), Some(&target)) = (child.last(), second.last()) else {
            return Ok(None);
        };
        match AStar.find_path(space, joint, target)? {
            Some(rest) => {
                child.extend(rest.into_iter().skip(1));
                Ok(Some(child))
            }
            None => Ok(None),
        }
    }

    fn mutate(&mut self, space: &SearchSpace<'_>, path: Path) -> SearchResult {
        if path.len() < 3 || self.rng.gen::<f64>() >= self.params.mutation_rate {
            return Ok(Some(path));
        }
        let i = self.rng.gen_range(0..path.len() - 1);
        let j = self.rng.gen_range(i + 1..path.len());
        let Some(segment) = AStar.find_path(space, path[i], path[j])? else {
            return Ok(Some(path));
        };

        let mut mutated = path[..i].to_vec();
        mutated.extend(segment);
        mutated.extend_from_slice(&path[j + 1..]);
        Ok(Some(mutated))
    }

    fn offspring(&mut self, space: &SearchSpace<'_>, population: &[Candidate], start: Position, goal: Position) -> SearchResult {
        if population.len() < 2 {
            return Ok(self.random_walk(space, start, goal));
        }
        let pool = &population[..self.params.parent_pool.clamp(2, population.len())];
        let parents: Vec<&Candidate> = pool.choose_multiple(&mut self.rng, 2).collect();
        let Some(child) = self.crossover(space, &parents[0].path, &parents[1].path)? else {
            return Ok(None);
        };
        self.mutate(space, child)
    }

    fn admit(space: &SearchSpace<'_>, population: &mut Vec<Candidate>, path: Path, goal: Position) {
        let fitness = Self::fitness(space, &path, goal);
        if fitness > 0.0 {
            population.push(Candidate { path, fitness });
        }
    }
}

impl PathfindingAlgorithm for GeneticSearch {
    fn find_path(&mut self, space: &SearchSpace<'_>, start: Position, goal: Position) -> SearchResult {
        let size = self.params.population_size;
        if size == 0 {
            return Err(SearchError::fault("Genetic", "population size is zero"));
        }

        let mut population: Vec<Candidate> = Vec::with_capacity(size);
        for _ in 0..size {
            if let Some(path) = self.random_walk(space, start, goal) {
                Self::admit(space, &mut population, path, goal);
            }
        }
        log::debug!("genetic: {} of {} seeds reached the goal", population.len(), size);

        let mut best: Option<Candidate> = None;
        for generation in 0..self.params.generations {
            // Stable, so equally fit individuals keep their order
            population.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
            population.truncate(size.div_ceil(2));

            let mut attempts = 0;
            while population.len() < size && attempts < size * REFILL_ATTEMPTS_PER_SLOT {
                attempts += 1;
                if let Some(child) = self.offspring(space, &population, start, goal)? {
                    Self::admit(space, &mut population, child, goal);
                }
            }

            if let Some(leader) = population.iter().max_by(|a, b| a.fitness.total_cmp(&b.fitness)) {
                if best.as_ref().map_or(true, |b| leader.fitness > b.fitness) {
                    best = Some(leader.clone());
                }
            }
            log::trace!(
                "genetic generation {}: population {}, best fitness {:?}",
                generation,
                population.len(),
                best.as_ref().map(|b| b.fitness)
            );
        }

        if best.is_none() {
            best = population
                .into_iter()
                .max_by(|a, b| a.fitness.total_cmp(&b.fitness));
        }
        Ok(best.map(|c| c.path))
    }
}
