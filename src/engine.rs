use crate::algorithms::{
    AStar, AntColony, AnytimeAStar, Bidirectional, BreadthFirst, DepthFirst, Dijkstra, Fringe,
    GeneticSearch, GreedyBestFirst, JumpPoint, Path, PathfindingAlgorithm, PheromoneField,
    Replanner, SearchResult, SearchSpace, SwarmSearch, ThetaStar, WeightedAStar,
};
use crate::config::SearchParams;
use crate::cost::Heuristic;
use crate::error::SearchError;
use crate::grid::{GridSnapshot, Position};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::str::FromStr;

/// Every search the engine can dispatch to.
///
/// Declaration order is the benchmark order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Algorithm {
    AStar,
    Dijkstra,
    BreadthFirst,
    DepthFirst,
    GreedyBestFirst,
    Bidirectional,
    JumpPoint,
    ThetaStar,
    Fringe,
    AnytimeAStar,
    AntColony,
    Genetic,
    Swarm,
    WeightedAStar,
    DStar,
    DStarLite,
    LpaStar,
}

impl Algorithm {
    /// The benchmark roster.
    pub const ROSTER: [Algorithm; 13] = [
        Algorithm::AStar,
        Algorithm::Dijkstra,
        Algorithm::BreadthFirst,
        Algorithm::DepthFirst,
        Algorithm::GreedyBestFirst,
        Algorithm::Bidirectional,
        Algorithm::JumpPoint,
        Algorithm::ThetaStar,
        Algorithm::Fringe,
        Algorithm::AnytimeAStar,
        Algorithm::AntColony,
        Algorithm::Genetic,
        Algorithm::Swarm,
    ];

    pub const ALL: [Algorithm; 17] = [
        Algorithm::AStar,
        Algorithm::Dijkstra,
        Algorithm::BreadthFirst,
        Algorithm::DepthFirst,
        Algorithm::GreedyBestFirst,
        Algorithm::Bidirectional,
        Algorithm::JumpPoint,
        Algorithm::ThetaStar,
        Algorithm::Fringe,
        Algorithm::AnytimeAStar,
        Algorithm::AntColony,
        Algorithm::Genetic,
        Algorithm::Swarm,
        Algorithm::WeightedAStar,
        Algorithm::DStar,
        Algorithm::DStarLite,
        Algorithm::LpaStar,
    ];

    /// Display name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::AStar => "A*",
            Algorithm::Dijkstra => "Dijkstra",
            Algorithm::BreadthFirst => "BFS",
            Algorithm::DepthFirst => "DFS",
            Algorithm::GreedyBestFirst => "Greedy BFS",
            Algorithm::Bidirectional => "Bidirectional",
            Algorithm::JumpPoint => "Jump Point",
            Algorithm::ThetaStar => "Theta*",
            Algorithm::Fringe => "Fringe",
            Algorithm::AnytimeAStar => "Anytime A*",
            Algorithm::AntColony => "Ant Colony",
            Algorithm::Genetic => "Genetic",
            Algorithm::Swarm => "Swarm",
            Algorithm::WeightedAStar => "Weighted A*",
            Algorithm::DStar => "D*",
            Algorithm::DStarLite => "D* Lite",
            Algorithm::LpaStar => "LPA*",
        }
    }

    /// Identifier accepted on the command line.
    pub fn key(self) -> &'static str {
        match self {
            Algorithm::AStar => "a_star",
            Algorithm::Dijkstra => "dijkstra",
            Algorithm::BreadthFirst => "bfs",
            Algorithm::DepthFirst => "dfs",
            Algorithm::GreedyBestFirst => "greedy",
            Algorithm::Bidirectional => "bidirectional",
            Algorithm::JumpPoint => "jps",
            Algorithm::ThetaStar => "theta_star",
            Algorithm::Fringe => "fringe",
            Algorithm::AnytimeAStar => "anytime_a_star",
            Algorithm::AntColony => "ant_colony",
            Algorithm::Genetic => "genetic",
            Algorithm::Swarm => "swarm",
            Algorithm::WeightedAStar => "weighted_a_star",
            Algorithm::DStar => "d_star",
            Algorithm::DStarLite => "d_star_lite",
            Algorithm::LpaStar => "lpa_star",
        }
    }

    /// Consumes randomness; repeated calls may differ.
    pub fn is_stochastic(self) -> bool {
        matches!(
            self,
            Algorithm::AntColony | Algorithm::Genetic | Algorithm::Swarm
        )
    }

    /// Named for an incremental planner but runs plain A*.
    pub fn is_placeholder(self) -> bool {
        matches!(
            self,
            Algorithm::DStar | Algorithm::DStarLite | Algorithm::LpaStar
        )
    }

    /// False when a returned path may stop short of the goal.
    pub fn reaches_goal(self) -> bool {
        self != Algorithm::Swarm
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Algorithm::ALL
            .into_iter()
            .find(|a| a.key() == wanted || a.name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Algorithm::ALL.iter().map(|a| a.key()).collect();
                format!("unknown algorithm '{}', expected one of: {}", s, known.join(", "))
            })
    }
}

/// Owns one grid snapshot and answers path queries over it.
///
/// The pheromone field is the only state carried from one call to the next.
pub struct PathfindingEngine {
    grid: GridSnapshot,
    heuristic: Heuristic,
    params: SearchParams,
    pheromones: PheromoneField,
    rng: StdRng,
}

impl PathfindingEngine {
    pub fn new(grid: GridSnapshot) -> Self {
        PathfindingEngine {
            grid,
            heuristic: Heuristic::default(),
            params: SearchParams::default(),
            pheromones: PheromoneField::new(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_params(mut self, params: SearchParams) -> Self {
        self.params = params;
        self
    }

    /// Makes the stochastic searches reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn grid(&self) -> &GridSnapshot {
        &self.grid
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    pub fn pheromones(&self) -> &PheromoneField {
        &self.pheromones
    }

    /// Forgets everything the ant colony has learned.
    pub fn reset_pheromones(&mut self) {
        self.pheromones.clear();
    }

    /// Runs `algorithm` with the engine's own parameters.
    pub fn find_path(&mut self, algorithm: Algorithm, start: Position, goal: Position) -> SearchResult {
        let params = self.params.clone();
        self.find_path_with_params(algorithm, &params, start, goal)
    }

    pub fn find_path_with_params(
        &mut self,
        algorithm: Algorithm,
        params: &SearchParams,
        start: Position,
        goal: Position,
    ) -> SearchResult {
        self.grid.validate_endpoint(start)?;
        self.grid.validate_endpoint(goal)?;
        if start == goal {
            return Ok(Some(vec![start]));
        }

        // Drawn for every call so a seeded engine stays reproducible whatever runs before
        let fork = StdRng::seed_from_u64(self.rng.gen());
        let space = SearchSpace::new(&self.grid, self.heuristic);

        let result = match algorithm {
            Algorithm::AStar => AStar::new().find_path(&space, start, goal),
            Algorithm::Dijkstra => Dijkstra.find_path(&space, start, goal),
            Algorithm::BreadthFirst => BreadthFirst.find_path(&space, start, goal),
            Algorithm::DepthFirst => DepthFirst.find_path(&space, start, goal),
            Algorithm::GreedyBestFirst => GreedyBestFirst.find_path(&space, start, goal),
            Algorithm::Bidirectional => Bidirectional.find_path(&space, start, goal),
            Algorithm::JumpPoint => JumpPoint.find_path(&space, start, goal),
            Algorithm::ThetaStar => ThetaStar.find_path(&space, start, goal),
            Algorithm::Fringe => Fringe.find_path(&space, start, goal),
            Algorithm::AnytimeAStar => {
                AnytimeAStar::new(params.anytime.clone()).find_path(&space, start, goal)
            }
            Algorithm::AntColony => {
                AntColony::new(params.ant_colony.clone(), &mut self.pheromones, fork)
                    .find_path(&space, start, goal)
            }
            Algorithm::Genetic => {
                GeneticSearch::new(params.genetic.clone(), fork).find_path(&space, start, goal)
            }
            Algorithm::Swarm => {
                SwarmSearch::new(params.swarm.clone(), fork).find_path(&space, start, goal)
            }
            Algorithm::WeightedAStar => {
                WeightedAStar::new(params.weighted_a_star_weight).find_path(&space, start, goal)
            }
            Algorithm::DStar => Replanner::DStar.find_path(&space, start, goal),
            Algorithm::DStarLite => Replanner::DStarLite.find_path(&space, start, goal),
            Algorithm::LpaStar => Replanner::LifelongPlanning.find_path(&space, start, goal),
        };

        log::debug!(
            "{} {} -> {}: {}",
            algorithm,
            start,
            goal,
            match &result {
                Ok(Some(path)) => format!("{} positions", path.len()),
                Ok(None) => "no path".to_string(),
                Err(e) => e.to_string(),
            }
        );
        result
    }

    /// Up to `count` distinct paths, taken in turn from A*, Dijkstra, BFS,
    /// Greedy and Bidirectional.
    pub fn find_alternate_paths(
        &mut self,
        start: Position,
        goal: Position,
        count: usize,
    ) -> Result<Vec<Path>, SearchError> {
        const SOURCES: [Algorithm; 5] = [
            Algorithm::AStar,
            Algorithm::Dijkstra,
            Algorithm::BreadthFirst,
            Algorithm::GreedyBestFirst,
            Algorithm::Bidirectional,
        ];

        let mut paths: Vec<Path> = Vec::new();
        for algorithm in SOURCES {
            if paths.len() >= count {
                break;
            }
            if let Some(path) = self.find_path(algorithm, start, goal)? {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvalidReason;
    use crate::grid::Cell;

    #[test]
    fn names_round_trip_through_from_str() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.key().parse::<Algorithm>(), Ok(algorithm));
            assert_eq!(algorithm.name().parse::<Algorithm>(), Ok(algorithm));
        }
        assert!("dijkstra2".parse::<Algorithm>().is_err());
    }

    #[test]
    fn roster_excludes_placeholders() {
        assert!(Algorithm::ROSTER.iter().all(|a| !a.is_placeholder()));
        assert!(Algorithm::ROSTER.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn endpoints_are_validated_before_dispatch() {
        let grid = GridSnapshot::from_ascii("..#\n...\n").unwrap();
        let mut engine = PathfindingEngine::new(grid).with_seed(1);

        let wall = engine.find_path(Algorithm::AStar, Position::new(0, 0, 0), Position::new(2, 0, 0));
        assert_eq!(
            wall,
            Err(SearchError::InvalidCoordinate {
                position: Position::new(2, 0, 0),
                reason: InvalidReason::NotWalkable(Cell::Wall),
            })
        );

        let outside = engine.find_path(Algorithm::Dijkstra, Position::new(9, 0, 0), Position::new(0, 0, 0));
        assert!(matches!(
            outside,
            Err(SearchError::InvalidCoordinate {
                reason: InvalidReason::OutOfBounds,
                ..
            })
        ));
    }

    #[test]
    fn alternate_paths_are_distinct() {
        let grid = GridSnapshot::filled(6, 6, 1, Cell::Open).unwrap();
        let mut engine = PathfindingEngine::new(grid).with_seed(3);
        let paths = engine
            .find_alternate_paths(Position::new(0, 0, 0), Position::new(5, 3, 0), 3)
            .unwrap();
        assert!(!paths.is_empty() && paths.len() <= 3);
        for (i, a) in paths.iter().enumerate() {
            assert!(paths[i + 1..].iter().all(|b| a != b));
        }
    }

    #[test]
    fn seeded_engines_agree_on_stochastic_results() {
        let grid = GridSnapshot::filled(6, 4, 1, Cell::Open).unwrap();
        let mut params = SearchParams::benchmark();
        params.genetic.population_size = 10;
        params.genetic.generations = 3;
        let run = |seed| {
            PathfindingEngine::new(grid.clone())
                .with_params(params.clone())
                .with_seed(seed)
                .find_path(Algorithm::Genetic, Position::new(0, 0, 0), Position::new(5, 3, 0))
                .unwrap()
        };
        assert_eq!(run(42), run(42));
    }
}
