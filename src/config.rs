use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// ASCII building snapshot; a seeded random layout is generated when omitted.
    #[arg(long)]
    pub map: Option<String>,

    #[arg(long, default_value_t = 20)]
    pub width: usize,

    #[arg(long, default_value_t = 20)]
    pub height: usize,

    #[arg(long, default_value_t = 3)]
    pub floors: usize,

    #[arg(long, default_value_t = 60)]
    pub num_walls: usize,

    /// Seed for the generated layout, endpoint picking and the stochastic searches.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Start as `x,y,floor`; a random walkable cell when omitted.
    #[arg(long)]
    pub start: Option<String>,

    /// Goal as `x,y,floor`; a random walkable cell when omitted.
    #[arg(long)]
    pub goal: Option<String>,

    #[arg(long, default_value = "all")]
    pub algorithm: String,

    /// Benchmark this many random start/goal pairs instead of one.
    #[arg(long, default_value_t = 0)]
    pub batch_pairs: usize,

    /// Anytime A* budget for single runs.
    #[arg(long, default_value_t = 1000)]
    pub time_budget_ms: u64,

    /// Use the admissible heuristic instead of the floor-weighted one.
    #[arg(long, default_value_t = false)]
    pub admissible: bool,

    #[arg(long)]
    pub output_file: Option<String>,

    #[arg(long, default_value_t = false)]
    pub print_grid: bool,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

impl Config {
    pub fn search_params(&self) -> SearchParams {
        let mut params = SearchParams::default();
        params.anytime.time_budget = Duration::from_millis(self.time_budget_ms);
        params
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnytimeParams {
    pub initial_weight: f64,
    /// Multiplier applied to the weight after each successful round.
    pub decay: f64,
    /// Checked between rounds only; a round in progress always completes.
    pub time_budget: Duration,
}

impl Default for AnytimeParams {
    fn default() -> Self {
        AnytimeParams {
            initial_weight: 2.0,
            decay: 0.8,
            time_budget: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AntColonyParams {
    pub ant_count: usize,
    pub iterations: usize,
    pub evaporation_rate: f64,
    pub initial_pheromone: f64,
}

impl Default for AntColonyParams {
    fn default() -> Self {
        AntColonyParams {
            ant_count: 50,
            iterations: 50,
            evaporation_rate: 0.1,
            initial_pheromone: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneticParams {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    /// Parents are drawn from this many of the fittest survivors.
    pub parent_pool: usize,
    /// Random walks longer than this are abandoned.
    pub max_walk_steps: usize,
}

impl Default for GeneticParams {
    fn default() -> Self {
        GeneticParams {
            population_size: 100,
            generations: 50,
            mutation_rate: 0.3,
            parent_pool: 10,
            max_walk_steps: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwarmParams {
    pub swarm_size: usize,
    pub iterations: usize,
    pub inertia: f64,
    pub cognitive: f64,
    pub social: f64,
    pub max_speed: f64,
}

impl Default for SwarmParams {
    fn default() -> Self {
        SwarmParams {
            swarm_size: 30,
            iterations: 100,
            inertia: 0.7,
            cognitive: 1.5,
            social: 1.5,
            max_speed: 2.0,
        }
    }
}

/// Per-algorithm parameters for one engine call.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub weighted_a_star_weight: f64,
    pub anytime: AnytimeParams,
    pub ant_colony: AntColonyParams,
    pub genetic: GeneticParams,
    pub swarm: SwarmParams,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            weighted_a_star_weight: 2.0,
            anytime: AnytimeParams::default(),
            ant_colony: AntColonyParams::default(),
            genetic: GeneticParams::default(),
            swarm: SwarmParams::default(),
        }
    }
}

impl SearchParams {
    /// Uniform, time-bounded parameters used by the benchmark roster.
    pub fn benchmark() -> Self {
        let mut params = SearchParams::default();
        params.anytime.time_budget = Duration::from_millis(500);
        params.ant_colony.iterations = 20;
        params.genetic.population_size = 50;
        params.genetic.generations = 20;
        params.swarm.swarm_size = 20;
        params.swarm.iterations = 50;
        params
    }
}
