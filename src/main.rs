use clap::Parser;
use evacuation_pathfinding::benchmark::BatchBenchmark;
use evacuation_pathfinding::config::Config;
use evacuation_pathfinding::cost::path_cost;
use evacuation_pathfinding::{Algorithm, GridError, GridSnapshot, Heuristic, PathfindingEngine, Position};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn parse_position(text: &str) -> Result<Position, String> {
    let parts: Vec<usize> = text
        .split(',')
        .map(|p| p.trim().parse::<usize>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("bad position '{}': {}", text, e))?;
    match parts.as_slice() {
        [x, y, floor] => Ok(Position::new(*x, *y, *floor)),
        _ => Err(format!("bad position '{}': expected x,y,floor", text)),
    }
}

fn load_grid(config: &Config, seed: u64) -> Result<GridSnapshot, GridError> {
    match &config.map {
        Some(path) => GridSnapshot::from_ascii(&std::fs::read_to_string(path)?),
        None => GridSnapshot::random(config.width, config.height, config.floors, config.num_walls, seed),
    }
}

fn pick_endpoint(
    given: Option<&str>,
    grid: &GridSnapshot,
    rng: &mut StdRng,
    avoid: Option<Position>,
) -> Result<Position, String> {
    if let Some(text) = given {
        return parse_position(text);
    }
    let candidates: Vec<Position> = grid
        .walkable_positions()
        .into_iter()
        .filter(|&p| Some(p) != avoid)
        .collect();
    candidates
        .choose(rng)
        .copied()
        .ok_or_else(|| "grid has no free walkable cell for an endpoint".to_string())
}

fn run(config: Config) -> Result<(), String> {
    let seed = config.seed.unwrap_or_else(rand::random);
    let grid = load_grid(&config, seed).map_err(|e| e.to_string())?;
    let mut rng = StdRng::seed_from_u64(seed);

    if !config.quiet {
        let summary = grid.summary();
        println!("Starting pathfinding engine...");
        println!(
            "Grid: {}x{}x{}, walkable: {}, hazards: {}, exits: {}, transit: {}",
            summary.dimensions.0,
            summary.dimensions.1,
            summary.dimensions.2,
            summary.walkable_area,
            summary.hazard_area,
            summary.exits,
            summary.transit_cells
        );
        println!("Seed: {} (for reproducibility)", seed);
    }

    let heuristic = if config.admissible {
        Heuristic::Admissible
    } else {
        Heuristic::FloorWeighted
    };
    let mut engine = PathfindingEngine::new(grid)
        .with_heuristic(heuristic)
        .with_params(config.search_params())
        .with_seed(seed);

    if config.batch_pairs > 0 {
        let pairs = BatchBenchmark::random_pairs(engine.grid(), config.batch_pairs, &mut rng);
        let mut batch = BatchBenchmark::new().quiet(config.quiet);
        batch.run(&mut engine, &pairs);
        batch.print_summary();
        if let Some(path) = &config.output_file {
            batch.write_csv(path).map_err(|e| format!("failed to write {}: {}", path, e))?;
            println!("Results written to {}", path);
        }
        return Ok(());
    }

    let start = pick_endpoint(config.start.as_deref(), engine.grid(), &mut rng, None)?;
    let goal = pick_endpoint(config.goal.as_deref(), engine.grid(), &mut rng, Some(start))?;

    if config.algorithm == "all" {
        let report = engine.benchmark(start, goal);
        report.print_comparison();
        if let Some(path) = &config.output_file {
            let mut batch = BatchBenchmark::new();
            batch.record(0, &report);
            batch.write_csv(path).map_err(|e| format!("failed to write {}: {}", path, e))?;
            println!("Results written to {}", path);
        }
        if config.print_grid {
            if let Some(path) = engine.find_path(Algorithm::AStar, start, goal).ok().flatten() {
                engine.grid().print_grid(Some(&path));
            }
        }
        return Ok(());
    }

    let algorithm: Algorithm = config.algorithm.parse()?;
    if algorithm.is_placeholder() {
        println!("Note: {} plans from scratch with A*", algorithm);
    }
    let started = std::time::Instant::now();
    let result = engine
        .find_path(algorithm, start, goal)
        .map_err(|e| e.to_string())?;
    let elapsed = started.elapsed();

    println!("Algorithm: {}", algorithm);
    println!("Start: {}, Goal: {}", start, goal);
    match result {
        Some(path) => {
            println!(
                "Path: {} positions, cost {:.3}, found in {:.2?}",
                path.len(),
                path_cost(&path),
                elapsed
            );
            if let Some(end) = path.last().filter(|&&end| end != goal) {
                println!("Path ends at waypoint {}", end);
            }
            if engine.grid().is_path_blocked_by_hazard(&path) {
                println!("Warning: path crosses a hazard");
            }
            if config.print_grid {
                engine.grid().print_grid(Some(&path));
            }
        }
        None => println!("No path found ({:.2?})", elapsed),
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::parse();

    if let Err(e) = run(config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
