use crate::config::SearchParams;
use crate::cost::{path_cost, scaled_cost, COST_SCALE};
use crate::engine::{Algorithm, PathfindingEngine};
use crate::grid::{GridSnapshot, Position};
use pathfinding::prelude::dijkstra;
use rand::seq::SliceRandom;
use rand::Rng;
use std::any::Any;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// Optimal movement cost between two cells, independent of the engine's searches.
pub fn reference_optimal_cost(grid: &GridSnapshot, start: Position, goal: Position) -> Option<f64> {
    if !grid.is_walkable(start) || !grid.is_walkable(goal) {
        return None;
    }
    dijkstra(
        &start,
        |p| {
            grid.neighbors(*p)
                .into_iter()
                .map(|n| (n, scaled_cost(*p, n)))
                .collect::<Vec<_>>()
        },
        |p| *p == goal,
    )
    .map(|(_, cost)| cost as f64 / COST_SCALE)
}

/// Outcome of one algorithm on one start/goal pair.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRecord {
    /// Number of positions, start and end included.
    pub path_length: Option<usize>,
    pub path_cost: Option<f64>,
    /// The path exists and ends at the goal.
    pub reached_goal: bool,
    /// Absent when the algorithm failed.
    pub latency: Option<Duration>,
    pub error: Option<String>,
}

impl BenchmarkRecord {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    pub start: Position,
    pub goal: Position,
    pub optimal_cost: Option<f64>,
    pub records: BTreeMap<Algorithm, BenchmarkRecord>,
}

impl BenchmarkReport {
    pub fn get(&self, algorithm: Algorithm) -> Option<&BenchmarkRecord> {
        self.records.get(&algorithm)
    }

    /// Records keyed by display name.
    pub fn by_name(&self) -> BTreeMap<&'static str, &BenchmarkRecord> {
        self.records.iter().map(|(a, r)| (a.name(), r)).collect()
    }

    pub fn efficiency(&self, algorithm: Algorithm) -> Option<f64> {
        let record = self.get(algorithm)?;
        efficiency(record.path_cost, self.optimal_cost, record.reached_goal)
    }

    pub fn print_comparison(&self) {
        println!("\n=== ALGORITHM COMPARISON RESULTS ===");
        println!("Start: {}, Goal: {}", self.start, self.goal);
        match self.optimal_cost {
            Some(cost) => println!("Reference optimal cost: {:.3}", cost),
            None => println!("Reference optimal cost: unreachable"),
        }
        println!();

        println!(
            "{:<14} {:<8} {:<8} {:<10} {:<12} {:<14} {}",
            "Algorithm", "Found", "Length", "Cost", "Efficiency", "Latency", "Note"
        );
        println!("{}", "-".repeat(80));

        for (algorithm, record) in &self.records {
            let found = match (record.path_length, record.reached_goal) {
                (Some(_), true) => "✓",
                (Some(_), false) => "~",
                (None, _) => "✗",
            };
            let length = record
                .path_length
                .map_or_else(|| "-".to_string(), |l| l.to_string());
            let cost = record
                .path_cost
                .map_or_else(|| "-".to_string(), |c| format!("{:.3}", c));
            let efficiency = self
                .efficiency(*algorithm)
                .map_or_else(|| "-".to_string(), |e| format!("{:.3}", e));
            let latency = record
                .latency
                .map_or_else(|| "-".to_string(), |l| format!("{:.2?}", l));
            let note = match (&record.error, record.reached_goal, record.path_length) {
                (Some(error), _, _) => error.clone(),
                (None, false, Some(_)) => "stops at best waypoint".to_string(),
                _ => String::new(),
            };
            println!(
                "{:<14} {:<8} {:<8} {:<10} {:<12} {:<14} {}",
                algorithm.name(),
                found,
                length,
                cost,
                efficiency,
                latency,
                note
            );
        }

        let arrived: Vec<(&Algorithm, &BenchmarkRecord)> = self
            .records
            .iter()
            .filter(|(_, r)| r.reached_goal)
            .collect();
        println!();
        if arrived.is_empty() {
            println!("No algorithm reached the goal.");
            return;
        }

        println!("=== PERFORMANCE ANALYSIS ===");
        if let Some((a, r)) = arrived
            .iter()
            .filter_map(|(a, r)| r.path_cost.map(|c| (a, c)))
            .min_by(|x, y| x.1.total_cmp(&y.1))
        {
            println!("Cheapest path: {} ({:.3})", a.name(), r);
        }
        if let Some((a, l)) = arrived
            .iter()
            .filter_map(|(a, r)| r.path_length.map(|l| (a, l)))
            .min_by_key(|(_, l)| *l)
        {
            println!("Fewest positions: {} ({})", a.name(), l);
        }
        if let Some((a, t)) = arrived
            .iter()
            .filter_map(|(a, r)| r.latency.map(|t| (a, t)))
            .min_by_key(|(_, t)| *t)
        {
            println!("Fastest: {} ({:.2?})", a.name(), t);
        }
    }
}

fn efficiency(cost: Option<f64>, optimal: Option<f64>, reached_goal: bool) -> Option<f64> {
    match (cost, optimal) {
        (Some(cost), Some(optimal)) if reached_goal && optimal > 0.0 => Some(cost / optimal),
        _ => None,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

impl PathfindingEngine {
    /// Runs the full roster with the uniform benchmark parameters.
    pub fn benchmark(&mut self, start: Position, goal: Position) -> BenchmarkReport {
        self.benchmark_with(&Algorithm::ROSTER, &SearchParams::benchmark(), start, goal)
    }

    /// Runs every algorithm in `roster` in turn. A failing or panicking
    /// algorithm is recorded and the rest still run.
    pub fn benchmark_with(
        &mut self,
        roster: &[Algorithm],
        params: &SearchParams,
        start: Position,
        goal: Position,
    ) -> BenchmarkReport {
        let optimal_cost = reference_optimal_cost(self.grid(), start, goal);
        let mut records = BTreeMap::new();

        for &algorithm in roster {
            let started = Instant::now();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.find_path_with_params(algorithm, params, start, goal)
            }));
            let elapsed = started.elapsed();

            let record = match outcome {
                Ok(Ok(path)) => {
                    let reached_goal = path.as_ref().is_some_and(|p| p.last() == Some(&goal));
                    BenchmarkRecord {
                        path_length: path.as_ref().map(Vec::len),
                        path_cost: path.as_deref().map(path_cost),
                        reached_goal,
                        latency: Some(elapsed),
                        error: None,
                    }
                }
                Ok(Err(error)) => BenchmarkRecord {
                    path_length: None,
                    path_cost: None,
                    reached_goal: false,
                    latency: None,
                    error: Some(error.to_string()),
                },
                Err(payload) => BenchmarkRecord {
                    path_length: None,
                    path_cost: None,
                    reached_goal: false,
                    latency: None,
                    error: Some(format!("{} panicked: {}", algorithm, panic_message(payload.as_ref()))),
                },
            };

            match &record.error {
                Some(error) => log::warn!("{}: {}", algorithm, error),
                None => log::info!(
                    "{}: length {:?}, latency {:.2?}",
                    algorithm,
                    record.path_length,
                    elapsed
                ),
            }
            records.insert(algorithm, record);
        }

        BenchmarkReport {
            start,
            goal,
            optimal_cost,
            records,
        }
    }
}

/// One row of a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub pair_id: usize,
    pub algorithm: Algorithm,
    pub start: Position,
    pub goal: Position,
    pub success: bool,
    pub path_length: Option<usize>,
    pub path_cost: Option<f64>,
    pub optimal_cost: Option<f64>,
    pub efficiency: Option<f64>,
    pub latency: Option<Duration>,
    pub error: Option<String>,
}

/// Per-algorithm aggregate over a batch. Means cover successful runs only.
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmSummary {
    pub algorithm: Algorithm,
    pub runs: usize,
    pub successes: usize,
    pub errors: usize,
    pub mean_length: Option<f64>,
    pub mean_efficiency: Option<f64>,
    pub mean_latency: Option<Duration>,
}

impl AlgorithmSummary {
    pub fn success_rate(&self) -> f64 {
        if self.runs == 0 {
            0.0
        } else {
            self.successes as f64 / self.runs as f64
        }
    }
}

/// Quotes a free-text CSV field when it holds a separator, quote or line break.
fn csv_field(text: &str) -> String {
    if text.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Benchmarks the roster over many start/goal pairs on one engine.
pub struct BatchBenchmark {
    roster: Vec<Algorithm>,
    params: SearchParams,
    results: Vec<BatchResult>,
    quiet: bool,
}

impl Default for BatchBenchmark {
    fn default() -> Self {
        BatchBenchmark::new()
    }
}

impl BatchBenchmark {
    pub fn new() -> Self {
        BatchBenchmark {
            roster: Algorithm::ROSTER.to_vec(),
            params: SearchParams::benchmark(),
            results: Vec::new(),
            quiet: false,
        }
    }

    pub fn with_roster(mut self, roster: &[Algorithm]) -> Self {
        self.roster = roster.to_vec();
        self
    }

    pub fn with_params(mut self, params: SearchParams) -> Self {
        self.params = params;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn results(&self) -> &[BatchResult] {
        &self.results
    }

    /// `count` pairs of distinct walkable cells. Empty if the grid has fewer than two.
    pub fn random_pairs(grid: &GridSnapshot, count: usize, rng: &mut impl Rng) -> Vec<(Position, Position)> {
        let walkable = grid.walkable_positions();
        if walkable.len() < 2 {
            return Vec::new();
        }
        (0..count)
            .filter_map(|_| {
                let picked: Vec<Position> = walkable.choose_multiple(rng, 2).copied().collect();
                match picked.as_slice() {
                    [start, goal] => Some((*start, *goal)),
                    _ => None,
                }
            })
            .collect()
    }

    pub fn run(&mut self, engine: &mut PathfindingEngine, pairs: &[(Position, Position)]) {
        let started = Instant::now();
        if !self.quiet {
            println!("=== BATCH BENCHMARK STARTED ===");
            println!("Pairs: {}, algorithms: {}", pairs.len(), self.roster.len());
        }

        for (pair_id, &(start, goal)) in pairs.iter().enumerate() {
            let report = engine.benchmark_with(&self.roster, &self.params, start, goal);
            self.record(pair_id, &report);
            log::info!("pair {}/{} done: {} -> {}", pair_id + 1, pairs.len(), start, goal);
            if !self.quiet && (pair_id + 1) % 10 == 0 {
                println!("Completed {}/{} pairs", pair_id + 1, pairs.len());
            }
        }

        if !self.quiet {
            println!("Batch finished in {:.2?}", started.elapsed());
        }
    }

    /// Appends one report's records as batch rows.
    pub fn record(&mut self, pair_id: usize, report: &BenchmarkReport) {
        for (&algorithm, record) in &report.records {
            self.results.push(BatchResult {
                pair_id,
                algorithm,
                start: report.start,
                goal: report.goal,
                success: record.reached_goal,
                path_length: record.path_length,
                path_cost: record.path_cost,
                optimal_cost: report.optimal_cost,
                efficiency: efficiency(record.path_cost, report.optimal_cost, record.reached_goal),
                latency: record.latency,
                error: record.error.clone(),
            });
        }
    }

    pub fn summaries(&self) -> Vec<AlgorithmSummary> {
        let mut groups: BTreeMap<Algorithm, Vec<&BatchResult>> = BTreeMap::new();
        for result in &self.results {
            groups.entry(result.algorithm).or_default().push(result);
        }

        groups
            .into_iter()
            .map(|(algorithm, results)| {
                let successful: Vec<&&BatchResult> = results.iter().filter(|r| r.success).collect();
                let latencies: Vec<Duration> = successful.iter().filter_map(|r| r.latency).collect();
                AlgorithmSummary {
                    algorithm,
                    runs: results.len(),
                    successes: successful.len(),
                    errors: results.iter().filter(|r| r.error.is_some()).count(),
                    mean_length: mean(successful.iter().filter_map(|r| r.path_length).map(|l| l as f64)),
                    mean_efficiency: mean(successful.iter().filter_map(|r| r.efficiency)),
                    mean_latency: (!latencies.is_empty())
                        .then(|| latencies.iter().sum::<Duration>() / latencies.len() as u32),
                }
            })
            .collect()
    }

    pub fn print_summary(&self) {
        if self.results.is_empty() {
            println!("No results to summarize.");
            return;
        }

        println!("\n=== BATCH BENCHMARK SUMMARY ===");
        for summary in self.summaries() {
            println!("\n{} Algorithm Results:", summary.algorithm);
            println!(
                "  Success rate: {}/{} ({:.1}%)",
                summary.successes,
                summary.runs,
                summary.success_rate() * 100.0
            );
            if summary.errors > 0 {
                println!("  Errors: {}", summary.errors);
            }
            if let Some(length) = summary.mean_length {
                println!("  Average length: {:.1}", length);
            }
            if let Some(efficiency) = summary.mean_efficiency {
                println!("  Average efficiency: {:.3}", efficiency);
            }
            if let Some(latency) = summary.mean_latency {
                println!("  Average latency: {:.2?}", latency);
            }
        }
    }

    pub fn write_csv(&self, path: impl AsRef<std::path::Path>) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_csv_to(&mut writer)?;
        writer.flush()
    }

    pub fn write_csv_to(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(
            out,
            "pair_id,algorithm,start,goal,success,path_length,path_cost,optimal_cost,efficiency,latency_ns,error"
        )?;
        let opt = |v: Option<f64>| v.map_or_else(String::new, |v| format!("{:.6}", v));
        for r in &self.results {
            writeln!(
                out,
                "{},{},{}:{}:{},{}:{}:{},{},{},{},{},{},{},{}",
                r.pair_id,
                r.algorithm.key(),
                r.start.x,
                r.start.y,
                r.start.floor,
                r.goal.x,
                r.goal.y,
                r.goal.floor,
                r.success,
                r.path_length.map_or_else(String::new, |l| l.to_string()),
                opt(r.path_cost),
                opt(r.optimal_cost),
                opt(r.efficiency),
                r.latency.map_or_else(String::new, |l| l.as_nanos().to_string()),
                csv_field(r.error.as_deref().unwrap_or("")),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn corridor_engine() -> PathfindingEngine {
        let grid = GridSnapshot::from_ascii(
            "
            ........
            .######.
            ........
            ",
        )
        .unwrap();
        PathfindingEngine::new(grid).with_seed(7)
    }

    #[test]
    fn reference_cost_matches_hand_count() {
        let grid = GridSnapshot::filled(5, 5, 1, Cell::Open).unwrap();
        let cost = reference_optimal_cost(&grid, Position::new(0, 0, 0), Position::new(4, 2, 0)).unwrap();
        assert!((cost - (2.0 + 2.0 * std::f64::consts::SQRT_2)).abs() < 1e-5);
    }

    #[test]
    fn faults_are_recorded_without_stopping_the_roster() {
        let mut engine = corridor_engine();
        let mut params = SearchParams::benchmark();
        params.anytime.decay = 2.0;
        let roster = [Algorithm::AStar, Algorithm::AnytimeAStar, Algorithm::Dijkstra];
        let report = engine.benchmark_with(&roster, &params, Position::new(0, 0, 0), Position::new(7, 2, 0));

        let anytime = report.get(Algorithm::AnytimeAStar).unwrap();
        assert!(anytime.is_error());
        assert_eq!(anytime.latency, None);
        assert_eq!(anytime.path_length, None);

        for ok in [Algorithm::AStar, Algorithm::Dijkstra] {
            let record = report.get(ok).unwrap();
            assert!(record.reached_goal);
            assert!(record.latency.is_some());
        }
        assert_eq!(report.by_name().len(), 3);
        assert!((report.efficiency(Algorithm::Dijkstra).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn invalid_endpoint_is_an_error_record() {
        let mut engine = corridor_engine();
        let report = engine.benchmark_with(
            &[Algorithm::BreadthFirst],
            &SearchParams::benchmark(),
            Position::new(0, 0, 0),
            Position::new(3, 1, 0),
        );
        let record = report.get(Algorithm::BreadthFirst).unwrap();
        assert!(record.error.as_deref().unwrap_or("").contains("invalid coordinate"));
        assert_eq!(report.optimal_cost, None);
    }

    #[test]
    fn batch_summary_and_csv() {
        let mut engine = corridor_engine();
        let mut rng = StdRng::seed_from_u64(2);
        let pairs = BatchBenchmark::random_pairs(engine.grid(), 3, &mut rng);
        assert_eq!(pairs.len(), 3);
        assert!(pairs.iter().all(|(s, g)| s != g));

        let mut batch = BatchBenchmark::new()
            .with_roster(&[Algorithm::AStar, Algorithm::BreadthFirst])
            .quiet(true);
        batch.run(&mut engine, &pairs);
        assert_eq!(batch.results().len(), 6);

        let summaries = batch.summaries();
        assert_eq!(summaries.len(), 2);
        assert!(summaries.iter().all(|s| s.runs == 3 && s.successes == 3));

        let mut csv = Vec::new();
        batch.write_csv_to(&mut csv).unwrap();
        let text = String::from_utf8(csv).unwrap();
        assert_eq!(text.lines().count(), 7);
        assert!(text.lines().nth(1).unwrap().starts_with("0,a_star,"));
    }

    #[test]
    fn csv_quotes_awkward_error_text() {
        let mut batch = BatchBenchmark::new();
        let failed = BenchmarkRecord {
            path_length: None,
            path_cost: None,
            reached_goal: false,
            latency: None,
            error: Some("panicked at \"walk\", step 3\nthen gave up".to_string()),
        };
        let report = BenchmarkReport {
            start: Position::new(0, 0, 0),
            goal: Position::new(1, 0, 0),
            optimal_cost: Some(1.0),
            records: BTreeMap::from([(Algorithm::AntColony, failed)]),
        };
        batch.record(0, &report);

        let mut csv = Vec::new();
        batch.write_csv_to(&mut csv).unwrap();
        let text = String::from_utf8(csv).unwrap();
        let (header, row) = text.split_once('\n').unwrap();
        assert!(row.ends_with("\"panicked at \"\"walk\"\", step 3\nthen gave up\"\n"));

        // Eleven columns once the quoted field is taken as one
        let (plain, quoted) = row.split_once('"').unwrap();
        assert_eq!(plain.split(',').count(), header.split(',').count());
        assert!(quoted.trim_end().ends_with('"'));
        assert_eq!(csv_field("no path"), "no path");
    }
}
