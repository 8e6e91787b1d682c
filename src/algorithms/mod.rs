pub mod a_star;
pub mod ant_colony;
pub mod bidirectional;
pub mod common;
pub mod dijkstra;
pub mod fringe;
pub mod genetic;
pub mod jump_point;
pub mod replanning;
pub mod swarm;
pub mod theta_star;
pub mod uninformed;

pub use a_star::{AStar, AnytimeAStar, AnytimeRound, GreedyBestFirst, WeightedAStar};
pub use ant_colony::{AntColony, PheromoneField};
pub use bidirectional::Bidirectional;
pub use common::{Path, PathfindingAlgorithm, SearchResult, SearchSpace};
pub use dijkstra::Dijkstra;
pub use fringe::Fringe;
pub use genetic::GeneticSearch;
pub use jump_point::JumpPoint;
pub use replanning::Replanner;
pub use swarm::SwarmSearch;
pub use theta_star::ThetaStar;
pub use uninformed::{BreadthFirst, DepthFirst};
