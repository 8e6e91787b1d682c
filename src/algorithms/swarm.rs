use crate::algorithms::a_star::AStar;
use crate::algorithms::common::{PathfindingAlgorithm, SearchResult, SearchSpace};
use crate::config::SwarmParams;
use crate::grid::{GridSnapshot, Position};
use rand::rngs::StdRng;
use rand::Rng;

#[derive(Debug, Clone)]
struct Particle {
    position: Position,
    velocity: [f64; 3],
    best_position: Position,
    best_fitness: f64,
}

fn coords(pos: Position) -> [f64; 3] {
    [pos.x as f64, pos.y as f64, pos.floor as f64]
}

/// Floors a continuous point back onto the grid. `None` outside it.
fn snap(grid: &GridSnapshot, point: [f64; 3]) -> Option<Position> {
    if point.iter().any(|c| !c.is_finite() || *c < 0.0) {
        return None;
    }
    let pos = Position::new(point[0] as usize, point[1] as usize, point[2] as usize);
    grid.in_bounds(pos).then_some(pos)
}

/// Particle swarm over grid coordinates.
///
/// Particles only look for the walkable cell closest to the goal by heuristic;
/// the returned path is A* from the start to that cell, so it ends at the goal
/// only if some particle landed on it.
pub struct SwarmSearch {
    params: SwarmParams,
    rng: StdRng,
}

impl SwarmSearch {
    pub fn new(params: SwarmParams, rng: StdRng) -> Self {
        SwarmSearch { params, rng }
    }

    fn spawn(&mut self, start: Position, fitness: f64) -> Particle {
        let speed = self.params.max_speed.abs();
        let mut velocity = [0.0; 3];
        for component in &mut velocity {
            *component = if speed > 0.0 {
                self.rng.gen_range(-speed..=speed)
            } else {
                0.0
            };
        }
        Particle {
            position: start,
            velocity,
            best_position: start,
            best_fitness: fitness,
        }
    }
}

impl PathfindingAlgorithm for SwarmSearch {
    fn find_path(&mut self, space: &SearchSpace<'_>, start: Position, goal: Position) -> SearchResult {
        let grid = space.grid();
        let SwarmParams {
            swarm_size,
            iterations,
            inertia,
            cognitive,
            social,
            max_speed,
        } = self.params;
        let max_speed = max_speed.abs();

        let start_fitness = space.estimate(start, goal);
        let mut swarm: Vec<Particle> = (0..swarm_size)
            .map(|_| self.spawn(start, start_fitness))
            .collect();
        let mut global_best = start;
        let mut global_fitness = start_fitness;

        for iteration in 0..=iterations {
            for particle in &mut swarm {
                let fitness = space.estimate(particle.position, goal);
                if fitness < particle.best_fitness {
                    particle.best_fitness = fitness;
                    particle.best_position = particle.position;
                }
                if fitness < global_fitness {
                    global_fitness = fitness;
                    global_best = particle.position;
                }
            }
            // The extra pass only scores the final positions
            if iteration == iterations {
                break;
            }

            let global = coords(global_best);
            for particle in &mut swarm {
                let here = coords(particle.position);
                let personal = coords(particle.best_position);
                let (r1, r2): (f64, f64) = (self.rng.gen(), self.rng.gen());
                let mut next = here;
                for axis in 0..3 {
                    let v = inertia * particle.velocity[axis]
                        + cognitive * r1 * (personal[axis] - here[axis])
                        + social * r2 * (global[axis] - here[axis]);
                    particle.velocity[axis] = v.clamp(-max_speed, max_speed);
                    next[axis] += particle.velocity[axis];
                }
                if let Some(pos) = snap(grid, next).filter(|&p| grid.is_walkable(p)) {
                    particle.position = pos;
                }
            }
        }

        log::debug!(
            "swarm: best waypoint {} at heuristic distance {:.3}",
            global_best,
            global_fitness
        );
        if global_best == start {
            return Ok(None);
        }
        AStar.find_path(space, start, global_best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::Heuristic;
    use rand::SeedableRng;

    #[test]
    fn snapping_rejects_points_off_the_grid() {
        let grid = GridSnapshot::filled(4, 4, 1, crate::grid::Cell::Open).unwrap();
        assert_eq!(snap(&grid, [1.7, 2.2, 0.4]), Some(Position::new(1, 2, 0)));
        assert_eq!(snap(&grid, [-0.5, 1.0, 0.0]), None);
        assert_eq!(snap(&grid, [1.0, 4.0, 0.0]), None);
        assert_eq!(snap(&grid, [1.0, 1.0, 1.0]), None);
    }

    #[test]
    fn path_runs_from_start_to_a_walkable_waypoint() {
        let grid = GridSnapshot::from_ascii(
            "
            ........
            ..#.....
            ..#.....
            ........
            ",
        )
        .unwrap();
        let space = SearchSpace::new(&grid, Heuristic::FloorWeighted);
        let start = Position::new(0, 0, 0);
        let goal = Position::new(7, 3, 0);
        let params = SwarmParams {
            swarm_size: 10,
            iterations: 30,
            ..SwarmParams::default()
        };
        let result = SwarmSearch::new(params, StdRng::seed_from_u64(9))
            .find_path(&space, start, goal)
            .unwrap();
        if let Some(path) = result {
            assert_eq!(path.first(), Some(&start));
            let end = *path.last().unwrap();
            assert!(grid.is_walkable(end));
            assert!(space.estimate(end, goal) < space.estimate(start, goal));
            assert!(path.windows(2).all(|w| grid.are_adjacent(w[0], w[1])));
        }
    }

    #[test]
    fn motionless_swarm_finds_nothing() {
        let grid = GridSnapshot::filled(5, 5, 1, crate::grid::Cell::Open).unwrap();
        let space = SearchSpace::new(&grid, Heuristic::FloorWeighted);
        let params = SwarmParams {
            max_speed: 0.0,
            ..SwarmParams::default()
        };
        let result = SwarmSearch::new(params, StdRng::seed_from_u64(1))
            .find_path(&space, Position::new(0, 0, 0), Position::new(4, 4, 0))
            .unwrap();
        assert_eq!(result, None);
    }
}
