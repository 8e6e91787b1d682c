use crate::grid::Position;
use std::f64::consts::SQRT_2;

/// Flat penalty added to any step that changes floor.
pub const TRANSIT_PENALTY: f64 = 5.0;

/// Weight applied to the floor difference before squaring in [`Heuristic::FloorWeighted`].
pub const FLOOR_HEURISTIC_WEIGHT: f64 = 10.0;

/// Cheapest possible floor change: an axis-aligned step plus the transit penalty.
const MIN_FLOOR_CHANGE_COST: f64 = 1.0 + TRANSIT_PENALTY;

/// Cost of a single step between adjacent positions.
///
/// 1 for an axis-aligned step, √2 when both planar axes change, plus
/// [`TRANSIT_PENALTY`] when the floor differs.
pub fn movement_cost(from: Position, to: Position) -> f64 {
    let dx = from.x.abs_diff(to.x);
    let dy = from.y.abs_diff(to.y);
    let mut cost = if dx + dy == 2 { SQRT_2 } else { 1.0 };
    if from.floor != to.floor {
        cost += TRANSIT_PENALTY;
    }
    cost
}

/// Straight planar distance, used for any-angle shortcuts on a single floor.
pub fn euclidean_distance(from: Position, to: Position) -> f64 {
    let dx = from.x.abs_diff(to.x) as f64;
    let dy = from.y.abs_diff(to.y) as f64;
    dx.hypot(dy)
}

/// Factor applied to step costs by searches that need integer weights.
pub const COST_SCALE: f64 = 1e6;

/// [`movement_cost`] scaled by [`COST_SCALE`] and rounded.
pub fn scaled_cost(from: Position, to: Position) -> u64 {
    (movement_cost(from, to) * COST_SCALE).round() as u64
}

/// Sum of step costs along `path`.
pub fn path_cost(path: &[Position]) -> f64 {
    path.windows(2).map(|w| movement_cost(w[0], w[1])).sum()
}

/// Distance estimate to the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Heuristic {
    /// `sqrt(dx² + dy² + (10·df)²)`.
    ///
    /// Not admissible across floors: one floor change is estimated at 10 while
    /// its true minimal cost is 6, so A*, Theta* and Fringe lose their optimality
    /// guarantee on multi-floor routes. Admissible on a single floor.
    #[default]
    FloorWeighted,
    /// `sqrt(dx² + dy²) + 6·|df|`, a lower bound on the true cost.
    Admissible,
}

impl Heuristic {
    pub fn estimate(self, from: Position, to: Position) -> f64 {
        let planar = euclidean_distance(from, to);
        let df = from.floor.abs_diff(to.floor) as f64;
        match self {
            Heuristic::FloorWeighted => {
                let weighted = df * FLOOR_HEURISTIC_WEIGHT;
                (planar * planar + weighted * weighted).sqrt()
            }
            Heuristic::Admissible => planar + df * MIN_FLOOR_CHANGE_COST,
        }
    }

    pub fn is_admissible(self) -> bool {
        matches!(self, Heuristic::Admissible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn step_costs() {
        let origin = Position::new(3, 3, 0);
        assert!((movement_cost(origin, Position::new(4, 3, 0)) - 1.0).abs() < EPS);
        assert!((movement_cost(origin, Position::new(4, 4, 0)) - SQRT_2).abs() < EPS);
        assert!((movement_cost(origin, Position::new(3, 3, 1)) - 6.0).abs() < EPS);
    }

    #[test]
    fn floor_weighted_overestimates_a_single_transit() {
        let a = Position::new(2, 2, 0);
        let b = Position::new(2, 2, 1);
        assert!((Heuristic::FloorWeighted.estimate(a, b) - 10.0).abs() < EPS);
        assert!(Heuristic::FloorWeighted.estimate(a, b) > movement_cost(a, b));
        assert!((Heuristic::Admissible.estimate(a, b) - movement_cost(a, b)).abs() < EPS);
    }

    #[test]
    fn heuristics_agree_on_one_floor() {
        let a = Position::new(0, 0, 0);
        let b = Position::new(3, 4, 0);
        assert!((Heuristic::FloorWeighted.estimate(a, b) - 5.0).abs() < EPS);
        assert!((Heuristic::Admissible.estimate(a, b) - 5.0).abs() < EPS);
    }

    #[test]
    fn path_cost_sums_steps() {
        let path = [
            Position::new(0, 0, 0),
            Position::new(1, 1, 0),
            Position::new(2, 1, 0),
        ];
        assert!((path_cost(&path) - (SQRT_2 + 1.0)).abs() < EPS);
        assert_eq!(path_cost(&path[..1]), 0.0);
    }
}
