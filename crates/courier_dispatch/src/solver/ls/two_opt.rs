use tracing::{Level, debug, instrument};

use crate::{
    problem::distance_matrix::DistanceMatrix,
    solver::route::Route,
};

/// Reversals must shorten the tour by more than this to be adopted.
const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// **Intra-Route 2-Opt**
///
/// Reverses the sequence of stops between `from` and `to` (inclusive).
/// This eliminates crossing edges within a single tour.
///
/// ```text
/// BEFORE:
///    ... (prev) --x--> [from] -> ... -> [to] --x--> (next) ...
///          ^             ^               ^            ^
///          A             B               C            D
///
/// AFTER (Sequence Reversed):
///    ... (prev) -----> [to] -> ... -> [from] -----> (next) ...
///          ^             ^               ^            ^
///          A             C               B            D
///
/// Edges Removed: (prev->from), (to->next)
/// Edges Added:   (prev->to),   (from->next)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoOptMove {
    from: usize,
    to: usize,
}

impl TwoOptMove {
    pub fn new(from: usize, to: usize) -> Self {
        debug_assert!(from > 0 && from < to, "TwoOpt: invalid segment {from}..={to}");

        TwoOptMove { from, to }
    }

    /// Change in tour length if the move is applied. The matrix is symmetric,
    /// so only the two replaced edges matter.
    pub fn delta(&self, route: &Route, matrix: &DistanceMatrix) -> f64 {
        let stops = route.stops();

        let prev = stops[self.from - 1];
        let from = stops[self.from];
        let to = stops[self.to];
        let next = stops[self.to + 1];

        let current = matrix.distance(prev, from) + matrix.distance(to, next);
        let candidate = matrix.distance(prev, to) + matrix.distance(from, next);

        (candidate - current).value()
    }

    pub fn apply(&self, route: &mut Route) {
        route.reverse_segment(self.from, self.to);
    }
}

/// Improves a depot-to-depot tour until no single reversal shortens it.
///
/// Every pair of inner positions is scanned per pass and an improving reversal
/// is applied as soon as it is found; the scan then carries on over the
/// modified tour. The depots at both ends never move.
#[instrument(skip_all, level = Level::TRACE)]
pub fn optimize_route(mut route: Route, matrix: &DistanceMatrix) -> Route {
    if route.len() < 4 {
        return route;
    }

    let mut passes = 0;
    let mut applied = 0;
    let mut improved = true;

    while improved {
        improved = false;
        passes += 1;

        for from in 1..route.len() - 2 {
            for to in (from + 1)..route.len() - 1 {
                let two_opt = TwoOptMove::new(from, to);

                if two_opt.delta(&route, matrix) < -IMPROVEMENT_EPSILON {
                    two_opt.apply(&mut route);
                    applied += 1;
                    improved = true;
                }
            }
        }
    }

    debug!("2-opt: {applied} reversals over {passes} passes");

    route
}
