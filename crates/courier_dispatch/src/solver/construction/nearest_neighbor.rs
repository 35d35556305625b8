use tracing::{Level, instrument};

use crate::{
    problem::{distance_matrix::DistanceMatrix, location::LocationIdx},
    solver::route::Route,
};

/// Builds a depot-to-depot tour greedily, always driving to the closest
/// unvisited stop.
///
/// Stops are deduplicated first, so several packages for one address make a
/// single stop. Candidates are scanned in canonical address order and only a
/// strictly shorter distance replaces the current best, so ties go to the
/// address listed first in the matrix.
#[instrument(skip_all, level = Level::TRACE)]
pub fn construct_route<I>(depot: LocationIdx, stops: I, matrix: &DistanceMatrix) -> Route
where
    I: IntoIterator<Item = LocationIdx>,
{
    let mut unvisited = stops.into_iter().collect::<Vec<_>>();
    unvisited.sort_unstable();
    unvisited.dedup();

    let mut route = Vec::with_capacity(unvisited.len() + 2);
    route.push(depot);

    let mut current = depot;
    while !unvisited.is_empty() {
        let mut nearest = 0;
        let mut nearest_distance = matrix.distance(current, unvisited[0]);

        for (position, &candidate) in unvisited.iter().enumerate().skip(1) {
            let distance = matrix.distance(current, candidate);
            if distance < nearest_distance {
                nearest = position;
                nearest_distance = distance;
            }
        }

        current = unvisited.remove(nearest);
        route.push(current);
    }

    route.push(depot);

    Route::new(route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    fn ids(route: &Route) -> Vec<usize> {
        route.stops().iter().map(|stop| stop.get()).collect()
    }

    #[test]
    fn test_nearest_neighbor_on_a_line() {
        let matrix = test_utils::create_matrix(&[(0.0, 0.0), (1.0, 0.0), (3.0, 0.0), (2.0, 0.0)]);

        let route = construct_route(
            LocationIdx::new(0),
            [2, 1, 3].map(LocationIdx::new),
            &matrix,
        );

        assert_eq!(ids(&route), vec![0, 1, 3, 2, 0]);
        assert_eq!(route.distance(&matrix).value(), 6.0);
    }

    #[test]
    fn test_ties_go_to_canonical_order() {
        let matrix = test_utils::create_matrix(&[(0.0, 0.0), (-1.0, 0.0), (1.0, 0.0)]);

        let route = construct_route(LocationIdx::new(0), [2, 1].map(LocationIdx::new), &matrix);

        assert_eq!(ids(&route), vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_shared_addresses_collapse() {
        let matrix = test_utils::create_matrix(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);

        let route = construct_route(
            LocationIdx::new(0),
            [2, 1, 2, 1, 1].map(LocationIdx::new),
            &matrix,
        );

        assert_eq!(ids(&route), vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_empty_manifest() {
        let matrix = test_utils::create_matrix(&[(0.0, 0.0)]);

        let route = construct_route(LocationIdx::new(0), [], &matrix);

        assert_eq!(ids(&route), vec![0, 0]);
        assert!(route.distance(&matrix).is_zero());
    }
}
