use serde::Serialize;

use crate::problem::{distance_matrix::DistanceMatrix, location::LocationIdx, miles::Miles};

/// Depot-to-depot sequence of stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    stops: Vec<LocationIdx>,
}

impl Route {
    pub fn new(stops: Vec<LocationIdx>) -> Self {
        Route { stops }
    }

    pub fn stops(&self) -> &[LocationIdx] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn distance(&self, matrix: &DistanceMatrix) -> Miles {
        matrix.path_distance(&self.stops)
    }

    pub fn legs(&self) -> impl Iterator<Item = (LocationIdx, LocationIdx)> + '_ {
        self.stops.windows(2).map(|leg| (leg[0], leg[1]))
    }

    /// Reverses the stops between `from` and `to`, both inclusive.
    pub(crate) fn reverse_segment(&mut self, from: usize, to: usize) {
        self.stops[from..=to].reverse();
    }

    pub fn addresses<'a>(&self, matrix: &'a DistanceMatrix) -> Vec<&'a str> {
        self.stops.iter().map(|&stop| matrix.address(stop)).collect()
    }
}
