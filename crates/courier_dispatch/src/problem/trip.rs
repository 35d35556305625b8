use jiff::civil::Time;
use serde::Serialize;

use crate::{
    problem::{miles::Miles, package::PackageId},
    solver::route::Route,
};

/// One executed depot-to-depot loop of a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRecord {
    pub start: Time,
    pub end: Time,
    /// Packages loaded at departure.
    pub manifest: Vec<PackageId>,
    pub initial_route: Route,
    pub optimized_route: Route,
    pub baseline_distance: Miles,
    pub distance: Miles,
}

impl TripRecord {
    pub fn covers(&self, time: Time) -> bool {
        self.start <= time && time <= self.end
    }
}
