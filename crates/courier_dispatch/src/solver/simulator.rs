use tracing::{Level, debug, instrument};

use crate::{
    error::DispatchError,
    problem::{
        distance_matrix::DistanceMatrix,
        location::LocationIdx,
        mph::Mph,
        package::PackageId,
        package_store::PackageStore,
        trip::TripRecord,
        vehicle::{Vehicle, VehicleIdx},
    },
    solver::{construction::nearest_neighbor::construct_route, ls::two_opt::optimize_route},
};

/// Drives a loaded vehicle around one depot-to-depot trip.
pub struct TripSimulator<'a> {
    matrix: &'a DistanceMatrix,
    depot: LocationIdx,
    speed: Mph,
}

impl<'a> TripSimulator<'a> {
    pub fn new(matrix: &'a DistanceMatrix, depot: LocationIdx, speed: Mph) -> Self {
        TripSimulator {
            matrix,
            depot,
            speed,
        }
    }

    /// Plans, optimizes and executes the vehicle's current manifest.
    ///
    /// Returns `None` when the vehicle has nothing loaded. Every package of
    /// the manifest is delivered by the time the vehicle is back at the depot.
    #[instrument(skip_all, level = Level::DEBUG, fields(vehicle = vehicle_id.number()))]
    pub fn run_trip(
        &self,
        vehicle_id: VehicleIdx,
        vehicle: &mut Vehicle,
        packages: &mut PackageStore,
    ) -> Result<Option<TripRecord>, DispatchError> {
        if vehicle.manifest().is_empty() {
            return Ok(None);
        }

        let start = vehicle.clock();
        let manifest = vehicle.manifest().to_vec();

        let stops = manifest
            .iter()
            .map(|&package_id| packages.get(package_id).map(|package| package.location_id()))
            .collect::<Result<Vec<_>, _>>()?;

        let initial_route = construct_route(self.depot, stops, self.matrix);
        let optimized_route = optimize_route(initial_route.clone(), self.matrix);

        // A clock overflow must leave the vehicle and its packages untouched.
        let mut schedule = Vec::new();
        let mut clock = start;
        for (from, to) in optimized_route.legs() {
            let travel_time = self.matrix.distance(from, to).travel_time(self.speed)?;
            clock = clock.checked_add(travel_time)?;
            schedule.push((to, travel_time));
        }

        for &package_id in &manifest {
            packages.get_mut(package_id)?.depart(vehicle_id, start)?;
        }

        for (to, travel_time) in schedule {
            vehicle.drive(travel_time)?;

            if to == self.depot {
                continue;
            }

            let mut delivered: Vec<PackageId> = Vec::new();
            for &package_id in vehicle.manifest() {
                if packages.get(package_id)?.location_id() == to {
                    delivered.push(package_id);
                }
            }

            for &package_id in &delivered {
                packages
                    .get_mut(package_id)?
                    .mark_delivered(vehicle_id, vehicle.clock())?;
            }
            vehicle.unload(&delivered);
        }

        let trip = TripRecord {
            start,
            end: vehicle.clock(),
            manifest,
            baseline_distance: initial_route.distance(self.matrix),
            distance: optimized_route.distance(self.matrix),
            initial_route,
            optimized_route,
        };

        debug!(
            "Trip {} -> {}: {} packages, baseline {}, driven {}",
            trip.start,
            trip.end,
            trip.manifest.len(),
            trip.baseline_distance,
            trip.distance
        );

        vehicle.finish_trip(trip.clone());

        Ok(Some(trip))
    }
}
