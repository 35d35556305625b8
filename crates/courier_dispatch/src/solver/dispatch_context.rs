use crate::{
    error::DispatchError,
    problem::{
        distance_matrix::DistanceMatrix, fleet::Fleet, location::LocationIdx,
        package_store::PackageStore, vehicle::VehicleIdx,
    },
    solver::dispatch_params::DispatchParams,
};

/// Everything one batch run reads and mutates. Owned by the orchestrator,
/// which lends each phase the parts it needs.
#[derive(Debug, Clone)]
pub struct DispatchContext {
    packages: PackageStore,
    matrix: DistanceMatrix,
    fleet: Fleet,
    depot: LocationIdx,
    params: DispatchParams,
}

impl DispatchContext {
    /// Checks that the depot and every package address, corrected addresses
    /// included, are known to the matrix and that every referenced vehicle
    /// exists.
    pub fn new(
        packages: PackageStore,
        matrix: DistanceMatrix,
        fleet: Fleet,
        depot_address: &str,
        params: DispatchParams,
    ) -> Result<Self, DispatchError> {
        let depot = matrix.location_id(depot_address)?;

        params.validate(&fleet)?;

        for package in packages.iter() {
            matrix.location_id(package.address())?;

            let mut destinations = vec![package.location_id()];
            if let Some(correction) = package.correction() {
                destinations.push(matrix.location_id(correction.original_address())?);
                destinations.push(matrix.location_id(correction.corrected_address())?);
            }

            // a depot stop is never delivered
            if destinations.contains(&depot) {
                return Err(DispatchError::PackageAtDepot(package.id()));
            }

            if let Some(vehicle_id) = package.forced_vehicle() {
                fleet.vehicle(vehicle_id)?;
            }

            if package.is_delayed() {
                params
                    .delayed_vehicle_idx()
                    .and_then(|vehicle_id| fleet.vehicle(vehicle_id).ok())
                    .ok_or(DispatchError::UnknownVehicle(VehicleIdx::new(
                        params.delayed_vehicle.saturating_sub(1),
                    )))?;
            }
        }

        Ok(DispatchContext {
            packages,
            matrix,
            fleet,
            depot,
            params,
        })
    }

    pub fn packages(&self) -> &PackageStore {
        &self.packages
    }

    pub fn matrix(&self) -> &DistanceMatrix {
        &self.matrix
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn depot(&self) -> LocationIdx {
        self.depot
    }

    pub fn params(&self) -> &DispatchParams {
        &self.params
    }

    /// Splits the context into the borrows a cycle needs.
    pub(crate) fn parts_mut(
        &mut self,
    ) -> (
        &mut PackageStore,
        &mut Fleet,
        &DistanceMatrix,
        LocationIdx,
        &DispatchParams,
    ) {
        (
            &mut self.packages,
            &mut self.fleet,
            &self.matrix,
            self.depot,
            &self.params,
        )
    }
}
