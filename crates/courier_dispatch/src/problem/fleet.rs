use crate::{
    error::DispatchError,
    problem::{
        miles::Miles,
        vehicle::{Vehicle, VehicleIdx},
    },
};

#[derive(Debug, Clone)]
pub struct Fleet {
    vehicles: Vec<Vehicle>,
}

impl Fleet {
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        Fleet { vehicles }
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn contains(&self, vehicle_id: VehicleIdx) -> bool {
        vehicle_id.get() < self.vehicles.len()
    }

    pub fn vehicle(&self, vehicle_id: VehicleIdx) -> Result<&Vehicle, DispatchError> {
        self.vehicles
            .get(vehicle_id.get())
            .ok_or(DispatchError::UnknownVehicle(vehicle_id))
    }

    pub(crate) fn vehicle_mut(&mut self, vehicle_id: VehicleIdx) -> Result<&mut Vehicle, DispatchError> {
        self.vehicles
            .get_mut(vehicle_id.get())
            .ok_or(DispatchError::UnknownVehicle(vehicle_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (VehicleIdx, &Vehicle)> {
        VehicleIdx::ids(self.vehicles.len()).zip(self.vehicles.iter())
    }

    pub(crate) fn clear_manifests(&mut self) {
        for vehicle in &mut self.vehicles {
            vehicle.clear_manifest();
        }
    }

    pub fn total_distance(&self) -> Miles {
        self.vehicles.iter().map(Vehicle::total_distance).sum()
    }

    pub fn baseline_distance(&self) -> Miles {
        self.vehicles.iter().map(Vehicle::baseline_distance).sum()
    }
}
