use jiff::{SignedDuration, civil::Time};
use serde::Serialize;

use crate::{
    define_index_newtype,
    problem::{miles::Miles, package::PackageId, trip::TripRecord},
};

define_index_newtype!(VehicleIdx, Vehicle);

impl VehicleIdx {
    /// 1-based number used in notes and reports ("vehicle #2").
    pub const fn number(&self) -> usize {
        self.0 + 1
    }

    pub fn from_number(number: usize) -> Option<Self> {
        number.checked_sub(1).map(VehicleIdx::new)
    }
}

/// What a vehicle is carrying at a queried time.
#[derive(Debug, PartialEq)]
pub enum VehicleLoad<'a> {
    /// A recorded trip covers the time.
    Trip(&'a TripRecord),
    /// Between trips, the manifest currently being loaded.
    Loading(&'a [PackageId]),
    Idle,
}

#[derive(Serialize, Debug, Clone)]
pub struct Vehicle {
    capacity: usize,
    clock: Time,
    manifest: Vec<PackageId>,
    total_distance: Miles,
    baseline_distance: Miles,
    trips: Vec<TripRecord>,
}

impl Vehicle {
    pub fn new(capacity: usize, start_time: Time) -> Self {
        Vehicle {
            capacity,
            clock: start_time,
            manifest: Vec::with_capacity(capacity),
            total_distance: Miles::ZERO,
            baseline_distance: Miles::ZERO,
            trips: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clock(&self) -> Time {
        self.clock
    }

    pub fn manifest(&self) -> &[PackageId] {
        &self.manifest
    }

    pub fn total_distance(&self) -> Miles {
        self.total_distance
    }

    pub fn baseline_distance(&self) -> Miles {
        self.baseline_distance
    }

    pub fn trips(&self) -> &[TripRecord] {
        &self.trips
    }

    pub fn remaining_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.manifest.len())
    }

    pub fn can_load(&self, count: usize) -> bool {
        self.manifest.len() + count <= self.capacity
    }

    /// Loads all of `ids` or none of them.
    pub(crate) fn try_load(&mut self, ids: &[PackageId]) -> bool {
        if !self.can_load(ids.len()) {
            return false;
        }

        self.manifest.extend_from_slice(ids);
        true
    }

    pub(crate) fn clear_manifest(&mut self) {
        self.manifest.clear();
    }

    /// Drops the delivered packages, keeping the order of the rest.
    pub(crate) fn unload(&mut self, delivered: &[PackageId]) {
        self.manifest = self
            .manifest
            .iter()
            .copied()
            .filter(|id| !delivered.contains(id))
            .collect();
    }

    pub(crate) fn drive(&mut self, duration: SignedDuration) -> Result<(), jiff::Error> {
        self.clock = self.clock.checked_add(duration)?;
        Ok(())
    }

    /// Books the trip's mileage and empties the manifest.
    pub(crate) fn finish_trip(&mut self, trip: TripRecord) {
        self.total_distance += trip.distance;
        self.baseline_distance += trip.baseline_distance;
        self.trips.push(trip);
        self.manifest.clear();
    }

    pub fn load_at(&self, time: Time) -> VehicleLoad<'_> {
        if let Some(trip) = self.trips.iter().find(|trip| trip.covers(time)) {
            return VehicleLoad::Trip(trip);
        }

        if !self.manifest.is_empty() && self.clock > time {
            return VehicleLoad::Loading(&self.manifest);
        }

        VehicleLoad::Idle
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::time;

    use super::*;

    fn ids(values: &[u32]) -> Vec<PackageId> {
        values.iter().copied().map(PackageId::new).collect()
    }

    #[test]
    fn test_vehicle_numbers() {
        assert_eq!(VehicleIdx::new(0).number(), 1);
        assert_eq!(VehicleIdx::from_number(2), Some(VehicleIdx::new(1)));
        assert_eq!(VehicleIdx::from_number(0), None);
    }

    #[test]
    fn test_load_is_all_or_nothing() {
        let mut vehicle = Vehicle::new(3, time(8, 0, 0, 0));

        assert!(vehicle.try_load(&ids(&[1, 2])));
        assert!(!vehicle.try_load(&ids(&[3, 4])));
        assert_eq!(vehicle.manifest(), ids(&[1, 2]).as_slice());
        assert_eq!(vehicle.remaining_capacity(), 1);

        vehicle.unload(&ids(&[1]));
        assert_eq!(vehicle.manifest(), ids(&[2]).as_slice());
    }

    #[test]
    fn test_drive_advances_clock() {
        let mut vehicle = Vehicle::new(16, time(8, 0, 0, 0));
        vehicle.drive(SignedDuration::from_mins(30)).unwrap();

        assert_eq!(vehicle.clock(), time(8, 30, 0, 0));
        assert_eq!(vehicle.total_distance(), Miles::ZERO);

        let mut late = Vehicle::new(16, time(23, 50, 0, 0));
        assert!(late.drive(SignedDuration::from_mins(20)).is_err());
    }

    #[test]
    fn test_load_at_without_trips() {
        let mut vehicle = Vehicle::new(16, time(9, 5, 0, 0));
        assert_eq!(vehicle.load_at(time(9, 0, 0, 0)), VehicleLoad::Idle);

        vehicle.try_load(&ids(&[6, 25]));
        assert_eq!(
            vehicle.load_at(time(9, 0, 0, 0)),
            VehicleLoad::Loading(ids(&[6, 25]).as_slice())
        );
        assert_eq!(vehicle.load_at(time(9, 30, 0, 0)), VehicleLoad::Idle);
    }
}
