use jiff::civil::Time;
use serde::Serialize;

use crate::{
    error::DispatchError,
    problem::{
        miles::Miles,
        package::{DeliveryStatus, PackageId},
        vehicle::{VehicleIdx, VehicleLoad},
    },
    solver::dispatch_context::DispatchContext,
    utils::time::{clock_time, optional_clock_time},
};

/// One row of the point-in-time package report.
#[derive(Debug, Clone, Serialize)]
pub struct PackageReport {
    pub id: PackageId,
    pub address: String,
    pub deadline: String,
    pub status: String,
    pub vehicle: Option<usize>,
    #[serde(with = "optional_clock_time")]
    pub delivery_time: Option<Time>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleSummary {
    pub vehicle: usize,
    pub trips: usize,
    pub distance: Miles,
    pub baseline_distance: Miles,
    #[serde(with = "clock_time")]
    pub finished_at: Time,
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchSummary {
    pub cycles: usize,
    pub total_mileage: Miles,
    pub baseline_mileage: Miles,
    pub improvement_percent: Option<f64>,
    pub vehicles: Vec<VehicleSummary>,
    pub deadline_misses: Vec<PackageId>,
}

impl DispatchContext {
    pub fn status_at(&self, id: PackageId, time: Time) -> Result<DeliveryStatus, DispatchError> {
        Ok(self.packages().get(id)?.status_at(time))
    }

    /// Address shown for the package at `time`, which switches to the
    /// corrected one once the correction has been applied.
    pub fn display_address_at(&self, id: PackageId, time: Time) -> Result<&str, DispatchError> {
        Ok(self.packages().get(id)?.display_address_at(time))
    }

    pub fn total_mileage(&self) -> Miles {
        self.fleet().total_distance()
    }

    /// Mileage the nearest neighbor routes alone would have driven.
    pub fn baseline_mileage(&self) -> Miles {
        self.fleet().baseline_distance()
    }

    /// Share of the baseline saved by the route improvement, in percent.
    pub fn improvement(&self) -> Option<f64> {
        let baseline = self.baseline_mileage();

        if baseline.is_zero() {
            return None;
        }

        Some((baseline - self.total_mileage()).value() / baseline.value() * 100.0)
    }

    pub fn vehicle_manifest_at(
        &self,
        vehicle_id: VehicleIdx,
        time: Time,
    ) -> Result<VehicleLoad<'_>, DispatchError> {
        Ok(self.fleet().vehicle(vehicle_id)?.load_at(time))
    }

    pub fn package_report(&self, time: Time) -> Vec<PackageReport> {
        self.packages()
            .iter()
            .map(|package| {
                let status = package.status_at(time);
                let vehicle = match status {
                    DeliveryStatus::AtDepot => None,
                    DeliveryStatus::EnRoute(vehicle) => Some(vehicle.number()),
                    DeliveryStatus::Delivered { vehicle, .. } => Some(vehicle.number()),
                };

                PackageReport {
                    id: package.id(),
                    address: package.display_address_at(time).to_owned(),
                    deadline: package.deadline().to_string(),
                    status: status.to_string(),
                    vehicle,
                    delivery_time: match status {
                        DeliveryStatus::Delivered { time, .. } => Some(time),
                        _ => None,
                    },
                }
            })
            .collect()
    }

    /// Delivered packages that arrived after their deadline, by id.
    pub fn deadline_misses(&self) -> Vec<PackageId> {
        let end_of_day = self.params().end_of_day;

        self.packages()
            .iter()
            .filter(|package| package.is_late(end_of_day))
            .map(|package| package.id())
            .collect()
    }

    pub fn summary(&self, cycles: usize) -> DispatchSummary {
        let vehicles = self
            .fleet()
            .iter()
            .map(|(vehicle_id, vehicle)| VehicleSummary {
                vehicle: vehicle_id.number(),
                trips: vehicle.trips().len(),
                distance: vehicle.total_distance(),
                baseline_distance: vehicle.baseline_distance(),
                finished_at: vehicle.clock(),
            })
            .collect();

        DispatchSummary {
            cycles,
            total_mileage: self.total_mileage(),
            baseline_mileage: self.baseline_mileage(),
            improvement_percent: self.improvement(),
            vehicles,
            deadline_misses: self.deadline_misses(),
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::time;

    use super::*;
    use crate::{
        problem::package::{Deadline, PackageBuilder},
        problem::package_store::PackageStore,
        solver::{dispatch_params::DispatchParams, orchestrator::DeliveryOrchestrator},
        test_utils,
    };

    // depot, then two stops 9 miles apart on a line
    const LINE: [(f64, f64); 3] = [(0.0, 0.0), (9.0, 0.0), (18.0, 0.0)];

    fn dispatched(packages: PackageStore) -> DispatchContext {
        let fleet = test_utils::create_fleet(&[time(8, 0, 0, 0)], 16);
        let context = test_utils::create_context(&LINE, packages, fleet, DispatchParams::default());
        let mut orchestrator = DeliveryOrchestrator::new(context);
        orchestrator.run().unwrap();
        orchestrator.into_context()
    }

    #[test]
    fn test_status_over_time() {
        let context = dispatched(test_utils::create_store(&[(1, 1), (2, 2)]));
        let id = PackageId::new(2);
        let vehicle = VehicleIdx::new(0);

        assert_eq!(
            context.status_at(id, time(7, 59, 0, 0)).unwrap(),
            DeliveryStatus::AtDepot
        );
        assert_eq!(
            context.status_at(id, time(8, 45, 0, 0)).unwrap(),
            DeliveryStatus::EnRoute(vehicle)
        );
        assert_eq!(
            context.status_at(id, time(9, 0, 0, 0)).unwrap(),
            DeliveryStatus::Delivered {
                time: time(9, 0, 0, 0),
                vehicle
            }
        );
        assert!(matches!(
            context.status_at(PackageId::new(9), time(9, 0, 0, 0)),
            Err(DispatchError::PackageNotFound(_))
        ));
    }

    #[test]
    fn test_vehicle_manifest_at() {
        let context = dispatched(test_utils::create_store(&[(1, 1), (2, 2)]));
        let vehicle = VehicleIdx::new(0);

        match context.vehicle_manifest_at(vehicle, time(9, 30, 0, 0)).unwrap() {
            VehicleLoad::Trip(trip) => {
                assert_eq!(trip.manifest, vec![PackageId::new(1), PackageId::new(2)]);
            }
            other => panic!("expected a trip, got {other:?}"),
        }
        assert_eq!(
            context.vehicle_manifest_at(vehicle, time(11, 0, 0, 0)).unwrap(),
            VehicleLoad::Idle
        );
        assert!(context.vehicle_manifest_at(VehicleIdx::new(3), time(9, 0, 0, 0)).is_err());
    }

    #[test]
    fn test_deadline_misses() {
        let mut packages = test_utils::create_store(&[(1, 1)]);
        let mut late = PackageBuilder::new(PackageId::new(2), "STOP 2", test_utils::location(2));
        late.set_deadline(Deadline::At(time(8, 30, 0, 0)));
        packages.insert(late.build()).unwrap();

        let context = dispatched(packages);

        assert_eq!(context.deadline_misses(), vec![PackageId::new(2)]);
    }

    #[test]
    fn test_report_and_summary() {
        let context = dispatched(test_utils::create_store(&[(1, 1), (2, 2)]));

        let report = context.package_report(time(8, 45, 0, 0));
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].id, PackageId::new(1));
        assert_eq!(report[0].delivery_time, Some(time(8, 30, 0, 0)));
        assert_eq!(report[1].delivery_time, None);
        assert_eq!(report[1].vehicle, Some(1));

        let summary = context.summary(1);
        assert_eq!(summary.total_mileage, Miles::new(36.0));
        assert_eq!(summary.baseline_mileage, Miles::new(36.0));
        assert_eq!(summary.improvement_percent, Some(0.0));
        assert_eq!(summary.vehicles.len(), 1);
        assert_eq!(summary.vehicles[0].finished_at, time(10, 0, 0, 0));
        assert!(summary.deadline_misses.is_empty());
    }
}
