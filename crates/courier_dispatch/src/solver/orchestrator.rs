use tracing::{debug, info};

use crate::{
    error::DispatchError,
    problem::{trip::TripRecord, vehicle::VehicleIdx},
    query::DispatchSummary,
    solver::{
        dispatch_context::DispatchContext,
        scheduler::{CycleAssignment, PriorityScheduler},
        simulator::TripSimulator,
    },
    timer_debug,
};

/// What a single scheduling-and-driving cycle did.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle: usize,
    pub assignment: CycleAssignment,
    pub trips: Vec<(VehicleIdx, TripRecord)>,
}

/// Repeats schedule, route, optimize and drive cycles until every package
/// has been delivered.
pub struct DeliveryOrchestrator {
    context: DispatchContext,
    cycles: usize,
}

impl DeliveryOrchestrator {
    pub fn new(context: DispatchContext) -> Self {
        DeliveryOrchestrator {
            context,
            cycles: 0,
        }
    }

    pub fn context(&self) -> &DispatchContext {
        &self.context
    }

    pub fn into_context(self) -> DispatchContext {
        self.context
    }

    pub fn cycles(&self) -> usize {
        self.cycles
    }

    pub fn is_complete(&self) -> bool {
        self.context.packages().all_delivered()
    }

    /// Assigns the undelivered packages, then drives every loaded vehicle
    /// through its trip in fleet order.
    pub fn step(&mut self) -> Result<CycleReport, DispatchError> {
        self.cycles += 1;

        let (packages, fleet, matrix, depot, params) = self.context.parts_mut();

        let scheduler = PriorityScheduler::new(params, fleet)?;
        let assignment = scheduler.assign(packages, fleet)?;

        let simulator = TripSimulator::new(matrix, depot, params.speed());
        let mut trips = Vec::new();

        for vehicle_id in VehicleIdx::ids(fleet.len()) {
            let vehicle = fleet.vehicle_mut(vehicle_id)?;

            if let Some(trip) = simulator.run_trip(vehicle_id, vehicle, packages)? {
                trips.push((vehicle_id, trip));
            }
        }

        debug!(
            "Cycle {}: placed {}, deferred {}, trips {}",
            self.cycles,
            assignment.placed_count(),
            assignment.deferred.len(),
            trips.len()
        );

        Ok(CycleReport {
            cycle: self.cycles,
            assignment,
            trips,
        })
    }

    /// Runs cycles until all packages are delivered.
    ///
    /// A cycle that places nothing leaves every clock where it was, so the
    /// following cycles could never differ; that case fails with
    /// [`DispatchError::Stalled`].
    pub fn run(&mut self) -> Result<DispatchSummary, DispatchError> {
        timer_debug!("Dispatch run", {
            while !self.is_complete() {
                let report = self.step()?;

                if report.assignment.placed_count() == 0 {
                    return Err(DispatchError::Stalled {
                        cycle: report.cycle,
                        undelivered: self.context.packages().undelivered(),
                    });
                }
            }
        });

        let summary = self.context.summary(self.cycles);

        info!(
            "Delivered {} packages in {} cycles: {} driven, {} baseline",
            self.context.packages().len(),
            self.cycles,
            summary.total_mileage,
            summary.baseline_mileage
        );

        Ok(summary)
    }
}
