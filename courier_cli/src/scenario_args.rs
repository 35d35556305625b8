use std::path::PathBuf;

use clap::Args;
use courier_dispatch::{
    json::scenario::load_scenario,
    query::DispatchSummary,
    solver::{dispatch_context::DispatchContext, orchestrator::DeliveryOrchestrator},
};
use tracing::info;

#[derive(Args)]
pub struct ScenarioArgs {
    /// Scenario file describing addresses, distances, packages and vehicles
    #[arg(short, long)]
    scenario: PathBuf,

    /// Overrides the vehicle speed in miles per hour
    #[arg(long)]
    speed: Option<f64>,

    /// Overrides the capacity of every vehicle
    #[arg(long)]
    capacity: Option<usize>,
}

/// Loads the scenario and runs every dispatch cycle.
pub fn dispatch(args: &ScenarioArgs) -> Result<(DispatchContext, DispatchSummary), anyhow::Error> {
    let mut scenario = load_scenario(&args.scenario)?;

    if let Some(speed) = args.speed {
        info!("Overriding speed: {speed} mph");
        scenario.params.speed_mph = speed;
    }

    if let Some(capacity) = args.capacity {
        info!("Overriding capacity: {capacity} packages");
        scenario.params.vehicle_capacity = capacity;
        for vehicle in &mut scenario.vehicles {
            vehicle.capacity = Some(capacity);
        }
    }

    let mut orchestrator = DeliveryOrchestrator::new(scenario.build_context()?);
    let summary = orchestrator.run()?;

    Ok((orchestrator.into_context(), summary))
}
