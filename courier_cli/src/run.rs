use clap::Args;
use comfy_table::{Table, presets::UTF8_FULL};
use courier_dispatch::{
    query::DispatchSummary, solver::dispatch_context::DispatchContext,
    utils::time::format_clock_time,
};

use crate::scenario_args::{ScenarioArgs, dispatch};

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    scenario: ScenarioArgs,

    /// Prints the summary as JSON
    #[arg(long)]
    json: bool,

    /// Also lists every trip with its optimized stop sequence
    #[arg(long)]
    trips: bool,
}

pub fn run(args: RunArgs) -> Result<(), anyhow::Error> {
    let (context, summary) = dispatch(&args.scenario)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if args.trips {
        print_trips(&context);
    }

    print_summary(&summary);

    Ok(())
}

fn print_trips(context: &DispatchContext) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Vehicle", "Departed", "Back", "Packages", "Miles", "Stops"]);

    for (vehicle_id, vehicle) in context.fleet().iter() {
        for trip in vehicle.trips() {
            table.add_row(vec![
                format!("#{}", vehicle_id.number()),
                format_clock_time(trip.start),
                format_clock_time(trip.end),
                trip.manifest.len().to_string(),
                trip.distance.to_string(),
                trip.optimized_route.addresses(context.matrix()).join(" -> "),
            ]);
        }
    }

    println!("{table}");
}

fn print_summary(summary: &DispatchSummary) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Vehicle", "Trips", "Miles", "Baseline", "Back at"]);

    for vehicle in &summary.vehicles {
        table.add_row(vec![
            format!("#{}", vehicle.vehicle),
            vehicle.trips.to_string(),
            vehicle.distance.to_string(),
            vehicle.baseline_distance.to_string(),
            format_clock_time(vehicle.finished_at),
        ]);
    }

    table.add_row(vec![
        String::from("Total"),
        summary
            .vehicles
            .iter()
            .map(|vehicle| vehicle.trips)
            .sum::<usize>()
            .to_string(),
        summary.total_mileage.to_string(),
        summary.baseline_mileage.to_string(),
        String::new(),
    ]);

    println!("{table}");
    println!("Cycles: {}", summary.cycles);

    if let Some(improvement) = summary.improvement_percent {
        println!("Improvement over nearest neighbor: {improvement:.1}%");
    }

    if summary.deadline_misses.is_empty() {
        println!("Every deadline was met");
    } else {
        let misses = summary
            .deadline_misses
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>();
        println!("Missed deadlines: {}", misses.join(", "));
    }
}
