use clap::Args;
use comfy_table::{Table, presets::UTF8_FULL};
use courier_dispatch::{
    problem::{package::PackageId, vehicle::VehicleLoad},
    utils::time::format_clock_time,
};
use jiff::civil::Time;

use crate::{
    parsers,
    scenario_args::{ScenarioArgs, dispatch},
};

#[derive(Args)]
pub struct LoadsArgs {
    #[command(flatten)]
    scenario: ScenarioArgs,

    /// Time of day to report at (e.g. "9:30 AM")
    #[arg(short, long, value_parser = parsers::parse_time)]
    at: Time,
}

fn join_ids(ids: &[PackageId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn run(args: LoadsArgs) -> Result<(), anyhow::Error> {
    let (context, _) = dispatch(&args.scenario)?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Vehicle", "State", "Packages"]);

    for (vehicle_id, _) in context.fleet().iter() {
        let (state, packages) = match context.vehicle_manifest_at(vehicle_id, args.at)? {
            VehicleLoad::Trip(trip) => (
                format!(
                    "On trip {} - {}",
                    format_clock_time(trip.start),
                    format_clock_time(trip.end)
                ),
                join_ids(&trip.manifest),
            ),
            VehicleLoad::Loading(manifest) => (String::from("Loading"), join_ids(manifest)),
            VehicleLoad::Idle => (String::from("Idle"), String::new()),
        };

        table.add_row(vec![format!("#{}", vehicle_id.number()), state, packages]);
    }

    println!("Vehicle loads at {}", format_clock_time(args.at));
    println!("{table}");

    Ok(())
}
