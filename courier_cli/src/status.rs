use clap::Args;
use comfy_table::{Table, presets::UTF8_FULL};
use courier_dispatch::{problem::package::PackageId, utils::time::format_clock_time};
use jiff::civil::Time;

use crate::{
    parsers,
    scenario_args::{ScenarioArgs, dispatch},
};

#[derive(Args)]
pub struct StatusArgs {
    #[command(flatten)]
    scenario: ScenarioArgs,

    /// Time of day to report at (e.g. "10:25 AM", "13:12")
    #[arg(short, long, value_parser = parsers::parse_time)]
    at: Time,

    /// Only report this package
    #[arg(short, long, value_parser = parsers::parse_package_id)]
    package: Option<PackageId>,
}

pub fn run(args: StatusArgs) -> Result<(), anyhow::Error> {
    let (context, _) = dispatch(&args.scenario)?;

    if let Some(id) = args.package {
        println!(
            "Package {} at {}: {} ({})",
            id,
            format_clock_time(args.at),
            context.status_at(id, args.at)?,
            context.display_address_at(id, args.at)?
        );
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Package", "Address", "Deadline", "Status"]);

    for row in context.package_report(args.at) {
        table.add_row(vec![
            row.id.to_string(),
            row.address,
            row.deadline,
            row.status,
        ]);
    }

    println!("Status at {}", format_clock_time(args.at));
    println!("{table}");

    Ok(())
}
