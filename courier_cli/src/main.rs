use clap::{Parser, Subcommand};
use courier_dispatch::json::schema::generate_json_schema;

use crate::{loads::LoadsArgs, run::RunArgs, status::StatusArgs};

mod loads;
mod parsers;
mod run;
mod scenario_args;
mod status;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatches every package and prints the mileage summary
    Run {
        #[command(flatten)]
        args: RunArgs,
    },
    /// Package statuses at a time of day
    Status {
        #[command(flatten)]
        args: StatusArgs,
    },
    /// What every vehicle carries at a time of day
    Loads {
        #[command(flatten)]
        args: LoadsArgs,
    },
    /// Prints the JSON schema of scenario files
    Schema,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Run { args }) => run::run(args)?,
        Some(Commands::Status { args }) => status::run(args)?,
        Some(Commands::Loads { args }) => loads::run(args)?,
        Some(Commands::Schema) => println!("{}", generate_json_schema()?),
        None => {}
    }

    Ok(())
}
