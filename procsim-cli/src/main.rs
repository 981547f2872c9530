//! ## procsim-cli
//! **Command line frontend for the process simulator**
//!
//! `procsim run <config>` simulates the configured meta-data program and
//! writes the simulation log; `procsim check <config>` validates the inputs
//! and prints the schedule without running it.

use clap::Parser;
use procsim_telemetry::logging::EventLogger;

mod commands;
mod error;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    EventLogger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(run_args) => commands::run_simulation(run_args).await.map(|_| ()),
        Commands::Check(check_args) => {
            let report = commands::check_inputs(&check_args)?;
            print!("{report}");
            Ok(())
        }
    }
}
