#![allow(clippy::cargo_common_metadata)]
use anyhow::Result;
use fir_cli::{
    cli::{CommandTable, Dispatcher},
    config::Config,
    core::{OfflineService, Operations},
};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    // Initialize configuration and the command table
    let config = Config::from_env()?;
    let table = CommandTable::standard()?;

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let mut operations = Operations::new(&config, OfflineService);
    let outcome = Dispatcher::new(&table, &config).dispatch(&argv, &mut operations);

    if let Some(help) = outcome.help_text() {
        print!("{help}");
    }

    Ok(ExitCode::from(outcome.exit_code()))
}
