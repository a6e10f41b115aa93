//! energy - building energy consumption forecasting
//!
//! Usage:
//!   energy derive data/raw_data.csv -o data/processed_data.csv
//!   energy train data/raw_data.csv --report reports/results.txt --save-model model.json
//!   energy predict --model model.json --building-type Commercial --square-footage 12000 \
//!       --year-built 1995 --heating-type Gas --occupants 40 --temperature 4 --humidity 65
//!   energy add data/raw_data.csv --building-type Residential ... --month 2 --energy 2400
//!   energy summary data/raw_data.csv

use clap::Parser;
use energy_cli::{execute_command, init_logging, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match execute_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}
