use clap::Parser;
use std::process::ExitCode;

use aprs_pgo::cli::{run_cli, to_exit_code, Cli};
use aprs_pgo::errors::PgoflowError;

fn main() -> ExitCode {
    match run_cli(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            let code = err
                .downcast_ref::<PgoflowError>()
                .map_or(1, PgoflowError::exit_code);
            to_exit_code(code)
        }
    }
}
