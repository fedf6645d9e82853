//! spot-validator CLI entry point
//!
//! Validation, correction export, and line reconstruction for palm spot
//! sheets.

use clap::Parser;
use spot_validator::checks::check_catalog;
use spot_validator::cli::args::{Args, Command};
use spot_validator::commands::{self, CommandOutput};
use spot_validator::version::get_build_info;
use spot_validator::{SpotCheckConfig, SpotError};
use tracing_subscriber::EnvFilter;

use std::process::ExitCode;

fn main() -> ExitCode {
    // Usage errors exit 3; exit 2 is reserved for correction refusal.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(3)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_logging(args.verbose);

    match args.command {
        Command::Version => {
            println!("{}", get_build_info());
            ExitCode::SUCCESS
        }
        Command::List => {
            print_check_list();
            ExitCode::SUCCESS
        }
        _ => run_command(&args),
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn print_check_list() {
    println!("Available checks:");
    println!();
    for check in check_catalog() {
        println!("  {:<8} {:<28} {}", check.id, check.category.as_str(), check.description);
    }
}

fn run_command(args: &Args) -> ExitCode {
    let config = match SpotCheckConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(3);
        }
    };
    let options = args.output_options();

    let result: Result<CommandOutput, SpotError> = match &args.command {
        Command::Validate(v) => commands::validate::run(v, &options, &config),
        Command::Correct(c) => commands::correct::run(c, &options, &config),
        Command::Lines(l) => commands::lines::run(l, &options, &config),
        Command::Stats(s) => commands::stats::run(s, &options),
        Command::List | Command::Version => return ExitCode::SUCCESS,
    };

    match result {
        Ok(output) => {
            println!("{}", output.text);
            if output.has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e @ SpotError::SchemaIncomplete { .. }) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(3)
        }
    }
}
