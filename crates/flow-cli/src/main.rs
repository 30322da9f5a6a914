//! Flowchart CLI entry point.

use std::{io, process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use flow_cli::Args;

fn main() {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!("Starting flowchart ({log_level})");
    debug!("Parsed arguments: {args:?}");

    let stdout = io::stdout();
    if let Err(err) = flow_cli::run(&args, &mut stdout.lock()) {
        error!("{err}");
        process::exit(1);
    }

    info!("Completed successfully");
}
