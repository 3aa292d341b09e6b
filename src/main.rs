#![warn(clippy::all)]

mod config;
mod sql;

use std::{
    fs,
    io::{self, Read},
    process::ExitCode,
};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::Cli;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_query(cli: &Cli) -> io::Result<String> {
    if let Some(query) = &cli.query {
        return Ok(query.clone());
    }
    if let Some(path) = &cli.file {
        return fs::read_to_string(path);
    }

    let mut query = String::new();
    io::stdin().read_to_string(&mut query)?;
    Ok(query)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let query = match read_query(&cli) {
        Ok(query) => query,
        Err(e) => {
            eprintln!("Failed to read query: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match sql::visualize(&query, &cli.options) {
        Ok(path) => {
            println!("Query visualization saved to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Visualization failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
