//! Autolint CLI - checks Composer autoload declarations against the sources.
//!
//! Every `psr-0`, `psr-4`, `classmap` and `files` entry of `composer.json` is
//! validated against the files it points at, and the resulting report is
//! printed as text or JSON.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod cli;
mod output;

use clap::Parser;
use cli::{Cli, OutputFormat};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 if cli.quiet => Level::ERROR,
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli::run(&cli) {
        Ok(code) => code,
        Err(e) => {
            if cli.format == OutputFormat::Json {
                output::json::print_error(&e);
            } else {
                output::error(&e);
            }
            ExitCode::from(cli::EXIT_ERROR)
        }
    }
}
