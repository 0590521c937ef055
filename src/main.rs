//! Route Docs - Command-line tool for exploring reflected API documentation.
//!
//! # Usage
//!
//! ```bash
//! route-docs [OPTIONS] <COMMAND>
//! ```
//!
//! # Examples
//!
//! Show the structure of a type name:
//! ```bash
//! route-docs parse-type 'alloc::vec::Vec<core::option::Option<u8>>'
//! ```
//!
//! Document the bundled pet store API as JSON:
//! ```bash
//! route-docs demo -f json -o docs.json
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! route-docs demo -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use route_docs::cli;

fn main() -> Result<()> {
    // Parse first so the verbose flag can pick the log level
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Route Docs starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("Done");

    Ok(())
}
