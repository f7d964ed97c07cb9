//! Stowage CLI
//!
//! Usage:
//!   stowage --types types.toml --asset lunch.json init food::Basket --name Lunch
//!   stowage --types types.toml --asset lunch.json add food::Apple
//!   stowage --types types.toml --asset lunch.json list

use anyhow::Result;
use clap::Parser;
use stowage_cli::{Args, run};
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    debug!("Running {:?}", args.command);
    for line in run(&args)? {
        println!("{line}");
    }
    Ok(())
}
