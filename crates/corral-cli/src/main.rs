//! Corral CLI
//!
//! Learning automata playing games over classical and quantum correlations.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use corral_cli::{Cli, Command, CorralConfig, commands, logging};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Config { action } => {
            logging::init(cli.quiet, cli.verbose, "info");
            commands::config(cli.config.as_deref(), action)
        }
        command => {
            let config = CorralConfig::load(cli.config.as_deref())?;
            logging::init(cli.quiet, cli.verbose, &config.logging.level);
            commands::run(&config, cli.config.as_deref(), command)
        }
    }
}
