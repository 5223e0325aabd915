//! # corral-cli
//!
//! Command-line front end for corral:
//! - the CHSH classical-versus-quantum comparison
//! - single plays of games read from payoff-tree files
//! - sampling correlations and printing unitaries
//! - config file management

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;

pub use cli::{Cli, Command, ConfigAction, ExperimentArgs};
pub use config::CorralConfig;
