//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use corral_sim::CorrelationKind;
use std::path::PathBuf;

/// Learning automata playing games over classical and quantum correlations
#[derive(Parser, Debug)]
#[command(name = "corral", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "CORRAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compare classical and quantum automata on the CHSH game
    Chsh {
        #[command(flatten)]
        experiment: ExperimentArgs,

        /// Number of independent trials per correlation kind
        #[arg(short, long)]
        tests: Option<usize>,

        /// Averages file (default: chsh_<tests>_averages.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Play a game once and report the final mean payoff
    Play {
        /// Game file (TOML or JSON with a `payoffs` tree), or `chsh`
        #[arg(short, long)]
        game: String,

        /// Read the payoff tree as one payoff shared by all players
        #[arg(long)]
        coordinated: bool,

        /// Correlation shared by the automata
        #[arg(long, default_value = "quantum")]
        correlation: CorrelationKind,

        #[command(flatten)]
        experiment: ExperimentArgs,

        /// Write the per-round mean payoff to this file
        #[arg(long)]
        progress: Option<PathBuf>,
    },

    /// Sample the joint observables of two agents
    Sample {
        /// Correlation to sample
        #[arg(long, default_value = "classical")]
        correlation: CorrelationKind,

        /// Local operation of the first agent (comma separated)
        #[arg(long, required = true, value_delimiter = ',', allow_hyphen_values = true)]
        first: Vec<f64>,

        /// Local operation of the second agent (comma separated)
        #[arg(long, required = true, value_delimiter = ',', allow_hyphen_values = true)]
        second: Vec<f64>,

        /// Values per agent in the shared register
        #[arg(long, default_value_t = 2)]
        register_size: usize,

        /// Number of plays to sample
        #[arg(long, default_value_t = 10_000)]
        trials: usize,

        /// Seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the unitary matrix described by N² parameters
    Unitary {
        /// Rotation angles and phases, then column phases, in units of π
        #[arg(required = true, allow_negative_numbers = true)]
        params: Vec<f64>,
    },

    /// Configuration file management
    Config {
        /// Config action to run
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Settings that override the `[experiment]` section of the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct ExperimentArgs {
    /// Rounds per play
    #[arg(short, long)]
    pub iterations: Option<usize>,

    /// Plays remembered by every automaton
    #[arg(short, long)]
    pub memory_size: Option<usize>,

    /// Step size of every automaton
    #[arg(short, long)]
    pub learning_rate: Option<f64>,

    /// Deal the least beneficial types
    #[arg(short, long)]
    pub adversarial: bool,

    /// Values per agent in the shared register
    #[arg(long)]
    pub register_size: Option<usize>,

    /// Seed for a reproducible run
    #[arg(short, long)]
    pub seed: Option<u64>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,
    /// Print the effective configuration as TOML
    Show,
    /// Create a default config file
    Init {
        /// Write here instead of the resolved path
        #[arg(long)]
        file: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
