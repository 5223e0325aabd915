#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Corral Simulation Library
//!
//! Correlations, learning automata, repeated play and the
//! classical-versus-quantum comparison experiment.

pub mod automaton;
pub mod correlation;
pub mod error;
pub mod experiment;
pub mod report;
pub mod tournament;

mod proptests;

// Re-exports for convenience
pub use automaton::{AutomatonConfig, LearningAutomaton, PlayRecord};
pub use correlation::{
    AgentId, ClassicalCorrelation, Correlation, CorrelationKind, QuantumCorrelation,
    two_agent_distribution,
};
pub use error::{Error, Result};
pub use experiment::{ComparisonReport, ExperimentConfig, TrialOutcome, play_once, run_comparison};
pub use report::{default_report_name, save_averages, save_progress, write_averages, write_progress};
pub use tournament::{PlaySettings, Tournament, TypeStats, play};
