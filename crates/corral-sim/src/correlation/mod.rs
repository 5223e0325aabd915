//! Shared randomness between agents.
//!
//! A correlation acts as a public signal that helps players reach a
//! correlated equilibrium. Every agent may apply its own local operation to
//! the shared resource before observing it, and is free to regard or
//! disregard what it observes.
//!
//! One play follows a fixed protocol:
//!
//! 1. [`Correlation::prepare`] creates a fresh signal,
//! 2. [`Correlation::local_operation`] for any subset of agents,
//! 3. [`Correlation::observe`] fixes every agent's outcome,
//! 4. [`Correlation::observable`] reads each agent's outcome.

mod classical;
mod quantum;

pub use classical::{ClassicalCorrelation, two_agent_distribution};
pub use quantum::{MAX_STATE_DIMENSION, QuantumCorrelation};

use crate::{Error, Result};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest register a correlation accepts, so that an `r²` local operation
/// and an `r × r` joint table both stay within [`MAX_STATE_DIMENSION`].
pub const MAX_REGISTER_SIZE: usize = 1 << 11;

fn check_register_size(register_size: usize) -> Result<()> {
    if register_size == 0 {
        return Err(Error::validation_field(
            "register_size",
            "register must hold at least one value",
        ));
    }
    if register_size > MAX_REGISTER_SIZE {
        return Err(Error::validation_field(
            "register_size",
            format!("register holds at most {MAX_REGISTER_SIZE} values"),
        ));
    }
    Ok(())
}

/// Handle of an agent registered with a correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(usize);

impl AgentId {
    /// Creates an agent handle from its registration index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Registration index of the agent.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent-{}", self.0)
    }
}

/// Source of correlated signals for a group of agents.
///
/// Randomness is passed in explicitly so that a seeded generator makes
/// whole experiments reproducible.
pub trait Correlation: Send {
    /// Which model of correlation this is.
    fn kind(&self) -> CorrelationKind;

    /// Number of distinct values each agent can observe.
    fn register_size(&self) -> usize;

    /// Number of registered agents.
    fn agent_count(&self) -> usize;

    /// Grants a new agent access to the shared randomness.
    ///
    /// Registering invalidates a play in progress; call
    /// [`Correlation::prepare`] afterwards.
    fn register_agent(&mut self) -> AgentId;

    /// Generates a new public signal and resets every local operation.
    fn prepare(&mut self, rng: &mut dyn RngCore) -> Result<()>;

    /// Dimensionality of the parameter space of local operations.
    fn local_operation_parameters_count(&self) -> usize;

    /// Applies a local operation of `agent`. Allowed between
    /// [`Correlation::prepare`] and [`Correlation::observe`].
    fn local_operation(&mut self, agent: AgentId, parameters: &[f64]) -> Result<()>;

    /// Makes every agent's observable definite.
    fn observe(&mut self, rng: &mut dyn RngCore) -> Result<()>;

    /// The value observed by `agent`, in `0..register_size()`.
    fn observable(&self, agent: AgentId) -> Result<usize>;
}

/// Available models of correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationKind {
    /// Identical copies of a random register broadcast to every agent.
    Classical,
    /// A maximally entangled register shared by every agent.
    Quantum,
}

impl CorrelationKind {
    /// Both kinds, classical first.
    pub const ALL: [CorrelationKind; 2] = [CorrelationKind::Classical, CorrelationKind::Quantum];

    /// Creates an empty correlation of this kind.
    pub fn build(self, register_size: usize) -> Result<Box<dyn Correlation>> {
        Ok(match self {
            CorrelationKind::Classical => Box::new(ClassicalCorrelation::new(register_size)?),
            CorrelationKind::Quantum => Box::new(QuantumCorrelation::new(register_size)?),
        })
    }

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationKind::Classical => "classical",
            CorrelationKind::Quantum => "quantum",
        }
    }
}

impl fmt::Display for CorrelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorrelationKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classical" => Ok(CorrelationKind::Classical),
            "quantum" => Ok(CorrelationKind::Quantum),
            other => Err(Error::validation_field(
                "correlation",
                format!("unknown correlation '{other}', expected 'classical' or 'quantum'"),
            )),
        }
    }
}

/// Where a correlation is within one play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Prepared,
    Observed,
}

/// Bookkeeping shared by the correlation models.
#[derive(Debug, Clone)]
struct Registry {
    agents: usize,
    phase: Phase,
}

impl Registry {
    fn new() -> Self {
        Self {
            agents: 0,
            phase: Phase::Idle,
        }
    }

    fn register(&mut self) -> AgentId {
        let id = AgentId(self.agents);
        self.agents += 1;
        self.phase = Phase::Idle;
        id
    }

    fn check_agent(&self, agent: AgentId) -> Result<()> {
        if agent.0 < self.agents {
            Ok(())
        } else {
            Err(Error::UnknownAgent { agent })
        }
    }

    fn check_operation(&self, agent: AgentId, expected: usize, actual: usize) -> Result<()> {
        self.check_agent(agent)?;
        if expected != actual {
            return Err(Error::ParameterCount {
                agent,
                expected,
                actual,
            });
        }
        match self.phase {
            Phase::Prepared => Ok(()),
            Phase::Idle => Err(Error::protocol("local operation before prepare()")),
            Phase::Observed => Err(Error::protocol("local operation after observe()")),
        }
    }

    fn check_observe(&self) -> Result<()> {
        match self.phase {
            Phase::Prepared => Ok(()),
            Phase::Idle => Err(Error::protocol("observe() before prepare()")),
            Phase::Observed => Err(Error::protocol("observe() called twice in one play")),
        }
    }

    fn check_observable(&self, agent: AgentId) -> Result<()> {
        self.check_agent(agent)?;
        if self.phase == Phase::Observed {
            Ok(())
        } else {
            Err(Error::protocol("observable read before observe()"))
        }
    }
}
