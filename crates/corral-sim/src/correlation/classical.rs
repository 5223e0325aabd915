//! Classical shared randomness.

use super::{AgentId, Correlation, CorrelationKind, Phase, Registry, check_register_size};
use crate::{Error, Result};
use rand::{Rng, RngCore};

/// Identical copies of a uniformly random register, broadcast to all agents.
///
/// A local operation is a weight per register cell; an agent observes the
/// index of the cell maximising `register[i] * |weight[i]|`. Without a
/// local operation all weights are equal and every agent observes the
/// same value.
#[derive(Debug, Clone)]
pub struct ClassicalCorrelation {
    register_size: usize,
    registry: Registry,
    register: Vec<f64>,
    operations: Vec<Vec<f64>>,
    observables: Vec<usize>,
}

impl ClassicalCorrelation {
    /// Creates a correlation whose register holds `register_size` values per play.
    pub fn new(register_size: usize) -> Result<Self> {
        check_register_size(register_size)?;
        Ok(Self {
            register_size,
            registry: Registry::new(),
            register: Vec::new(),
            operations: Vec::new(),
            observables: Vec::new(),
        })
    }

    /// The register drawn by the last [`Correlation::prepare`].
    pub fn register(&self) -> &[f64] {
        &self.register
    }
}

impl Correlation for ClassicalCorrelation {
    fn kind(&self) -> CorrelationKind {
        CorrelationKind::Classical
    }

    fn register_size(&self) -> usize {
        self.register_size
    }

    fn agent_count(&self) -> usize {
        self.registry.agents
    }

    fn register_agent(&mut self) -> AgentId {
        self.registry.register()
    }

    fn prepare(&mut self, rng: &mut dyn RngCore) -> Result<()> {
        let impartial = vec![1.0 / self.register_size as f64; self.register_size];
        self.operations = vec![impartial; self.registry.agents];
        self.register = (0..self.register_size).map(|_| rng.r#gen::<f64>()).collect();
        self.observables.clear();
        self.registry.phase = Phase::Prepared;
        Ok(())
    }

    fn local_operation_parameters_count(&self) -> usize {
        self.register_size
    }

    fn local_operation(&mut self, agent: AgentId, parameters: &[f64]) -> Result<()> {
        self.registry
            .check_operation(agent, self.register_size, parameters.len())?;
        self.operations[agent.index()] = parameters.to_vec();
        Ok(())
    }

    fn observe(&mut self, _rng: &mut dyn RngCore) -> Result<()> {
        self.registry.check_observe()?;
        self.observables = self
            .operations
            .iter()
            .map(|weights| {
                let mut best = 0;
                let mut best_value = f64::NEG_INFINITY;
                for (i, (r, w)) in self.register.iter().zip(weights).enumerate() {
                    let value = r * w.abs();
                    if value > best_value {
                        best = i;
                        best_value = value;
                    }
                }
                best
            })
            .collect();
        self.registry.phase = Phase::Observed;
        Ok(())
    }

    fn observable(&self, agent: AgentId) -> Result<usize> {
        self.registry.check_observable(agent)?;
        Ok(self.observables[agent.index()])
    }
}

/// Exact joint distribution of two agents' observables for a register of size 2.
///
/// `first` and `second` are the agents' local operations (positive weights).
/// Entry `[a][b]` is the probability that the first agent observes `a` and
/// the second observes `b`.
pub fn two_agent_distribution(first: [f64; 2], second: [f64; 2]) -> Result<[[f64; 2]; 2]> {
    if first
        .iter()
        .chain(&second)
        .any(|w| !w.is_finite() || *w <= 0.0)
    {
        return Err(Error::validation_field(
            "weights",
            "local operations must have positive finite weights",
        ));
    }

    // An agent with weights (w0, w1) observes 0 iff X1 / X0 <= w0 / w1 for
    // independent uniform X0, X1; `cdf` is the distribution of that ratio.
    let cdf = |q: f64| if q <= 1.0 { q / 2.0 } else { 1.0 - 1.0 / (2.0 * q) };
    let q_first = first[0] / first[1];
    let q_second = second[0] / second[1];

    let both_zero = cdf(q_first.min(q_second));
    let first_zero = cdf(q_first);
    let second_zero = cdf(q_second);
    let both_one = 1.0 - cdf(q_first.max(q_second));

    Ok([
        [both_zero, first_zero - both_zero],
        [second_zero - both_zero, both_one],
    ])
}
