//! Simulated quantum correlation over a maximally entangled register.

use super::{AgentId, Correlation, CorrelationKind, Phase, Registry, check_register_size};
use crate::{Error, Result};
use corral_core::math::weighted_choice;
use corral_core::{ComplexMatrix, unitary};
use num_complex::Complex64;
use rand::RngCore;

/// Largest state vector the simulator will allocate.
pub const MAX_STATE_DIMENSION: usize = 1 << 22;

/// A register of dimension `r` per agent, prepared in the uniform entangled
/// state `(|0..0⟩ + |1..1⟩ + … + |r-1..r-1⟩) / √r`.
///
/// A local operation is a unitary on the agent's own subsystem, given by the
/// `r²` parameters understood by [`corral_core::unitary()`]. Without local
/// operations every agent observes the same uniformly random value, just
/// like classical shared randomness.
///
/// Agent 0 owns the most significant digit of the basis-state index.
#[derive(Debug, Clone)]
pub struct QuantumCorrelation {
    register_size: usize,
    registry: Registry,
    state: Vec<Complex64>,
    operations: Vec<ComplexMatrix>,
    observables: Vec<usize>,
}

impl QuantumCorrelation {
    /// Creates a correlation with an `register_size`-dimensional subsystem per agent.
    pub fn new(register_size: usize) -> Result<Self> {
        check_register_size(register_size)?;
        Ok(Self {
            register_size,
            registry: Registry::new(),
            state: Vec::new(),
            operations: Vec::new(),
            observables: Vec::new(),
        })
    }

    /// Dimension of the joint state for the registered agents.
    pub fn state_dimension(&self) -> Result<usize> {
        let agents = self.registry.agents;
        u32::try_from(agents)
            .ok()
            .and_then(|exp| self.register_size.checked_pow(exp))
            .filter(|dim| *dim <= MAX_STATE_DIMENSION)
            .ok_or(Error::StateTooLarge {
                agents,
                register_size: self.register_size,
            })
    }

    /// Probability of every basis state after the local operations applied so far.
    pub fn outcome_probabilities(&self) -> Result<Vec<f64>> {
        if self.registry.phase == Phase::Idle {
            return Err(Error::protocol("outcome probabilities before prepare()"));
        }
        Ok(self.evolved_state().iter().map(|a| a.norm_sqr()).collect())
    }

    fn stride(&self, agent: usize) -> usize {
        let digits_after = self.registry.agents - 1 - agent;
        (0..digits_after).fold(1, |acc, _| acc * self.register_size)
    }

    /// The prepared state with every agent's matrix applied on its own axis.
    ///
    /// The amplitude of `|i⟩` becomes `Σ_j state[j] · Π_a M_a[j_a][i_a]`.
    fn evolved_state(&self) -> Vec<Complex64> {
        let r = self.register_size;
        let mut state = self.state.clone();
        for (agent, matrix) in self.operations.iter().enumerate() {
            let stride = self.stride(agent);
            let mut next = vec![Complex64::new(0.0, 0.0); state.len()];
            for (index, amplitude) in state.iter().enumerate() {
                if amplitude.norm_sqr() == 0.0 {
                    continue;
                }
                let digit = (index / stride) % r;
                let base = index - digit * stride;
                for (out, entry) in matrix.row(digit).iter().enumerate() {
                    next[base + out * stride] += amplitude * entry;
                }
            }
            state = next;
        }
        state
    }
}

impl Correlation for QuantumCorrelation {
    fn kind(&self) -> CorrelationKind {
        CorrelationKind::Quantum
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

    fn prepare(&mut self, _rng: &mut dyn RngCore) -> Result<()> {
        if self.registry.agents == 0 {
            return Err(Error::protocol("prepare() without registered agents"));
        }
        let dimension = self.state_dimension()?;
        let r = self.register_size;

        // |kk..k⟩ sits at k * (1 + r + r² + … + r^(agents-1)).
        let step: usize = (0..self.registry.agents).map(|a| self.stride(a)).sum();
        let amplitude = Complex64::new((r as f64).sqrt().recip(), 0.0);
        self.state = vec![Complex64::new(0.0, 0.0); dimension];
        for k in 0..r {
            self.state[k * step] = amplitude;
        }

        self.operations = vec![ComplexMatrix::identity(r); self.registry.agents];
        self.observables.clear();
        self.registry.phase = Phase::Prepared;
        Ok(())
    }

    fn local_operation_parameters_count(&self) -> usize {
        self.register_size * self.register_size
    }

    fn local_operation(&mut self, agent: AgentId, parameters: &[f64]) -> Result<()> {
        self.registry.check_operation(
            agent,
            self.local_operation_parameters_count(),
            parameters.len(),
        )?;
        self.operations[agent.index()] = unitary(parameters)?;
        Ok(())
    }

    fn observe(&mut self, rng: &mut dyn RngCore) -> Result<()> {
        self.registry.check_observe()?;
        let probabilities: Vec<f64> = self.evolved_state().iter().map(|a| a.norm_sqr()).collect();
        let measurement = weighted_choice(rng, &probabilities)?;
        self.observables = (0..self.registry.agents)
            .map(|agent| (measurement / self.stride(agent)) % self.register_size)
            .collect();
        self.registry.phase = Phase::Observed;
        Ok(())
    }

    fn observable(&self, agent: AgentId) -> Result<usize> {
        self.registry.check_observable(agent)?;
        Ok(self.observables[agent.index()])
    }
}
