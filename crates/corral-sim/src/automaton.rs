//! Learning automata.
//!
//! An automaton plays an arbitrary finite game and tries to maximise its
//! payoff without knowing the game. Its strategy has two parts:
//!
//! 1. the parameters of the local operation it applies to the correlation;
//! 2. for every value it may observe, a weight per choice, which is turned
//!    into a mixed strategy.
//!
//! Each round the automaton steps from its current strategy to the most
//! promising neighbour at distance `learning_rate`, where promise is
//! predicted from a bounded memory of earlier plays.

use crate::correlation::{AgentId, Correlation};
use crate::{Error, Result};
use corral_core::EPSILON;
use corral_core::math::{distance_squared, normalized_to_one, random_basis};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Tunables of a learning automaton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutomatonConfig {
    /// Number of most recent plays kept for payoff prediction.
    pub memory_size: usize,
    /// Distance between consecutive strategies. Larger values learn faster,
    /// smaller values settle more precisely.
    pub learning_rate: f64,
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self {
            memory_size: 100,
            learning_rate: 0.01,
        }
    }
}

impl AutomatonConfig {
    /// Checks that the configuration can drive an automaton.
    pub fn validate(&self) -> Result<()> {
        if self.memory_size == 0 {
            return Err(Error::validation_field(
                "memory_size",
                "must remember at least one play",
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(Error::validation_field(
                "learning_rate",
                format!("must be a positive number, got {}", self.learning_rate),
            ));
        }
        Ok(())
    }
}

/// What an automaton remembers about one play.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayRecord {
    /// Value observed from the correlation.
    pub observable: usize,
    /// Local operation parameters in force.
    pub local_operation: Vec<f64>,
    /// Choice weights used for the observed value.
    pub mixed_choice: Vec<f64>,
    /// Payoff received.
    pub payoff: f64,
}

/// An agent that learns to play a game through a correlation.
#[derive(Debug, Clone)]
pub struct LearningAutomaton {
    agent: AgentId,
    choices_count: usize,
    register_size: usize,
    parameters_count: usize,
    config: AutomatonConfig,
    memory: VecDeque<PlayRecord>,
    strategy: Vec<f64>,
    observable: Option<usize>,
    total_payoff: f64,
    total_played: u64,
}

impl LearningAutomaton {
    /// Creates an automaton with `choices_count` pure choices and registers it
    /// with `correlation`.
    pub fn new(
        correlation: &mut dyn Correlation,
        choices_count: usize,
        config: AutomatonConfig,
    ) -> Result<Self> {
        config.validate()?;
        if choices_count == 0 {
            return Err(Error::validation_field(
                "choices_count",
                "an automaton needs at least one choice",
            ));
        }
        let agent = correlation.register_agent();
        let register_size = correlation.register_size();
        let parameters_count = correlation.local_operation_parameters_count();
        Ok(Self {
            agent,
            choices_count,
            register_size,
            parameters_count,
            memory: VecDeque::new(),
            config,
            strategy: vec![0.0; parameters_count + register_size * choices_count],
            observable: None,
            total_payoff: 0.0,
            total_played: 0,
        })
    }

    /// Handle under which the automaton is registered.
    pub fn agent(&self) -> AgentId {
        self.agent
    }

    /// Current strategy: local operation parameters, then one block of
    /// choice weights per observable value.
    pub fn strategy(&self) -> &[f64] {
        &self.strategy
    }

    /// Current local operation parameters.
    pub fn local_operation(&self) -> &[f64] {
        &self.strategy[..self.parameters_count]
    }

    /// Remembered plays, oldest first.
    pub fn memory(&self) -> impl ExactSizeIterator<Item = &PlayRecord> {
        self.memory.iter()
    }

    /// Number of plays so far.
    pub fn total_played(&self) -> u64 {
        self.total_played
    }

    /// Mean payoff over the whole history of play.
    pub fn mean_payoff(&self) -> f64 {
        self.total_payoff / self.total_played.max(1) as f64
    }

    /// Predicts the payoff of a local operation from remembered plays.
    pub fn predict_local_operation_payoff(&self, candidate: &[f64]) -> f64 {
        predict(
            self.memory.iter().map(|record| {
                (
                    distance_squared(candidate, &record.local_operation),
                    record.payoff,
                )
            }),
        )
    }

    /// Predicts the payoff of choice weights for `observable`, given the
    /// current local operation, from remembered plays with the same observable.
    pub fn predict_mixed_choice_payoff(&self, observable: usize, candidate: &[f64]) -> f64 {
        let local_operation = self.local_operation();
        predict(
            self.memory
                .iter()
                .filter(|record| record.observable == observable)
                .map(|record| {
                    let distance = distance_squared(candidate, &record.mixed_choice)
                        + distance_squared(local_operation, &record.local_operation);
                    (distance, record.payoff)
                }),
        )
    }

    /// Moves to the most promising nearby local operation and applies it.
    pub fn operate(
        &mut self,
        correlation: &mut dyn Correlation,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        let current = self.local_operation().to_vec();
        if let Some(best) = climb(&current, self.config.learning_rate, rng, |candidate| {
            self.predict_local_operation_payoff(candidate)
        }) {
            self.strategy[..self.parameters_count].copy_from_slice(&best);
        }
        correlation.local_operation(self.agent, self.local_operation())
    }

    /// Reads the observable, moves to the most promising nearby choice
    /// weights for it and returns the resulting mixed strategy.
    pub fn choose(
        &mut self,
        correlation: &dyn Correlation,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>> {
        let observable = correlation.observable(self.agent)?;
        if observable >= self.register_size {
            return Err(Error::protocol(format!(
                "{} observed {observable} from a register of size {}",
                self.agent, self.register_size
            )));
        }
        self.observable = Some(observable);

        let start = self.parameters_count + self.choices_count * observable;
        let end = start + self.choices_count;
        let current = self.strategy[start..end].to_vec();
        if let Some(best) = climb(&current, self.config.learning_rate, rng, |candidate| {
            self.predict_mixed_choice_payoff(observable, candidate)
        }) {
            self.strategy[start..end].copy_from_slice(&best);
        }
        Ok(normalized_to_one(&self.strategy[start..end])?)
    }

    /// Records the strategy used in the last play together with its payoff.
    pub fn remember(&mut self, payoff: f64) -> Result<()> {
        let observable = self.observable.take().ok_or_else(|| {
            Error::protocol(format!("{} remembered a payoff before choosing", self.agent))
        })?;
        let start = self.parameters_count + self.choices_count * observable;
        self.memory.push_back(PlayRecord {
            observable,
            local_operation: self.local_operation().to_vec(),
            mixed_choice: self.strategy[start..start + self.choices_count].to_vec(),
            payoff,
        });
        while self.memory.len() > self.config.memory_size {
            self.memory.pop_front();
        }
        self.total_payoff += payoff;
        self.total_played += 1;
        Ok(())
    }
}

/// Inverse squared distance weighting of remembered payoffs.
///
/// Records closer than `EPSILON` count as coincident; if any exist, their
/// mean payoff is the prediction and all other records are ignored.
fn predict(records: impl Iterator<Item = (f64, f64)>) -> f64 {
    let (mut weighted, mut weight) = (0.0, 0.0);
    let (mut coincident_sum, mut coincident_count) = (0.0, 0usize);
    for (distance2, payoff) in records {
        if distance2 < EPSILON {
            coincident_sum += payoff;
            coincident_count += 1;
        } else if coincident_count == 0 {
            let w = 1.0 / distance2;
            weighted += payoff * w;
            weight += w;
        }
    }
    if coincident_count > 0 {
        coincident_sum / coincident_count as f64
    } else {
        weighted / f64::max(weight, EPSILON)
    }
}

/// The best of the `2d` points at distance `step` from `current` along a
/// random orthonormal basis; the first of equally good points wins.
fn climb<F>(current: &[f64], step: f64, rng: &mut dyn RngCore, score: F) -> Option<Vec<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let mut best: Option<(f64, Vec<f64>)> = None;
    for direction in random_basis(rng, current.len()) {
        for t in [step, -step] {
            let candidate: Vec<f64> = current
                .iter()
                .zip(&direction)
                .map(|(s, d)| s + d * t)
                .collect();
            let value = score(&candidate);
            if best.as_ref().is_none_or(|(best_value, _)| value > *best_value) {
                best = Some((value, candidate));
            }
        }
    }
    best.map(|(_, candidate)| candidate)
}
