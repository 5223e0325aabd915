//! Classical-versus-quantum comparison over many independent trials.

use crate::automaton::AutomatonConfig;
use crate::correlation::CorrelationKind;
use crate::tournament::{PlaySettings, play};
use crate::{Error, Result};
use corral_core::Game;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Parameters of a comparison experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Step size of every automaton.
    pub learning_rate: f64,
    /// Plays remembered by every automaton.
    pub memory_size: usize,
    /// Rounds per trial.
    pub iterations: usize,
    /// Deal the least beneficial types.
    pub adversarial: bool,
    /// Independent trials per correlation kind.
    pub tests_count: usize,
    /// Values per agent in the shared register.
    pub register_size: usize,
    /// Seed for a reproducible experiment; fresh entropy when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            memory_size: 20,
            iterations: 1000,
            adversarial: false,
            tests_count: 100,
            register_size: 2,
            seed: None,
        }
    }
}

impl ExperimentConfig {
    /// Checks every field.
    pub fn validate(&self) -> Result<()> {
        self.play_settings().validate()?;
        if self.tests_count == 0 {
            return Err(Error::validation_field("tests_count", "must be at least 1"));
        }
        if self.register_size == 0 {
            return Err(Error::validation_field("register_size", "must be at least 1"));
        }
        Ok(())
    }

    /// Settings for a single play.
    pub fn play_settings(&self) -> PlaySettings {
        PlaySettings {
            automaton: AutomatonConfig {
                memory_size: self.memory_size,
                learning_rate: self.learning_rate,
            },
            iterations: self.iterations,
            adversarial: self.adversarial,
        }
    }

    /// The random generator for the experiment.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Final mean payoffs of one trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    /// Trial number, starting at 1.
    pub trial: usize,
    /// Mean payoff of the classically correlated automata after the last round.
    pub classical: f64,
    /// Mean payoff of the quantum correlated automata after the last round.
    pub quantum: f64,
}

/// Per-round averages over all trials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Average progress of classically correlated automata, one entry per round.
    pub classical: Vec<f64>,
    /// Average progress of quantum correlated automata, one entry per round.
    pub quantum: Vec<f64>,
    /// Final values of every trial, in order.
    pub trials: Vec<TrialOutcome>,
}

impl ComparisonReport {
    /// Number of rounds per trial.
    pub fn steps(&self) -> usize {
        self.classical.len()
    }

    /// Mean over trials of the final classical and quantum values.
    pub fn final_averages(&self) -> Option<(f64, f64)> {
        Some((*self.classical.last()?, *self.quantum.last()?))
    }
}

/// Plays `game` once with a fresh correlation of `kind`.
pub fn play_once(
    game: &Game,
    kind: CorrelationKind,
    config: &ExperimentConfig,
    rng: &mut dyn RngCore,
) -> Result<Vec<f64>> {
    config.validate()?;
    play(game, kind.build(config.register_size)?, &config.play_settings(), rng)
}

/// Runs `config.tests_count` trials. Every trial plays `game` with fresh
/// classically correlated automata, then with fresh quantum correlated
/// automata; `observer` sees each trial's outcome as soon as it is known.
pub fn run_comparison<F>(
    game: &Game,
    config: &ExperimentConfig,
    mut observer: F,
) -> Result<ComparisonReport>
where
    F: FnMut(&TrialOutcome),
{
    config.validate()?;
    let settings = config.play_settings();
    let mut rng = config.rng();
    tracing::info!(
        tests = config.tests_count,
        iterations = config.iterations,
        memory_size = config.memory_size,
        learning_rate = config.learning_rate,
        adversarial = config.adversarial,
        "Starting classical/quantum comparison"
    );

    // Sized by the plays themselves, never by the configured counts.
    let mut classical_sums = Vec::new();
    let mut quantum_sums = Vec::new();
    let mut trials = Vec::new();

    for trial in 1..=config.tests_count {
        let classical = play(
            game,
            CorrelationKind::Classical.build(config.register_size)?,
            &settings,
            &mut rng,
        )?;
        let quantum = play(
            game,
            CorrelationKind::Quantum.build(config.register_size)?,
            &settings,
            &mut rng,
        )?;
        accumulate(&mut classical_sums, &classical);
        accumulate(&mut quantum_sums, &quantum);

        let outcome = TrialOutcome {
            trial,
            classical: classical.last().copied().unwrap_or_default(),
            quantum: quantum.last().copied().unwrap_or_default(),
        };
        tracing::debug!(
            trial,
            classical = outcome.classical,
            quantum = outcome.quantum,
            "Trial finished"
        );
        observer(&outcome);
        trials.push(outcome);
    }

    let tests = config.tests_count as f64;
    let report = ComparisonReport {
        classical: classical_sums.into_iter().map(|s| s / tests).collect(),
        quantum: quantum_sums.into_iter().map(|s| s / tests).collect(),
        trials,
    };
    if let Some((classical, quantum)) = report.final_averages() {
        tracing::info!(classical, quantum, "Comparison finished");
    }
    Ok(report)
}

fn accumulate(sums: &mut Vec<f64>, progress: &[f64]) {
    if sums.len() < progress.len() {
        sums.resize(progress.len(), 0.0);
    }
    for (sum, value) in sums.iter_mut().zip(progress) {
        *sum += value;
    }
}
