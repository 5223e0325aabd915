//! Common test utilities and harness for corral integration tests.

use corral_sim::{AutomatonConfig, ExperimentConfig, PlaySettings};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Test harness holding a seeded generator and small run settings.
pub struct TestHarness {
    /// Seeded generator shared by one test
    pub rng: StdRng,
    /// Settings for short plays
    pub settings: PlaySettings,
}

impl TestHarness {
    /// Creates a harness seeded with `seed` that plays `iterations` rounds.
    pub fn new(seed: u64, iterations: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            settings: PlaySettings {
                automaton: AutomatonConfig {
                    memory_size: 20,
                    learning_rate: 0.01,
                },
                iterations,
                adversarial: false,
            },
        }
    }

    /// Switches to adversarial dealing of types.
    pub fn adversarial(mut self) -> Self {
        self.settings.adversarial = true;
        self
    }
}

/// A short, seeded comparison experiment.
pub fn small_experiment(seed: u64) -> ExperimentConfig {
    ExperimentConfig {
        iterations: 30,
        tests_count: 2,
        seed: Some(seed),
        ..ExperimentConfig::default()
    }
}

/// A two-player game without types where both players are paid 1 for
/// matching choices and nothing otherwise.
pub fn coordination_toml() -> &'static str {
    r#"
payoffs = [
    [[1.0, 1.0], [0.0, 0.0]],
    [[0.0, 0.0], [1.0, 1.0]],
]
"#
}
