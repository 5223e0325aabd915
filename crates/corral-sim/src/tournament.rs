//! Repeated play of a game between learning automata.

use crate::automaton::{AutomatonConfig, LearningAutomaton};
use crate::correlation::Correlation;
use crate::{Error, Result};
use corral_core::Game;
use rand::{Rng, RngCore};

/// Probability with which an adversarial dealer still deals types at random.
const ADVERSARY_SLACK: f64 = 0.01;

/// Settings of one repeated play.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaySettings {
    /// Settings shared by every automaton.
    pub automaton: AutomatonConfig,
    /// Number of rounds.
    pub iterations: usize,
    /// Deal the type profile that has been least beneficial so far.
    pub adversarial: bool,
}

impl Default for PlaySettings {
    fn default() -> Self {
        Self {
            automaton: AutomatonConfig::default(),
            iterations: 100,
            adversarial: false,
        }
    }
}

impl PlaySettings {
    /// Checks that the settings describe a playable run.
    pub fn validate(&self) -> Result<()> {
        self.automaton.validate()?;
        if self.iterations == 0 {
            return Err(Error::validation_field("iterations", "must be at least 1"));
        }
        Ok(())
    }
}

/// Accumulated payoff of one type profile.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TypeStats {
    /// Sum over plays of the players' total payoff.
    pub total_payoff: f64,
    /// Number of plays with this profile.
    pub plays: u64,
}

impl TypeStats {
    /// Mean total payoff, `None` if never played.
    pub fn average(&self) -> Option<f64> {
        (self.plays > 0).then(|| self.total_payoff / self.plays as f64)
    }
}

/// A game played repeatedly by one automaton per (player, type), all
/// sharing one correlation.
pub struct Tournament<'g> {
    game: &'g Game,
    correlation: Box<dyn Correlation>,
    automata: Vec<Vec<LearningAutomaton>>,
    type_profiles: Vec<Vec<usize>>,
    type_stats: Vec<TypeStats>,
    settings: PlaySettings,
    progress: Vec<f64>,
}

impl<'g> Tournament<'g> {
    /// Creates the automata and registers them with `correlation`.
    pub fn new(
        game: &'g Game,
        mut correlation: Box<dyn Correlation>,
        settings: PlaySettings,
    ) -> Result<Self> {
        settings.validate()?;
        let mut automata = Vec::with_capacity(game.player_count());
        for (types, choices) in game.type_counts().iter().zip(game.choice_counts()) {
            let mut player = Vec::with_capacity(*types);
            for _ in 0..*types {
                player.push(LearningAutomaton::new(
                    correlation.as_mut(),
                    *choices,
                    settings.automaton.clone(),
                )?);
            }
            automata.push(player);
        }
        let type_profiles = game.type_profiles();
        tracing::debug!(
            correlation = %correlation.kind(),
            agents = correlation.agent_count(),
            profiles = type_profiles.len(),
            "Created tournament"
        );
        Ok(Self {
            game,
            correlation,
            automata,
            type_stats: vec![TypeStats::default(); type_profiles.len()],
            type_profiles,
            settings,
            progress: Vec::new(),
        })
    }

    /// Automata of each player, indexed by type.
    pub fn automata(&self) -> &[Vec<LearningAutomaton>] {
        &self.automata
    }

    /// Type profiles in lexicographic order, paired with their statistics.
    pub fn type_stats(&self) -> impl Iterator<Item = (&[usize], &TypeStats)> {
        self.type_profiles
            .iter()
            .map(Vec::as_slice)
            .zip(self.type_stats.iter())
    }

    /// Mean payoff over all automata after each round played so far.
    pub fn progress(&self) -> &[f64] {
        &self.progress
    }

    /// Hands the correlation back.
    pub fn into_correlation(self) -> Box<dyn Correlation> {
        self.correlation
    }

    /// Plays one round and returns the mean payoff over all automata.
    pub fn step(&mut self, rng: &mut dyn RngCore) -> Result<f64> {
        self.correlation.prepare(rng)?;
        let profile = self.deal_types(rng);
        let types = self.type_profiles[profile].clone();

        for (player, t) in types.iter().enumerate() {
            self.automata[player][*t].operate(self.correlation.as_mut(), rng)?;
        }
        self.correlation.observe(rng)?;

        let mut mixed = Vec::with_capacity(types.len());
        for (player, t) in types.iter().enumerate() {
            mixed.push(self.automata[player][*t].choose(self.correlation.as_ref(), rng)?);
        }

        let payoffs = self.game.expected_payoffs(&types, &mixed)?;
        for ((player, t), payoff) in types.iter().enumerate().zip(&payoffs) {
            self.automata[player][*t].remember(*payoff)?;
        }

        let stats = &mut self.type_stats[profile];
        stats.total_payoff += payoffs.iter().sum::<f64>();
        stats.plays += 1;

        let (sum, count) = self
            .automata
            .iter()
            .flatten()
            .fold((0.0, 0usize), |(sum, count), a| (sum + a.mean_payoff(), count + 1));
        let mean = sum / count as f64;
        self.progress.push(mean);
        Ok(mean)
    }

    /// Plays the configured number of rounds; returns the progress of this run.
    pub fn run(&mut self, rng: &mut dyn RngCore) -> Result<Vec<f64>> {
        let start = self.progress.len();
        for _ in 0..self.settings.iterations {
            self.step(rng)?;
        }
        tracing::debug!(
            correlation = %self.correlation.kind(),
            iterations = self.settings.iterations,
            final_mean = self.progress.last().copied().unwrap_or_default(),
            "Tournament finished"
        );
        Ok(self.progress[start..].to_vec())
    }

    /// Index into `type_profiles` of the profile to play next.
    fn deal_types(&self, rng: &mut dyn RngCore) -> usize {
        if self.settings.adversarial && rng.r#gen::<f64>() > ADVERSARY_SLACK {
            return self.least_beneficial_profile();
        }
        // Lexicographic profile order makes the mixed-radix index the profile index.
        self.game
            .type_counts()
            .iter()
            .fold(0, |index, count| index * count + rng.gen_range(0..*count))
    }

    /// Index of the profile with the lowest average payoff so far. Unplayed
    /// profiles come first; ties go to the lexicographically first profile.
    fn least_beneficial_profile(&self) -> usize {
        let mut worst = 0;
        let mut worst_value = f64::INFINITY;
        for (i, stats) in self.type_stats.iter().enumerate() {
            let value = stats.average().unwrap_or(f64::NEG_INFINITY);
            if value < worst_value {
                worst = i;
                worst_value = value;
            }
        }
        worst
    }
}

/// Plays `settings.iterations` rounds of `game` between fresh automata
/// sharing `correlation`; returns the mean payoff over all automata after
/// each round.
pub fn play(
    game: &Game,
    correlation: Box<dyn Correlation>,
    settings: &PlaySettings,
    rng: &mut dyn RngCore,
) -> Result<Vec<f64>> {
    Tournament::new(game, correlation, settings.clone())?.run(rng)
}
