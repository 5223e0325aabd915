//! Integration tests for games read from payoff trees.

use corral_core::{Game, PayoffTree};
use corral_sim::{CorrelationKind, LearningAutomaton, Tournament, play};
use serde::Deserialize;

use crate::common::{TestHarness, coordination_toml};

#[derive(Deserialize)]
struct GameFile {
    payoffs: PayoffTree,
}

fn coordination_game() -> Game {
    let file: GameFile = toml::from_str(coordination_toml()).unwrap();
    Game::from_tree(&file.payoffs).unwrap()
}

#[test]
fn test_game_without_types_has_one_automaton_per_player() {
    let game = coordination_game();
    assert!(!game.is_bayesian());
    let harness = TestHarness::new(3, 10);
    let correlation = CorrelationKind::Classical.build(2).unwrap();
    let tournament = Tournament::new(&game, correlation, harness.settings).unwrap();
    assert_eq!(tournament.automata().len(), 2);
    assert!(tournament.automata().iter().all(|types| types.len() == 1));
}

#[test]
fn test_coordination_payoffs_stay_in_range() {
    let game = coordination_game();
    for kind in CorrelationKind::ALL {
        let mut harness = TestHarness::new(5, 80);
        let correlation = kind.build(2).unwrap();
        let progress = play(&game, correlation, &harness.settings, &mut harness.rng).unwrap();
        assert_eq!(progress.len(), 80);
        assert!(progress.iter().all(|p| (0.0..=1.0).contains(p)));
    }
}

#[test]
fn test_three_player_game_from_fn() {
    // Majority game: each player is paid 1 when it sides with the majority.
    let game = Game::from_fn(&[1, 1, 1], &[2, 2, 2], |_, choices| {
        let ones = choices.iter().filter(|c| **c == 1).count();
        let majority = usize::from(ones >= 2);
        choices.iter().map(|c| if *c == majority { 1.0 } else { 0.0 }).collect()
    })
    .unwrap();
    let mut harness = TestHarness::new(13, 30);
    let correlation = CorrelationKind::Quantum.build(2).unwrap();
    let mut tournament = Tournament::new(&game, correlation, harness.settings.clone()).unwrap();
    tournament.run(&mut harness.rng).unwrap();
    let played: Vec<u64> = tournament
        .automata()
        .iter()
        .flatten()
        .map(LearningAutomaton::total_played)
        .collect();
    assert_eq!(played, vec![30, 30, 30]);
}
