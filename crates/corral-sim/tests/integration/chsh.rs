//! Integration tests for the CHSH game.

use corral_core::Game;
use corral_sim::{
    ClassicalCorrelation, Correlation, CorrelationKind, QuantumCorrelation, Tournament,
    run_comparison, save_averages, two_agent_distribution,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::common::{TestHarness, small_experiment};

/// Reflection `[[cos πt, sin πt], [sin πt, -cos πt]]` as unitary parameters.
fn reflection(t: f64) -> [f64; 4] {
    [t, 0.0, 0.0, 0.0]
}

/// Expected CHSH payoff when each player's choice equals its observable.
fn chsh_value(mut joint: impl FnMut(usize, usize) -> [[f64; 2]; 2]) -> f64 {
    let game = Game::chsh();
    let mut value = 0.0;
    for types in game.type_profiles() {
        let p = joint(types[0], types[1]);
        for a in 0..2 {
            for b in 0..2 {
                value += 0.25 * p[a][b] * game.payoffs(&types, &[a, b]).unwrap()[0];
            }
        }
    }
    value
}

#[test]
fn test_entangled_strategy_reaches_tsirelson_bound() {
    let first = [reflection(0.0), reflection(0.25)];
    let second = [reflection(0.125), reflection(-0.125)];
    let mut rng = StdRng::seed_from_u64(0);

    let value = chsh_value(|t1, t2| {
        let mut correlation = QuantumCorrelation::new(2).unwrap();
        let a = correlation.register_agent();
        let b = correlation.register_agent();
        correlation.prepare(&mut rng).unwrap();
        correlation.local_operation(a, &first[t1]).unwrap();
        correlation.local_operation(b, &second[t2]).unwrap();
        let p = correlation.outcome_probabilities().unwrap();
        [[p[0], p[1]], [p[2], p[3]]]
    });

    assert!((value - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9, "value {value}");
}

#[test]
fn test_classical_strategies_respect_bell_bound() {
    let weights = [[0.1, 0.9], [0.3, 0.7], [0.5, 0.5], [0.7, 0.3], [0.9, 0.1]];
    for a0 in weights {
        for a1 in weights {
            for b0 in weights {
                for b1 in weights {
                    let first = [a0, a1];
                    let second = [b0, b1];
                    let value =
                        chsh_value(|t1, t2| two_agent_distribution(first[t1], second[t2]).unwrap());
                    assert!(value <= 0.5 + 1e-9, "{first:?} {second:?}: {value}");
                }
            }
        }
    }
}

#[test]
fn test_sampled_classical_play_matches_exact_distribution() {
    let mut correlation = ClassicalCorrelation::new(2).unwrap();
    let a = correlation.register_agent();
    let b = correlation.register_agent();
    let mut rng = StdRng::seed_from_u64(11);
    let trials = 20_000;
    let mut agree = 0usize;
    for _ in 0..trials {
        correlation.prepare(&mut rng).unwrap();
        correlation.local_operation(a, &[0.8, 0.2]).unwrap();
        correlation.local_operation(b, &[0.2, 0.8]).unwrap();
        correlation.observe(&mut rng).unwrap();
        if correlation.observable(a).unwrap() == correlation.observable(b).unwrap() {
            agree += 1;
        }
    }
    let exact = two_agent_distribution([0.8, 0.2], [0.2, 0.8]).unwrap();
    let expected = exact[0][0] + exact[1][1];
    assert!((agree as f64 / trials as f64 - expected).abs() < 0.02);
}

#[test]
fn test_tournament_on_chsh_with_both_correlations() {
    let game = Game::chsh();
    for kind in CorrelationKind::ALL {
        let mut harness = TestHarness::new(21, 60);
        let correlation = kind.build(2).unwrap();
        let mut tournament = Tournament::new(&game, correlation, harness.settings.clone()).unwrap();
        let progress = tournament.run(&mut harness.rng).unwrap();
        assert_eq!(progress.len(), 60);
        assert!(progress.iter().all(|p| (-1.0..=1.0).contains(p)));
        assert_eq!(tournament.type_stats().count(), 4);
        for automaton in tournament.automata().iter().flatten() {
            let choice_weights = automaton.strategy().len() - automaton.local_operation().len();
            assert_eq!(choice_weights, 4);
            assert!(automaton.memory().len() <= 20);
        }
    }
}

#[test]
fn test_adversarial_tournament_plays_every_profile() {
    let game = Game::chsh();
    let mut harness = TestHarness::new(8, 40).adversarial();
    let correlation = CorrelationKind::Quantum.build(2).unwrap();
    let mut tournament = Tournament::new(&game, correlation, harness.settings.clone()).unwrap();
    tournament.run(&mut harness.rng).unwrap();
    assert!(tournament.type_stats().all(|(_, stats)| stats.plays > 0));
}

#[test]
fn test_comparison_report_round_trip_through_file() {
    let game = Game::chsh();
    let config = small_experiment(99);
    let report = run_comparison(&game, &config, |_| {}).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(corral_sim::default_report_name(config.tests_count));
    save_averages(&path, &report).unwrap();

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(&path)
        .unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.len(), 3);
    assert_eq!(&headers[0], "Step");
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), config.iterations);
    assert_eq!(&rows[0][0], "1");
    let last_quantum: f64 = rows[config.iterations - 1][2].parse().unwrap();
    assert_eq!(last_quantum, report.quantum[config.iterations - 1]);
}
