//! Tests for error handling and coverage.

use corral_sim::{
    AutomatonConfig, CorrelationKind, Error, ExperimentConfig, LearningAutomaton, PlaySettings,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn test_protocol_error_creation() {
    let err = Error::protocol("observe() before prepare()");
    assert_eq!(err.to_string(), "Protocol violation: observe() before prepare()");
    assert!(err.is_protocol_error());
}

#[test]
fn test_validation_error() {
    let err = Error::validation("bad settings");
    assert_eq!(err.to_string(), "Validation error: bad settings");
    assert!(!err.is_protocol_error());
}

#[test]
fn test_state_too_large_display() {
    let err = Error::StateTooLarge {
        agents: 40,
        register_size: 2,
    };
    assert!(err.to_string().contains("40 agents"));
    assert!(!err.is_protocol_error());
}

#[test]
fn test_io_error_conversion() {
    let err: Error = std::io::Error::other("disk full").into();
    assert!(matches!(err, Error::Io(_)));
    assert!(err.to_string().contains("disk full"));
}

#[test]
fn test_unknown_correlation_kind() {
    let err = "entangled".parse::<CorrelationKind>().unwrap_err();
    match &err {
        Error::Validation { field, message } => {
            assert_eq!(field, &Some("correlation".to_string()));
            assert!(message.contains("entangled"));
        }
        _ => unreachable!("Expected Validation error"),
    }
}

#[test]
fn test_invalid_automaton_config() {
    let mut correlation = CorrelationKind::Classical.build(2).unwrap();
    let config = AutomatonConfig {
        memory_size: 0,
        learning_rate: 0.01,
    };
    assert!(LearningAutomaton::new(correlation.as_mut(), 2, config).is_err());
    assert_eq!(correlation.agent_count(), 0);
}

#[test]
fn test_remember_before_choose_is_protocol_error() {
    let mut correlation = CorrelationKind::Quantum.build(2).unwrap();
    let mut automaton =
        LearningAutomaton::new(correlation.as_mut(), 2, AutomatonConfig::default()).unwrap();
    let err = automaton.remember(1.0).unwrap_err();
    assert!(err.is_protocol_error());

    let mut rng = StdRng::seed_from_u64(0);
    correlation.prepare(&mut rng).unwrap();
    automaton.operate(correlation.as_mut(), &mut rng).unwrap();
    correlation.observe(&mut rng).unwrap();
    automaton.choose(correlation.as_ref(), &mut rng).unwrap();
    automaton.remember(1.0).unwrap();
    assert!(automaton.remember(1.0).is_err());
}

#[test]
fn test_invalid_play_settings() {
    let settings = PlaySettings {
        iterations: 0,
        ..PlaySettings::default()
    };
    assert!(settings.validate().is_err());
}

#[test]
fn test_experiment_config_rejects_empty_register() {
    let config = ExperimentConfig {
        register_size: 0,
        ..ExperimentConfig::default()
    };
    let Err(Error::Validation { field, .. }) = config.validate() else {
        unreachable!("Expected Validation error variant");
    };
    assert_eq!(field.as_deref(), Some("register_size"));
}
