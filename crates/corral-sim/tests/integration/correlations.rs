//! Integration tests for the correlation protocol.

use corral_sim::{Correlation, CorrelationKind, Error, QuantumCorrelation};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn test_protocol_order_is_enforced_for_every_kind() {
    let mut rng = StdRng::seed_from_u64(1);
    for kind in CorrelationKind::ALL {
        let mut correlation = kind.build(2).unwrap();
        let agent = correlation.register_agent();
        let parameters = vec![0.0; correlation.local_operation_parameters_count()];

        let err = correlation.local_operation(agent, &parameters).unwrap_err();
        assert!(err.is_protocol_error(), "{kind}: {err}");
        assert!(correlation.observe(&mut rng).unwrap_err().is_protocol_error());

        correlation.prepare(&mut rng).unwrap();
        correlation.local_operation(agent, &parameters).unwrap();
        assert!(correlation.observable(agent).is_err());
        correlation.observe(&mut rng).unwrap();
        assert!(correlation.observable(agent).unwrap() < 2);
        assert!(correlation.observe(&mut rng).is_err());
    }
}

#[test]
fn test_registering_invalidates_a_play() {
    let mut rng = StdRng::seed_from_u64(2);
    for kind in CorrelationKind::ALL {
        let mut correlation = kind.build(2).unwrap();
        let first = correlation.register_agent();
        correlation.prepare(&mut rng).unwrap();
        let second = correlation.register_agent();
        assert_eq!(correlation.agent_count(), 2);
        assert!(correlation.observe(&mut rng).is_err());
        correlation.prepare(&mut rng).unwrap();
        correlation.observe(&mut rng).unwrap();
        assert_eq!(
            correlation.observable(first).unwrap(),
            correlation.observable(second).unwrap()
        );
    }
}

#[test]
fn test_parameter_counts() {
    let classical = CorrelationKind::Classical.build(3).unwrap();
    let quantum = CorrelationKind::Quantum.build(3).unwrap();
    assert_eq!(classical.local_operation_parameters_count(), 3);
    assert_eq!(quantum.local_operation_parameters_count(), 9);
}

#[test]
fn test_larger_quantum_register_stays_normalised() {
    let mut correlation = QuantumCorrelation::new(3).unwrap();
    let a = correlation.register_agent();
    let b = correlation.register_agent();
    let mut rng = StdRng::seed_from_u64(4);
    correlation.prepare(&mut rng).unwrap();
    correlation
        .local_operation(a, &[0.3, 0.1, -0.2, 0.7, 0.4, -0.6, 0.2, 0.0, 0.5])
        .unwrap();
    correlation
        .local_operation(b, &[-0.1, 0.9, 0.3, 0.3, 0.8, -0.4, 0.1, 0.2, -0.3])
        .unwrap();
    let total: f64 = correlation.outcome_probabilities().unwrap().iter().sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn test_quantum_parameters_must_form_a_square() {
    let mut correlation = QuantumCorrelation::new(2).unwrap();
    let agent = correlation.register_agent();
    let mut rng = StdRng::seed_from_u64(0);
    correlation.prepare(&mut rng).unwrap();
    assert!(matches!(
        correlation.local_operation(agent, &[0.0; 3]),
        Err(Error::ParameterCount { expected: 4, actual: 3, .. })
    ));
}
