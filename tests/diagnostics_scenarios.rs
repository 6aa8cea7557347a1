use primesearch::config::FitnessConfig;
use primesearch::data::TargetSequence;
use primesearch::engines::evaluation::{evaluate, DiagnosticsEvaluator, EvaluationFailure};
use primesearch::engines::generation::{Formula, Polynomial};
use primesearch::engines::metrics::MetricsEngine;
use primesearch::types::{BinaryOp, Expression, UnaryOp};

fn first_primes() -> TargetSequence {
    TargetSequence::new(vec![2, 3, 5, 7, 11]).unwrap()
}

#[test]
fn test_two_x_scores() {
    let evaluator = DiagnosticsEvaluator::new(FitnessConfig::default());
    let formula = Formula::from_polynomial(Polynomial::linear(2, 0));
    let d = evaluator.evaluate(&formula.root, &first_primes());

    assert_eq!(d.outputs, vec![2.0, 4.0, 6.0, 8.0, 10.0]);
    assert_eq!(d.strict_hits, 1);
    // Every position is within 2 of its prime: |8 - 7| and |10 - 11| count too
    assert_eq!(d.near_hits, 5);
    assert_eq!(d.negative_penalty, 0.0);
    assert_eq!(d.evaluation_failures, 0);
}

#[test]
fn test_tighter_threshold_excludes_off_by_one() {
    let config = FitnessConfig {
        near_threshold: 1.0,
        ..Default::default()
    };
    let formula = Formula::from_polynomial(Polynomial::linear(2, 0));
    let d = DiagnosticsEvaluator::new(config).evaluate(&formula.root, &first_primes());
    assert_eq!(d.near_hits, 1);
}

#[test]
fn test_domain_error_every_position() {
    let target = TargetSequence::new(vec![2, 3, 5, 7]).unwrap();
    let expr = Expression::unary(
        UnaryOp::Log,
        Expression::binary(BinaryOp::Sub, Expression::Variable, Expression::constant(5.0)),
    );

    for n in 1..=4 {
        assert!(evaluate(&expr, n).is_err());
    }

    let d = DiagnosticsEvaluator::new(FitnessConfig::default()).evaluate(&expr, &target);
    assert_eq!(d.evaluation_failures, 4);
    assert!(d.failure_penalty > 0.0);
    assert_eq!(d.strict_hits, 0);
    assert!(d.combined_fitness.is_finite());
}

#[test]
fn test_sentinel_output_never_counts_as_a_hit() {
    let target = TargetSequence::new(vec![2, 3, 5, 7]).unwrap();
    let expr = Expression::unary(
        UnaryOp::Log,
        Expression::binary(BinaryOp::Sub, Expression::Variable, Expression::constant(5.0)),
    );

    // The sentinel lands exactly on the first prime
    let config = FitnessConfig {
        sentinel_output: 2.0,
        near_threshold: 3.0,
        ..Default::default()
    };
    let d = DiagnosticsEvaluator::new(config).evaluate(&expr, &target);
    assert_eq!(d.evaluation_failures, 4);
    assert_eq!(d.outputs, vec![2.0; 4]);
    assert_eq!(d.strict_hits, 0);
    assert_eq!(d.near_hits, 0);

    let negative_sentinel = FitnessConfig {
        sentinel_output: -1.0,
        ..Default::default()
    };
    let d = DiagnosticsEvaluator::new(negative_sentinel).evaluate(&expr, &target);
    assert_eq!(d.negative_penalty, 0.0);
    assert!(d.failure_penalty > 0.0);
}

#[test]
fn test_runaway_power_fails_instead_of_overflowing() {
    let expr = Expression::binary(
        BinaryOp::Pow,
        Expression::constant(10.0),
        Expression::binary(BinaryOp::Pow, Expression::Variable, Expression::constant(3.0)),
    );
    assert!(evaluate(&expr, 1).is_ok());
    assert!(matches!(evaluate(&expr, 5), Err(EvaluationFailure::Overflow)));
}

#[test]
fn test_exact_formula_outranks_near_miss() {
    let target = TargetSequence::new(vec![3, 5, 7, 9, 11]).unwrap();
    let evaluator = DiagnosticsEvaluator::new(FitnessConfig::default());

    let exact = evaluator.evaluate(&Formula::from_polynomial(Polynomial::linear(2, 1)).root, &target);
    let near = evaluator.evaluate(&Formula::from_polynomial(Polynomial::linear(2, 2)).root, &target);
    let far = evaluator.evaluate(&Formula::from_polynomial(Polynomial::linear(7, -40)).root, &target);

    assert_eq!(exact.strict_hits, 5);
    assert!(exact.combined_fitness > near.combined_fitness);
    assert!(near.combined_fitness > far.combined_fitness);
}

#[test]
fn test_metrics_engine_exposes_objectives() {
    let formula = Formula::from_polynomial(Polynomial::linear(2, 0));
    let d = DiagnosticsEvaluator::new(FitnessConfig::default()).evaluate(&formula.root, &first_primes());
    let metrics = MetricsEngine::calculate_all(&d);

    assert_eq!(metrics.get("strict_hits"), Some(&1.0));
    assert_eq!(metrics.get("complexity"), Some(&3.0));
    assert!(metrics.contains_key("combined_fitness"));
    assert!(metrics.contains_key("novelty"));
}
