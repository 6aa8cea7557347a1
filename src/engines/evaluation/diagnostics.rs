use crate::config::FitnessConfig;
use crate::data::TargetSequence;
use crate::engines::evaluation::expression::{evaluate, EvaluationFailure};
use crate::engines::metrics::{AccuracyMetrics, ClosenessForm, ShapeMetrics};
use crate::types::Expression;
use serde::{Deserialize, Serialize};

/// Scale of the complexity squashing `c / (c + COMPLEXITY_SCALE)`
pub const COMPLEXITY_SCALE: f64 = 10.0;

/// Combined fitness reported if the weighted sum is ever non-finite
pub const FITNESS_FLOOR: f64 = -1e9;

/// Scores of one formula against the target sequence.
///
/// Every field is finite. Failed positions hold the configured sentinel in
/// `outputs` and are flagged in `failed`, so a failure is never confused with
/// a legitimate zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub outputs: Vec<f64>,
    pub failed: Vec<bool>,
    pub evaluation_failures: usize,
    pub strict_hits: usize,
    pub near_hits: usize,
    pub closeness: f64,
    /// Mean distance of outputs from the nearest integer, in [0, 0.5]
    pub non_integer_penalty: f64,
    pub negative_penalty: f64,
    pub failure_penalty: f64,
    pub variance: f64,
    pub local_novelty: f64,
    /// Behavioural novelty against the rest of the population
    pub novelty: f64,
    pub complexity: usize,
    pub mean_error: f64,
    pub combined_fitness: f64,
}

impl Diagnostics {
    pub fn sequence_length(&self) -> usize {
        self.outputs.len()
    }
}

/// Turns an expression into a `Diagnostics` record. Never fails.
#[derive(Debug, Clone)]
pub struct DiagnosticsEvaluator {
    config: FitnessConfig,
}

impl DiagnosticsEvaluator {
    pub fn new(config: FitnessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FitnessConfig {
        &self.config
    }

    pub fn evaluate(&self, expr: &Expression, target: &TargetSequence) -> Diagnostics {
        let mut outputs = Vec::with_capacity(target.len());
        let mut failed = Vec::with_capacity(target.len());

        for (position, _) in target.positions() {
            match evaluate(expr, position) {
                Ok(value) => {
                    outputs.push(value);
                    failed.push(false);
                }
                Err(failure) => {
                    log_failure(expr, position, failure);
                    outputs.push(self.config.sentinel_output);
                    failed.push(true);
                }
            }
        }

        let targets = target.values();
        let evaluation_failures = failed.iter().filter(|&&f| f).count();
        let negatives = AccuracyMetrics::negative_count(&outputs, &failed);

        let mut diagnostics = Diagnostics {
            strict_hits: AccuracyMetrics::strict_hits(&outputs, targets, &failed, self.config.hit_policy),
            near_hits: AccuracyMetrics::near_hits(&outputs, targets, &failed, self.config.near_threshold),
            closeness: finite_or(
                AccuracyMetrics::closeness(&outputs, targets, self.config.closeness_form),
                FITNESS_FLOOR,
            ),
            non_integer_penalty: AccuracyMetrics::mean_fractional_distance(&outputs),
            negative_penalty: negatives as f64 * self.config.negative_penalty,
            failure_penalty: evaluation_failures as f64 * self.config.failure_penalty,
            variance: finite_or(ShapeMetrics::variance(&outputs), 0.0),
            local_novelty: ShapeMetrics::local_novelty(&outputs),
            novelty: 0.0,
            complexity: expr.size(),
            mean_error: AccuracyMetrics::mean_signed_error(&outputs, targets),
            combined_fitness: 0.0,
            evaluation_failures,
            outputs,
            failed,
        };
        diagnostics.combined_fitness = self.combined_fitness(&diagnostics, target);
        diagnostics
    }

    /// Attach a behavioural novelty score and recompute the combined fitness
    pub fn apply_novelty(&self, diagnostics: &mut Diagnostics, novelty: f64, target: &TargetSequence) {
        diagnostics.novelty = finite_or(novelty, 0.0);
        diagnostics.combined_fitness = self.combined_fitness(diagnostics, target);
    }

    /// Weighted sum of the normalised terms.
    ///
    /// Each term is brought into a bounded range first so sequence length or
    /// output magnitude cannot let one term swamp the rest.
    pub fn combined_fitness(&self, d: &Diagnostics, target: &TargetSequence) -> f64 {
        let w = &self.config.weights;
        let length = target.len().max(1) as f64;

        let strict = d.strict_hits as f64 / length;
        let closeness = match self.config.closeness_form {
            ClosenessForm::LogMse => 1.0 / (1.0 - d.closeness.min(0.0)),
            ClosenessForm::InverseAbsError => d.closeness,
        };
        let scaled_novelty = d.novelty / (length.sqrt() * (target.max_value().max(1) as f64));
        let novelty = scaled_novelty / (1.0 + scaled_novelty);
        let max_abs = ShapeMetrics::max_abs(&d.outputs);
        let local_novelty = d.local_novelty / (1.0 + max_abs);
        let variance = d.variance / (max_abs * max_abs + 1e-6);
        let non_integer = 2.0 * d.non_integer_penalty;
        let negative = d.negative_penalty / length;
        let failure = d.failure_penalty / length;
        let complexity = d.complexity as f64 / (d.complexity as f64 + COMPLEXITY_SCALE);

        let combined = w.weight_strict_hits * strict
            + w.weight_closeness * closeness
            + w.weight_novelty * novelty
            + w.weight_local_novelty * local_novelty
            + w.weight_variance * variance
            - w.weight_non_integer * non_integer
            - w.weight_negative * negative
            - w.weight_failure * failure
            - w.weight_complexity * complexity;

        finite_or(combined, FITNESS_FLOOR)
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn log_failure(expr: &Expression, position: i64, failure: EvaluationFailure) {
    log::trace!("{} failed at x = {}: {}", expr, position, failure);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BinaryOp, UnaryOp};

    fn evaluator() -> DiagnosticsEvaluator {
        DiagnosticsEvaluator::new(FitnessConfig::default())
    }

    #[test]
    fn test_two_x_against_first_primes() {
        let target = TargetSequence::new(vec![2, 3, 5, 7, 11]).unwrap();
        let expr = Expression::binary(BinaryOp::Mul, Expression::Constant(2.0), Expression::Variable);
        let d = evaluator().evaluate(&expr, &target);

        assert_eq!(d.outputs, vec![2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(d.strict_hits, 1);
        assert_eq!(d.negative_penalty, 0.0);
        assert_eq!(d.evaluation_failures, 0);
        assert_eq!(d.complexity, 3);
        assert!(d.combined_fitness.is_finite());
    }

    #[test]
    fn test_failures_are_flagged_and_penalised() {
        let target = TargetSequence::new(vec![2, 3, 5, 7]).unwrap();
        let expr = Expression::unary(
            UnaryOp::Log,
            Expression::binary(BinaryOp::Sub, Expression::Variable, Expression::Constant(5.0)),
        );
        let d = evaluator().evaluate(&expr, &target);

        assert_eq!(d.evaluation_failures, 4);
        assert!(d.failed.iter().all(|&f| f));
        assert!(d.failure_penalty > 0.0);
        assert_eq!(d.strict_hits, 0);
        assert!(d.combined_fitness.is_finite());
    }

    #[test]
    fn test_exact_formula_beats_constant() {
        let target = TargetSequence::new(vec![3, 5, 7, 9]).unwrap();
        let exact = Expression::linear(2.0, 1.0);
        let constant = Expression::Constant(6.0);
        let e = evaluator();
        assert!(e.evaluate(&exact, &target).combined_fitness > e.evaluate(&constant, &target).combined_fitness);
    }

    #[test]
    fn test_negative_outputs_are_penalised() {
        let target = TargetSequence::new(vec![2, 3, 5]).unwrap();
        let expr = Expression::unary(UnaryOp::Negate, Expression::Variable);
        let d = evaluator().evaluate(&expr, &target);
        assert!((d.negative_penalty - 3.0 * 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_novelty_raises_combined_fitness() {
        let target = TargetSequence::new(vec![2, 3, 5, 7, 11]).unwrap();
        let e = evaluator();
        let mut d = e.evaluate(&Expression::Variable, &target);
        let before = d.combined_fitness;
        e.apply_novelty(&mut d, 20.0, &target);
        assert_eq!(d.novelty, 20.0);
        assert!(d.combined_fitness > before);
    }
}
