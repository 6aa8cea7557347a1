use crate::engines::evaluation::Diagnostics;

/// Number of entries in `diagnostics_features`
pub const DIAGNOSTICS_FEATURES: usize = 6;

/// Input vector for guidance models:
/// hit rate, near-hit rate, closeness, non-integer penalty, mean signed error, complexity
pub fn diagnostics_features(diagnostics: &Diagnostics) -> [f64; DIAGNOSTICS_FEATURES] {
    let length = diagnostics.sequence_length().max(1) as f64;
    [
        diagnostics.strict_hits as f64 / length,
        diagnostics.near_hits as f64 / length,
        diagnostics.closeness,
        diagnostics.non_integer_penalty,
        diagnostics.mean_error,
        diagnostics.complexity as f64,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FitnessConfig;
    use crate::data::TargetSequence;
    use crate::engines::evaluation::DiagnosticsEvaluator;
    use crate::types::{BinaryOp, Expression};

    #[test]
    fn test_rates_are_per_position() {
        let target = TargetSequence::new(vec![2, 3, 5, 7]).unwrap();
        let expr = Expression::binary(BinaryOp::Mul, Expression::Constant(2.0), Expression::Variable);
        let d = DiagnosticsEvaluator::new(FitnessConfig::default()).evaluate(&expr, &target);

        let features = diagnostics_features(&d);
        assert_eq!(features[0], 0.25);
        assert_eq!(features[1], 1.0);
        assert_eq!(features[4], -0.75);
        assert_eq!(features[5], 3.0);
    }
}
