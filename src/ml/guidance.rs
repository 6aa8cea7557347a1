use crate::engines::evaluation::Diagnostics;
use crate::engines::generation::ast::Formula;
use crate::error::{PrimeSearchError, Result};
use crate::ml::features::{diagnostics_features, DIAGNOSTICS_FEATURES};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Integer deltas for the coefficients of a polynomial formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Adjustment {
    pub quadratic_delta: i64,
    pub linear_delta: i64,
    pub constant_delta: i64,
}

impl Adjustment {
    pub fn constant(delta: i64) -> Self {
        Self {
            constant_delta: delta,
            ..Default::default()
        }
    }

    /// `[quadratic, linear, constant]`
    pub fn deltas(&self) -> [i64; 3] {
        [self.quadratic_delta, self.linear_delta, self.constant_delta]
    }

    pub fn is_zero(&self) -> bool {
        self.deltas().iter().all(|&d| d == 0)
    }
}

/// Optional advisor consulted during mutation.
///
/// Only the mutation branch of breeding asks for a suggestion; children made
/// by crossover never reach the advisor.
///
/// `Ok(None)` means "no suggestion". The engine uses its default operator
/// for that, for errors, and for suggestions it cannot apply.
pub trait NeuralGuidance: Send + Sync {
    fn suggest(&self, formula: &Formula, diagnostics: &Diagnostics) -> Result<Option<Adjustment>>;
}

/// Weights of a one-hidden-layer network with a scalar output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorWeights {
    /// One row per hidden unit, each `DIAGNOSTICS_FEATURES` wide
    pub hidden_weights: Vec<Vec<f64>>,
    pub hidden_bias: Vec<f64>,
    pub output_weights: Vec<f64>,
    pub output_bias: f64,
}

/// Feed-forward predictor of a constant-term delta.
///
/// `input -> ReLU(W1·x + b1) -> w2·h + b2`, rounded to the nearest integer.
#[derive(Debug, Clone)]
pub struct DeltaPredictor {
    weights: PredictorWeights,
}

impl DeltaPredictor {
    pub fn new(weights: PredictorWeights) -> Result<Self> {
        let hidden = weights.hidden_weights.len();
        if hidden == 0 {
            return Err(PrimeSearchError::Guidance("predictor has no hidden units".to_string()));
        }
        if weights.hidden_bias.len() != hidden || weights.output_weights.len() != hidden {
            return Err(PrimeSearchError::Guidance(format!(
                "hidden layer size mismatch: {} rows, {} biases, {} output weights",
                hidden,
                weights.hidden_bias.len(),
                weights.output_weights.len()
            )));
        }
        if let Some(row) = weights.hidden_weights.iter().find(|row| row.len() != DIAGNOSTICS_FEATURES) {
            return Err(PrimeSearchError::Guidance(format!(
                "expected {} inputs per hidden unit, got {}",
                DIAGNOSTICS_FEATURES,
                row.len()
            )));
        }
        Ok(Self { weights })
    }

    /// Load weights from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let weights: PredictorWeights = serde_json::from_str(&contents)?;
        Self::new(weights)
    }

    pub fn predict(&self, input: &[f64]) -> Result<f64> {
        if input.len() != DIAGNOSTICS_FEATURES {
            return Err(PrimeSearchError::Guidance(format!(
                "expected {} features, got {}",
                DIAGNOSTICS_FEATURES,
                input.len()
            )));
        }

        let w = &self.weights;
        let output = w
            .hidden_weights
            .iter()
            .zip(&w.hidden_bias)
            .zip(&w.output_weights)
            .map(|((row, bias), out_w)| {
                let activation = row.iter().zip(input).map(|(a, b)| a * b).sum::<f64>() + bias;
                activation.max(0.0) * out_w
            })
            .sum::<f64>()
            + w.output_bias;

        if output.is_finite() {
            Ok(output)
        } else {
            Err(PrimeSearchError::Guidance("non-finite prediction".to_string()))
        }
    }
}

impl NeuralGuidance for DeltaPredictor {
    fn suggest(&self, formula: &Formula, diagnostics: &Diagnostics) -> Result<Option<Adjustment>> {
        if !formula.is_polynomial() {
            return Ok(None);
        }

        let delta = self.predict(&diagnostics_features(diagnostics))?.round();
        if delta.abs() > i64::MAX as f64 / 2.0 {
            return Err(PrimeSearchError::Guidance(format!("delta {} out of range", delta)));
        }

        let adjustment = Adjustment::constant(delta as i64);
        Ok((!adjustment.is_zero()).then_some(adjustment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FitnessConfig;
    use crate::data::TargetSequence;
    use crate::engines::evaluation::DiagnosticsEvaluator;
    use crate::engines::generation::polynomial::Polynomial;
    use crate::types::Expression;

    /// Hidden unit passes mean signed error through; output copies it.
    fn error_follower() -> DeltaPredictor {
        DeltaPredictor::new(PredictorWeights {
            hidden_weights: vec![vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0]],
            hidden_bias: vec![0.0],
            output_weights: vec![1.0],
            output_bias: 0.0,
        })
        .unwrap()
    }

    #[test]
    fn test_suggests_constant_shift_toward_target() {
        let target = TargetSequence::new(vec![5, 7, 9]).unwrap();
        let formula = Formula::from_polynomial(Polynomial::linear(2, 0));
        let diagnostics = DiagnosticsEvaluator::new(FitnessConfig::default()).evaluate(&formula.root, &target);

        let suggestion = error_follower().suggest(&formula, &diagnostics).unwrap();
        assert_eq!(suggestion, Some(Adjustment::constant(3)));
    }

    #[test]
    fn test_no_suggestion_for_trees() {
        let target = TargetSequence::new(vec![5, 7, 9]).unwrap();
        let formula = Formula::new(Expression::Variable);
        let diagnostics = DiagnosticsEvaluator::new(FitnessConfig::default()).evaluate(&formula.root, &target);
        assert_eq!(error_follower().suggest(&formula, &diagnostics).unwrap(), None);
    }

    #[test]
    fn test_rejects_mismatched_weights() {
        let result = DeltaPredictor::new(PredictorWeights {
            hidden_weights: vec![vec![1.0, 2.0]],
            hidden_bias: vec![0.0],
            output_weights: vec![1.0],
            output_bias: 0.0,
        });
        assert!(matches!(result, Err(PrimeSearchError::Guidance(_))));
    }

    #[test]
    fn test_weights_parse_from_json() {
        let json = r#"{
            "hidden_weights": [[0, 0, 0, 0, 1, 0], [0, 0, 0, 0, -1, 0]],
            "hidden_bias": [0, 0],
            "output_weights": [1, -1],
            "output_bias": 0.5
        }"#;
        let weights: PredictorWeights = serde_json::from_str(json).unwrap();
        let predictor = DeltaPredictor::new(weights).unwrap();
        assert_eq!(predictor.predict(&[0.0, 0.0, 0.0, 0.0, -2.0, 0.0]).unwrap(), -1.5);
    }
}
