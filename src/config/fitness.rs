use super::traits::ConfigSection;
use crate::engines::metrics::{ClosenessForm, HitPolicy};
use crate::error::PrimeSearchError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    pub near_threshold: f64,
    pub hit_policy: HitPolicy,
    pub closeness_form: ClosenessForm,
    /// Neighbours averaged for behavioural novelty
    pub novelty_k: usize,
    /// Output recorded in place of a failed evaluation
    pub sentinel_output: f64,
    /// Penalty per failed position
    pub failure_penalty: f64,
    /// Penalty per negative output
    pub negative_penalty: f64,
    #[serde(flatten)]
    pub weights: FitnessWeights,
}

/// Weights of the normalised terms in the combined fitness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    pub weight_strict_hits: f64,
    pub weight_closeness: f64,
    pub weight_novelty: f64,
    pub weight_local_novelty: f64,
    pub weight_variance: f64,
    pub weight_non_integer: f64,
    pub weight_negative: f64,
    pub weight_failure: f64,
    pub weight_complexity: f64,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            near_threshold: 2.0,
            hit_policy: HitPolicy::Rounded,
            closeness_form: ClosenessForm::LogMse,
            novelty_k: 5,
            sentinel_output: 0.0,
            failure_penalty: 0.5,
            negative_penalty: 0.2,
            weights: FitnessWeights::default(),
        }
    }
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            weight_strict_hits: 2.0,
            weight_closeness: 1.0,
            weight_novelty: 1.0,
            weight_local_novelty: 0.0,
            weight_variance: 0.0,
            weight_non_integer: 0.5,
            weight_negative: 1.0,
            weight_failure: 1.0,
            weight_complexity: 0.1,
        }
    }
}

impl FitnessWeights {
    fn all(&self) -> [f64; 9] {
        [
            self.weight_strict_hits,
            self.weight_closeness,
            self.weight_novelty,
            self.weight_local_novelty,
            self.weight_variance,
            self.weight_non_integer,
            self.weight_negative,
            self.weight_failure,
            self.weight_complexity,
        ]
    }
}

impl ConfigSection for FitnessConfig {
    fn section_name() -> &'static str {
        "fitness"
    }

    fn validate(&self) -> Result<(), PrimeSearchError> {
        if !(self.near_threshold > 0.0) {
            return Err(PrimeSearchError::Configuration(
                "Near-hit threshold must be positive".to_string()
            ));
        }
        if self.novelty_k == 0 {
            return Err(PrimeSearchError::Configuration(
                "novelty_k must be at least 1".to_string()
            ));
        }
        if !self.sentinel_output.is_finite()
            || !self.failure_penalty.is_finite()
            || !self.negative_penalty.is_finite()
        {
            return Err(PrimeSearchError::Configuration(
                "Sentinel and penalty values must be finite".to_string()
            ));
        }
        if self.weights.all().iter().any(|w| !w.is_finite()) {
            return Err(PrimeSearchError::Configuration(
                "Fitness weights must be finite".to_string()
            ));
        }
        Ok(())
    }
}
