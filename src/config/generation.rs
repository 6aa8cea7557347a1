use super::traits::{check_unit_interval, ConfigSection};
use crate::error::PrimeSearchError;
use crate::types::Operator;
use serde::{Deserialize, Serialize};

/// Shape and constant ranges of randomly generated formulas
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub max_depth: usize,
    pub operator_set: Vec<Operator>,
    /// Chance of emitting a terminal before reaching `max_depth`
    pub early_stop_probability: f64,
    /// Chance a terminal is a bare constant rather than `k * x + n`
    pub constant_leaf_probability: f64,
    pub max_mul: i64,
    pub max_add: i64,
    pub max_quad: i64,
    pub quadratic_probability: f64,
    /// Share of the initial population seeded with polynomials
    pub polynomial_seed_fraction: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            operator_set: Operator::all(),
            early_stop_probability: 0.3,
            constant_leaf_probability: 0.2,
            max_mul: 10,
            max_add: 50,
            max_quad: 5,
            quadratic_probability: 0.3,
            polynomial_seed_fraction: 0.5,
        }
    }
}

impl ConfigSection for GeneratorConfig {
    fn section_name() -> &'static str {
        "generator"
    }

    fn validate(&self) -> Result<(), PrimeSearchError> {
        if self.operator_set.is_empty() {
            return Err(PrimeSearchError::Configuration(
                "Operator set must not be empty".to_string()
            ));
        }
        if self.max_mul < 1 || self.max_quad < 1 || self.max_add < 0 {
            return Err(PrimeSearchError::Configuration(
                "Constant ranges must satisfy max_mul >= 1, max_quad >= 1, max_add >= 0".to_string()
            ));
        }
        check_unit_interval("Early stop probability", self.early_stop_probability)?;
        check_unit_interval("Constant leaf probability", self.constant_leaf_probability)?;
        check_unit_interval("Quadratic probability", self.quadratic_probability)?;
        check_unit_interval("Polynomial seed fraction", self.polynomial_seed_fraction)?;
        Ok(())
    }
}
