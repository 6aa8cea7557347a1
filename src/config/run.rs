use super::traits::ConfigSection;
use crate::error::PrimeSearchError;
use serde::{Deserialize, Serialize};

/// Inputs and outputs around a run: target length and collaborator paths
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub num_primes: usize,
    pub log_file: Option<String>,
    pub neural_model_path: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_primes: 100,
            log_file: Some("evolution_log.jsonl".to_string()),
            neural_model_path: None,
        }
    }
}

impl ConfigSection for RunConfig {
    fn section_name() -> &'static str {
        "run"
    }

    fn validate(&self) -> Result<(), PrimeSearchError> {
        if self.num_primes == 0 {
            return Err(PrimeSearchError::Configuration(
                "num_primes must be at least 1".to_string()
            ));
        }
        Ok(())
    }
}
