// src/engines/metrics/engine.rs
use crate::engines::evaluation::Diagnostics;
use std::collections::HashMap;

/// Flattens a diagnostics record into named metrics, the shape used by
/// Pareto objective extraction and record export.
pub struct MetricsEngine;

impl MetricsEngine {
    pub fn calculate_all(diagnostics: &Diagnostics) -> HashMap<String, f64> {
        let mut all_metrics = HashMap::new();

        all_metrics.insert("combined_fitness".to_string(), diagnostics.combined_fitness);
        all_metrics.insert("strict_hits".to_string(), diagnostics.strict_hits as f64);
        all_metrics.insert("near_hits".to_string(), diagnostics.near_hits as f64);
        all_metrics.insert("closeness".to_string(), diagnostics.closeness);
        all_metrics.insert("non_integer_penalty".to_string(), diagnostics.non_integer_penalty);
        all_metrics.insert("negative_penalty".to_string(), diagnostics.negative_penalty);
        all_metrics.insert("failure_penalty".to_string(), diagnostics.failure_penalty);
        all_metrics.insert("evaluation_failures".to_string(), diagnostics.evaluation_failures as f64);
        all_metrics.insert("variance".to_string(), diagnostics.variance);
        all_metrics.insert("local_novelty".to_string(), diagnostics.local_novelty);
        all_metrics.insert("novelty".to_string(), diagnostics.novelty);
        all_metrics.insert("complexity".to_string(), diagnostics.complexity as f64);
        all_metrics.insert("mean_error".to_string(), diagnostics.mean_error);

        all_metrics
    }
}
