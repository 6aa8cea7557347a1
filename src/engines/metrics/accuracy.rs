// src/engines/metrics/accuracy.rs
use serde::{Deserialize, Serialize};

/// How an output is compared against its target for a strict hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitPolicy {
    /// Round the output to the nearest integer first
    Rounded,
    /// Require exact floating-point equality
    Exact,
}

/// Aggregate closeness form. The two forms live on different scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClosenessForm {
    /// `-ln(1 + mse)`, range (-inf, 0]
    LogMse,
    /// `1 / (1 + sum|error|)`, range (0, 1]
    InverseAbsError,
}

/// Error-based scores of an output vector against the targets
pub struct AccuracyMetrics;

impl AccuracyMetrics {
    /// Positions flagged in `failed` never count, whatever their sentinel output
    pub fn strict_hits(outputs: &[f64], targets: &[i64], failed: &[bool], policy: HitPolicy) -> usize {
        evaluated(outputs, targets, failed)
            .filter(|&(out, target)| match policy {
                HitPolicy::Rounded => out.round() == target as f64,
                HitPolicy::Exact => out == target as f64,
            })
            .count()
    }

    pub fn near_hits(outputs: &[f64], targets: &[i64], failed: &[bool], threshold: f64) -> usize {
        evaluated(outputs, targets, failed)
            .filter(|&(out, target)| (out - target as f64).abs() < threshold)
            .count()
    }

    pub fn closeness(outputs: &[f64], targets: &[i64], form: ClosenessForm) -> f64 {
        if outputs.is_empty() {
            return match form {
                ClosenessForm::LogMse => 0.0,
                ClosenessForm::InverseAbsError => 1.0,
            };
        }

        match form {
            ClosenessForm::LogMse => {
                let mse = outputs
                    .iter()
                    .zip(targets)
                    .map(|(&out, &target)| (out - target as f64).powi(2))
                    .sum::<f64>()
                    / outputs.len() as f64;
                -(1.0 + mse).ln()
            }
            ClosenessForm::InverseAbsError => {
                let total: f64 = outputs
                    .iter()
                    .zip(targets)
                    .map(|(&out, &target)| (out - target as f64).abs())
                    .sum();
                1.0 / (1.0 + total)
            }
        }
    }

    /// Mean distance of each output from its nearest integer, in [0, 0.5]
    pub fn mean_fractional_distance(outputs: &[f64]) -> f64 {
        if outputs.is_empty() {
            return 0.0;
        }
        outputs.iter().map(|v| (v - v.round()).abs()).sum::<f64>() / outputs.len() as f64
    }

    pub fn negative_count(outputs: &[f64], failed: &[bool]) -> usize {
        outputs
            .iter()
            .zip(failed)
            .filter(|&(&v, &f)| !f && v < 0.0)
            .count()
    }

    /// Mean of `target - output`; positive when the formula undershoots
    pub fn mean_signed_error(outputs: &[f64], targets: &[i64]) -> f64 {
        if outputs.is_empty() {
            return 0.0;
        }
        outputs
            .iter()
            .zip(targets)
            .map(|(&out, &target)| target as f64 - out)
            .sum::<f64>()
            / outputs.len() as f64
    }
}

/// `(output, target)` pairs of the positions that evaluated successfully
fn evaluated<'a>(
    outputs: &'a [f64],
    targets: &'a [i64],
    failed: &'a [bool],
) -> impl Iterator<Item = (f64, i64)> + 'a {
    outputs
        .iter()
        .zip(targets)
        .zip(failed)
        .filter(|&(_, &f)| !f)
        .map(|((&out, &target), _)| (out, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hits() {
        let outputs = [2.0, 4.0, 6.0, 8.0, 10.0];
        let targets = [2, 3, 5, 7, 11];
        let ok = [false; 5];
        assert_eq!(AccuracyMetrics::strict_hits(&outputs, &targets, &ok, HitPolicy::Rounded), 1);
        assert_eq!(AccuracyMetrics::near_hits(&outputs, &targets, &ok, 2.0), 5);
        assert_eq!(AccuracyMetrics::near_hits(&outputs, &targets, &ok, 1.0), 1);
    }

    #[test]
    fn test_failed_positions_never_score() {
        let outputs = [2.0, -1.0, 5.0];
        let targets = [2, 3, 5];
        let failed = [true, true, false];
        assert_eq!(AccuracyMetrics::strict_hits(&outputs, &targets, &failed, HitPolicy::Rounded), 1);
        assert_eq!(AccuracyMetrics::near_hits(&outputs, &targets, &failed, 10.0), 1);
        assert_eq!(AccuracyMetrics::negative_count(&outputs, &failed), 0);
        assert_eq!(AccuracyMetrics::negative_count(&outputs, &[false; 3]), 1);
    }

    #[test]
    fn test_rounded_vs_exact() {
        let outputs = [2.2, 3.0];
        let targets = [2, 3];
        let ok = [false; 2];
        assert_eq!(AccuracyMetrics::strict_hits(&outputs, &targets, &ok, HitPolicy::Rounded), 2);
        assert_eq!(AccuracyMetrics::strict_hits(&outputs, &targets, &ok, HitPolicy::Exact), 1);
    }

    #[test]
    fn test_closeness_forms() {
        let targets = [2, 3];
        let perfect = [2.0, 3.0];
        assert_eq!(AccuracyMetrics::closeness(&perfect, &targets, ClosenessForm::LogMse), 0.0);
        assert_eq!(AccuracyMetrics::closeness(&perfect, &targets, ClosenessForm::InverseAbsError), 1.0);

        let off = [3.0, 4.0];
        let log_mse = AccuracyMetrics::closeness(&off, &targets, ClosenessForm::LogMse);
        assert!((log_mse + 2.0f64.ln()).abs() < 1e-12);
        let inverse = AccuracyMetrics::closeness(&off, &targets, ClosenessForm::InverseAbsError);
        assert!((inverse - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_fractional_distance() {
        assert!((AccuracyMetrics::mean_fractional_distance(&[1.5, 2.0, -0.25]) - 0.25).abs() < 1e-12);
    }
}
