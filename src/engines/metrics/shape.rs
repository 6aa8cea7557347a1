// src/engines/metrics/shape.rs

/// Statistics of an output sequence on its own, independent of the targets
pub struct ShapeMetrics;

impl ShapeMetrics {
    /// Population variance of the outputs
    pub fn variance(outputs: &[f64]) -> f64 {
        if outputs.is_empty() {
            return 0.0;
        }
        let mean = outputs.iter().sum::<f64>() / outputs.len() as f64;
        outputs.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / outputs.len() as f64
    }

    /// Mean absolute difference between consecutive outputs
    pub fn local_novelty(outputs: &[f64]) -> f64 {
        if outputs.len() < 2 {
            return 0.0;
        }
        outputs.windows(2).map(|w| (w[1] - w[0]).abs()).sum::<f64>() / (outputs.len() - 1) as f64
    }

    pub fn max_abs(outputs: &[f64]) -> f64 {
        outputs.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variance() {
        assert_eq!(ShapeMetrics::variance(&[2.0, 4.0, 6.0, 8.0, 10.0]), 8.0);
        assert_eq!(ShapeMetrics::variance(&[5.0, 5.0]), 0.0);
    }

    #[test]
    fn test_local_novelty() {
        assert_eq!(ShapeMetrics::local_novelty(&[2.0, 4.0, 6.0, 8.0, 10.0]), 2.0);
        assert_eq!(ShapeMetrics::local_novelty(&[1.0]), 0.0);
    }
}
