use rayon::prelude::*;

/// Behavioural novelty in output space.
///
/// An individual's novelty is the mean Euclidean distance from its output
/// vector to its `k` nearest neighbours in the current population.
#[derive(Debug, Clone)]
pub struct NoveltyTracker {
    k: usize,
    parallel: bool,
}

impl NoveltyTracker {
    pub fn new(k: usize, parallel: bool) -> Self {
        Self { k, parallel }
    }

    /// Effective neighbour count for a population of `population_size`
    pub fn neighbours(&self, population_size: usize) -> usize {
        self.k.min(population_size.saturating_sub(1))
    }

    /// Novelty per output vector, in input order. Needs the whole generation.
    pub fn compute(&self, outputs: &[&[f64]]) -> Vec<f64> {
        let k = self.neighbours(outputs.len());
        if k == 0 {
            return vec![0.0; outputs.len()];
        }

        let score = |i: usize| -> f64 {
            let mut distances: Vec<f64> = outputs
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, other)| euclidean(outputs[i], other))
                .collect();
            distances.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            distances[..k].iter().sum::<f64>() / k as f64
        };

        if self.parallel {
            (0..outputs.len()).into_par_iter().map(score).collect()
        } else {
            (0..outputs.len()).map(score).collect()
        }
    }
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_neighbour_mean() {
        let a = [0.0, 0.0];
        let b = [3.0, 4.0];
        let c = [6.0, 8.0];
        let tracker = NoveltyTracker::new(1, false);
        let novelty = tracker.compute(&[&a, &b, &c]);
        assert_eq!(novelty, vec![5.0, 5.0, 5.0]);

        let tracker = NoveltyTracker::new(5, false);
        let novelty = tracker.compute(&[&a, &b, &c]);
        assert_eq!(novelty, vec![7.5, 5.0, 7.5]);
    }

    #[test]
    fn test_single_individual_has_zero_novelty() {
        let a = [1.0, 2.0];
        let tracker = NoveltyTracker::new(5, true);
        assert_eq!(tracker.compute(&[&a]), vec![0.0]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let rows: Vec<Vec<f64>> = (0..12).map(|i| vec![i as f64, (i * i) as f64, 1.0]).collect();
        let refs: Vec<&[f64]> = rows.iter().map(|r| r.as_slice()).collect();
        assert_eq!(
            NoveltyTracker::new(3, true).compute(&refs),
            NoveltyTracker::new(3, false).compute(&refs)
        );
    }
}
