/// Pareto optimization utilities for multi-objective selection
/// NSGA-II style non-dominated sorting with crowding-distance tie-breaking

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Defines whether a metric should be maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizationDirection {
    Maximize,
    Minimize,
}

/// One objective: a named metric and its direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveConfig {
    pub metric_name: String,
    pub direction: OptimizationDirection,
}

/// Front rank (0 = non-dominated) and crowding distance per individual
#[derive(Debug, Clone)]
pub struct ParetoRanking {
    pub ranks: Vec<usize>,
    pub crowding: Vec<f64>,
    pub fronts: Vec<Vec<usize>>,
}

impl ParetoRanking {
    pub fn compute(objectives: &[Vec<f64>], directions: &[OptimizationDirection]) -> Self {
        let (fronts, ranks) = fast_non_dominated_sort(objectives, directions);
        let mut crowding = vec![0.0; objectives.len()];
        for front in &fronts {
            calculate_crowding_distance(objectives, front, &mut crowding);
        }
        Self {
            ranks,
            crowding,
            fronts,
        }
    }

    /// `(rank, crowding)` pairs in population order
    pub fn pairs(&self) -> Vec<(usize, f64)> {
        self.ranks.iter().copied().zip(self.crowding.iter().copied()).collect()
    }

    /// Indices by front, then by descending crowding distance, then by index
    pub fn order(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.ranks.len()).collect();
        indices.sort_by(|&a, &b| {
            self.ranks[a]
                .cmp(&self.ranks[b])
                .then_with(|| {
                    self.crowding[b]
                        .partial_cmp(&self.crowding[a])
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| a.cmp(&b))
        });
        indices
    }

    /// Truncate to `count` survivors by front order then crowding distance
    pub fn select_survivors(&self, count: usize) -> Vec<usize> {
        let mut order = self.order();
        order.truncate(count);
        order
    }
}

/// A dominates B if A is no worse in every objective and strictly better in one
pub fn dominates(
    a_objectives: &[f64],
    b_objectives: &[f64],
    directions: &[OptimizationDirection],
) -> bool {
    if a_objectives.len() != b_objectives.len() || a_objectives.len() != directions.len() {
        return false;
    }

    let mut strictly_better = false;
    for ((&a, &b), direction) in a_objectives.iter().zip(b_objectives).zip(directions) {
        let (a_better, b_better) = match direction {
            OptimizationDirection::Maximize => (a > b, b > a),
            OptimizationDirection::Minimize => (a < b, b < a),
        };
        if b_better {
            return false;
        }
        strictly_better |= a_better;
    }

    strictly_better
}

/// Group indices into Pareto fronts; also returns each index's front rank
pub fn fast_non_dominated_sort(
    objectives: &[Vec<f64>],
    directions: &[OptimizationDirection],
) -> (Vec<Vec<usize>>, Vec<usize>) {
    let n = objectives.len();
    let mut domination_count = vec![0usize; n];
    let mut dominated: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut ranks = vec![0usize; n];

    for i in 0..n {
        for j in (i + 1)..n {
            if dominates(&objectives[i], &objectives[j], directions) {
                dominated[i].push(j);
                domination_count[j] += 1;
            } else if dominates(&objectives[j], &objectives[i], directions) {
                dominated[j].push(i);
                domination_count[i] += 1;
            }
        }
    }

    let mut fronts: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();

    while !current.is_empty() {
        let mut next = Vec::new();
        for &i in &current {
            ranks[i] = fronts.len();
            for &j in &dominated[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    next.push(j);
                }
            }
        }
        next.sort_unstable();
        fronts.push(current);
        current = next;
    }

    (fronts, ranks)
}

/// Crowding distance for one front, written into `distances`.
/// Boundary members of each objective get infinity.
pub fn calculate_crowding_distance(objectives: &[Vec<f64>], front: &[usize], distances: &mut [f64]) {
    if front.len() <= 2 {
        for &idx in front {
            distances[idx] = f64::INFINITY;
        }
        return;
    }

    for &idx in front {
        distances[idx] = 0.0;
    }

    let num_objectives = objectives[front[0]].len();
    for obj in 0..num_objectives {
        let mut sorted = front.to_vec();
        sorted.sort_by(|&a, &b| {
            objectives[a][obj]
                .partial_cmp(&objectives[b][obj])
                .unwrap_or(Ordering::Equal)
        });

        let first = sorted[0];
        let last = sorted[sorted.len() - 1];
        distances[first] = f64::INFINITY;
        distances[last] = f64::INFINITY;

        let range = objectives[last][obj] - objectives[first][obj];
        if range.abs() < 1e-10 {
            continue;
        }

        for window in sorted.windows(3) {
            let gap = objectives[window[2]][obj] - objectives[window[0]][obj];
            distances[window[1]] += gap / range;
        }
    }
}

/// Extract objective values from named metrics; missing metrics read as 0
pub fn extract_objectives(
    metrics: &HashMap<String, f64>,
    objective_configs: &[ObjectiveConfig],
) -> Vec<f64> {
    objective_configs
        .iter()
        .map(|config| metrics.get(&config.metric_name).copied().unwrap_or(0.0))
        .collect()
}

/// True if `a` should be preferred over `b`: lower rank, then wider crowding
pub fn crowded_comparison(a: (usize, f64), b: (usize, f64)) -> bool {
    match a.0.cmp(&b.0) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => a.1 > b.1,
    }
}
