use crate::engines::evaluation::diagnostics::{Diagnostics, FITNESS_FLOOR};
use crate::engines::generation::ast::Formula;
use crate::engines::generation::pareto::{extract_objectives, ObjectiveConfig};
use crate::engines::metrics::MetricsEngine;
use std::cmp::Ordering;

/// One candidate formula and its cached diagnostics.
///
/// Formulas are immutable, so the cache is only ever empty for a freshly
/// created individual; variation always builds a new `Individual`.
#[derive(Debug, Clone)]
pub struct Individual {
    pub formula: Formula,
    diagnostics: Option<Diagnostics>,
}

impl Individual {
    pub fn new(formula: Formula) -> Self {
        Self {
            formula,
            diagnostics: None,
        }
    }

    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        self.diagnostics.as_ref()
    }

    pub fn diagnostics_mut(&mut self) -> Option<&mut Diagnostics> {
        self.diagnostics.as_mut()
    }

    pub fn set_diagnostics(&mut self, diagnostics: Diagnostics) {
        self.diagnostics = Some(diagnostics);
    }

    pub fn is_evaluated(&self) -> bool {
        self.diagnostics.is_some()
    }

    pub fn combined_fitness(&self) -> f64 {
        self.diagnostics
            .as_ref()
            .map(|d| d.combined_fitness)
            .unwrap_or(FITNESS_FLOOR)
    }

    /// Objective values for Pareto ranking, read from the named metrics
    pub fn objectives(&self, configs: &[ObjectiveConfig]) -> Vec<f64> {
        match &self.diagnostics {
            Some(d) => extract_objectives(&MetricsEngine::calculate_all(d), configs),
            None => vec![FITNESS_FLOOR; configs.len()],
        }
    }
}

/// The individuals of one generation
#[derive(Debug, Clone, Default)]
pub struct Population {
    pub individuals: Vec<Individual>,
    pub generation: usize,
}

impl Population {
    pub fn new(individuals: Vec<Individual>, generation: usize) -> Self {
        Self {
            individuals,
            generation,
        }
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn is_fully_evaluated(&self) -> bool {
        self.individuals.iter().all(Individual::is_evaluated)
    }

    pub fn fitness(&self) -> Vec<f64> {
        self.individuals.iter().map(Individual::combined_fitness).collect()
    }

    /// Indices by descending combined fitness; ties keep population order
    pub fn ranked_indices(&self) -> Vec<usize> {
        let fitness = self.fitness();
        let mut indices: Vec<usize> = (0..fitness.len()).collect();
        indices.sort_by(|&a, &b| fitness[b].partial_cmp(&fitness[a]).unwrap_or(Ordering::Equal));
        indices
    }

    pub fn best(&self) -> Option<&Individual> {
        self.ranked_indices().first().map(|&i| &self.individuals[i])
    }
}
