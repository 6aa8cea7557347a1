use super::traits::{check_unit_interval, ConfigSection};
use crate::engines::generation::pareto::{ObjectiveConfig, OptimizationDirection};
use crate::error::PrimeSearchError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub elitism_count: usize,
    pub tournament_size: usize,
    pub selection_method: SelectionMethod,
    pub mutation_policy: MutationPolicy,
    pub crossover_policy: CrossoverPolicy,
    /// Largest coefficient delta applied by coefficient mutation
    pub max_mutation: i64,
    /// Largest noise added to each blended coefficient
    pub crossover_noise: i64,
    /// Run a second mutation pass over every offspring
    pub second_mutation_pass: bool,
    /// Fraction of non-elite slots replaced by random immigrants
    pub immigrant_fraction: f64,
    pub hall_of_fame_size: usize,
    pub objectives: Vec<ObjectiveConfig>,
    pub parallel_evaluation: bool,
    pub cache_capacity: usize,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMethod {
    Tournament,
    Pareto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationPolicy {
    /// Replace the parent with a fresh random formula
    Regenerate,
    /// Perturb polynomial coefficients; subtree mutation otherwise
    Coefficient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverPolicy {
    /// Take one parent wholesale
    PickParent,
    /// Mix polynomial coefficients of both parents
    CoefficientBlend,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            generations: 200,
            mutation_rate: 0.3,
            crossover_rate: 0.7,
            elitism_count: 4,
            tournament_size: 5,
            selection_method: SelectionMethod::Tournament,
            mutation_policy: MutationPolicy::Coefficient,
            crossover_policy: CrossoverPolicy::CoefficientBlend,
            max_mutation: 5,
            crossover_noise: 2,
            second_mutation_pass: true,
            immigrant_fraction: 0.05,
            hall_of_fame_size: 10,
            objectives: default_objectives(),
            parallel_evaluation: true,
            cache_capacity: 10_000,
            seed: Some(42),
        }
    }
}

pub fn default_objectives() -> Vec<ObjectiveConfig> {
    vec![
        ObjectiveConfig {
            metric_name: "combined_fitness".to_string(),
            direction: OptimizationDirection::Maximize,
        },
        ObjectiveConfig {
            metric_name: "novelty".to_string(),
            direction: OptimizationDirection::Maximize,
        },
        ObjectiveConfig {
            metric_name: "complexity".to_string(),
            direction: OptimizationDirection::Minimize,
        },
    ]
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), PrimeSearchError> {
        if self.population_size == 0 {
            return Err(PrimeSearchError::Configuration(
                "Population size must be at least 1".to_string()
            ));
        }
        if self.generations == 0 {
            return Err(PrimeSearchError::Configuration(
                "Generation count must be at least 1".to_string()
            ));
        }
        if self.elitism_count >= self.population_size {
            return Err(PrimeSearchError::Configuration(format!(
                "Elitism count {} must be smaller than population size {}",
                self.elitism_count, self.population_size
            )));
        }
        if self.tournament_size == 0 {
            return Err(PrimeSearchError::Configuration(
                "Tournament size must be at least 1".to_string()
            ));
        }
        check_unit_interval("Mutation rate", self.mutation_rate)?;
        check_unit_interval("Crossover rate", self.crossover_rate)?;
        check_unit_interval("Immigrant fraction", self.immigrant_fraction)?;
        if self.max_mutation < 0 || self.crossover_noise < 0 {
            return Err(PrimeSearchError::Configuration(
                "Mutation and crossover noise bounds must be non-negative".to_string()
            ));
        }
        if self.selection_method == SelectionMethod::Pareto && self.objectives.is_empty() {
            return Err(PrimeSearchError::Configuration(
                "Pareto selection needs at least one objective".to_string()
            ));
        }
        Ok(())
    }
}
