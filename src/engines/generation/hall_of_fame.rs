use crate::engines::evaluation::Diagnostics;
use crate::engines::generation::ast::Formula;
use crate::engines::generation::population::Individual;

use std::collections::HashSet;

/// Best formula seen so far, with the generation it was scored in
#[derive(Clone, Debug)]
pub struct EliteFormula {
    pub formula: Formula,
    pub diagnostics: Diagnostics,
    pub generation: usize,
    pub canonical_string: String, // For deduplication
}

impl EliteFormula {
    pub fn fitness(&self) -> f64 {
        self.diagnostics.combined_fitness
    }
}

/// Bounded, deduplicated record of the best formulas across all generations
pub struct HallOfFame {
    formulas: Vec<EliteFormula>,
    max_size: usize,
    seen_signatures: HashSet<String>,
}

impl HallOfFame {
    pub fn new(max_size: usize) -> Self {
        Self {
            formulas: Vec::new(),
            max_size,
            seen_signatures: HashSet::new(),
        }
    }

    /// Offer an evaluated individual; returns whether it was added as a new entry.
    ///
    /// A formula already on record has its diagnostics replaced by the latest
    /// scoring, since the novelty share of the fitness drifts between generations.
    pub fn try_add(&mut self, individual: &Individual, generation: usize) -> bool {
        if self.max_size == 0 {
            return false;
        }
        let Some(diagnostics) = individual.diagnostics() else {
            return false;
        };

        let canonical_string = individual.formula.canonical_string();
        if self.seen_signatures.contains(&canonical_string) {
            self.refresh(&canonical_string, diagnostics, generation);
            return false;
        }

        if self.formulas.len() >= self.max_size {
            let worst = self.formulas.last().map(EliteFormula::fitness).unwrap_or(f64::NEG_INFINITY);
            if diagnostics.combined_fitness <= worst {
                return false;
            }
        }

        self.seen_signatures.insert(canonical_string.clone());
        self.formulas.push(EliteFormula {
            formula: individual.formula.clone(),
            diagnostics: diagnostics.clone(),
            generation,
            canonical_string,
        });
        self.sort_and_trim();
        true
    }

    fn refresh(&mut self, canonical_string: &str, diagnostics: &Diagnostics, generation: usize) {
        if let Some(entry) = self
            .formulas
            .iter_mut()
            .find(|e| e.canonical_string == canonical_string)
        {
            entry.diagnostics = diagnostics.clone();
            entry.generation = generation;
        }
        self.sort_and_trim();
    }

    fn sort_and_trim(&mut self) {
        // Stable: among equal scores the earlier entry stays ahead
        self.formulas.sort_by(|a, b| {
            b.fitness().partial_cmp(&a.fitness()).unwrap_or(std::cmp::Ordering::Equal)
        });

        while self.formulas.len() > self.max_size {
            if let Some(removed) = self.formulas.pop() {
                self.seen_signatures.remove(&removed.canonical_string);
            }
        }
    }

    pub fn best(&self) -> Option<&EliteFormula> {
        self.formulas.first()
    }

    pub fn get_all(&self) -> &[EliteFormula] {
        &self.formulas
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FitnessConfig;
    use crate::data::TargetSequence;
    use crate::engines::evaluation::DiagnosticsEvaluator;
    use crate::engines::generation::polynomial::Polynomial;

    fn scored(poly: Polynomial, target: &TargetSequence) -> Individual {
        let evaluator = DiagnosticsEvaluator::new(FitnessConfig::default());
        let mut individual = Individual::new(Formula::from_polynomial(poly));
        individual.set_diagnostics(evaluator.evaluate(&individual.formula.root, target));
        individual
    }

    #[test]
    fn test_keeps_best_and_deduplicates() {
        let target = TargetSequence::new(vec![3, 5, 7, 9]).unwrap();
        let mut hof = HallOfFame::new(2);

        let exact = scored(Polynomial::linear(2, 1), &target);
        let close = scored(Polynomial::linear(2, 2), &target);
        let poor = scored(Polynomial::constant(100), &target);

        assert!(hof.try_add(&poor, 0));
        assert!(hof.try_add(&exact, 0));
        assert!(!hof.try_add(&exact, 1));
        assert!(hof.try_add(&close, 1));

        assert_eq!(hof.len(), 2);
        assert_eq!(hof.best().map(|e| e.formula.clone()), Some(exact.formula.clone()));
        assert!(hof.get_all().iter().all(|e| e.canonical_string != poor.formula.canonical_string()));
    }

    #[test]
    fn test_repeat_sighting_refreshes_score() {
        let target = TargetSequence::new(vec![3, 5, 7, 9]).unwrap();
        let mut hof = HallOfFame::new(2);

        let mut exact = scored(Polynomial::linear(2, 1), &target);
        let close = scored(Polynomial::linear(2, 2), &target);
        assert!(hof.try_add(&exact, 0));
        assert!(hof.try_add(&close, 0));
        assert_eq!(hof.best().map(|e| e.generation), Some(0));

        // Same formula scored again after its novelty bonus has faded
        let mut faded = exact.diagnostics().cloned().unwrap();
        faded.combined_fitness = close.combined_fitness() - 1.0;
        exact.set_diagnostics(faded);
        assert!(!hof.try_add(&exact, 3));

        assert_eq!(hof.len(), 2);
        let best = hof.best().unwrap();
        assert_eq!(best.canonical_string, close.formula.canonical_string());
        let refreshed = &hof.get_all()[1];
        assert_eq!(refreshed.generation, 3);
        assert_eq!(refreshed.fitness(), close.combined_fitness() - 1.0);
    }

    #[test]
    fn test_unevaluated_is_ignored() {
        let mut hof = HallOfFame::new(3);
        let individual = Individual::new(Formula::from_polynomial(Polynomial::linear(1, 1)));
        assert!(!hof.try_add(&individual, 0));
        assert!(hof.is_empty());
    }
}
