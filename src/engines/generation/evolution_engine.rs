use crate::config::{AppConfig, ConfigSection, EvolutionConfig, FitnessConfig, GeneratorConfig, SelectionMethod};
use crate::data::{DiagnosticsCache, TargetSequence};
use crate::engines::evaluation::{Diagnostics, DiagnosticsEvaluator};
use crate::engines::generation::{
    ast::{Formula, FormulaOrigin},
    generator::FormulaGenerator,
    hall_of_fame::{EliteFormula, HallOfFame},
    novelty::NoveltyTracker,
    operators::{apply_adjustment, crossover, mutate, pareto_tournament_selection, tournament_selection},
    pareto::{ObjectiveConfig, OptimizationDirection, ParetoRanking},
    population::{Individual, Population},
    progress::{GenerationRecord, ProgressCallback},
};
use crate::error::{PrimeSearchError, Result};
use crate::ml::guidance::NeuralGuidance;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Lifecycle of a run. One generation walks
/// `Evaluating -> Ranking -> Selecting -> Varying -> Replaced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Ready,
    Evaluating,
    Ranking,
    Selecting,
    Varying,
    Replaced,
    Terminated,
}

/// What a finished run hands back
#[derive(Debug, Clone)]
pub struct EvolutionOutcome {
    /// Last generation, fully evaluated
    pub population: Population,
    pub best: Option<EliteFormula>,
    pub hall_of_fame: Vec<EliteFormula>,
    pub records: Vec<GenerationRecord>,
}

impl EvolutionOutcome {
    pub fn diagnostics(&self) -> Vec<&Diagnostics> {
        self.population
            .individuals
            .iter()
            .filter_map(Individual::diagnostics)
            .collect()
    }
}

pub struct EvolutionEngine {
    config: EvolutionConfig,
    target: TargetSequence,
    generator: FormulaGenerator,
    evaluator: DiagnosticsEvaluator,
    novelty: NoveltyTracker,
    cache: DiagnosticsCache,
    hall_of_fame: HallOfFame,
    guidance: Option<Box<dyn NeuralGuidance>>,
    population: Population,
    records: Vec<GenerationRecord>,
    state: EngineState,
    rng: StdRng,
}

impl EvolutionEngine {
    pub fn new(
        config: EvolutionConfig,
        generator_config: GeneratorConfig,
        fitness_config: FitnessConfig,
        target: TargetSequence,
    ) -> Result<Self> {
        config.validate()?;
        generator_config.validate()?;
        fitness_config.validate()?;
        if target.is_empty() {
            return Err(PrimeSearchError::Configuration(
                "Target sequence must not be empty".to_string()
            ));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            generator: FormulaGenerator::new(generator_config),
            novelty: NoveltyTracker::new(fitness_config.novelty_k, config.parallel_evaluation),
            evaluator: DiagnosticsEvaluator::new(fitness_config),
            cache: DiagnosticsCache::new(config.cache_capacity),
            hall_of_fame: HallOfFame::new(config.hall_of_fame_size),
            guidance: None,
            population: Population::default(),
            records: Vec::new(),
            state: EngineState::Uninitialized,
            config,
            target,
            rng,
        })
    }

    pub fn from_config(config: &AppConfig, target: TargetSequence) -> Result<Self> {
        Self::new(
            config.evolution.clone(),
            config.generator.clone(),
            config.fitness.clone(),
            target,
        )
    }

    /// Attach an advisory mutation model
    pub fn with_guidance(mut self, guidance: Box<dyn NeuralGuidance>) -> Self {
        self.guidance = Some(guidance);
        self
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn hall_of_fame(&self) -> &HallOfFame {
        &self.hall_of_fame
    }

    pub fn records(&self) -> &[GenerationRecord] {
        &self.records
    }

    pub fn target(&self) -> &TargetSequence {
        &self.target
    }

    fn transition(&mut self, next: EngineState) {
        log::trace!("Engine state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Fill the first generation with random formulas
    pub fn initialize(&mut self) {
        let individuals = (0..self.config.population_size)
            .map(|_| Individual::new(self.generator.initial_formula(&mut self.rng)))
            .collect();
        self.population = Population::new(individuals, 1);
        self.records.clear();
        self.transition(EngineState::Ready);
    }

    /// Run every remaining generation
    pub fn run<C: ProgressCallback>(&mut self, mut callback: C) -> Result<EvolutionOutcome> {
        while self.state != EngineState::Terminated {
            self.step(&mut callback)?;
        }

        Ok(EvolutionOutcome {
            population: self.population.clone(),
            best: self.hall_of_fame.best().cloned(),
            hall_of_fame: self.hall_of_fame.get_all().to_vec(),
            records: self.records.clone(),
        })
    }

    /// Evaluate and rank the current generation, then replace it unless it
    /// was the last one.
    pub fn step<C: ProgressCallback + ?Sized>(&mut self, callback: &mut C) -> Result<GenerationRecord> {
        match self.state {
            EngineState::Uninitialized => self.initialize(),
            EngineState::Terminated => {
                return Err(PrimeSearchError::InvalidState(
                    "the run has already terminated".to_string()
                ))
            }
            _ => {}
        }

        let generation = self.population.generation;
        callback.on_generation_start(generation);

        self.transition(EngineState::Evaluating);
        self.evaluate_population();
        self.apply_novelty();

        self.transition(EngineState::Ranking);
        let best = self
            .population
            .best()
            .ok_or_else(|| PrimeSearchError::InvalidState("population is empty".to_string()))?;
        let record = GenerationRecord::from_best(generation, best)
            .ok_or_else(|| PrimeSearchError::InvalidState("best individual was not evaluated".to_string()))?;
        for individual in &self.population.individuals {
            self.hall_of_fame.try_add(individual, generation);
        }

        callback.on_generation_complete(&record);
        self.records.push(record.clone());

        if generation >= self.config.generations {
            self.transition(EngineState::Terminated);
        } else {
            self.replace_population();
        }

        Ok(record)
    }

    fn evaluate_population(&mut self) {
        let fresh = score_individuals(
            &self.evaluator,
            &self.cache,
            &self.target,
            self.config.parallel_evaluation,
            &mut self.population.individuals,
        );

        log::debug!(
            "Generation {}: evaluated {} formulas, {} reused",
            self.population.generation,
            fresh,
            self.population.len() - fresh
        );
    }

    /// Behavioural novelty needs every output vector, so it runs after the
    /// whole generation is evaluated.
    fn apply_novelty(&mut self) {
        apply_population_novelty(
            &self.novelty,
            &self.evaluator,
            &self.target,
            &mut self.population.individuals,
        );
    }

    fn replace_population(&mut self) {
        let current = std::mem::take(&mut self.population);
        let size = self.config.population_size;
        let next_generation = current.generation + 1;

        self.transition(EngineState::Selecting);
        let elites = select_elites(&current, self.config.elitism_count);
        let pool = self.select_parents(&current);

        self.transition(EngineState::Varying);
        let open = size - elites.len();
        let offspring: Vec<Individual> = (0..open)
            .map(|_| Individual::new(self.breed(&current, &pool, next_generation)))
            .collect();

        let mut next: Vec<Individual> = elites
            .iter()
            .map(|&i| current.individuals[i].clone())
            .collect();

        match self.config.selection_method {
            SelectionMethod::Tournament => next.extend(offspring),
            SelectionMethod::Pareto => {
                // Non-elite parents compete with their offspring for the open slots
                let candidates: Vec<Individual> = current
                    .individuals
                    .into_iter()
                    .enumerate()
                    .filter(|(i, _)| !elites.contains(i))
                    .map(|(_, individual)| individual)
                    .chain(offspring)
                    .collect();
                next.extend(self.truncate_by_front(candidates, open));
            }
        }

        self.inject_immigrants(&mut next, elites.len(), next_generation);

        self.population = Population::new(next, next_generation);
        self.transition(EngineState::Replaced);
    }

    /// Keep `count` of `candidates` by front rank, then crowding distance
    fn truncate_by_front(&self, mut candidates: Vec<Individual>, count: usize) -> Vec<Individual> {
        score_individuals(
            &self.evaluator,
            &self.cache,
            &self.target,
            self.config.parallel_evaluation,
            &mut candidates,
        );
        apply_population_novelty(&self.novelty, &self.evaluator, &self.target, &mut candidates);

        let survivors = pareto_survivors(&candidates, &self.config.objectives, count);
        log::debug!(
            "Pareto truncation kept {} of {} candidates",
            survivors.len(),
            candidates.len()
        );

        let mut slots: Vec<Option<Individual>> = candidates.into_iter().map(Some).collect();
        survivors
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect()
    }

    /// Parent pool of `population_size` indices into `current`
    fn select_parents(&mut self, current: &Population) -> Vec<usize> {
        let size = self.config.population_size;
        match self.config.selection_method {
            SelectionMethod::Tournament => {
                let fitness = current.fitness();
                (0..size)
                    .map(|_| tournament_selection(&fitness, self.config.tournament_size, &mut self.rng))
                    .collect()
            }
            SelectionMethod::Pareto => {
                let ranking = rank_individuals(&current.individuals, &self.config.objectives);
                let pairs = ranking.pairs();

                log::debug!(
                    "Pareto ranking: {} fronts, first front size {}",
                    ranking.fronts.len(),
                    ranking.fronts.first().map(Vec::len).unwrap_or(0)
                );

                (0..size)
                    .map(|_| pareto_tournament_selection(&pairs, self.config.tournament_size, &mut self.rng))
                    .collect()
            }
        }
    }

    fn breed(&mut self, current: &Population, pool: &[usize], generation: usize) -> Formula {
        let child = if self.rng.gen::<f64>() < self.config.crossover_rate {
            let (a, b) = self.pick_two(pool);
            crossover(
                &current.individuals[a].formula,
                &current.individuals[b].formula,
                self.config.crossover_policy,
                self.config.crossover_noise,
                &mut self.rng,
            )
        } else {
            let parent = pool[self.rng.gen_range(0..pool.len())];
            self.mutate_parent(&current.individuals[parent])
        };

        let child = if self.config.second_mutation_pass {
            mutate(
                &child,
                self.config.mutation_rate,
                self.config.mutation_policy,
                self.config.max_mutation,
                &self.generator,
                &mut self.rng,
            )
        } else {
            child
        };

        let origin = child.metadata.origin;
        child.with_origin(origin, generation)
    }

    fn pick_two(&mut self, pool: &[usize]) -> (usize, usize) {
        if pool.len() < 2 {
            return (pool[0], pool[0]);
        }
        let first = self.rng.gen_range(0..pool.len());
        let mut second = self.rng.gen_range(0..pool.len() - 1);
        if second >= first {
            second += 1;
        }
        (pool[first], pool[second])
    }

    /// Mutation, consulting the guidance model first when one is attached
    fn mutate_parent(&mut self, parent: &Individual) -> Formula {
        let (Some(guidance), Some(diagnostics)) = (&self.guidance, parent.diagnostics()) else {
            return mutate(
                &parent.formula,
                self.config.mutation_rate,
                self.config.mutation_policy,
                self.config.max_mutation,
                &self.generator,
                &mut self.rng,
            );
        };

        if self.rng.gen::<f64>() >= self.config.mutation_rate {
            return parent.formula.clone();
        }

        match guidance.suggest(&parent.formula, diagnostics) {
            Ok(Some(adjustment)) => match apply_adjustment(&parent.formula, &adjustment) {
                Ok(guided) => return guided,
                Err(mismatch) => log::debug!("Guidance not applicable to {}: {}", parent.formula, mismatch),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Guidance failed for {}, using default mutation: {}", parent.formula, e),
        }

        mutate(
            &parent.formula,
            1.0,
            self.config.mutation_policy,
            self.config.max_mutation,
            &self.generator,
            &mut self.rng,
        )
    }

    /// Replace a fixed share of non-elite slots with fresh random formulas
    fn inject_immigrants(&mut self, next: &mut [Individual], elite_count: usize, generation: usize) {
        let open_slots = next.len() - elite_count;
        let count = immigrant_count(next.len(), self.config.immigrant_fraction).min(open_slots);
        if count == 0 {
            return;
        }

        for slot in index::sample(&mut self.rng, open_slots, count).into_iter() {
            let formula = self
                .generator
                .random_formula(&mut self.rng)
                .with_origin(FormulaOrigin::Immigrant, generation);
            next[elite_count + slot] = Individual::new(formula);
        }
    }
}

/// Score every individual that has no diagnostics yet, reusing cached
/// results. Returns how many were freshly evaluated.
fn score_individuals(
    evaluator: &DiagnosticsEvaluator,
    cache: &DiagnosticsCache,
    target: &TargetSequence,
    parallel: bool,
    individuals: &mut [Individual],
) -> usize {
    let mut pending = Vec::new();
    for (i, individual) in individuals.iter_mut().enumerate() {
        if individual.is_evaluated() {
            continue;
        }
        match cache.get(&individual.formula.canonical_string()) {
            Some(diagnostics) => individual.set_diagnostics(diagnostics),
            None => pending.push(i),
        }
    }

    let scored: Vec<Diagnostics> = {
        let individuals = &*individuals;
        if parallel {
            pending
                .par_iter()
                .map(|&i| evaluator.evaluate(&individuals[i].formula.root, target))
                .collect()
        } else {
            pending
                .iter()
                .map(|&i| evaluator.evaluate(&individuals[i].formula.root, target))
                .collect()
        }
    };

    let fresh = pending.len();
    for (i, diagnostics) in pending.into_iter().zip(scored) {
        let individual = &mut individuals[i];
        cache.set(individual.formula.canonical_string(), diagnostics.clone());
        individual.set_diagnostics(diagnostics);
    }
    fresh
}

fn apply_population_novelty(
    tracker: &NoveltyTracker,
    evaluator: &DiagnosticsEvaluator,
    target: &TargetSequence,
    individuals: &mut [Individual],
) {
    let scores = {
        let outputs: Vec<&[f64]> = individuals
            .iter()
            .map(|ind| ind.diagnostics().map(|d| d.outputs.as_slice()).unwrap_or(&[]))
            .collect();
        tracker.compute(&outputs)
    };

    for (individual, score) in individuals.iter_mut().zip(scores) {
        if let Some(diagnostics) = individual.diagnostics_mut() {
            evaluator.apply_novelty(diagnostics, score, target);
        }
    }
}

fn rank_individuals(individuals: &[Individual], objectives: &[ObjectiveConfig]) -> ParetoRanking {
    let values: Vec<Vec<f64>> = individuals
        .iter()
        .map(|ind| ind.objectives(objectives))
        .collect();
    let directions: Vec<OptimizationDirection> = objectives.iter().map(|c| c.direction).collect();
    ParetoRanking::compute(&values, &directions)
}

/// Indices of the `count` candidates that survive non-dominated sorting,
/// best front first and, within the cut front, widest crowding first
pub fn pareto_survivors(candidates: &[Individual], objectives: &[ObjectiveConfig], count: usize) -> Vec<usize> {
    rank_individuals(candidates, objectives).select_survivors(count)
}

/// Indices of the `count` individuals with the highest combined fitness
pub fn select_elites(population: &Population, count: usize) -> Vec<usize> {
    let mut ranked = population.ranked_indices();
    ranked.truncate(count);
    ranked
}

/// Immigrants per generation: `fraction` of the population, at least one
/// whenever the fraction is non-zero
pub fn immigrant_count(population_size: usize, fraction: f64) -> usize {
    if fraction <= 0.0 {
        return 0;
    }
    ((population_size as f64 * fraction).floor() as usize).max(1)
}
