use crate::config::{CrossoverPolicy, MutationPolicy};
use crate::engines::generation::ast::{Formula, FormulaOrigin};
use crate::engines::generation::generator::FormulaGenerator;
use crate::engines::generation::pareto::crowded_comparison;
use crate::engines::generation::polynomial::{Polynomial, MULTIPLICATIVE_TERMS};
use crate::error::StructuralMismatch;
use crate::ml::guidance::Adjustment;
use rand::Rng;

/// Tournament selection: index of the best of `tournament_size` random picks
pub fn tournament_selection<R: Rng>(
    fitness: &[f64],
    tournament_size: usize,
    rng: &mut R,
) -> usize {
    let mut best_idx = rng.gen_range(0..fitness.len());
    let mut best_fitness = fitness[best_idx];

    for _ in 1..tournament_size {
        let idx = rng.gen_range(0..fitness.len());
        if fitness[idx] > best_fitness {
            best_idx = idx;
            best_fitness = fitness[idx];
        }
    }

    best_idx
}

/// Tournament over `(pareto_rank, crowding_distance)` using the crowded comparison
pub fn pareto_tournament_selection<R: Rng>(
    ranking: &[(usize, f64)],
    tournament_size: usize,
    rng: &mut R,
) -> usize {
    let mut best_idx = rng.gen_range(0..ranking.len());

    for _ in 1..tournament_size {
        let idx = rng.gen_range(0..ranking.len());
        if crowded_comparison(ranking[idx], ranking[best_idx]) {
            best_idx = idx;
        }
    }

    best_idx
}

/// Mutate with probability `rate`, otherwise hand back the parent unchanged.
pub fn mutate<R: Rng>(
    formula: &Formula,
    rate: f64,
    policy: MutationPolicy,
    max_delta: i64,
    generator: &FormulaGenerator,
    rng: &mut R,
) -> Formula {
    if rng.gen::<f64>() >= rate {
        return formula.clone();
    }

    let child = match policy {
        MutationPolicy::Regenerate => generator.random_formula(rng),
        MutationPolicy::Coefficient => perturb_coefficients(formula, max_delta, rng)
            .or_else(|_| subtree_mutation(formula, generator, rng))
            .unwrap_or_else(|mismatch| {
                log::debug!("Mutation fell back to parent {}: {}", formula, mismatch);
                formula.clone()
            }),
    };
    child.with_origin(FormulaOrigin::Mutation, formula.metadata.generation)
}

/// Shift every non-zero coefficient by a random delta in `[-max_delta, max_delta]`.
/// Quadratic and linear coefficients are clamped to stay at least 1.
pub fn perturb_coefficients<R: Rng>(
    formula: &Formula,
    max_delta: i64,
    rng: &mut R,
) -> Result<Formula, StructuralMismatch> {
    let polynomial = formula.polynomial.ok_or(StructuralMismatch::NotPolynomial)?;

    let mut coefficients = polynomial.coefficients();
    for (coefficient, multiplicative) in coefficients.iter_mut().zip(MULTIPLICATIVE_TERMS) {
        if *coefficient == 0 {
            continue;
        }
        *coefficient += rng.gen_range(-max_delta..=max_delta);
        if multiplicative {
            *coefficient = (*coefficient).max(1);
        }
    }

    Ok(Formula::from_polynomial(Polynomial::from_coefficients(coefficients)))
}

/// Replace one uniformly chosen node with a fresh random subtree, keeping the
/// tree within the generator's depth bound.
pub fn subtree_mutation<R: Rng>(
    formula: &Formula,
    generator: &FormulaGenerator,
    rng: &mut R,
) -> Result<Formula, StructuralMismatch> {
    let index = rng.gen_range(0..formula.complexity());
    if index == 0 {
        return Ok(generator.random_formula(rng));
    }

    let level = formula
        .root
        .level_of(index)
        .ok_or(StructuralMismatch::MissingNode(index))?;
    let room = generator.depth_bound().saturating_sub(level);
    let replacement = if level <= generator.config().max_depth && room >= 2 {
        generator.random_subtree(level, rng)
    } else {
        generator.random_leaf(rng)
    };

    formula
        .root
        .replace_at(index, replacement)
        .map(Formula::new)
        .ok_or(StructuralMismatch::MissingNode(index))
}

/// Recombine two parents. Never fails: when blending cannot apply, the first
/// parent comes back unchanged.
pub fn crossover<R: Rng>(
    parent1: &Formula,
    parent2: &Formula,
    policy: CrossoverPolicy,
    noise: i64,
    rng: &mut R,
) -> Formula {
    let child = match policy {
        CrossoverPolicy::PickParent => {
            if rng.gen_bool(0.5) {
                parent1.clone()
            } else {
                parent2.clone()
            }
        }
        CrossoverPolicy::CoefficientBlend => match blend_coefficients(parent1, parent2, noise, rng) {
            Ok(child) => child,
            Err(mismatch) => {
                log::trace!("Blend of {} and {} skipped: {}", parent1, parent2, mismatch);
                return parent1.clone();
            }
        },
    };
    child.with_origin(FormulaOrigin::Crossover, parent1.metadata.generation)
}

/// Per coefficient, take either parent's value, then add noise in `[-noise, noise]`.
pub fn blend_coefficients<R: Rng>(
    parent1: &Formula,
    parent2: &Formula,
    noise: i64,
    rng: &mut R,
) -> Result<Formula, StructuralMismatch> {
    let first = parent1.polynomial.ok_or(StructuralMismatch::NotPolynomial)?;
    let second = parent2.polynomial.ok_or(StructuralMismatch::NotPolynomial)?;

    let mut blended = [0i64; 3];
    let pairs = first.coefficients().into_iter().zip(second.coefficients());
    for ((slot, (a, b)), multiplicative) in blended.iter_mut().zip(pairs).zip(MULTIPLICATIVE_TERMS) {
        *slot = if rng.gen_bool(0.5) { a } else { b };
        *slot += rng.gen_range(-noise..=noise);
        if multiplicative {
            *slot = (*slot).max(1);
        }
    }

    Ok(Formula::from_polynomial(Polynomial::from_coefficients(blended)))
}

/// Apply an advisory coefficient adjustment to a polynomial formula
pub fn apply_adjustment(formula: &Formula, adjustment: &Adjustment) -> Result<Formula, StructuralMismatch> {
    let polynomial = formula.polynomial.ok_or(StructuralMismatch::NotPolynomial)?;

    let mut coefficients = polynomial.coefficients();
    for ((coefficient, delta), multiplicative) in coefficients
        .iter_mut()
        .zip(adjustment.deltas())
        .zip(MULTIPLICATIVE_TERMS)
    {
        let was_zero = *coefficient == 0;
        *coefficient = coefficient.saturating_add(delta);
        if multiplicative && !(was_zero && delta == 0) {
            *coefficient = (*coefficient).max(1);
        }
    }

    Ok(Formula::from_polynomial(Polynomial::from_coefficients(coefficients))
        .with_origin(FormulaOrigin::Guided, formula.metadata.generation))
}
