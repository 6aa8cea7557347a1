use crate::config::GeneratorConfig;
use crate::engines::generation::ast::{Formula, FormulaOrigin};
use crate::engines::generation::polynomial::Polynomial;
use crate::types::{Expression, Operator};
use rand::seq::SliceRandom;
use rand::Rng;

/// Builds random formulas top-down.
///
/// `max_depth` bounds operator nesting. Terminals are a bare constant or a
/// `k * x + n` leaf, so a finished tree is at most `max_depth + 2` deep.
#[derive(Debug, Clone)]
pub struct FormulaGenerator {
    config: GeneratorConfig,
}

impl FormulaGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Formula for the initial population: a seeded polynomial or a tree
    pub fn initial_formula<R: Rng>(&self, rng: &mut R) -> Formula {
        if rng.gen::<f64>() < self.config.polynomial_seed_fraction {
            Formula::from_polynomial(self.random_polynomial(rng)).with_origin(FormulaOrigin::Seeded, 0)
        } else {
            self.random_formula(rng)
        }
    }

    /// Random tree. A formula that stops at its root is tagged polynomial.
    pub fn random_formula<R: Rng>(&self, rng: &mut R) -> Formula {
        if self.should_stop(0, rng) {
            return Formula::from_polynomial(self.random_terminal(rng));
        }
        Formula::new(self.random_operator_node(0, rng))
    }

    /// Random subtree to be placed at `level` of an existing tree
    pub fn random_subtree<R: Rng>(&self, level: usize, rng: &mut R) -> Expression {
        if self.should_stop(level, rng) {
            return self.random_terminal(rng).to_expression();
        }
        self.random_operator_node(level, rng)
    }

    /// Linear or quadratic polynomial with positive coefficients
    pub fn random_polynomial<R: Rng>(&self, rng: &mut R) -> Polynomial {
        if rng.gen::<f64>() < self.config.quadratic_probability {
            Polynomial::new(
                rng.gen_range(1..=self.config.max_quad),
                rng.gen_range(1..=self.config.max_mul),
                rng.gen_range(1..=self.config.max_add.max(1)),
            )
        } else {
            Polynomial::linear(
                rng.gen_range(1..=self.config.max_mul),
                rng.gen_range(1..=self.config.max_add.max(1)),
            )
        }
    }

    /// A constant or `k * x + n`, with `k` in `[1, max_mul]` and `n` in `[-max_add, max_add]`
    pub fn random_terminal<R: Rng>(&self, rng: &mut R) -> Polynomial {
        let additive = rng.gen_range(-self.config.max_add..=self.config.max_add);
        if rng.gen::<f64>() < self.config.constant_leaf_probability {
            Polynomial::constant(additive)
        } else {
            Polynomial::linear(rng.gen_range(1..=self.config.max_mul), additive)
        }
    }

    /// Depth-0 node: a bare constant or `x`
    pub fn random_leaf<R: Rng>(&self, rng: &mut R) -> Expression {
        if rng.gen::<f64>() < self.config.constant_leaf_probability {
            Expression::Constant(rng.gen_range(-self.config.max_add..=self.config.max_add) as f64)
        } else {
            Expression::Variable
        }
    }

    /// Deepest tree the generator can produce
    pub fn depth_bound(&self) -> usize {
        self.config.max_depth + 2
    }

    fn should_stop<R: Rng>(&self, level: usize, rng: &mut R) -> bool {
        level >= self.config.max_depth || rng.gen::<f64>() < self.config.early_stop_probability
    }

    fn random_operator_node<R: Rng>(&self, level: usize, rng: &mut R) -> Expression {
        let operator = match self.config.operator_set.choose(rng) {
            Some(op) => *op,
            None => return self.random_terminal(rng).to_expression(),
        };

        match operator {
            Operator::Unary(op) => Expression::unary(op, self.random_subtree(level + 1, rng)),
            Operator::Binary(op) => {
                let left = self.random_subtree(level + 1, rng);
                let right = self.random_subtree(level + 1, rng);
                Expression::binary(op, left, right)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_depth_is_bounded() {
        let generator = FormulaGenerator::new(GeneratorConfig {
            max_depth: 3,
            early_stop_probability: 0.0,
            ..Default::default()
        });
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let formula = generator.random_formula(&mut rng);
            assert!(formula.depth() <= 3 + 2, "too deep: {}", formula);
        }
    }

    #[test]
    fn test_terminal_roots_are_tagged() {
        let generator = FormulaGenerator::new(GeneratorConfig {
            max_depth: 0,
            ..Default::default()
        });
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let formula = generator.random_formula(&mut rng);
            let poly = formula.polynomial.expect("terminal root must be tagged");
            assert_eq!(*formula.root, poly.to_expression());
            assert!(poly.quadratic == 0);
            assert!(poly.constant.abs() <= 50);
        }
    }

    #[test]
    fn test_random_polynomial_ranges() {
        let generator = FormulaGenerator::new(GeneratorConfig::default());
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let poly = generator.random_polynomial(&mut rng);
            assert!((0..=5).contains(&poly.quadratic));
            assert!((1..=10).contains(&poly.linear));
            assert!((1..=50).contains(&poly.constant));
        }
    }

    #[test]
    fn test_same_seed_same_formulas() {
        let generator = FormulaGenerator::new(GeneratorConfig::default());
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..20 {
            assert_eq!(generator.initial_formula(&mut a), generator.initial_formula(&mut b));
        }
    }
}
