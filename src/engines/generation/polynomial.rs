use crate::types::{BinaryOp, Expression};
use serde::{Deserialize, Serialize};

/// Integer polynomial of degree at most two: `quadratic·x² + linear·x + constant`.
///
/// Formulas built from this form carry it as a tag, which is what lets the
/// coefficient operators work without any symbolic expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Polynomial {
    pub quadratic: i64,
    pub linear: i64,
    pub constant: i64,
}

/// Coefficients whose sign is held positive by the coefficient operators
pub const MULTIPLICATIVE_TERMS: [bool; 3] = [true, true, false];

impl Polynomial {
    pub fn new(quadratic: i64, linear: i64, constant: i64) -> Self {
        Self {
            quadratic,
            linear,
            constant,
        }
    }

    pub fn linear(k: i64, n: i64) -> Self {
        Self::new(0, k, n)
    }

    pub fn constant(c: i64) -> Self {
        Self::new(0, 0, c)
    }

    /// `[quadratic, linear, constant]`
    pub fn coefficients(&self) -> [i64; 3] {
        [self.quadratic, self.linear, self.constant]
    }

    pub fn from_coefficients(c: [i64; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }

    pub fn degree(&self) -> usize {
        if self.quadratic != 0 {
            2
        } else if self.linear != 0 {
            1
        } else {
            0
        }
    }

    pub fn value_at(&self, n: i64) -> i64 {
        self.quadratic
            .saturating_mul(n.saturating_mul(n))
            .saturating_add(self.linear.saturating_mul(n))
            .saturating_add(self.constant)
    }

    /// Rebuild the expression tree, leaving out zero terms
    pub fn to_expression(&self) -> Expression {
        let mut terms = Vec::with_capacity(3);

        if self.quadratic != 0 {
            terms.push(Expression::binary(
                BinaryOp::Mul,
                Expression::Constant(self.quadratic as f64),
                Expression::binary(BinaryOp::Pow, Expression::Variable, Expression::Constant(2.0)),
            ));
        }
        if self.linear != 0 {
            terms.push(Expression::binary(
                BinaryOp::Mul,
                Expression::Constant(self.linear as f64),
                Expression::Variable,
            ));
        }
        if self.constant != 0 || terms.is_empty() {
            terms.push(Expression::Constant(self.constant as f64));
        }

        let mut iter = terms.into_iter();
        let first = iter.next().unwrap_or(Expression::Constant(0.0));
        iter.fold(first, |acc, term| Expression::binary(BinaryOp::Add, acc, term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::evaluation::evaluate;

    #[test]
    fn test_expression_matches_integer_value() {
        let poly = Polynomial::new(1, -1, 41);
        let expr = poly.to_expression();
        for n in 1..=10 {
            assert_eq!(evaluate(&expr, n), Ok(poly.value_at(n) as f64));
        }
    }

    #[test]
    fn test_zero_terms_are_omitted() {
        assert_eq!(Polynomial::linear(2, 0).to_expression().to_string(), "(2 * x)");
        assert_eq!(Polynomial::linear(2, 3).to_expression(), Expression::linear(2.0, 3.0));
        assert_eq!(Polynomial::constant(0).to_expression(), Expression::Constant(0.0));
    }

    #[test]
    fn test_degree() {
        assert_eq!(Polynomial::new(3, 0, 1).degree(), 2);
        assert_eq!(Polynomial::linear(1, 0).degree(), 1);
        assert_eq!(Polynomial::constant(7).degree(), 0);
    }
}
