use crate::types::{BinaryOp, Expression, UnaryOp};
use thiserror::Error;

/// Largest magnitude any intermediate value may reach
pub const MAX_MAGNITUDE: f64 = 1e15;

/// Largest exponent magnitude `pow` will attempt
pub const MAX_EXPONENT: f64 = 64.0;

/// Per-position numeric failure. Contained by the diagnostics evaluator.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationFailure {
    #[error("division by zero")]
    DivisionByZero,

    #[error("{0} outside its domain")]
    Domain(&'static str),

    #[error("fractional power of a negative base")]
    ComplexResult,

    #[error("value exceeded the magnitude ceiling")]
    Overflow,
}

pub type EvalResult = std::result::Result<f64, EvaluationFailure>;

/// Substitute `n` for `x` and reduce the tree.
///
/// Never panics: every domain error or runaway magnitude comes back as an
/// `EvaluationFailure`.
pub fn evaluate(expr: &Expression, n: i64) -> EvalResult {
    eval_node(expr, n as f64)
}

fn eval_node(expr: &Expression, x: f64) -> EvalResult {
    let value = match expr {
        Expression::Constant(value) => *value,
        Expression::Variable => x,
        Expression::Unary(op, child) => apply_unary(*op, eval_node(child, x)?)?,
        Expression::Binary(op, left, right) => {
            let lhs = eval_node(left, x)?;
            let rhs = eval_node(right, x)?;
            apply_binary(*op, lhs, rhs)?
        }
    };
    checked(value)
}

fn checked(value: f64) -> EvalResult {
    if !value.is_finite() || value.abs() > MAX_MAGNITUDE {
        Err(EvaluationFailure::Overflow)
    } else {
        Ok(value)
    }
}

fn apply_unary(op: UnaryOp, value: f64) -> EvalResult {
    match op {
        UnaryOp::Sin => Ok(value.sin()),
        UnaryOp::Cos => Ok(value.cos()),
        UnaryOp::Log => {
            if value <= 0.0 {
                Err(EvaluationFailure::Domain("log"))
            } else {
                Ok(value.ln())
            }
        }
        UnaryOp::Exp => Ok(value.exp()),
        UnaryOp::Negate => Ok(-value),
    }
}

fn apply_binary(op: BinaryOp, lhs: f64, rhs: f64) -> EvalResult {
    match op {
        BinaryOp::Add => Ok(lhs + rhs),
        BinaryOp::Sub => Ok(lhs - rhs),
        BinaryOp::Mul => Ok(lhs * rhs),
        BinaryOp::Div => {
            if rhs == 0.0 {
                Err(EvaluationFailure::DivisionByZero)
            } else {
                Ok(lhs / rhs)
            }
        }
        BinaryOp::Pow => power(lhs, rhs),
    }
}

fn power(base: f64, exponent: f64) -> EvalResult {
    if exponent.abs() > MAX_EXPONENT {
        return Err(EvaluationFailure::Overflow);
    }
    if base == 0.0 && exponent < 0.0 {
        return Err(EvaluationFailure::DivisionByZero);
    }
    if base < 0.0 && exponent.fract() != 0.0 {
        return Err(EvaluationFailure::ComplexResult);
    }
    if exponent.fract() == 0.0 {
        Ok(base.powi(exponent as i32))
    } else {
        Ok(base.powf(exponent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x_minus(c: f64) -> Expression {
        Expression::binary(BinaryOp::Sub, Expression::Variable, Expression::Constant(c))
    }

    #[test]
    fn test_linear_evaluation() {
        let expr = Expression::linear(2.0, 1.0);
        assert_eq!(evaluate(&expr, 3), Ok(7.0));
    }

    #[test]
    fn test_log_domain() {
        let expr = Expression::unary(UnaryOp::Log, x_minus(5.0));
        for n in 1..=5 {
            assert_eq!(evaluate(&expr, n), Err(EvaluationFailure::Domain("log")));
        }
        assert!(evaluate(&expr, 6).is_ok());
    }

    #[test]
    fn test_division_by_zero() {
        let expr = Expression::binary(BinaryOp::Div, Expression::Constant(1.0), x_minus(2.0));
        assert_eq!(evaluate(&expr, 2), Err(EvaluationFailure::DivisionByZero));
        assert_eq!(evaluate(&expr, 3), Ok(1.0));
    }

    #[test]
    fn test_fractional_power_of_negative() {
        let expr = Expression::binary(BinaryOp::Pow, x_minus(5.0), Expression::Constant(0.5));
        assert_eq!(evaluate(&expr, 1), Err(EvaluationFailure::ComplexResult));
        assert_eq!(evaluate(&expr, 9), Ok(2.0));
    }

    #[test]
    fn test_runaway_magnitude_is_overflow() {
        let expr = Expression::unary(UnaryOp::Exp, Expression::unary(UnaryOp::Exp, Expression::Variable));
        assert_eq!(evaluate(&expr, 4), Err(EvaluationFailure::Overflow));

        let tower = Expression::binary(
            BinaryOp::Pow,
            Expression::Variable,
            Expression::binary(BinaryOp::Pow, Expression::Variable, Expression::Variable),
        );
        assert_eq!(evaluate(&tower, 5), Err(EvaluationFailure::Overflow));
        assert_eq!(evaluate(&tower, 2), Ok(16.0));
    }

    #[test]
    fn test_zero_is_a_value_not_a_failure() {
        let expr = x_minus(3.0);
        assert_eq!(evaluate(&expr, 3), Ok(0.0));
    }
}
