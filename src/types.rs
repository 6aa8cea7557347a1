use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Unary functions available to formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Sin,
    Cos,
    Log,
    Exp,
    Negate,
}

/// Binary arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Log => "log",
            UnaryOp::Exp => "exp",
            UnaryOp::Negate => "neg",
        }
    }
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "**",
        }
    }
}

/// One entry of the configured operator set.
///
/// Serialized by symbol (`"+"`, `"**"`, `"sin"`, ...) so the configuration
/// surface stays a flat list of strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Operator {
    Unary(UnaryOp),
    Binary(BinaryOp),
}

impl Operator {
    pub fn all() -> Vec<Operator> {
        vec![
            Operator::Binary(BinaryOp::Add),
            Operator::Binary(BinaryOp::Sub),
            Operator::Binary(BinaryOp::Mul),
            Operator::Binary(BinaryOp::Div),
            Operator::Binary(BinaryOp::Pow),
            Operator::Unary(UnaryOp::Sin),
            Operator::Unary(UnaryOp::Cos),
            Operator::Unary(UnaryOp::Log),
            Operator::Unary(UnaryOp::Exp),
        ]
    }

    pub fn arity(&self) -> usize {
        match self {
            Operator::Unary(_) => 1,
            Operator::Binary(_) => 2,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Unary(op) => op.symbol(),
            Operator::Binary(op) => op.symbol(),
        }
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "+" | "add" => Operator::Binary(BinaryOp::Add),
            "-" | "sub" => Operator::Binary(BinaryOp::Sub),
            "*" | "mul" => Operator::Binary(BinaryOp::Mul),
            "/" | "div" => Operator::Binary(BinaryOp::Div),
            "**" | "^" | "pow" => Operator::Binary(BinaryOp::Pow),
            "sin" => Operator::Unary(UnaryOp::Sin),
            "cos" => Operator::Unary(UnaryOp::Cos),
            "log" => Operator::Unary(UnaryOp::Log),
            "exp" => Operator::Unary(UnaryOp::Exp),
            "neg" | "negate" => Operator::Unary(UnaryOp::Negate),
            other => return Err(format!("unknown operator '{}'", other)),
        })
    }
}

impl TryFrom<String> for Operator {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.symbol().to_string()
    }
}

/// Immutable expression tree over the single free variable `x`.
///
/// Children sit behind `Arc` so variation operators can share untouched
/// subtrees between parent and child without copying them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Constant(f64),
    Variable,
    Unary(UnaryOp, Arc<Expression>),
    Binary(BinaryOp, Arc<Expression>, Arc<Expression>),
}

impl Expression {
    pub fn constant(value: f64) -> Self {
        Expression::Constant(value)
    }

    pub fn unary(op: UnaryOp, child: Expression) -> Self {
        Expression::Unary(op, Arc::new(child))
    }

    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary(op, Arc::new(left), Arc::new(right))
    }

    /// `k * x + n`, the trivial terminal the generator may emit
    pub fn linear(k: f64, n: f64) -> Self {
        Expression::binary(
            BinaryOp::Add,
            Expression::binary(BinaryOp::Mul, Expression::Constant(k), Expression::Variable),
            Expression::Constant(n),
        )
    }

    /// Number of nodes in the tree
    pub fn size(&self) -> usize {
        match self {
            Expression::Constant(_) | Expression::Variable => 1,
            Expression::Unary(_, child) => 1 + child.size(),
            Expression::Binary(_, left, right) => 1 + left.size() + right.size(),
        }
    }

    /// Depth of the tree; a lone terminal has depth 0
    pub fn depth(&self) -> usize {
        match self {
            Expression::Constant(_) | Expression::Variable => 0,
            Expression::Unary(_, child) => 1 + child.depth(),
            Expression::Binary(_, left, right) => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Expression::Constant(_) | Expression::Variable)
    }

    /// Subtree at a preorder index, root is 0
    pub fn node_at(&self, index: usize) -> Option<&Expression> {
        let mut remaining = index;
        self.find_preorder(&mut remaining)
    }

    fn find_preorder(&self, remaining: &mut usize) -> Option<&Expression> {
        if *remaining == 0 {
            return Some(self);
        }
        *remaining -= 1;
        match self {
            Expression::Constant(_) | Expression::Variable => None,
            Expression::Unary(_, child) => child.find_preorder(remaining),
            Expression::Binary(_, left, right) => left
                .find_preorder(remaining)
                .or_else(|| right.find_preorder(remaining)),
        }
    }

    /// Depth from the root down to the node at a preorder index
    pub fn level_of(&self, index: usize) -> Option<usize> {
        let mut remaining = index;
        self.level_preorder(&mut remaining, 0)
    }

    fn level_preorder(&self, remaining: &mut usize, level: usize) -> Option<usize> {
        if *remaining == 0 {
            return Some(level);
        }
        *remaining -= 1;
        match self {
            Expression::Constant(_) | Expression::Variable => None,
            Expression::Unary(_, child) => child.level_preorder(remaining, level + 1),
            Expression::Binary(_, left, right) => left
                .level_preorder(remaining, level + 1)
                .or_else(|| right.level_preorder(remaining, level + 1)),
        }
    }

    /// Build a new tree with the node at `index` swapped for `replacement`.
    /// Subtrees off the replacement path are shared, not copied.
    pub fn replace_at(&self, index: usize, replacement: Expression) -> Option<Expression> {
        let mut remaining = index;
        self.replace_preorder(&mut remaining, &replacement)
    }

    fn replace_preorder(&self, remaining: &mut usize, replacement: &Expression) -> Option<Expression> {
        if *remaining == 0 {
            return Some(replacement.clone());
        }
        *remaining -= 1;
        match self {
            Expression::Constant(_) | Expression::Variable => None,
            Expression::Unary(op, child) => child
                .replace_preorder(remaining, replacement)
                .map(|new_child| Expression::Unary(*op, Arc::new(new_child))),
            Expression::Binary(op, left, right) => {
                if let Some(new_left) = left.replace_preorder(remaining, replacement) {
                    return Some(Expression::Binary(*op, Arc::new(new_left), Arc::clone(right)));
                }
                right
                    .replace_preorder(remaining, replacement)
                    .map(|new_right| Expression::Binary(*op, Arc::clone(left), Arc::new(new_right)))
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    write!(f, "{}", *value as i64)
                } else {
                    write!(f, "{}", value)
                }
            }
            Expression::Variable => write!(f, "x"),
            Expression::Unary(op, child) => write!(f, "{}({})", op.symbol(), child),
            Expression::Binary(op, left, right) => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
        }
    }
}
