use crate::engines::generation::polynomial::Polynomial;
use crate::types::Expression;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How a formula came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FormulaOrigin {
    #[default]
    Random,
    Seeded,
    Mutation,
    Crossover,
    Guided,
    Immigrant,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormulaMetadata {
    pub origin: FormulaOrigin,
    pub generation: usize,
}

/// An expression tree plus its polynomial tag.
///
/// Equality is structural: it compares the tree and the tag and ignores
/// metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formula {
    pub root: Arc<Expression>,
    pub polynomial: Option<Polynomial>,
    pub metadata: FormulaMetadata,
}

impl Formula {
    pub fn new(root: Expression) -> Self {
        Self {
            root: Arc::new(root),
            polynomial: None,
            metadata: FormulaMetadata::default(),
        }
    }

    pub fn from_polynomial(polynomial: Polynomial) -> Self {
        Self {
            root: Arc::new(polynomial.to_expression()),
            polynomial: Some(polynomial),
            metadata: FormulaMetadata::default(),
        }
    }

    pub fn with_origin(mut self, origin: FormulaOrigin, generation: usize) -> Self {
        self.metadata = FormulaMetadata { origin, generation };
        self
    }

    pub fn is_polynomial(&self) -> bool {
        self.polynomial.is_some()
    }

    pub fn complexity(&self) -> usize {
        self.root.size()
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Display form, used as the deduplication and cache key
    pub fn canonical_string(&self) -> String {
        self.root.to_string()
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.polynomial == other.polynomial && self.root == other.root
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
