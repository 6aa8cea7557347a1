pub mod diagnostics;
pub mod expression;

pub use diagnostics::{Diagnostics, DiagnosticsEvaluator};
pub use expression::{evaluate, EvaluationFailure};
