pub mod features;
pub mod guidance;

pub use features::diagnostics_features;
pub use guidance::{Adjustment, DeltaPredictor, NeuralGuidance, PredictorWeights};
