pub mod accuracy;
pub mod shape;
pub mod engine;

pub use accuracy::{AccuracyMetrics, ClosenessForm, HitPolicy};
pub use shape::ShapeMetrics;
pub use engine::MetricsEngine;
