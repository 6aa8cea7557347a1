pub mod ast;
pub mod polynomial;
pub mod generator;
pub mod operators;
pub mod pareto;
pub mod novelty;
pub mod population;
pub mod hall_of_fame;
pub mod progress;
pub mod evolution_engine;

pub use ast::{Formula, FormulaMetadata, FormulaOrigin};
pub use polynomial::Polynomial;
pub use generator::FormulaGenerator;
pub use hall_of_fame::{EliteFormula, HallOfFame};
pub use evolution_engine::{EngineState, EvolutionEngine, EvolutionOutcome};
pub use novelty::NoveltyTracker;
pub use population::{Individual, Population};
pub use progress::{ChannelProgressCallback, ConsoleProgressCallback, GenerationRecord, ProgressCallback, ProgressMessage};
pub use pareto::{ObjectiveConfig, OptimizationDirection, ParetoRanking};
