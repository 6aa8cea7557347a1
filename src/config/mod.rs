pub mod traits;
pub mod evolution;
pub mod generation;
pub mod fitness;
pub mod run;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use evolution::{CrossoverPolicy, EvolutionConfig, MutationPolicy, SelectionMethod};
pub use generation::GeneratorConfig;
pub use fitness::{FitnessConfig, FitnessWeights};
pub use run::RunConfig;
pub use traits::ConfigSection;
