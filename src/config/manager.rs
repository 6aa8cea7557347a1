use super::{
    evolution::EvolutionConfig,
    fitness::FitnessConfig,
    generation::GeneratorConfig,
    run::RunConfig,
    traits::ConfigSection,
};
use crate::error::PrimeSearchError;
use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of environment variables that override file values
pub const ENV_PREFIX: &str = "PRIMESEARCH";

/// Every run parameter. The sections are flattened, so on disk this is a
/// single flat mapping of named parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(flatten)]
    pub evolution: EvolutionConfig,
    #[serde(flatten)]
    pub generator: GeneratorConfig,
    #[serde(flatten)]
    pub fitness: FitnessConfig,
    #[serde(flatten)]
    pub run: RunConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), PrimeSearchError> {
        self.evolution.validate()?;
        self.generator.validate()?;
        self.fitness.validate()?;
        self.run.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: AppConfig,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Load a JSON or TOML file (format from the extension), then apply
    /// `PRIMESEARCH_*` environment overrides.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), PrimeSearchError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        self.install(settings.try_deserialize()?)
    }

    pub fn load_from_str(&mut self, contents: &str, format: FileFormat) -> Result<(), PrimeSearchError> {
        let settings = Config::builder()
            .add_source(File::from_str(contents, format))
            .build()?;

        self.install(settings.try_deserialize()?)
    }

    fn install(&mut self, config: AppConfig) -> Result<(), PrimeSearchError> {
        config.validate()?;
        log::debug!(
            "Loaded configuration: population {}, generations {}, seed {:?}",
            config.evolution.population_size,
            config.evolution.generations,
            config.evolution.seed
        );
        self.config = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PrimeSearchError> {
        let toml_str = toml::to_string_pretty(&self.config)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config.clone()
    }

    pub fn update<F>(&mut self, f: F) -> Result<(), PrimeSearchError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut candidate = self.config.clone();
        f(&mut candidate);
        candidate.validate()?;
        self.config = candidate;
        Ok(())
    }
}
