use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrimeSearchError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Config source error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid engine state: {0}")]
    InvalidState(String),

    #[error("Guidance error: {0}")]
    Guidance(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// A variation operator could not apply its transform to the given shape.
/// Never escapes the operator layer: callers fall back to a parent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralMismatch {
    #[error("formula is not in polynomial normal form")]
    NotPolynomial,

    #[error("no node at preorder index {0}")]
    MissingNode(usize),
}

pub type Result<T> = std::result::Result<T, PrimeSearchError>;
