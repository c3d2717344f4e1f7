//! Error handling for the esnn CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Simulation core error
    #[error("simulation error: {0}")]
    Core(#[from] esnn_core::SnnError),

    /// Storage layer error
    #[error("storage error: {0}")]
    Storage(#[from] esnn_storage::StorageError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file deserialization error
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error
    #[error("{0}")]
    Generic(#[from] anyhow::Error),

    /// Invalid command-line arguments
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid-arguments error
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArgs(msg.into())
    }
}
