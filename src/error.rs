use thiserror::Error;

use crate::config::ConfigError;
use crate::oracle::OracleError;

/// Errors surfaced to callers of the generator.
///
/// Rejected candidates never appear here; they are absorbed by the pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error("generator state: {0}")]
    State(#[from] bincode::Error),
}
