// Crate-level error returned by the application layer

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::{SolverError, ValidationError};
use crate::infrastructure::lp_writer::ExportError;

#[derive(Debug, Error)]
pub enum SourcingError {
    #[error("Invalid problem data: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

pub type Result<T> = std::result::Result<T, SourcingError>;
