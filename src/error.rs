// src/error.rs

use thiserror::Error;

/// Errors that can occur while building a simulation or running a scan.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Invalid geometry: {0}")]
    Domain(String),

    #[error("Element '{0}' not found in the parameter table")]
    Lookup(String),

    #[error("Numerical failure: {0}")]
    Numerical(String),

    #[error("Output file '{0}' already exists")]
    AlreadyExists(String),

    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Malformed input file: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
