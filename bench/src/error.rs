use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error(transparent)]
    Index(#[from] indexes::IndexError),

    #[error(transparent)]
    Pattern(#[from] storage::PatternError),

    #[error(transparent)]
    Load(#[from] storage::LoadError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Usage(String),

    #[error("{tool} failed ({status}): {stderr}")]
    ExternalTool {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("malformed artifact {}: {reason}", path.display())]
    Artifact { path: PathBuf, reason: String },

    #[error("index has not been built")]
    NotBuilt,

    #[error("{implementation} does not support {operation}")]
    Unsupported {
        implementation: &'static str,
        operation: &'static str,
    },

    #[error("{0} requires pattern files")]
    MissingPatterns(&'static str),
}

pub type Result<T> = std::result::Result<T, BenchError>;
