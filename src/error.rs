//! Error types for trophic.
//!
//! Everything that aborts a model evaluation is an [`Error`]. Recoverable
//! data problems are reported through [`crate::diagnostics::Diagnostics`]
//! instead.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while loading, binding or scoring.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unrecognised function '{name}' for {component}")]
    UnknownFunction { component: String, name: String },

    #[error("{component} - failed to match {kind} '{name}'")]
    MissingEntity {
        component: String,
        kind: &'static str,
        name: String,
    },

    #[error("wrong number of columns in {path} line {line} - should be {expected}, found {found}")]
    ColumnCount {
        path: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("failed to parse {path} line {line}: {reason}")]
    Parse {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("{component} scored before predators and preys were bound")]
    NotBound { component: String },

    #[error("{component} is already bound")]
    AlreadyBound { component: String },

    #[error("{component} - invalid timestep {index}")]
    InvalidTimestep { component: String, index: usize },

    #[error("{component} - aggregated output has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        component: String,
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },

    #[error("{component} - length groups for preys not compatible")]
    IncompatibleLengths { component: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
