//! Error taxonomy for the aggregation pipeline.
//!
//! Every variant is fatal for the run that raised it; callers never skip a
//! point or a row and carry on.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("result file or directory not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error at {}:{line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("no values to aggregate: {what}")]
    EmptyInput { what: String },

    #[error("measurement window is not positive (start {start}, end {end})")]
    DegenerateWindow { start: f64, end: f64 },

    #[error("invalid sweep: {reason}")]
    Sweep { reason: String },

    /// A stage was handed a family or metric that plan validation rules out.
    #[error("unsupported input for {stage}: {what}")]
    Unsupported { stage: &'static str, what: String },
}

impl AggregateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            AggregateError::NotFound { path }
        } else {
            AggregateError::Io { path, source }
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        AggregateError::Parse {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AggregateError>;
