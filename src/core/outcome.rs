//! Stage outcomes shared by the ingest and report pipelines

use thiserror::Error;

/// Failure of a single pipeline stage.
///
/// Feed hiccups and store rejections are expected business outcomes, so every
/// stage returns one of these instead of panicking. Orchestrators pass them
/// through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    #[error("{message}")]
    Fetch {
        status: Option<u16>,
        message: String,
    },
    #[error("{0}")]
    Parse(String),
    #[error("{0}")]
    Store(String),
}

impl StageError {
    /// Status code attached to the failure, if the stage observed one.
    pub fn code(&self) -> Option<u16> {
        match self {
            StageError::Fetch { status, .. } => *status,
            StageError::Parse(_) | StageError::Store(_) => None,
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            StageError::Fetch { .. } => "fetch",
            StageError::Parse(_) => "parse",
            StageError::Store(_) => "store",
        }
    }
}

pub type Outcome<T> = Result<T, StageError>;
