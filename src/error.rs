use std::fmt::{self, Debug, Display};
use std::io;
use std::path::PathBuf;

use plotters::drawing::DrawingAreaErrorKind;

/// Provides `PipelineError` and maps other errors to
/// convert to a `PipelineError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum PipelineError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    /// The shared library or its entry point could not be bound. Carries the loader's error
    /// as-is.
    NativeBinding(libloading::Error),
    /// A distribution file does not hold `horizon + 1` values.
    InvalidDistributionLength {
        expected: usize,
        generation_time: usize,
        incubation_period: usize,
    },
    /// A buffer handed to the native routine does not have the length it reads.
    BufferLength {
        expected: usize,
        found: usize,
    },
    InvalidNumber {
        path: PathBuf,
        line: usize,
        token: String,
    },
    /// The time evolution file is absent when it is read.
    MissingOutputFile(PathBuf),
    MalformedRow {
        line: usize,
        reason: String,
    },
    UnknownVariable(String),
    UnknownColor(String),
    PlotError(String),
}

impl From<io::Error> for PipelineError {
    fn from(error: io::Error) -> Self {
        PipelineError::IoError(error)
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(error: serde_json::Error) -> Self {
        PipelineError::JsonError(error)
    }
}

impl From<libloading::Error> for PipelineError {
    fn from(error: libloading::Error) -> Self {
        PipelineError::NativeBinding(error)
    }
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for PipelineError {
    fn from(error: DrawingAreaErrorKind<E>) -> Self {
        PipelineError::PlotError(error.to_string())
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::IoError(error) => Some(error),
            PipelineError::JsonError(error) => Some(error),
            PipelineError::NativeBinding(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PipelineError::IoError(error) => write!(f, "I/O error: {error}"),
            PipelineError::JsonError(error) => write!(f, "invalid configuration: {error}"),
            PipelineError::NativeBinding(error) => {
                write!(f, "could not bind the simulation library: {error}")
            }
            PipelineError::InvalidDistributionLength {
                expected,
                generation_time,
                incubation_period,
            } => write!(
                f,
                "expected {expected} values in the distributions, \
                 but got {generation_time} and {incubation_period}"
            ),
            PipelineError::BufferLength { expected, found } => write!(
                f,
                "the simulation routine reads {expected} values per buffer, got {found}"
            ),
            PipelineError::InvalidNumber { path, line, token } => write!(
                f,
                "{}:{line}: `{token}` is not a number",
                path.display()
            ),
            PipelineError::MissingOutputFile(path) => {
                write!(f, "{} does not exist", path.display())
            }
            PipelineError::MalformedRow { line, reason } => {
                write!(f, "malformed row at line {line}: {reason}")
            }
            PipelineError::UnknownVariable(name) => write!(
                f,
                "unknown variable `{name}`; expected one of S, I, Q, R, D"
            ),
            PipelineError::UnknownColor(name) => write!(f, "unknown color `{name}`"),
            PipelineError::PlotError(message) => write!(f, "plotting failed: {message}"),
        }
    }
}
