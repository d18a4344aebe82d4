use std::fmt::{self, Display};
use std::io;

use crate::parameters::ParametersBuilderError;

/// Provides `GridSpreadError` and maps to other errors to
/// convert to a `GridSpreadError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum GridSpreadError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
    /// Invalid construction parameters. Raised before any simulation state exists.
    ParameterError(String),
    ReportError(String),
    GridSpreadError(String),
}

impl From<io::Error> for GridSpreadError {
    fn from(error: io::Error) -> Self {
        GridSpreadError::IoError(error)
    }
}

impl From<serde_json::Error> for GridSpreadError {
    fn from(error: serde_json::Error) -> Self {
        GridSpreadError::JsonError(error)
    }
}

impl From<csv::Error> for GridSpreadError {
    fn from(error: csv::Error) -> Self {
        GridSpreadError::CSVError(error)
    }
}

impl From<ParametersBuilderError> for GridSpreadError {
    fn from(error: ParametersBuilderError) -> Self {
        GridSpreadError::ParameterError(error.to_string())
    }
}

impl From<String> for GridSpreadError {
    fn from(error: String) -> Self {
        GridSpreadError::GridSpreadError(error)
    }
}

impl From<&str> for GridSpreadError {
    fn from(error: &str) -> Self {
        GridSpreadError::GridSpreadError(error.to_string())
    }
}

impl std::error::Error for GridSpreadError {}

impl Display for GridSpreadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GridSpreadError::ParameterError(msg) => write!(f, "Invalid parameters: {msg}"),
            GridSpreadError::ReportError(msg) => write!(f, "Report error: {msg}"),
            _ => write!(f, "Error: {self:?}"),
        }
    }
}
