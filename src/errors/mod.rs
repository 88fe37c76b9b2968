/// Error handling for the market-data fetcher
///
/// One error type for every operation. Expected failures (provider errors,
/// transport, bad JSON) are absorbed at the operation boundary and surface as
/// `success = false` plus an [`ErrorSummary`]; nothing in the library exits
/// the process.
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid input: {0}")] InvalidInput(String),

    #[error("Transport error: {0}")] Transport(String),

    #[error("Parse error: {0}")] Parse(String),

    #[error("Upstream error: {0}")] Upstream(String),

    #[error("Configuration error: {0}")] Config(String),

    #[error("IO error: {0}")] Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")] Serialization(#[from] serde_json::Error),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::InvalidInput(_) => ErrorKind::InvalidInput,
            FetchError::Transport(_) => ErrorKind::Transport,
            FetchError::Parse(_) => ErrorKind::Parse,
            FetchError::Upstream(_) => ErrorKind::Upstream,
            FetchError::Config(_) => ErrorKind::Config,
            FetchError::Io(_) => ErrorKind::Io,
            FetchError::Serialization(_) => ErrorKind::Serialization,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    Transport,
    Parse,
    Upstream,
    Config,
    Io,
    Serialization,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Transport => "transport",
            ErrorKind::Parse => "parse",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Config => "config",
            ErrorKind::Io => "io",
            ErrorKind::Serialization => "serialization",
        };
        write!(f, "{}", name)
    }
}

/// Serializable record of the error that ended an operation early
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&FetchError> for ErrorSummary {
    fn from(err: &FetchError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
