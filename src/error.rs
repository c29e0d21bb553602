use std::error::Error;
use std::fmt;
use tokio_cron_scheduler::JobSchedulerError;

/// Custom Error and Result types to unify errors from all sources.
pub type TrackerResult<T> = Result<T, TrackerError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// The session cookie was rejected (expired or incorrect).
    InvalidCredential,
    /// The requested contest does not exist upstream.
    InvalidContestId,
    /// Network, parse or browser automation failure.
    Unexpected(String),
    Scheduler(String),
    Config(String),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TrackerError::InvalidCredential => write!(f, "Invalid session cookie"),
            TrackerError::InvalidContestId => write!(f, "Invalid contest ID"),
            TrackerError::Unexpected(s) => write!(f, "An unexpected error occurred: {}", s),
            TrackerError::Scheduler(s) => write!(f, "Scheduler Error: {}", s),
            TrackerError::Config(s) => write!(f, "Config Error: {}", s),
        }
    }
}

impl Error for TrackerError {}

impl From<reqwest::Error> for TrackerError {
    fn from(error: reqwest::Error) -> Self {
        TrackerError::Unexpected(format!("HTTP: {error}"))
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(error: serde_json::Error) -> Self {
        TrackerError::Unexpected(format!("JSON: {error}"))
    }
}

impl From<fantoccini::error::NewSessionError> for TrackerError {
    fn from(error: fantoccini::error::NewSessionError) -> Self {
        TrackerError::Unexpected(format!("WebDriver session: {error}"))
    }
}

impl From<fantoccini::error::CmdError> for TrackerError {
    fn from(error: fantoccini::error::CmdError) -> Self {
        TrackerError::Unexpected(format!("WebDriver command: {error}"))
    }
}

impl From<JobSchedulerError> for TrackerError {
    fn from(error: JobSchedulerError) -> Self {
        TrackerError::Scheduler(error.to_string())
    }
}

impl From<figment::Error> for TrackerError {
    fn from(error: figment::Error) -> Self {
        TrackerError::Config(error.to_string())
    }
}
