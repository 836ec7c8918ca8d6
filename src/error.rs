use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Failed to connect to Chrome: {0}")]
    ConnectionFailed(String),

    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("No page available")]
    NoPage,

    #[error("CDP error: {0}")]
    CdpError(#[from] chromiumoxide::error::CdpError),

    #[error("Timed out after {elapsed:?} waiting for {what}")]
    Timeout { what: String, elapsed: Duration },

    #[error("Calendar never showed '{target}' after {steps} page(s)")]
    ScanLimitExceeded { target: String, steps: usize },

    #[error("Assertion failed: expected '{expected}', got '{actual}'")]
    AssertionFailed { expected: String, actual: String },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, BrowserError>;
