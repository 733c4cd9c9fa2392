//! Error types for stockview
//!
//! This module defines domain-specific error types that provide clear,
//! actionable error messages to users.

use thiserror::Error;

/// Validation errors for user input in the TUI and CLI.
///
/// These errors are shown directly to users and should be clear and actionable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Ticker is required")]
    EmptyTicker,

    #[error("Invalid ticker symbol: {0}")]
    InvalidTicker(String),

    #[error("You can compare at most {0} tickers")]
    TooManyTickers(usize),

    #[error("Both start and end dates are required")]
    DateRequired,

    #[error("Invalid date format: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Start date {start} is after end date {end}")]
    InvertedDateRange { start: String, end: String },

    #[error("Unknown period: {0}")]
    UnknownPeriod(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
}

/// Failures talking to the dashboard backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend returned HTTP {0}")]
    Status(u16),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The backend answered but reported a logical error in its payload.
    #[error("Backend error: {0}")]
    Backend(String),
}
