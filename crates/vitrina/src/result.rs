//! Result and error types for Vitrina.

use thiserror::Error;

/// Result type for Vitrina operations
pub type VitrinaResult<T> = Result<T, VitrinaError>;

/// Errors that can occur while driving a scenario
#[derive(Debug, Error)]
pub enum VitrinaError {
    /// Browser executable not found
    #[error("Browser not found. Install Chromium or set CHROMIUM_PATH")]
    BrowserNotFound,

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Page error (element query, click dispatch, value commit)
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// Navigation failure. Fatal to the current scenario only.
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed to load
        url: String,
        /// Error message
        message: String,
    },

    /// Bounded wait expired
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Expected UI/network state not observed within the wait budget
    #[error("Assertion failed in '{scenario}': expected {expected}, observed {observed}")]
    AssertionFailed {
        /// Scenario that was running
        scenario: String,
        /// What the scenario expected to observe
        expected: String,
        /// What was actually observed when the wait expired
        observed: String,
    },

    /// Network interception rule could not be installed.
    /// Fatal to the current scenario only.
    #[error("Interception setup failed: {message}")]
    InterceptionSetup {
        /// Error message
        message: String,
    },

    /// JavaScript evaluation error
    #[error("Evaluation failed: {message}")]
    Eval {
        /// Error message
        message: String,
    },

    /// Fixture or selector map could not be loaded or failed validation
    #[error("Fixture error: {message}")]
    Fixture {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VitrinaError {
    /// Build an assertion failure with expected/observed context.
    pub fn assertion(
        scenario: impl Into<String>,
        expected: impl Into<String>,
        observed: impl Into<String>,
    ) -> Self {
        Self::AssertionFailed {
            scenario: scenario.into(),
            expected: expected.into(),
            observed: observed.into(),
        }
    }
}
