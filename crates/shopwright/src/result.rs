//! Result and error types for Shopwright.

use thiserror::Error;

/// Result type for Shopwright operations
pub type ShopResult<T> = Result<T, ShopError>;

/// Errors that can occur while driving the storefront
#[derive(Debug, Error)]
pub enum ShopError {
    /// A required environment variable is absent or empty
    #[error("Missing required environment variable {name}")]
    MissingEnv {
        /// Variable name
        name: String,
    },

    /// Suite configuration is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// An expectation did not hold before its polling window elapsed
    #[error("Assertion failed for `{locator}`: expected {expected}, got {actual}")]
    Assertion {
        /// Locator description (or `page url`)
        locator: String,
        /// What was expected
        expected: String,
        /// Last observed value
        actual: String,
    },

    /// An action did not become possible in time
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What the operation was waiting for
        waited_for: String,
    },

    /// The login verification endpoint rejected the credentials
    #[error("Login verification failed with responseCode {code}: {message}")]
    ApiVerification {
        /// `responseCode` from the JSON body
        code: u16,
        /// `message` from the JSON body
        message: String,
    },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Driver error (CDP command or script evaluation)
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Download capture error
    #[error("Download failed: {message}")]
    Download {
        /// Error message
        message: String,
    },

    /// Invalid state error (operation called in wrong state)
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ShopError {
    /// Build an assertion failure
    pub fn assertion(
        locator: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Assertion {
            locator: locator.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Build an invalid state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Build a driver error
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// True for errors raised by a verification (assertion or timeout)
    #[must_use]
    pub const fn is_verification_failure(&self) -> bool {
        matches!(self, Self::Assertion { .. } | Self::Timeout { .. })
    }

    /// True for environment or configuration problems that make a run meaningless
    #[must_use]
    pub const fn is_misconfiguration(&self) -> bool {
        matches!(self, Self::MissingEnv { .. } | Self::Config { .. })
    }
}
