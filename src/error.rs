//! Error types and handling infrastructure for crossold.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! custom error types. The binary layers `anyhow` on top for context.
//!
//! ## Error classes
//!
//! - **Run-fatal**: authentication and configuration failures end the program
//! - **Cycle-fatal**: invalid queries, transport failures and unexpected responses
//!   discard the current search cycle, after which a new query may be submitted
//! - **Input**: malformed query literals are rejected before any request is sent

use thiserror::Error;

/// The main error type for crossold operations.
#[derive(Error, Debug)]
pub enum CrossOldError {
    /// A backend did not confirm the login
    #[error("Authentication failed for {backend}: {message}")]
    Authentication { backend: String, message: String },

    /// The count phase came back without a usable count
    #[error("Sorry, that's not a valid search expression (rejected by {backend}).")]
    InvalidQuery { backend: String },

    /// Network-level failure talking to a backend
    #[error("Request to {backend} failed: {message}")]
    Transport { backend: String, message: String },

    /// The backend answered, but not with what the protocol promises
    #[error("Unexpected response from {backend}: {message}")]
    UnexpectedResponse { backend: String, message: String },

    /// The query literal could not be parsed
    #[error("Malformed search expression: {message}")]
    MalformedInput { message: String },

    /// Configuration file or registry problems
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Terminal or file I/O
    #[error("I/O operation failed: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Standard Result type for crossold operations.
pub type Result<T> = std::result::Result<T, CrossOldError>;

impl CrossOldError {
    pub fn authentication(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Authentication {
            backend: backend.into(),
            message: message.into(),
        }
    }

    pub fn invalid_query(backend: impl Into<String>) -> Self {
        Self::InvalidQuery {
            backend: backend.into(),
        }
    }

    pub fn transport(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            backend: backend.into(),
            message: message.into(),
        }
    }

    pub fn unexpected_response(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            backend: backend.into(),
            message: message.into(),
        }
    }

    pub fn malformed_input(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// True for failures that end only the current search cycle.
    ///
    /// The interactive loop reports these and asks for the next query; anything
    /// else terminates the program.
    pub fn is_cycle_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidQuery { .. }
                | Self::Transport { .. }
                | Self::UnexpectedResponse { .. }
                | Self::MalformedInput { .. }
        )
    }
}

impl From<std::io::Error> for CrossOldError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: "IO operation failed".to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let auth = CrossOldError::authentication("bla", "authenticated was false");
        assert_eq!(
            auth.to_string(),
            "Authentication failed for bla: authenticated was false"
        );

        let invalid = CrossOldError::invalid_query("kab");
        assert_eq!(
            invalid.to_string(),
            "Sorry, that's not a valid search expression (rejected by kab)."
        );

        let malformed = CrossOldError::malformed_input("expected a list");
        assert_eq!(
            malformed.to_string(),
            "Malformed search expression: expected a list"
        );
    }

    #[test]
    fn test_cycle_error_classification() {
        assert!(CrossOldError::invalid_query("a").is_cycle_error());
        assert!(CrossOldError::transport("a", "reset").is_cycle_error());
        assert!(CrossOldError::unexpected_response("a", "object").is_cycle_error());
        assert!(CrossOldError::malformed_input("x").is_cycle_error());

        assert!(!CrossOldError::authentication("a", "no").is_cycle_error());
        assert!(!CrossOldError::config("bad url").is_cycle_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err: CrossOldError = io_err.into();

        match err {
            CrossOldError::Io { message, .. } => {
                assert_eq!(message, "IO operation failed");
            }
            _ => panic!("Expected Io variant"),
        }
    }
}
