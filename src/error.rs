//! Error types for PokéGPT
//!
//! This module defines all error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for PokéGPT operations
///
/// Covers configuration loading, backend HTTP failures, and the
/// classification the controllers need (most importantly whether a
/// failure means the chat session no longer exists).
#[derive(Error, Debug)]
pub enum PokeGptError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backend does not know the referenced chat session
    #[error("Chat session not found: {0}")]
    SessionNotFound(String),

    /// The backend answered with a non-success status
    #[error("Backend returned {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message extracted from the response body
        message: String,
    },

    /// The backend answered with a body we could not interpret
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A favorites operation failed; carries the user-facing message
    #[error("{0}")]
    Favorites(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type alias for PokéGPT operations
///
/// Uses `anyhow::Error` so callers can attach context; controllers recover
/// the typed [`PokeGptError`] with [`is_session_not_found`].
pub type Result<T> = anyhow::Result<T>;

/// Returns true when the error chain carries [`PokeGptError::SessionNotFound`]
///
/// # Examples
///
/// ```
/// use pokegpt::error::{is_session_not_found, PokeGptError};
///
/// let err: anyhow::Error = PokeGptError::SessionNotFound("abc".to_string()).into();
/// assert!(is_session_not_found(&err));
/// ```
pub fn is_session_not_found(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<PokeGptError>(),
            Some(PokeGptError::SessionNotFound(_))
        )
    })
}
