//! Error taxonomy shared across the equisearch crates.
//!
//! Mirrors the error taxonomy of spec section 7: every pipeline stage
//! returns one of these variants instead of panicking or using exceptions
//! for control flow. The HTTP/boundary layer (out of scope here) maps
//! variants to status codes.

use std::fmt;

/// Errors that can surface from the equisearch core pipeline.
#[derive(Debug)]
pub enum EquisearchError {
    /// Empty query, bad `top_k`, or another malformed request.
    InputValidation(String),

    /// The engine was accessed before it finished initializing.
    NotReady,

    /// Persisted index failed its checksum/version check and must be rebuilt.
    IndexCorruption(String),

    /// The aggregated dataset file is missing or malformed at startup.
    CorpusMalformed(String),

    /// An optional embedding/cross-encoder provider failed or timed out.
    ProviderUnavailable(String),

    /// An invariant the pipeline relies on was violated (e.g. rerank
    /// dropped or introduced a document id).
    InternalInvariantViolation(String),

    /// I/O error (file operations, disk I/O).
    Io(std::io::Error),
}

impl fmt::Display for EquisearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputValidation(msg) => write!(f, "invalid input: {msg}"),
            Self::NotReady => write!(f, "engine not ready"),
            Self::IndexCorruption(msg) => write!(f, "index corruption: {msg}"),
            Self::CorpusMalformed(msg) => write!(f, "corpus malformed: {msg}"),
            Self::ProviderUnavailable(msg) => write!(f, "provider unavailable: {msg}"),
            Self::InternalInvariantViolation(msg) => {
                write!(f, "internal invariant violation: {msg}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for EquisearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EquisearchError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(feature = "persistence")]
impl From<serde_json::Error> for EquisearchError {
    fn from(e: serde_json::Error) -> Self {
        Self::IndexCorruption(format!("json: {e}"))
    }
}

#[cfg(feature = "persistence")]
impl From<postcard::Error> for EquisearchError {
    fn from(e: postcard::Error) -> Self {
        Self::IndexCorruption(format!("postcard: {e}"))
    }
}

/// Result type used throughout the equisearch pipeline.
pub type EquisearchResult<T> = Result<T, EquisearchError>;
