//! Error types for the Hearth domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum. Only structural
//! misconfiguration is meant to reach the chat path; memory and similarity
//! failures are absorbed by the context engine.

use thiserror::Error;

/// The top-level error type for Hearth operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Memory / transcript storage ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Similarity provider ---
    #[error("Similarity error: {0}")]
    Similarity(#[from] SimilarityError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum MemoryError {
    /// A record or turn was rejected on write. Nothing was persisted.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The backing store could not be reached or read.
    #[error("Store not available: {0}")]
    NotAvailable(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Error)]
pub enum SimilarityError {
    #[error("Similarity provider not available: {0}")]
    NotAvailable(String),

    #[error("Similarity provider {provider} timed out after {timeout_ms}ms")]
    Timeout { provider: String, timeout_ms: u64 },

    #[error("Invalid similarity response: {0}")]
    InvalidResponse(String),
}
