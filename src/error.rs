//! Error types for the teacal library.
//!
//! This module provides custom error types using `thiserror` so that every
//! failure a form can surface maps to one variant with a readable message.

use thiserror::Error;

/// Errors that can occur in the teacal application.
#[derive(Error, Debug)]
pub enum TeaCalError {
    /// Empty or invalid form field, password too short or mismatched
    #[error("Validation error: {0}")]
    Validation(String),

    /// Registration with a username that is already taken
    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    /// Unknown username or wrong password
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Stored data has a legacy shape this version cannot read.
    /// Recovery is to clear the old user data and register again.
    #[error("Incompatible stored data: {0}")]
    IncompatibleStoredData(String),

    /// Missing user, session or temporary registration id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Key-value storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Credential hashing failed
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

impl TeaCalError {
    /// True when the caller should offer the "clear old data" recovery flow
    #[must_use]
    pub const fn needs_clear_data(&self) -> bool {
        matches!(self, Self::IncompatibleStoredData(_))
    }
}

/// Convenience type alias for Result with `TeaCalError`
pub type Result<T> = std::result::Result<T, TeaCalError>;

impl From<anyhow::Error> for TeaCalError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<sled::Error> for TeaCalError {
    fn from(err: sled::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
