//! Error types for the Galaxy3D tiles pipeline
//!
//! This module defines the error types used throughout the crate,
//! including device resource creation, content preparation, and
//! singleton management.

use std::fmt;

/// Result type for Galaxy3D tiles operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D tiles errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (graphics device, physics cooking, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, mesh, image, model content, etc.)
    InvalidResource(String),

    /// Initialization failed (engine, singletons, selection engine)
    InitializationFailed(String),

    /// Operation attempted in a state that does not allow it
    InvalidState(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
