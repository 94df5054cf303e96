//! Error taxonomy for the directory client.
//!
//! - `DirectoryError`: the directory fetch failed or timed out. Recovered
//!   locally by keeping the previous list.
//! - `AuthError`: the identity service rejected or could not serve a request.
//! - `ValidationError`: local input was malformed. Raised before any request
//!   is made, so invalid input never reaches the network.

use std::time::Duration;

use thiserror::Error;

/// Directory fetch failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("directory request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("directory request failed: {0}")]
    Request(String),
    #[error("directory returned HTTP {status}")]
    Status { status: u16 },
    #[error("failed to decode directory response: {0}")]
    Decode(String),
}

/// Identity service failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The provider answered and refused the operation.
    #[error("{message}")]
    Rejected { code: String, message: String },
    #[error("identity service unreachable: {0}")]
    Transport(String),
    #[error("unexpected identity response: {0}")]
    Decode(String),
    #[error("identity service is not configured: set {0}")]
    NotConfigured(&'static str),
}

/// Local input problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Password min {min} char")]
    PasswordTooShort { min: usize },
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Top-level error for session and directory operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Network(#[from] DirectoryError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("session storage failed: {0:#}")]
    Storage(anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Returns true for errors raised before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
