//! Common error types for Promptune

use thiserror::Error;

/// Common result type for Promptune operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Promptune crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file missing, unreadable or malformed
    #[error("Configuration error: {0}")]
    Config(String),
}
