//! Common error types for TractKit

use thiserror::Error;

/// Common result type for TractKit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across TractKit crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
