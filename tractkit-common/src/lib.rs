//! # TractKit Common Library
//!
//! Shared code for the TractKit services:
//! - Error types
//! - Bootstrap configuration (TOML file, environment overrides, compiled defaults)

pub mod config;
pub mod error;

pub use error::{Error, Result};
