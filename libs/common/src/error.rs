//! Custom error types for the common library
//!
//! This module defines the configuration errors shared by every binary in
//! the workspace.

use thiserror::Error;

/// Custom error type for configuration loading and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error occurred while reading or deserializing a configuration source
    #[error("Configuration loading error: {0}")]
    Load(#[from] config::ConfigError),

    /// A URL setting is not an http(s) URL
    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },

    /// A value is outside its accepted range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

/// Type alias for Result with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
