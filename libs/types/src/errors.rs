//! Error taxonomy for the simulation core
//!
//! Business outcomes (rejections, cancel misses) are reported through
//! order status and return values, never as errors. `Result` is reserved
//! for infrastructure failure: invalid configuration and unusable replay
//! sources.

use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: String },

    #[error("{field} must be within [0, 1], got {value}")]
    FractionOutOfRange { field: &'static str, value: f64 },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}

impl ConfigError {
    pub fn non_positive(field: &'static str, value: impl ToString) -> Self {
        ConfigError::NonPositive {
            field,
            value: value.to_string(),
        }
    }

    pub fn fraction_out_of_range(field: &'static str, value: f64) -> Self {
        ConfigError::FractionOutOfRange { field, value }
    }
}
