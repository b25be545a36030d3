//! This module defines the error types used by the `obocar-sensing` crate.

#![warn(missing_docs)]

/// Error type for sensing operations.
///
/// This enum encapsulates all possible errors that can occur while configuring
/// a range sensor or naming one of its directions.
#[derive(Debug, Clone, PartialEq)]
pub enum SensingError {
    /// Error for an unrecognized sensor direction.
    /// This variant carries the rejected input; valid names are `front`, `right`, `back` and `left`.
    UnknownDirection(String),
    /// Error for an invalid sensor parameter.
    /// This variant is returned when a range, cone width, noise or floor is out of range.
    InvalidParameter(&'static str),
}

impl core::fmt::Display for SensingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SensingError::UnknownDirection(input) => write!(
                f,
                "Invalid sensor direction: {:?}. Use: front, right, back, left",
                input
            ),
            SensingError::InvalidParameter(msg) => write!(f, "Invalid sensor parameter: {}", msg),
        }
    }
}

impl core::error::Error for SensingError {}
