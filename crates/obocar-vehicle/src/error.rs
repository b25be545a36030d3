//! Error types for the vehicle crate.
//!
//! `VehicleError` is what callers of [`crate::Vehicle`] can see. `BridgeError`
//! is what a [`crate::Renderer`] reports; the vehicle always recovers from it
//! and never hands it back to its caller.

#![warn(missing_docs)]

use core::fmt;

use obocar_sensing::SensingError;

/// Errors surfaced by vehicle operations.
#[derive(Debug, Clone, PartialEq)]
pub enum VehicleError {
    /// Error for an invalid command argument, such as an unknown sensor direction.
    InvalidArgument(SensingError),
    /// Error for an invalid configuration value.
    /// This variant is returned when a vehicle is built from a config that fails validation.
    InvalidConfig(&'static str),
}

impl fmt::Display for VehicleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleError::InvalidArgument(err) => write!(f, "Invalid argument: {}", err),
            VehicleError::InvalidConfig(msg) => write!(f, "Invalid vehicle config: {}", msg),
        }
    }
}

impl core::error::Error for VehicleError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            VehicleError::InvalidArgument(err) => Some(err),
            VehicleError::InvalidConfig(_) => None,
        }
    }
}

impl From<SensingError> for VehicleError {
    fn from(err: SensingError) -> Self {
        match err {
            SensingError::InvalidParameter(msg) => VehicleError::InvalidConfig(msg),
            other => VehicleError::InvalidArgument(other),
        }
    }
}

/// Errors reported by a renderer bridge.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// The renderer does not implement this operation.
    Unsupported(&'static str),
    /// The renderer call was made and failed.
    Call {
        /// Name of the renderer operation.
        method: &'static str,
        /// Failure reported by the renderer.
        message: String,
    },
    /// The renderer can no longer be reached (closed connection, expired wait).
    Disconnected,
}

impl BridgeError {
    /// Builds a [`BridgeError::Call`].
    pub fn call(method: &'static str, message: impl Into<String>) -> Self {
        BridgeError::Call {
            method,
            message: message.into(),
        }
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::Unsupported(method) => write!(f, "Renderer does not support {}", method),
            BridgeError::Call { method, message } => {
                write!(f, "Renderer call {} failed: {}", method, message)
            }
            BridgeError::Disconnected => write!(f, "Renderer disconnected"),
        }
    }
}

impl core::error::Error for BridgeError {}
