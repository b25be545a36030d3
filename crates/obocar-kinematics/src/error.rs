#![warn(missing_docs)]

//! Error types for the kinematics library.
//!
//! This module defines error types that can occur while applying motion
//! commands to a pose.

use core::fmt;

/// Errors that can occur in kinematic calculations.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// Error for a non-finite travel distance.
    /// This variant is returned when a distance is `NaN` or infinite.
    NonFiniteDistance(&'static str),
    /// Error for a non-finite turn angle.
    /// This variant is returned when a rotation in degrees is `NaN` or infinite.
    NonFiniteAngle(&'static str),
    /// Error for a non-finite pose.
    /// This variant is returned when a pose would leave the set of finite coordinates.
    NonFinitePose(&'static str),
}

impl fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::NonFiniteDistance(msg) => write!(f, "Invalid distance: {}", msg),
            KinematicsError::NonFiniteAngle(msg) => write!(f, "Invalid angle: {}", msg),
            KinematicsError::NonFinitePose(msg) => write!(f, "Invalid pose: {}", msg),
        }
    }
}

impl core::error::Error for KinematicsError {}
