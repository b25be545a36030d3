#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for dead-reckoning kinematics of a 2D wheeled vehicle."]
#![doc = ""]
#![doc = "Headings are compass-style: degrees measured clockwise from the +Y axis,"]
#![doc = "so 0° points \"north\" (+Y) and 90° points \"east\" (+X)."]

use core::fmt;
use libm::{atan2, cos, fabs, hypot, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::KinematicsError;

/// Degrees in a full turn.
pub const FULL_TURN: f64 = 360.0;

/// A 2‑D pose `(x, y, heading)` in plane units and degrees.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// Lateral position.
    pub x: f64,
    /// Forward position (north is +Y).
    pub y: f64,
    /// Heading (deg), clockwise from +Y, normalized to `[0, 360)`.
    pub heading: f64,
}

impl Pose {
    /// Construct a new pose. The heading is normalized.
    ///
    /// # Arguments
    ///
    /// * `x`: Lateral position.
    /// * `y`: Forward position.
    /// * `heading`: Heading in degrees, any finite value.
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Pose {
            x,
            y,
            heading: normalize_heading(heading),
        }
    }

    /// The pose every vehicle starts from: origin, facing north.
    pub const fn origin() -> Self {
        Pose {
            x: 0.0,
            y: 0.0,
            heading: 0.0,
        }
    }

    /// Returns `true` if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.heading.is_finite()
    }

    /// Moves the pose along its heading.
    ///
    /// `new_x = x + d·sin(h)`, `new_y = y + d·cos(h)`. A negative `distance`
    /// moves backward; the heading is unchanged.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::NonFiniteDistance)` if `distance` is not finite and
    /// `Err(KinematicsError::NonFinitePose)` if the result overflows.
    pub fn advanced(&self, distance: f64) -> Result<Pose, KinematicsError> {
        if !distance.is_finite() {
            return Err(KinematicsError::NonFiniteDistance("must be finite"));
        }

        let heading_rad = self.heading.to_radians();
        let next = Pose {
            x: self.x + distance * sin(heading_rad),
            y: self.y + distance * cos(heading_rad),
            heading: self.heading,
        };

        if !next.is_finite() {
            return Err(KinematicsError::NonFinitePose("position overflowed"));
        }
        Ok(next)
    }

    /// Turns the pose in place. Positive `degrees` turn clockwise (right),
    /// negative turn counter-clockwise (left).
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::NonFiniteAngle)` if `degrees` is not finite.
    pub fn rotated(&self, degrees: f64) -> Result<Pose, KinematicsError> {
        if !degrees.is_finite() {
            return Err(KinematicsError::NonFiniteAngle("must be finite"));
        }
        Ok(Pose {
            x: self.x,
            y: self.y,
            heading: normalize_heading(self.heading + degrees),
        })
    }

    /// Euclidean distance from this pose to a point.
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        hypot(x - self.x, y - self.y)
    }

    /// Compass bearing from this pose to a point, in degrees within `(-180, 180]`.
    ///
    /// The bearing is absolute (it ignores the pose heading).
    pub fn bearing_to(&self, x: f64, y: f64) -> f64 {
        bearing(x - self.x, y - self.y)
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {:.1}, y: {:.1}, heading: {:.1}°)", self.x, self.y, self.heading)
    }
}

/// Normalize a heading to be within `[0, 360)`.
///
/// Tiny negative inputs can round up to exactly `360.0`; those fold to `0.0`.
pub fn normalize_heading(degrees: f64) -> f64 {
    let mut a = degrees % FULL_TURN;
    if a < 0.0 {
        a += FULL_TURN;
    }
    if a >= FULL_TURN { 0.0 } else { a }
}

/// Compass bearing of the offset `(dx, dy)`, in degrees within `(-180, 180]`.
///
/// Uses `atan2(dx, dy)`: `dx` is lateral and `dy` is forward, matching the
/// motion model.
pub fn bearing(dx: f64, dy: f64) -> f64 {
    atan2(dx, dy).to_degrees()
}

/// Smallest absolute difference between two headings, in degrees within `[0, 180]`.
pub fn angular_difference(a: f64, b: f64) -> f64 {
    fabs(normalize_heading(a - b + 180.0) - 180.0)
}
