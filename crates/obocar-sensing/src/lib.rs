//! Obstacle fields and cone-shaped range sensors for the obocar vehicle.
//!
//! The field holds point obstacles; the sensor answers "how far is the nearest
//! obstacle in this direction" the way a cheap ultrasonic ranger would, with a
//! wide cone, a maximum range and a little noise.

pub mod error;
pub mod field;
pub mod range;

pub use error::SensingError;
pub use field::{ObstacleField, ObstaclePolicy, WorldPoint};
pub use range::{RangeSensor, SensorDirection};
