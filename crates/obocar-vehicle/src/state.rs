use obocar_kinematics::Pose;
use obocar_sensing::ObstacleField;

/// Battery level of a fresh vehicle, in percent.
pub const FULL_BATTERY: f64 = 100.0;

/// Everything a vehicle knows about itself and its surroundings.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleState {
    /// Position and heading.
    pub pose: Pose,
    /// Battery percentage, within `[0, 100]`.
    pub battery: f64,
    /// Total absolute distance driven since creation or reset.
    pub total_distance: f64,
    /// Reported speed. Commands are instantaneous, so this stays at zero.
    pub speed: f64,
    /// Point obstacles around the vehicle.
    pub obstacles: ObstacleField,
}

impl VehicleState {
    /// A vehicle at the origin facing north with a full battery.
    pub fn initial(obstacles: ObstacleField) -> Self {
        VehicleState {
            pose: Pose::origin(),
            battery: FULL_BATTERY,
            total_distance: 0.0,
            speed: 0.0,
            obstacles,
        }
    }
}

/// Summary returned by [`crate::Vehicle::status`]. Values are rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status {
    /// `(x, y)`.
    pub position: (f64, f64),
    /// Degrees within `[0, 360)`.
    pub heading: f64,
    /// Percent.
    pub battery: f64,
    /// Total distance driven.
    pub distance: f64,
    /// Always zero.
    pub speed: f64,
    /// Obstacles within the configured nearby radius.
    pub obstacles_nearby: usize,
}

/// Rounds to one decimal place for reporting.
pub(crate) fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
