//! Battery drain and collision accounting.

use obocar_sensing::WorldPoint;
use tracing::warn;

use crate::config::VehicleConfig;
use crate::error::VehicleError;
use crate::state::VehicleState;

/// Applies battery costs for driving, turning and collisions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accounting {
    drive_drain_per_unit: f64,
    turn_drain: f64,
    collision_radius: f64,
    collision_penalty: f64,
}

impl Accounting {
    /// Builds the accounting rules from a vehicle config.
    ///
    /// # Errors
    /// Returns `VehicleError::InvalidConfig` if any cost or the collision radius is
    /// negative or not finite.
    pub fn from_config(config: &VehicleConfig) -> Result<Self, VehicleError> {
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;
        if !non_negative(config.drive_drain_per_unit) {
            return Err(VehicleError::InvalidConfig("drive drain must be non-negative"));
        }
        if !non_negative(config.turn_drain) {
            return Err(VehicleError::InvalidConfig("turn drain must be non-negative"));
        }
        if !non_negative(config.collision_radius) {
            return Err(VehicleError::InvalidConfig("collision radius must be non-negative"));
        }
        if !non_negative(config.collision_penalty) {
            return Err(VehicleError::InvalidConfig("collision penalty must be non-negative"));
        }
        Ok(Accounting {
            drive_drain_per_unit: config.drive_drain_per_unit,
            turn_drain: config.turn_drain,
            collision_radius: config.collision_radius,
            collision_penalty: config.collision_penalty,
        })
    }

    /// Records a drive of `distance` units (either sign): odometer and battery.
    pub fn charge_drive(&self, state: &mut VehicleState, distance: f64) {
        state.total_distance += distance.abs();
        state.battery = drain(state.battery, distance.abs() * self.drive_drain_per_unit);
    }

    /// Records a turn command.
    pub fn charge_turn(&self, state: &mut VehicleState) {
        state.battery = drain(state.battery, self.turn_drain);
    }

    /// Applies the collision penalty if any obstacle is within the collision radius.
    ///
    /// Obstacles are scanned in insertion order and the scan stops at the first hit,
    /// so the penalty is applied at most once per call.
    ///
    /// # Returns
    /// * `Option<WorldPoint>` - The obstacle that was hit, if any
    pub fn check_collisions(&self, state: &mut VehicleState) -> Option<WorldPoint> {
        let hit = state
            .obstacles
            .first_within(WorldPoint::from(state.pose), self.collision_radius)?;
        state.battery = drain(state.battery, self.collision_penalty);
        warn!(
            obstacle_x = hit.x,
            obstacle_y = hit.y,
            battery = state.battery,
            "Collision with obstacle"
        );
        Some(hit)
    }
}

/// Subtracts `amount` from `battery`, never going below zero.
pub fn drain(battery: f64, amount: f64) -> f64 {
    (battery - amount).max(0.0)
}
