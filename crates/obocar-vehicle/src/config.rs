use obocar_sensing::ObstaclePolicy;
use obocar_sensing::range::{
    DEFAULT_CONE_HALF_WIDTH, DEFAULT_MIN_READING, DEFAULT_NOISE, DEFAULT_RANGE,
};

/// Tunable constants of a vehicle.
///
/// The defaults reproduce the reference vehicle: 20 unit sensors with a ±30° cone,
/// 1% battery per unit driven, 0.5% per turn and a 10% collision penalty.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VehicleConfig {
    /// Maximum sensor range, reported when no obstacle is in the cone.
    pub sensor_range: f64,
    /// Sensor cone half-width in degrees.
    pub cone_half_width: f64,
    /// Amplitude of the uniform noise added to local sensor readings.
    pub sensor_noise: f64,
    /// Lowest value any sensor reading can take.
    pub min_reading: f64,
    /// Obstacles strictly closer than this collide with the vehicle.
    pub collision_radius: f64,
    /// Battery lost on a collision, once per check.
    pub collision_penalty: f64,
    /// Battery lost per unit of distance driven.
    pub drive_drain_per_unit: f64,
    /// Battery lost per turn command.
    pub turn_drain: f64,
    /// Radius used for `obstacles_nearby` in the status report.
    pub nearby_radius: f64,
    /// Position drift (|dx| + |dy|) above which renderer divergence is logged.
    pub divergence_position: f64,
    /// Heading drift in degrees above which renderer divergence is logged.
    pub divergence_heading: f64,
    /// Push the local pose to the renderer before reading it back.
    pub push_local_state: bool,
    /// How obstacles are generated on creation and reset.
    pub obstacles: ObstaclePolicy,
    /// Seed for obstacle generation and sensor noise; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        VehicleConfig {
            sensor_range: DEFAULT_RANGE,
            cone_half_width: DEFAULT_CONE_HALF_WIDTH,
            sensor_noise: DEFAULT_NOISE,
            min_reading: DEFAULT_MIN_READING,
            collision_radius: 1.0,
            collision_penalty: 10.0,
            drive_drain_per_unit: 1.0,
            turn_drain: 0.5,
            nearby_radius: 10.0,
            divergence_position: 0.1,
            divergence_heading: 0.1,
            push_local_state: false,
            obstacles: ObstaclePolicy::Random,
            seed: None,
        }
    }
}

impl VehicleConfig {
    /// A config with no obstacles and no sensor noise, for reproducible runs.
    pub fn quiet() -> Self {
        VehicleConfig {
            sensor_noise: 0.0,
            obstacles: ObstaclePolicy::None,
            seed: Some(0),
            ..Default::default()
        }
    }
}
