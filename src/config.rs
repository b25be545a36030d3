use config::{Config, ConfigError, Environment, File, FileFormat};
use obocar_vehicle::{Maneuver, VehicleConfig};
use serde::Deserialize;
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Everything the runner reads at startup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub vehicle: VehicleConfig,
    pub mission: MissionConfig,
    pub runner: RunnerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionKind {
    #[default]
    Square,
    Patrol,
    Explore,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    pub kind: MissionKind,
    /// Side length of the square mission.
    pub side: f64,
    /// Times the square or patrol route is driven.
    pub laps: usize,
    /// Relative moves of one patrol lap.
    pub route: Vec<Maneuver>,
    /// Extra obstacles added before the mission starts, as `[x, y]` pairs.
    pub obstacles: Vec<[f64; 2]>,
    /// Exploration stops after this many decisions.
    pub max_moves: usize,
    /// Exploration stops when the battery drops to this level.
    pub min_battery: f64,
    /// Free distance ahead needed before exploring forward.
    pub clearance: f64,
    /// Forward step while exploring.
    pub step: f64,
    /// Turn used to steer around obstacles.
    pub turn: f64,
    /// Pause recorded after each patrol or exploration step, in seconds.
    pub pause: f64,
}

impl Default for MissionConfig {
    fn default() -> Self {
        MissionConfig {
            kind: MissionKind::Square,
            side: 3.0,
            laps: 1,
            route: vec![
                Maneuver::Forward(5.0),
                Maneuver::Right(90.0),
                Maneuver::Forward(3.0),
                Maneuver::Right(90.0),
                Maneuver::Forward(5.0),
                Maneuver::Right(90.0),
                Maneuver::Forward(3.0),
                Maneuver::Right(90.0),
            ],
            obstacles: Vec::new(),
            max_moves: 20,
            min_battery: 10.0,
            clearance: 8.0,
            step: 3.0,
            turn: 45.0,
            pause: 0.3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Drive the in-process scene renderer alongside the vehicle.
    pub bridged: bool,
    /// Open a window instead of logging telemetry.
    pub visualize: bool,
    /// Delay between commands, in milliseconds.
    pub step_ms: u64,
    /// The watchdog warns when no command was issued for this long.
    pub stall_timeout_ms: u64,
    /// Watchdog tick, in milliseconds.
    pub watchdog_ms: u64,
    /// Longest wait for the scene lock before a renderer call fails.
    pub scene_timeout_ms: u64,
    /// Fraction of every move the scene loses to wheel slip.
    pub slip: f64,
    pub topic_capacity: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            bridged: true,
            visualize: false,
            step_ms: 200,
            stall_timeout_ms: 1_000,
            watchdog_ms: 100,
            scene_timeout_ms: 50,
            slip: 0.0,
            topic_capacity: 64,
        }
    }
}

/// Loads `config/default.toml` (if present) and `OBOCAR__*` environment overrides.
///
/// `OBOCAR__VEHICLE__SENSOR_NOISE=0` overrides `vehicle.sensor_noise`.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    info!(path = DEFAULT_CONFIG_PATH, "Loading configuration");

    let settings = Config::builder()
        .add_source(File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix("OBOCAR")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .and_then(|config| config.try_deserialize::<AppConfig>());

    match settings {
        Ok(config) => {
            info!(?config, "Configuration loaded");
            Ok(config)
        }
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            Err(e)
        }
    }
}
