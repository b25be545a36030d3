//! A simulated two-wheeled vehicle with range sensors, a battery and an
//! optional external renderer.
//!
//! ```
//! use obocar_vehicle::{Vehicle, VehicleConfig};
//!
//! let mut car = Vehicle::new(VehicleConfig::quiet()).unwrap();
//! car.forward(3.0).right(90.0).forward(2.0);
//! assert_eq!(car.get_position(), (2.0, 3.0));
//! ```

#![warn(missing_docs)]

pub mod bridge;
/// Tunable constants for a vehicle.
pub mod config;
pub mod energy;
pub mod error;
pub mod events;
/// Named commands and canned routes.
pub mod maneuver;
pub mod reconcile;
/// Vehicle state and its rounded summary.
pub mod state;
mod vehicle;

pub use bridge::{Capabilities, Renderer, RendererReport, ScenePoint};
pub use config::VehicleConfig;
pub use error::{BridgeError, VehicleError};
pub use events::{Command, Event, EventLog};
pub use maneuver::Maneuver;
pub use reconcile::Divergence;
pub use state::{FULL_BATTERY, Status, VehicleState};
pub use vehicle::{Mode, Vehicle};

pub use obocar_kinematics::Pose;
pub use obocar_sensing::{ObstaclePolicy, RangeSensor, SensorDirection, WorldPoint};
