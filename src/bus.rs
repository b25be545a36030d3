use std::sync::Arc;
use tokio::sync::broadcast;

use obocar_vehicle::{Pose, Status, Vehicle, WorldPoint};

/// Broadcast topic with bounded capacity.
/// `T` must be `Send + Sync` because we hop across threads.
#[derive(Debug, Clone)]
pub struct Topic<T> {
    tx: broadcast::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> Topic<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, msg: T) {
        let _ = self.tx.send(Arc::new(msg));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<T>> {
        self.tx.subscribe()
    }
}

/// One frame of vehicle telemetry, published after every mission command.
#[derive(Debug, Clone)]
pub struct Telemetry {
    pub status: Status,
    /// Exact pose, for drawing the trail.
    pub pose: Pose,
    pub command: Option<String>,
    pub obstacles: Vec<WorldPoint>,
    pub sensor_range: f64,
    pub cone_half_width: f64,
}

impl Telemetry {
    pub fn capture(vehicle: &Vehicle) -> Self {
        Telemetry {
            status: vehicle.status(),
            pose: vehicle.pose(),
            command: vehicle.last_event().map(|e| e.description()),
            obstacles: vehicle.get_obstacles().to_vec(),
            sensor_range: vehicle.range_sensor().range(),
            cone_half_width: vehicle.range_sensor().cone_half_width(),
        }
    }
}
