use std::time::Duration;

use obocar_kinematics::{Pose, normalize_heading};
use obocar_vehicle::{BridgeError, Capabilities, Renderer, ScenePoint};
use parking_lot::RwLockWriteGuard;
use tracing::debug;

use crate::blackboard::{Blackboard, Scene, touch_cmd};

/// An in-process renderer that co-simulates the vehicle on the scene blackboard.
///
/// Moves lose `slip` of their length, so a non-zero slip makes the scene drift
/// away from the arithmetic model. The scene has no battery and no sensors.
pub struct SceneRenderer {
    bb: Blackboard,
    slip: f64,
    timeout: Duration,
}

impl SceneRenderer {
    pub fn new(bb: Blackboard, slip: f64, timeout: Duration) -> Self {
        SceneRenderer {
            bb,
            slip: slip.clamp(0.0, 1.0),
            timeout,
        }
    }

    fn lock(&self, method: &'static str) -> Result<RwLockWriteGuard<'_, Scene>, BridgeError> {
        self.bb.try_write_for(self.timeout).ok_or_else(|| {
            debug!(method, timeout = ?self.timeout, "Scene lock wait expired");
            BridgeError::Disconnected
        })
    }

    fn read(&self) -> Result<Scene, BridgeError> {
        self.bb
            .try_read_for(self.timeout)
            .map(|g| (*g).clone())
            .ok_or(BridgeError::Disconnected)
    }
}

impl Renderer for SceneRenderer {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            backward: false,
            battery: false,
            sensor: false,
            ..Capabilities::all()
        }
    }

    fn move_by(&mut self, distance: f64) -> Result<(), BridgeError> {
        let travelled = distance * (1.0 - self.slip);
        {
            let mut scene = self.lock("move")?;
            let (x, y) = scene.position.plane();
            let next = Pose::new(x, y, scene.heading)
                .advanced(travelled)
                .map_err(|e| BridgeError::call("move", e.to_string()))?;
            scene.position = ScenePoint::new(next.x, scene.position.height, next.y);
            scene.distance += travelled.abs();
        }
        touch_cmd(&self.bb);
        Ok(())
    }

    fn rotate(&mut self, degrees: f64) -> Result<(), BridgeError> {
        if !degrees.is_finite() {
            return Err(BridgeError::call("rotate", "non-finite angle"));
        }
        {
            let mut scene = self.lock("rotate")?;
            scene.heading = normalize_heading(scene.heading + degrees);
        }
        touch_cmd(&self.bb);
        Ok(())
    }

    fn position(&mut self) -> Result<Option<ScenePoint>, BridgeError> {
        Ok(Some(self.read()?.position))
    }

    fn rotation(&mut self) -> Result<Option<f64>, BridgeError> {
        Ok(Some(self.read()?.heading))
    }

    fn distance_traveled(&mut self) -> Result<Option<f64>, BridgeError> {
        Ok(Some(self.read()?.distance))
    }

    fn update_state(&mut self, x: f64, y: f64, heading: f64) -> Result<(), BridgeError> {
        let mut scene = self.lock("updateState")?;
        scene.position = ScenePoint::new(x, scene.position.height, y);
        scene.heading = normalize_heading(heading);
        Ok(())
    }

    fn reset(&mut self) -> Result<(), BridgeError> {
        let mut scene = self.lock("reset")?;
        scene.position = ScenePoint::default();
        scene.heading = 0.0;
        scene.distance = 0.0;
        Ok(())
    }
}
