use parking_lot::RwLock;
use std::{sync::Arc, time::Instant};

use obocar_vehicle::ScenePoint;

/// The co-simulated scene: the renderer's own copy of the vehicle.
#[derive(Clone, Debug)]
pub struct Scene {
    pub position: ScenePoint,
    pub heading: f64,
    pub distance: f64,
    pub last_cmd_ts: Instant,
    pub faults: Vec<String>,
}

impl Default for Scene {
    fn default() -> Self {
        Scene {
            position: ScenePoint::default(),
            heading: 0.0,
            distance: 0.0,
            last_cmd_ts: Instant::now(),
            faults: Vec::new(),
        }
    }
}

pub type Blackboard = Arc<RwLock<Scene>>;

pub fn snapshot(bb: &Blackboard) -> Scene {
    (*bb.read()).clone()
}

pub fn touch_cmd(bb: &Blackboard) {
    bb.write().last_cmd_ts = Instant::now();
}

/// Records a fault once; repeated faults with the same message are dropped.
///
/// Returns `true` if the fault was new.
pub fn raise_fault(bb: &Blackboard, msg: &str) -> bool {
    let mut g = bb.write();
    if g.faults.iter().any(|s| s == msg) {
        return false;
    }
    g.faults.push(msg.to_string());
    true
}

pub fn clear_fault(bb: &Blackboard, msg: &str) {
    bb.write().faults.retain(|s| s != msg);
}
