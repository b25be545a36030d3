//! Resolves the local model against what an attached renderer reports.

use obocar_kinematics::{Pose, angular_difference, normalize_heading};
use tracing::{debug, warn};

use crate::bridge::{Bridge, RendererReport};
use crate::config::VehicleConfig;
use crate::state::{FULL_BATTERY, VehicleState};

/// How far a renderer report sits from the local pose.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Divergence {
    /// `|dx| + |dy|`, or `None` if no position was reported.
    pub position: Option<f64>,
    /// Minimal angular difference in degrees, or `None` if no heading was reported.
    pub heading: Option<f64>,
}

impl Divergence {
    /// Whether each measured component is strictly over its tolerance, as
    /// `(position, heading)`. Absent components never exceed.
    pub fn exceeds(&self, position_tolerance: f64, heading_tolerance: f64) -> (bool, bool) {
        (
            self.position.is_some_and(|p| p > position_tolerance),
            self.heading.is_some_and(|h| h > heading_tolerance),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Reconciler {
    position_tolerance: f64,
    heading_tolerance: f64,
    push_local_state: bool,
}

impl Reconciler {
    pub(crate) fn from_config(config: &VehicleConfig) -> Self {
        Reconciler {
            position_tolerance: config.divergence_position,
            heading_tolerance: config.divergence_heading,
            push_local_state: config.push_local_state,
        }
    }

    /// Queries the renderer, logs any divergence and folds the report into `state`.
    pub(crate) fn run(&self, bridge: &mut Bridge, state: &mut VehicleState) -> Divergence {
        let mut report = bridge.report();
        let divergence = divergence(&state.pose, &report);
        self.log_divergence(&divergence);

        if self.push_local_state && bridge.push(&state.pose) {
            debug!("Pushed local pose to renderer");
            report = bridge.report();
        }

        apply(state, &report);
        divergence
    }

    fn log_divergence(&self, divergence: &Divergence) {
        let (position, heading) =
            divergence.exceeds(self.position_tolerance, self.heading_tolerance);
        if position {
            warn!(
                divergence = divergence.position,
                tolerance = self.position_tolerance,
                "Renderer position diverges from local model"
            );
        }
        if heading {
            warn!(
                divergence = divergence.heading,
                tolerance = self.heading_tolerance,
                "Renderer heading diverges from local model"
            );
        }
    }
}

/// Measures a report against a local pose. Non-finite reported values are ignored.
pub fn divergence(local: &Pose, report: &RendererReport) -> Divergence {
    let position = report.position.map(|p| p.plane()).and_then(|(x, y)| {
        (x.is_finite() && y.is_finite()).then(|| (x - local.x).abs() + (y - local.y).abs())
    });
    let heading = report
        .heading
        .filter(|h| h.is_finite())
        .map(|h| angular_difference(h, local.heading));
    Divergence { position, heading }
}

/// Overwrites `state` with every present, finite value in `report`.
pub fn apply(state: &mut VehicleState, report: &RendererReport) {
    if let Some((x, y)) = report.position.map(|p| p.plane()) {
        if x.is_finite() && y.is_finite() {
            state.pose.x = x;
            state.pose.y = y;
        }
    }
    if let Some(heading) = report.heading.filter(|h| h.is_finite()) {
        state.pose.heading = normalize_heading(heading);
    }
    if let Some(battery) = report.battery.filter(|b| b.is_finite()) {
        state.battery = battery.clamp(0.0, FULL_BATTERY);
    }
    if let Some(distance) = report.distance.filter(|d| d.is_finite()) {
        state.total_distance = distance.max(0.0);
    }
}
