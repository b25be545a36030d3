//! The renderer bridge: an external co-simulator of the same vehicle.
//!
//! A renderer keeps its own copy of the vehicle in a 3-axis scene. Scene `x`
//! is the vehicle `x`, scene `z` is the vehicle `y`, and scene height is
//! ignored. Every operation is optional: a renderer declares what it supports
//! once through [`Renderer::capabilities`] and the vehicle never calls the rest.

use obocar_kinematics::Pose;
use obocar_sensing::SensorDirection;
use tracing::{debug, warn};

use crate::error::BridgeError;

/// The operations a renderer supports.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// [`Renderer::move_by`]
    pub moves: bool,
    /// [`Renderer::backward`]; without it a reverse drive is sent as a negative move.
    pub backward: bool,
    /// [`Renderer::rotate`]
    pub rotates: bool,
    /// [`Renderer::position`]
    pub position: bool,
    /// [`Renderer::rotation`]
    pub rotation: bool,
    /// [`Renderer::battery`]
    pub battery: bool,
    /// [`Renderer::distance_traveled`]
    pub distance: bool,
    /// [`Renderer::sensor`]
    pub sensor: bool,
    /// [`Renderer::update_state`]
    pub update_state: bool,
    /// [`Renderer::reset`], also used to check the renderer is reachable on attach.
    pub reset: bool,
}

impl Capabilities {
    /// Every operation available.
    pub const fn all() -> Self {
        Capabilities {
            moves: true,
            backward: true,
            rotates: true,
            position: true,
            rotation: true,
            battery: true,
            distance: true,
            sensor: true,
            update_state: true,
            reset: true,
        }
    }

    /// Nothing available.
    pub const fn none() -> Self {
        Capabilities {
            moves: false,
            backward: false,
            rotates: false,
            position: false,
            rotation: false,
            battery: false,
            distance: false,
            sensor: false,
            update_state: false,
            reset: false,
        }
    }
}

/// A position in the renderer's scene.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScenePoint {
    /// Maps to the vehicle `x`.
    pub x: f64,
    /// Vertical axis, not part of the vehicle model.
    pub height: f64,
    /// Maps to the vehicle `y`.
    pub z: f64,
}

impl ScenePoint {
    /// Creates a point from raw scene coordinates.
    pub const fn new(x: f64, height: f64, z: f64) -> Self {
        ScenePoint { x, height, z }
    }

    /// Lifts a plane position into the scene at ground level.
    pub const fn from_plane(x: f64, y: f64) -> Self {
        ScenePoint { x, height: 0.0, z: y }
    }

    /// Projects back onto the vehicle plane, dropping the height.
    pub const fn plane(&self) -> (f64, f64) {
        (self.x, self.z)
    }
}

/// An external renderer driven alongside the local model.
///
/// Every method has a default body returning [`BridgeError::Unsupported`], so an
/// implementation only writes what it declares in [`Renderer::capabilities`].
/// Queries return `Ok(None)` when the renderer has no value to report.
/// Implementations are expected to bound their own waits and report an expired
/// wait as an error.
pub trait Renderer {
    /// The operations this renderer supports. Read once when the bridge is attached.
    fn capabilities(&self) -> Capabilities;

    /// Drives the scene vehicle along its heading.
    fn move_by(&mut self, _distance: f64) -> Result<(), BridgeError> {
        Err(BridgeError::Unsupported("move"))
    }

    /// Drives the scene vehicle against its heading by `distance`.
    fn backward(&mut self, _distance: f64) -> Result<(), BridgeError> {
        Err(BridgeError::Unsupported("backward"))
    }

    /// Turns the scene vehicle; positive is clockwise.
    fn rotate(&mut self, _degrees: f64) -> Result<(), BridgeError> {
        Err(BridgeError::Unsupported("rotate"))
    }

    /// Where the scene vehicle is.
    fn position(&mut self) -> Result<Option<ScenePoint>, BridgeError> {
        Err(BridgeError::Unsupported("getPosition"))
    }

    /// Heading in degrees, same convention as the local model.
    fn rotation(&mut self) -> Result<Option<f64>, BridgeError> {
        Err(BridgeError::Unsupported("getRotation"))
    }

    /// Battery percentage.
    fn battery(&mut self) -> Result<Option<f64>, BridgeError> {
        Err(BridgeError::Unsupported("getBattery"))
    }

    /// Total distance driven in the scene.
    fn distance_traveled(&mut self) -> Result<Option<f64>, BridgeError> {
        Err(BridgeError::Unsupported("getDistanceTraveled"))
    }

    /// A range reading taken in the scene.
    fn sensor(&mut self, _direction: SensorDirection) -> Result<Option<f64>, BridgeError> {
        Err(BridgeError::Unsupported("getSensor"))
    }

    /// Overwrites the scene pose with plane coordinates and a heading.
    fn update_state(&mut self, _x: f64, _y: f64, _heading: f64) -> Result<(), BridgeError> {
        Err(BridgeError::Unsupported("updateState"))
    }

    /// Returns the scene vehicle to its initial state.
    fn reset(&mut self) -> Result<(), BridgeError> {
        Err(BridgeError::Unsupported("reset"))
    }
}

/// What a renderer reported about its copy of the vehicle.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RendererReport {
    /// Scene position.
    pub position: Option<ScenePoint>,
    /// Heading in degrees.
    pub heading: Option<f64>,
    /// Battery percentage.
    pub battery: Option<f64>,
    /// Total distance driven.
    pub distance: Option<f64>,
}

impl RendererReport {
    /// `true` if the renderer reported nothing at all.
    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.heading.is_none()
            && self.battery.is_none()
            && self.distance.is_none()
    }
}

/// An attached renderer plus the capabilities it declared.
///
/// Every call goes through here so that failures are logged and swallowed in one place.
pub(crate) struct Bridge {
    renderer: Box<dyn Renderer + Send>,
    caps: Capabilities,
}

impl Bridge {
    /// Reads the capabilities and, if supported, resets the renderer to check it responds.
    pub(crate) fn attach(mut renderer: Box<dyn Renderer + Send>) -> Result<Self, BridgeError> {
        let caps = renderer.capabilities();
        if caps.reset {
            renderer.reset()?;
        }
        Ok(Bridge { renderer, caps })
    }

    pub(crate) fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Forwards a drive. Returns `true` if the renderer accepted it.
    pub(crate) fn send_move(&mut self, distance: f64) -> bool {
        self.caps.moves && accepted("move", self.renderer.move_by(distance))
    }

    /// Forwards a reverse drive of `distance`, as a native backward call if declared and
    /// as `move(-distance)` otherwise. Returns `true` if the renderer accepted it.
    pub(crate) fn send_backward(&mut self, distance: f64) -> bool {
        if self.caps.backward {
            accepted("backward", self.renderer.backward(distance))
        } else {
            self.send_move(-distance)
        }
    }

    /// Forwards a turn. Returns `true` if the renderer accepted it.
    pub(crate) fn send_rotate(&mut self, degrees: f64) -> bool {
        self.caps.rotates && accepted("rotate", self.renderer.rotate(degrees))
    }

    pub(crate) fn push(&mut self, pose: &Pose) -> bool {
        self.caps.update_state
            && accepted(
                "updateState",
                self.renderer.update_state(pose.x, pose.y, pose.heading),
            )
    }

    pub(crate) fn reset(&mut self) -> bool {
        self.caps.reset && accepted("reset", self.renderer.reset())
    }

    pub(crate) fn sensor(&mut self, direction: SensorDirection) -> Option<f64> {
        if !self.caps.sensor {
            return None;
        }
        value("getSensor", self.renderer.sensor(direction))
    }

    /// Queries every supported state accessor. Failed queries are left empty.
    pub(crate) fn report(&mut self) -> RendererReport {
        let mut report = RendererReport::default();
        if self.caps.position {
            report.position = value("getPosition", self.renderer.position());
        }
        if self.caps.rotation {
            report.heading = value("getRotation", self.renderer.rotation());
        }
        if self.caps.battery {
            report.battery = value("getBattery", self.renderer.battery());
        }
        if self.caps.distance {
            report.distance = value("getDistanceTraveled", self.renderer.distance_traveled());
        }
        debug!(?report, "Renderer report");
        report
    }
}

fn accepted(method: &'static str, result: Result<(), BridgeError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(method, error = %e, "Renderer call failed, keeping local result");
            false
        }
    }
}

fn value<T>(method: &'static str, result: Result<Option<T>, BridgeError>) -> Option<T> {
    match result {
        Ok(v) => v,
        Err(e) => {
            warn!(method, error = %e, "Renderer query failed");
            None
        }
    }
}
