use obocar_kinematics::{Pose, normalize_heading};
use obocar_sensing::{ObstacleField, RangeSensor, SensorDirection, WorldPoint};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::bridge::{Bridge, Capabilities, Renderer};
use crate::config::VehicleConfig;
use crate::energy::Accounting;
use crate::error::VehicleError;
use crate::events::{Command, Event, EventLog};
use crate::maneuver::Maneuver;
use crate::reconcile::{Divergence, Reconciler};
use crate::state::{Status, VehicleState, round_tenth};

/// Which model is authoritative. Fixed when the vehicle is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Mode {
    /// Only the local arithmetic model.
    Standalone,
    /// A renderer co-simulates the vehicle and its reports win.
    Bridged,
}

/// A simulated two-wheeled vehicle.
///
/// Commands never fail: a renderer that misbehaves is logged and the local model
/// carries on. The only error a caller sees is an invalid argument, such as an
/// unknown sensor direction.
pub struct Vehicle {
    config: VehicleConfig,
    state: VehicleState,
    log: EventLog,
    sensor: RangeSensor,
    accounting: Accounting,
    reconciler: Reconciler,
    bridge: Option<Bridge>,
    rng: StdRng,
}

impl Vehicle {
    /// Creates a standalone vehicle.
    ///
    /// # Errors
    /// Returns `VehicleError::InvalidConfig` if a sensor, cost or tolerance value is out of range.
    pub fn new(config: VehicleConfig) -> Result<Self, VehicleError> {
        let sensor = RangeSensor::new(
            config.sensor_range,
            config.cone_half_width,
            config.sensor_noise,
            config.min_reading,
        )?;
        let accounting = Accounting::from_config(&config)?;
        if !(config.nearby_radius >= 0.0) {
            return Err(VehicleError::InvalidConfig("nearby radius must be non-negative"));
        }
        if !(config.divergence_position >= 0.0 && config.divergence_heading >= 0.0) {
            return Err(VehicleError::InvalidConfig(
                "divergence tolerances must be non-negative",
            ));
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let obstacles = ObstacleField::generate(config.obstacles, &mut rng);
        info!(
            policy = ?config.obstacles,
            obstacles = obstacles.len(),
            "Vehicle created"
        );

        Ok(Vehicle {
            reconciler: Reconciler::from_config(&config),
            state: VehicleState::initial(obstacles),
            log: EventLog::new(),
            sensor,
            accounting,
            bridge: None,
            rng,
            config,
        })
    }

    /// Creates a vehicle driven alongside `renderer`.
    ///
    /// The renderer is reset once to check it is reachable. If that fails the vehicle
    /// stays standalone for its whole lifetime.
    ///
    /// # Errors
    /// Same as [`Vehicle::new`]; renderer failures are never returned.
    pub fn bridged(
        config: VehicleConfig,
        renderer: Box<dyn Renderer + Send>,
    ) -> Result<Self, VehicleError> {
        let mut vehicle = Self::new(config)?;
        match Bridge::attach(renderer) {
            Ok(bridge) => {
                info!(capabilities = ?bridge.capabilities(), "Renderer attached");
                vehicle.bridge = Some(bridge);
            }
            Err(e) => warn!(error = %e, "Renderer unreachable, running standalone"),
        }
        Ok(vehicle)
    }

    /// Whether a renderer is attached.
    pub fn mode(&self) -> Mode {
        if self.bridge.is_some() {
            Mode::Bridged
        } else {
            Mode::Standalone
        }
    }

    /// What the attached renderer supports; nothing when standalone.
    pub fn capabilities(&self) -> Capabilities {
        self.bridge
            .as_ref()
            .map_or(Capabilities::none(), Bridge::capabilities)
    }

    /// The configuration the vehicle was created with.
    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    /// The validated range sensor built from the config.
    pub fn range_sensor(&self) -> &RangeSensor {
        &self.sensor
    }

    /// Drives along the current heading. A negative distance drives backward.
    pub fn forward(&mut self, distance: f64) -> &mut Self {
        self.drive(distance, |bridge| bridge.send_move(distance))
    }

    /// Same transition and event as `forward(-distance)`. A renderer that declares a
    /// native backward drive receives that instead of a negative move.
    pub fn backward(&mut self, distance: f64) -> &mut Self {
        self.drive(-distance, |bridge| bridge.send_backward(distance))
    }

    fn drive(&mut self, distance: f64, send: impl FnOnce(&mut Bridge) -> bool) -> &mut Self {
        let next = match self.state.pose.advanced(distance) {
            Ok(pose) => pose,
            Err(e) => {
                warn!(error = %e, "Ignoring drive command");
                return self;
            }
        };
        let forwarded = self.bridge.as_mut().is_some_and(send);

        self.state.pose = next;
        self.accounting.charge_drive(&mut self.state, distance);
        self.accounting.check_collisions(&mut self.state);
        if forwarded {
            self.reconcile();
        }

        debug!(
            distance,
            x = self.state.pose.x,
            y = self.state.pose.y,
            battery = self.state.battery,
            "Drive"
        );
        self.record(Command::Forward(distance));
        self
    }

    /// Turns counter-clockwise.
    pub fn left(&mut self, degrees: f64) -> &mut Self {
        self.turn(-degrees, Command::Left(degrees))
    }

    /// Turns clockwise.
    pub fn right(&mut self, degrees: f64) -> &mut Self {
        self.turn(degrees, Command::Right(degrees))
    }

    fn turn(&mut self, clockwise: f64, command: Command) -> &mut Self {
        let next = match self.state.pose.rotated(clockwise) {
            Ok(pose) => pose,
            Err(e) => {
                warn!(error = %e, "Ignoring turn command");
                return self;
            }
        };
        let forwarded = self
            .bridge
            .as_mut()
            .is_some_and(|bridge| bridge.send_rotate(clockwise));

        self.state.pose = next;
        self.accounting.charge_turn(&mut self.state);
        if forwarded {
            self.reconcile();
        }

        debug!(
            degrees = clockwise,
            heading = self.state.pose.heading,
            battery = self.state.battery,
            "Turn"
        );
        self.record(command);
        self
    }

    /// Records a pause. Commands are instantaneous, so this never blocks.
    pub fn wait(&mut self, seconds: f64) -> &mut Self {
        if !seconds.is_finite() {
            warn!(seconds, "Ignoring wait with a non-finite duration");
            return self;
        }
        debug!(seconds, "Wait");
        self.record(Command::Wait(seconds));
        self
    }

    /// Reads the range sensor facing `direction` (`front`, `right`, `back` or `left`).
    ///
    /// # Errors
    /// Returns `VehicleError::InvalidArgument` for an unknown direction. Nothing is logged
    /// in that case.
    pub fn sensor(&mut self, direction: &str) -> Result<f64, VehicleError> {
        let direction: SensorDirection = direction.parse()?;
        Ok(self.sensor_at(direction))
    }

    /// Reads the range sensor facing `direction`. Never below the configured floor.
    pub fn sensor_at(&mut self, direction: SensorDirection) -> f64 {
        let remote = match self.bridge.as_mut() {
            Some(bridge) if bridge.capabilities().sensor => {
                self.reconciler.run(bridge, &mut self.state);
                bridge.sensor(direction).filter(|r| r.is_finite())
            }
            _ => None,
        };

        let reading = match remote {
            Some(raw) => self.sensor.clamp_reading(raw),
            None => self.sensor.read(
                &self.state.pose,
                direction,
                &self.state.obstacles,
                &mut self.rng,
            ),
        };

        debug!(%direction, reading, remote = remote.is_some(), "Sensor");
        self.record(Command::Sensor { direction, reading });
        reading
    }

    /// Battery percentage, rounded to one decimal.
    pub fn battery(&self) -> f64 {
        round_tenth(self.state.battery)
    }

    /// Total distance driven, rounded to one decimal.
    pub fn distance(&self) -> f64 {
        round_tenth(self.state.total_distance)
    }

    /// Position rounded to one decimal.
    pub fn get_position(&self) -> (f64, f64) {
        (round_tenth(self.state.pose.x), round_tenth(self.state.pose.y))
    }

    /// Heading rounded to one decimal, within `[0, 360)`.
    pub fn get_heading(&self) -> f64 {
        normalize_heading(round_tenth(self.state.pose.heading))
    }

    /// The exact pose.
    pub fn pose(&self) -> Pose {
        self.state.pose
    }

    /// The exact, unrounded state.
    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    /// Rounded summary of the current state.
    pub fn status(&self) -> Status {
        Status {
            position: self.get_position(),
            heading: self.get_heading(),
            battery: self.battery(),
            distance: self.distance(),
            speed: self.state.speed,
            obstacles_nearby: self.count_nearby(self.config.nearby_radius),
        }
    }

    /// Applies the collision penalty if an obstacle is within the collision radius.
    ///
    /// Runs automatically after every drive.
    pub fn check_collisions(&mut self) -> bool {
        self.accounting.check_collisions(&mut self.state).is_some()
    }

    /// Number of obstacles within `radius` of the vehicle.
    pub fn count_nearby(&self, radius: f64) -> usize {
        self.state
            .obstacles
            .count_within(WorldPoint::from(self.state.pose), radius)
    }

    /// Adds a point obstacle. Non-finite coordinates are ignored.
    pub fn add_obstacle(&mut self, x: f64, y: f64) -> &mut Self {
        let point = WorldPoint::new(x, y);
        if !point.is_finite() {
            warn!(x, y, "Ignoring obstacle with non-finite coordinates");
            return self;
        }
        self.state.obstacles.push(point);
        self
    }

    /// Every obstacle, generated and added.
    pub fn get_obstacles(&self) -> &[WorldPoint] {
        self.state.obstacles.points()
    }

    /// An owned copy of the event log, oldest first.
    pub fn get_event_log(&self) -> Vec<Event> {
        self.log.snapshot()
    }

    /// The most recent event, if any.
    pub fn last_event(&self) -> Option<&Event> {
        self.log.last()
    }

    /// Restores the initial state, regenerates obstacles and clears the event log.
    ///
    /// Obstacles added with [`Vehicle::add_obstacle`] are discarded.
    pub fn reset(&mut self) -> &mut Self {
        if let Some(bridge) = self.bridge.as_mut() {
            bridge.reset();
        }
        let obstacles = ObstacleField::generate(self.config.obstacles, &mut self.rng);
        self.state = VehicleState::initial(obstacles);
        self.log.clear();
        info!(obstacles = self.state.obstacles.len(), "Vehicle reset");
        self
    }

    /// Pulls the renderer's state into the local model without issuing a command.
    ///
    /// # Returns
    /// * `Option<Divergence>` - How far the renderer was from the local model, or `None`
    ///   when standalone
    pub fn sync(&mut self) -> Option<Divergence> {
        let bridge = self.bridge.as_mut()?;
        Some(self.reconciler.run(bridge, &mut self.state))
    }

    /// Runs a single maneuver.
    pub fn perform(&mut self, maneuver: Maneuver) -> &mut Self {
        match maneuver {
            Maneuver::Forward(d) => self.forward(d),
            Maneuver::Backward(d) => self.backward(d),
            Maneuver::Left(deg) => self.left(deg),
            Maneuver::Right(deg) => self.right(deg),
            Maneuver::Wait(s) => self.wait(s),
        }
    }

    /// Runs `maneuvers` in order, `times` times over.
    pub fn repeat(&mut self, maneuvers: &[Maneuver], times: usize) -> &mut Self {
        for _ in 0..times {
            for maneuver in maneuvers {
                self.perform(*maneuver);
            }
        }
        self
    }

    fn reconcile(&mut self) {
        if let Some(bridge) = self.bridge.as_mut() {
            self.reconciler.run(bridge, &mut self.state);
        }
    }

    fn record(&mut self, command: Command) {
        self.log.record(Event::capture(command, &self.state));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::bridge::ScenePoint;
    use crate::error::BridgeError;
    use crate::maneuver::square;
    use obocar_sensing::ObstaclePolicy;

    const EPSILON: f64 = 1e-9;

    fn quiet() -> Vehicle {
        Vehicle::new(VehicleConfig::quiet()).unwrap()
    }

    /// State of the scripted renderer, shared with the test body.
    #[derive(Debug, Default)]
    struct Script {
        pose: Pose,
        drift: f64,
        battery: Option<f64>,
        distance: f64,
        reading: Option<f64>,
        fail_moves: bool,
        fail_reset: bool,
        calls: Vec<String>,
    }

    impl Script {
        fn drive(&mut self, method: &'static str, distance: f64) -> Result<(), BridgeError> {
            if self.fail_moves {
                return Err(BridgeError::call(method, "scene busy"));
            }
            let mut next = self
                .pose
                .advanced(distance)
                .map_err(|e| BridgeError::call(method, e.to_string()))?;
            next.x += self.drift;
            self.pose = next;
            self.distance += distance.abs();
            Ok(())
        }
    }

    struct ScriptedRenderer {
        caps: Capabilities,
        script: Arc<Mutex<Script>>,
    }

    impl ScriptedRenderer {
        fn boxed(caps: Capabilities, script: &Arc<Mutex<Script>>) -> Box<dyn Renderer + Send> {
            Box::new(ScriptedRenderer {
                caps,
                script: Arc::clone(script),
            })
        }
    }

    impl Renderer for ScriptedRenderer {
        fn capabilities(&self) -> Capabilities {
            self.caps
        }

        fn move_by(&mut self, distance: f64) -> Result<(), BridgeError> {
            let mut s = self.script.lock();
            s.calls.push(format!("move({})", distance));
            s.drive("move", distance)
        }

        fn backward(&mut self, distance: f64) -> Result<(), BridgeError> {
            let mut s = self.script.lock();
            s.calls.push(format!("backward({})", distance));
            s.drive("backward", -distance)
        }

        fn rotate(&mut self, degrees: f64) -> Result<(), BridgeError> {
            let mut s = self.script.lock();
            s.calls.push(format!("rotate({})", degrees));
            s.pose = s.pose.rotated(degrees).map_err(|e| BridgeError::call("rotate", e.to_string()))?;
            Ok(())
        }

        fn position(&mut self) -> Result<Option<ScenePoint>, BridgeError> {
            let s = self.script.lock();
            Ok(Some(ScenePoint::new(s.pose.x, 0.3, s.pose.y)))
        }

        fn rotation(&mut self) -> Result<Option<f64>, BridgeError> {
            Ok(Some(self.script.lock().pose.heading))
        }

        fn battery(&mut self) -> Result<Option<f64>, BridgeError> {
            Ok(self.script.lock().battery)
        }

        fn distance_traveled(&mut self) -> Result<Option<f64>, BridgeError> {
            Ok(Some(self.script.lock().distance))
        }

        fn sensor(&mut self, _direction: SensorDirection) -> Result<Option<f64>, BridgeError> {
            Ok(self.script.lock().reading)
        }

        fn update_state(&mut self, x: f64, y: f64, heading: f64) -> Result<(), BridgeError> {
            let mut s = self.script.lock();
            s.calls.push("updateState".to_string());
            s.pose = Pose::new(x, y, heading);
            Ok(())
        }

        fn reset(&mut self) -> Result<(), BridgeError> {
            let mut s = self.script.lock();
            s.calls.push("reset".to_string());
            if s.fail_reset {
                return Err(BridgeError::Disconnected);
            }
            s.pose = Pose::origin();
            s.distance = 0.0;
            Ok(())
        }
    }

    fn bridged(caps: Capabilities, script: Script) -> (Vehicle, Arc<Mutex<Script>>) {
        bridged_with(VehicleConfig::quiet(), caps, script)
    }

    fn bridged_with(
        config: VehicleConfig,
        caps: Capabilities,
        script: Script,
    ) -> (Vehicle, Arc<Mutex<Script>>) {
        let script = Arc::new(Mutex::new(script));
        let vehicle = Vehicle::bridged(config, ScriptedRenderer::boxed(caps, &script)).unwrap();
        (vehicle, script)
    }

    #[test]
    fn test_vehicle_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Vehicle>();
    }

    #[test]
    fn test_initial_state() {
        let v = quiet();
        assert_eq!(v.mode(), Mode::Standalone);
        assert_eq!(v.capabilities(), Capabilities::none());
        assert_eq!(v.get_position(), (0.0, 0.0));
        assert_eq!(v.get_heading(), 0.0);
        assert_eq!(v.battery(), 100.0);
        assert_eq!(v.distance(), 0.0);
        assert!(v.get_obstacles().is_empty());
        assert!(v.get_event_log().is_empty());
    }

    #[test]
    fn test_forward_three() {
        let mut v = quiet();
        v.forward(3.0);
        assert_eq!(v.get_position(), (0.0, 3.0));
        assert_eq!(v.distance(), 3.0);
        assert_eq!(v.battery(), 97.0);
        assert_eq!(v.last_event().map(Event::description), Some("forward(3)".to_string()));
    }

    #[test]
    fn test_square_returns_home() {
        let mut v = quiet();
        v.repeat(&square(3.0), 1);
        let pose = v.pose();
        assert!(pose.x.abs() < EPSILON);
        assert!(pose.y.abs() < EPSILON);
        assert_eq!(v.get_position(), (0.0, 0.0));
        assert_eq!(v.get_heading(), 0.0);
        assert_eq!(v.get_event_log().len(), 8);
    }

    #[test]
    fn test_backward_matches_negative_forward() {
        let mut a = quiet();
        let mut b = quiet();
        a.right(30.0).backward(4.0);
        b.right(30.0).forward(-4.0);
        assert_eq!(a.state(), b.state());

        let describe = |v: &Vehicle| {
            v.get_event_log()
                .iter()
                .map(Event::description)
                .collect::<Vec<_>>()
        };
        assert_eq!(describe(&a), describe(&b));
        assert_eq!(describe(&a).last().map(String::as_str), Some("forward(-4)"));
    }

    #[test]
    fn test_heading_wraps() {
        let mut v = quiet();
        v.left(30.0);
        assert_eq!(v.get_heading(), 330.0);
        v.right(400.0);
        assert!((v.pose().heading - 10.0).abs() < EPSILON);
        v.left(730.0);
        assert!((v.pose().heading - 0.0).abs() < EPSILON);
        assert!((0.0..360.0).contains(&v.get_heading()));
    }

    #[test]
    fn test_battery_formula() {
        let mut v = quiet();
        v.forward(5.0).left(90.0).forward(2.5).right(45.0).right(45.0).backward(2.0);
        // D = 9.5, k = 3
        assert!((v.state().battery - (100.0 - 9.5 - 1.5)).abs() < EPSILON);
        assert_eq!(v.battery(), 89.0);
    }

    #[test]
    fn test_battery_floors_at_zero() {
        let mut v = quiet();
        v.forward(150.0).left(90.0);
        assert_eq!(v.battery(), 0.0);
        assert_eq!(v.distance(), 150.0);
    }

    #[test]
    fn test_sensor_sees_obstacle_ahead() {
        let config = VehicleConfig {
            obstacles: ObstaclePolicy::None,
            seed: Some(11),
            ..VehicleConfig::default()
        };
        let mut v = Vehicle::new(config).unwrap();
        v.add_obstacle(0.0, 5.0);

        for _ in 0..20 {
            let reading = v.sensor("front").unwrap();
            assert!((reading - 5.0).abs() <= 0.2 + EPSILON);
        }
        let behind = v.sensor("back").unwrap();
        assert!((behind - 20.0).abs() <= 0.2 + EPSILON);
        assert_eq!(v.get_event_log().len(), 21);
    }

    #[test]
    fn test_sensor_follows_heading() {
        let mut v = quiet();
        v.add_obstacle(6.0, 0.0);
        assert_eq!(v.sensor_at(SensorDirection::Right), 6.0);
        v.right(90.0);
        assert_eq!(v.sensor_at(SensorDirection::Front), 6.0);
        assert_eq!(v.sensor_at(SensorDirection::Right), 20.0);
    }

    #[test]
    fn test_sensor_floor() {
        let mut v = quiet();
        v.add_obstacle(0.0, 0.05);
        assert_eq!(v.sensor("front").unwrap(), 0.1);
    }

    #[test]
    fn test_invalid_direction() {
        let mut v = quiet();
        for bad in ["up", "Front", "FRONT", " front", "left "] {
            assert!(matches!(
                v.sensor(bad),
                Err(VehicleError::InvalidArgument(_))
            ));
        }
        assert!(v.get_event_log().is_empty());
    }

    #[test]
    fn test_collision_penalty() {
        let mut v = quiet();
        v.add_obstacle(0.0, 3.5).add_obstacle(0.2, 3.0);
        v.forward(3.0);
        // One penalty even though two obstacles are in range
        assert_eq!(v.battery(), 87.0);
        assert!(v.check_collisions());
        assert_eq!(v.battery(), 77.0);
        assert_eq!(v.count_nearby(1.0), 2);
    }

    #[test]
    fn test_status() {
        let mut v = quiet();
        v.add_obstacle(0.0, 12.0).add_obstacle(40.0, 40.0).add_obstacle(-3.0, 0.0);
        v.forward(2.04).right(90.0);
        let status = v.status();
        assert_eq!(status.position, (0.0, 2.0));
        assert_eq!(status.heading, 90.0);
        assert_eq!(status.battery, 97.5);
        assert_eq!(status.distance, 2.0);
        assert_eq!(status.speed, 0.0);
        assert_eq!(status.obstacles_nearby, 2);
    }

    #[test]
    fn test_non_finite_commands_ignored() {
        let mut v = quiet();
        v.forward(f64::NAN).left(f64::INFINITY).wait(f64::NAN);
        v.add_obstacle(f64::NAN, 1.0);
        assert_eq!(v.pose(), Pose::origin());
        assert_eq!(v.battery(), 100.0);
        assert!(v.get_event_log().is_empty());
        assert!(v.get_obstacles().is_empty());
    }

    #[test]
    fn test_wait_logs_without_moving() {
        let mut v = quiet();
        v.wait(0.5);
        assert_eq!(v.pose(), Pose::origin());
        assert_eq!(v.last_event().map(Event::description), Some("wait(0.5)".to_string()));
    }

    #[test]
    fn test_reset() {
        let mut v = quiet();
        v.add_obstacle(5.0, 5.0);
        v.forward(4.0).left(45.0).sensor("left").unwrap();
        v.reset();
        assert_eq!(v.pose(), Pose::origin());
        assert_eq!(v.battery(), 100.0);
        assert_eq!(v.distance(), 0.0);
        assert_eq!(v.state().speed, 0.0);
        assert!(v.get_event_log().is_empty());
        assert!(v.get_obstacles().is_empty());
    }

    #[test]
    fn test_reset_regenerates_policy_obstacles() {
        let config = VehicleConfig {
            obstacles: ObstaclePolicy::Circle,
            ..VehicleConfig::quiet()
        };
        let mut v = Vehicle::new(config).unwrap();
        assert_eq!(v.get_obstacles().len(), 8);
        v.add_obstacle(1.0, 1.0);
        v.reset();
        assert_eq!(v.get_obstacles().len(), 8);
    }

    #[test]
    fn test_invalid_config() {
        let config = VehicleConfig {
            sensor_range: 0.0,
            ..VehicleConfig::default()
        };
        assert!(matches!(
            Vehicle::new(config),
            Err(VehicleError::InvalidConfig(_))
        ));
        let config = VehicleConfig {
            divergence_heading: -1.0,
            ..VehicleConfig::default()
        };
        assert!(Vehicle::new(config).is_err());
    }

    #[test]
    fn test_renderer_values_override_local() {
        let (mut v, script) = bridged(
            Capabilities {
                sensor: false,
                ..Capabilities::all()
            },
            Script {
                drift: 0.5,
                battery: Some(77.0),
                ..Script::default()
            },
        );
        assert_eq!(v.mode(), Mode::Bridged);

        v.forward(3.0);
        assert_eq!(v.get_position(), (0.5, 3.0));
        assert_eq!(v.battery(), 77.0);
        assert_eq!(v.distance(), 3.0);

        v.right(90.0);
        assert_eq!(v.get_heading(), 90.0);
        assert_eq!(v.battery(), 77.0);

        let event = v.last_event().unwrap();
        assert_eq!(event.position.0, 0.5);
        assert_eq!(event.battery, 77.0);

        let calls = script.lock().calls.clone();
        assert_eq!(calls, vec!["reset", "move(3)", "rotate(90)"]);
    }

    #[test]
    fn test_left_rotates_counter_clockwise_in_scene() {
        let (mut v, script) = bridged(Capabilities::all(), Script::default());
        v.left(90.0);
        assert_eq!(v.get_heading(), 270.0);
        assert_eq!(script.lock().calls.last().map(String::as_str), Some("rotate(-90)"));

        v.backward(2.0);
        assert_eq!(script.lock().calls.last().map(String::as_str), Some("backward(2)"));
        assert_eq!(v.get_position(), (2.0, 0.0));
    }

    #[test]
    fn test_native_backward_matches_negative_forward() {
        let (mut a, script) = bridged(Capabilities::all(), Script::default());
        let (mut b, _) = bridged(Capabilities::all(), Script::default());
        a.right(30.0).backward(4.0);
        b.right(30.0).forward(-4.0);
        assert_eq!(a.state(), b.state());
        assert_eq!(
            a.last_event().map(Event::description),
            Some("forward(-4)".to_string())
        );
        assert_eq!(script.lock().calls, vec!["reset", "rotate(30)", "backward(4)"]);
    }

    #[test]
    fn test_backward_without_native_support_sends_negative_move() {
        let (mut v, script) = bridged(
            Capabilities {
                backward: false,
                ..Capabilities::all()
            },
            Script::default(),
        );
        v.backward(2.0);
        assert_eq!(script.lock().calls, vec!["reset", "move(-2)"]);
        assert_eq!(v.get_position(), (0.0, -2.0));
        assert_eq!(v.distance(), 2.0);
        assert_eq!(
            v.last_event().map(Event::description),
            Some("forward(-2)".to_string())
        );
    }

    #[test]
    fn test_failing_renderer_keeps_local_result() {
        let (mut v, _script) = bridged(
            Capabilities::all(),
            Script {
                drift: 5.0,
                battery: Some(10.0),
                fail_moves: true,
                ..Script::default()
            },
        );
        v.forward(3.0);
        assert_eq!(v.mode(), Mode::Bridged);
        assert_eq!(v.get_position(), (0.0, 3.0));
        assert_eq!(v.battery(), 97.0);
        assert_eq!(v.get_event_log().len(), 1);
    }

    #[test]
    fn test_unsupported_capabilities_degrade() {
        let (mut v, _script) = bridged(
            Capabilities {
                moves: true,
                position: true,
                ..Capabilities::none()
            },
            Script {
                drift: 0.5,
                battery: Some(10.0),
                ..Script::default()
            },
        );
        v.forward(3.0);
        // Position comes from the renderer, battery stays local
        assert_eq!(v.get_position(), (0.5, 3.0));
        assert_eq!(v.battery(), 97.0);

        // Turning is not forwarded, so there is no reconciliation
        v.right(90.0);
        assert_eq!(v.get_heading(), 90.0);
        assert_eq!(v.battery(), 96.5);
    }

    #[test]
    fn test_unreachable_renderer_falls_back() {
        let (mut v, script) = bridged(
            Capabilities::all(),
            Script {
                fail_reset: true,
                drift: 1.0,
                ..Script::default()
            },
        );
        assert_eq!(v.mode(), Mode::Standalone);
        v.forward(3.0);
        assert_eq!(v.get_position(), (0.0, 3.0));
        assert_eq!(script.lock().calls, vec!["reset"]);
        assert!(v.sync().is_none());
    }

    #[test]
    fn test_renderer_sensor() {
        let (mut v, script) = bridged(
            Capabilities::all(),
            Script {
                reading: Some(0.01),
                ..Script::default()
            },
        );
        assert_eq!(v.sensor("front").unwrap(), 0.1);

        script.lock().reading = Some(7.25);
        assert_eq!(v.sensor("left").unwrap(), 7.25);

        // No reading from the renderer falls back to the local cast
        script.lock().reading = None;
        assert_eq!(v.sensor("left").unwrap(), 20.0);
    }

    #[test]
    fn test_push_local_state() {
        let config = VehicleConfig {
            push_local_state: true,
            ..VehicleConfig::quiet()
        };
        let (mut v, script) = bridged_with(
            config,
            Capabilities::all(),
            Script {
                drift: 0.5,
                battery: Some(60.0),
                ..Script::default()
            },
        );
        v.forward(3.0);
        // Local pose wins, other renderer values still apply
        assert_eq!(v.get_position(), (0.0, 3.0));
        assert_eq!(v.battery(), 60.0);
        let s = script.lock();
        assert_eq!((s.pose.x, s.pose.y), (0.0, 3.0));
        assert!(s.calls.contains(&"updateState".to_string()));
    }

    #[test]
    fn test_sync_pulls_without_event() {
        let (mut v, script) = bridged(Capabilities::all(), Script::default());
        script.lock().pose = Pose::new(2.0, 1.0, 45.0);
        let divergence = v.sync().unwrap();
        assert!((divergence.position.unwrap() - 3.0).abs() < EPSILON);
        assert!((divergence.heading.unwrap() - 45.0).abs() < EPSILON);
        assert_eq!(v.get_position(), (2.0, 1.0));
        assert_eq!(v.get_heading(), 45.0);
        assert!(v.get_event_log().is_empty());
    }

    #[test]
    fn test_reset_is_forwarded() {
        let (mut v, script) = bridged(Capabilities::all(), Script::default());
        v.forward(1.0).reset();
        assert_eq!(script.lock().calls, vec!["reset", "move(1)", "reset"]);
        assert_eq!(v.pose(), Pose::origin());
    }
}
