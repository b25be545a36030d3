use std::time::Duration;

use obocar_vehicle::{Maneuver, SensorDirection, Status, Vehicle, maneuver};
use spin_sleep::SpinSleeper;
use tracing::{info, warn};

use crate::bus::{Telemetry, Topic};
use crate::config::{MissionConfig, MissionKind};

/// Drives a vehicle one command at a time, publishing telemetry after each.
pub struct Pilot {
    vehicle: Vehicle,
    telemetry: Topic<Telemetry>,
    sleeper: SpinSleeper,
    step: Duration,
    commands: usize,
}

impl Pilot {
    pub fn new(vehicle: Vehicle, telemetry: Topic<Telemetry>, step: Duration) -> Self {
        Pilot {
            vehicle,
            telemetry,
            sleeper: SpinSleeper::new(100_000),
            step,
            commands: 0,
        }
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn perform(&mut self, maneuver: Maneuver) {
        self.vehicle.perform(maneuver);
        self.publish();
    }

    pub fn sense(&mut self, direction: SensorDirection) -> f64 {
        let reading = self.vehicle.sensor_at(direction);
        self.publish();
        reading
    }

    fn publish(&mut self) {
        self.commands += 1;
        self.telemetry.publish(Telemetry::capture(&self.vehicle));
        if !self.step.is_zero() {
            self.sleeper.sleep(self.step);
        }
    }
}

/// How a mission ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissionReport {
    pub commands: usize,
    pub status: Status,
}

/// Runs the configured mission to completion.
pub fn run(pilot: &mut Pilot, config: &MissionConfig) -> MissionReport {
    for &[x, y] in &config.obstacles {
        pilot.vehicle.add_obstacle(x, y);
    }
    info!(
        kind = ?config.kind,
        obstacles = pilot.vehicle().get_obstacles().len(),
        "Mission started"
    );

    match config.kind {
        MissionKind::Square => square(pilot, config.side, config.laps),
        MissionKind::Patrol => patrol(pilot, config),
        MissionKind::Explore => explore(pilot, config),
    }

    let report = MissionReport {
        commands: pilot.commands,
        status: pilot.vehicle().status(),
    };
    info!(commands = report.commands, status = ?report.status, "Mission finished");
    report
}

fn square(pilot: &mut Pilot, side: f64, laps: usize) {
    let route = maneuver::square(side);
    for lap in 0..laps {
        for m in route {
            pilot.perform(m);
        }
        let (x, y) = pilot.vehicle.get_position();
        info!(lap, x, y, heading = pilot.vehicle.get_heading(), "Square lap complete");
    }
}

/// Drives the patrol route, checking the front sensor before each forward leg and
/// detouring when the leg is blocked.
fn patrol(pilot: &mut Pilot, config: &MissionConfig) {
    for lap in 0..config.laps {
        for &m in &config.route {
            match m {
                Maneuver::Forward(d) => {
                    let front = pilot.sense(SensorDirection::Front);
                    if front > d + 1.0 {
                        pilot.perform(m);
                    } else {
                        warn!(front, leg = d, "Patrol leg blocked, detouring");
                        pilot.perform(Maneuver::Right(config.turn));
                        pilot.perform(Maneuver::Forward(d / 2.0));
                        pilot.perform(Maneuver::Left(config.turn));
                    }
                }
                other => pilot.perform(other),
            }
            pilot.perform(Maneuver::Wait(config.pause));
        }
        info!(lap, battery = pilot.vehicle.battery(), "Patrol lap complete");
    }
}

fn explore(pilot: &mut Pilot, config: &MissionConfig) {
    let mut moves = 0;
    while moves < config.max_moves && pilot.vehicle.battery() > config.min_battery {
        let readings = Readings {
            front: pilot.sense(SensorDirection::Front),
            right: pilot.sense(SensorDirection::Right),
            back: pilot.sense(SensorDirection::Back),
            left: pilot.sense(SensorDirection::Left),
        };
        let next = decide(&readings, config.clearance, config.step, config.turn);
        info!(moves, ?readings, ?next, "Exploring");
        pilot.perform(next);
        pilot.perform(Maneuver::Wait(config.pause));
        moves += 1;
    }
    if pilot.vehicle.battery() <= config.min_battery {
        warn!(battery = pilot.vehicle.battery(), "Exploration stopped on low battery");
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Readings {
    front: f64,
    right: f64,
    back: f64,
    left: f64,
}

/// Go forward if the way ahead is clear, otherwise turn toward the more open side.
fn decide(readings: &Readings, clearance: f64, step: f64, turn: f64) -> Maneuver {
    if readings.front > clearance {
        Maneuver::Forward(step)
    } else if readings.right > readings.left {
        Maneuver::Right(turn)
    } else if readings.left > readings.right {
        Maneuver::Left(turn)
    } else {
        Maneuver::Right(180.0)
    }
}
