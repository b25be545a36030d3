//! Append-only diagnostic trail of vehicle commands.

use core::fmt;
use std::time::SystemTime;

use obocar_sensing::SensorDirection;

use crate::state::VehicleState;

/// A command as it is recorded in the event log.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Command {
    /// A drive; backward drives are recorded with a negative distance.
    Forward(f64),
    /// A counter-clockwise turn in degrees.
    Left(f64),
    /// A clockwise turn in degrees.
    Right(f64),
    /// A range reading.
    Sensor {
        /// Where the sensor faced.
        direction: SensorDirection,
        /// What it returned.
        reading: f64,
    },
    /// A pause in seconds.
    Wait(f64),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Forward(distance) => write!(f, "forward({})", distance),
            Command::Left(degrees) => write!(f, "left({})", degrees),
            Command::Right(degrees) => write!(f, "right({})", degrees),
            Command::Sensor { direction, reading } => {
                write!(f, "sensor({}) = {:.1}", direction, reading)
            }
            Command::Wait(seconds) => write!(f, "wait({})", seconds),
        }
    }
}

/// One entry of the event log: a command and the state it left behind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    /// Wall-clock time of the command.
    pub timestamp: SystemTime,
    /// What was done.
    pub command: Command,
    /// Exact `(x, y)` afterwards.
    pub position: (f64, f64),
    /// Exact heading afterwards.
    pub heading: f64,
    /// Battery afterwards.
    pub battery: f64,
}

impl Event {
    /// Captures `command` together with a snapshot of `state`.
    pub fn capture(command: Command, state: &VehicleState) -> Self {
        Event {
            timestamp: SystemTime::now(),
            command,
            position: (state.pose.x, state.pose.y),
            heading: state.pose.heading,
            battery: state.battery,
        }
    }

    /// Human readable form of the command, e.g. `forward(3)`.
    pub fn description(&self) -> String {
        self.command.to_string()
    }
}

/// The log itself. Only [`EventLog::clear`] removes entries.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `event`.
    pub fn record(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Returns an owned copy of every event, oldest first.
    pub fn snapshot(&self) -> Vec<Event> {
        self.events.clone()
    }

    /// The most recent event.
    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drops every event.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
