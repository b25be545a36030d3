use core::fmt;

/// A single movement command as data, so sequences can be stored and repeated.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Maneuver {
    /// Drive ahead by a distance.
    Forward(f64),
    /// Drive in reverse by a distance.
    Backward(f64),
    /// Turn counter-clockwise by degrees.
    Left(f64),
    /// Turn clockwise by degrees.
    Right(f64),
    /// Pause for seconds.
    Wait(f64),
}

impl fmt::Display for Maneuver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Maneuver::Forward(d) => write!(f, "forward({})", d),
            Maneuver::Backward(d) => write!(f, "backward({})", d),
            Maneuver::Left(deg) => write!(f, "left({})", deg),
            Maneuver::Right(deg) => write!(f, "right({})", deg),
            Maneuver::Wait(s) => write!(f, "wait({})", s),
        }
    }
}

/// Four sides of a square, turning clockwise after each side.
pub fn square(side: f64) -> [Maneuver; 8] {
    [
        Maneuver::Forward(side),
        Maneuver::Right(90.0),
        Maneuver::Forward(side),
        Maneuver::Right(90.0),
        Maneuver::Forward(side),
        Maneuver::Right(90.0),
        Maneuver::Forward(side),
        Maneuver::Right(90.0),
    ]
}
