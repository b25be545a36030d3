use obocar_kinematics::Pose;

/// Represents a point in world coordinates (plane units).
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldPoint {
    /// The lateral coordinate.
    pub x: f64,
    /// The forward coordinate.
    pub y: f64,
}

impl WorldPoint {
    /// Creates a new `WorldPoint`.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(&self, other: WorldPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Returns `true` if both coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<Pose> for WorldPoint {
    fn from(pose: Pose) -> Self {
        Self::new(pose.x, pose.y)
    }
}

impl From<(f64, f64)> for WorldPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<WorldPoint> for (f64, f64) {
    fn from(p: WorldPoint) -> Self {
        (p.x, p.y)
    }
}
