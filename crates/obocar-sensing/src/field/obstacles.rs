#![warn(missing_docs)]

use rand::Rng;
use tracing::debug;

use super::WorldPoint;

const WALL_X: f64 = 10.0;
const WALL_LENGTH: usize = 20;
const WALL_SPACING: usize = 2;
const SCATTER_COUNT: usize = 8;
const SCATTER_EXTENT: f64 = 30.0;
const CIRCLE_RADIUS: f64 = 15.0;
const CIRCLE_STEP_DEG: usize = 45;

/// How an obstacle field is populated when a vehicle is created or reset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ObstaclePolicy {
    /// No obstacles; every sensor reads its maximum range.
    None,
    /// One of the three patterns below, picked uniformly at random.
    #[default]
    Random,
    /// A vertical wall of points at `x = 10`, `y = 0, 2, .., 18`.
    Wall,
    /// Eight points scattered uniformly over `[-30, 30]²`.
    Scattered,
    /// Eight points on a circle of radius 15 around the origin, every 45°.
    Circle,
}

/// An unordered collection of point obstacles.
///
/// Points are kept in insertion order so scans that stop at the first hit are
/// deterministic. Duplicates are allowed.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObstacleField {
    points: Vec<WorldPoint>,
}

impl ObstacleField {
    /// Creates an empty field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a field populated according to `policy`.
    ///
    /// # Arguments
    /// * `policy` - Which pattern to generate
    /// * `rng` - Random source for the scattered pattern and the random choice
    pub fn generate<R: Rng + ?Sized>(policy: ObstaclePolicy, rng: &mut R) -> Self {
        let points = match policy {
            ObstaclePolicy::None => Vec::new(),
            ObstaclePolicy::Wall => wall(),
            ObstaclePolicy::Scattered => scattered(rng),
            ObstaclePolicy::Circle => circle(),
            ObstaclePolicy::Random => match rng.random_range(0..3) {
                0 => wall(),
                1 => scattered(rng),
                _ => circle(),
            },
        };
        debug!(?policy, count = points.len(), "Generated obstacle field");
        Self { points }
    }

    /// Adds an obstacle at the end of the field.
    pub fn push(&mut self, point: WorldPoint) {
        self.points.push(point);
    }

    /// Removes every obstacle.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Gets the obstacles in insertion order.
    pub fn points(&self) -> &[WorldPoint] {
        &self.points
    }

    /// Iterates over the obstacles in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &WorldPoint> {
        self.points.iter()
    }

    /// Number of obstacles.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the field holds no obstacles.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Counts obstacles whose distance to `center` is at most `radius`.
    pub fn count_within(&self, center: WorldPoint, radius: f64) -> usize {
        self.points
            .iter()
            .filter(|p| p.distance_to(center) <= radius)
            .count()
    }

    /// Returns the first obstacle, in insertion order, strictly closer than `radius` to `center`.
    pub fn first_within(&self, center: WorldPoint, radius: f64) -> Option<WorldPoint> {
        self.points
            .iter()
            .find(|p| p.distance_to(center) < radius)
            .copied()
    }
}

impl FromIterator<WorldPoint> for ObstacleField {
    fn from_iter<I: IntoIterator<Item = WorldPoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

fn wall() -> Vec<WorldPoint> {
    (0..WALL_LENGTH)
        .step_by(WALL_SPACING)
        .map(|i| WorldPoint::new(WALL_X, i as f64))
        .collect()
}

fn scattered<R: Rng + ?Sized>(rng: &mut R) -> Vec<WorldPoint> {
    (0..SCATTER_COUNT)
        .map(|_| {
            WorldPoint::new(
                rng.random_range(-SCATTER_EXTENT..=SCATTER_EXTENT),
                rng.random_range(-SCATTER_EXTENT..=SCATTER_EXTENT),
            )
        })
        .collect()
}

fn circle() -> Vec<WorldPoint> {
    (0..360)
        .step_by(CIRCLE_STEP_DEG)
        .map(|deg| {
            let rad = (deg as f64).to_radians();
            WorldPoint::new(CIRCLE_RADIUS * rad.cos(), CIRCLE_RADIUS * rad.sin())
        })
        .collect()
}
