#![warn(missing_docs)]

//! Directional range sensing against a field of point obstacles.
//!
//! A sensor looks along `heading + offset`, where the offset depends on which
//! of the four mounted sensors is read. Any obstacle whose bearing lies within
//! the cone half-width of that direction, and which is closer than the sensor
//! range, can be the reported hit.

use core::fmt;
use core::str::FromStr;

use obocar_kinematics::{Pose, angular_difference, normalize_heading};
use rand::Rng;

use crate::error::SensingError;
use crate::field::ObstacleField;

/// Default maximum detection range.
pub const DEFAULT_RANGE: f64 = 20.0;
/// Default cone half-width in degrees.
pub const DEFAULT_CONE_HALF_WIDTH: f64 = 30.0;
/// Default amplitude of the uniform reading noise.
pub const DEFAULT_NOISE: f64 = 0.2;
/// Default lowest value a reading can take.
pub const DEFAULT_MIN_READING: f64 = 0.1;

/// One of the four sensors mounted on the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SensorDirection {
    /// Looks along the heading.
    Front,
    /// Looks 90° clockwise of the heading.
    Right,
    /// Looks opposite the heading.
    Back,
    /// Looks 90° counter-clockwise of the heading.
    Left,
}

impl SensorDirection {
    /// All directions, clockwise from the front.
    pub const ALL: [SensorDirection; 4] = [
        SensorDirection::Front,
        SensorDirection::Right,
        SensorDirection::Back,
        SensorDirection::Left,
    ];

    /// Clockwise offset from the vehicle heading, in degrees.
    pub const fn offset(self) -> f64 {
        match self {
            SensorDirection::Front => 0.0,
            SensorDirection::Right => 90.0,
            SensorDirection::Back => 180.0,
            SensorDirection::Left => 270.0,
        }
    }

    /// The lowercase name used on the wire and in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            SensorDirection::Front => "front",
            SensorDirection::Right => "right",
            SensorDirection::Back => "back",
            SensorDirection::Left => "left",
        }
    }
}

impl fmt::Display for SensorDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorDirection {
    type Err = SensingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensorDirection::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| SensingError::UnknownDirection(s.to_string()))
    }
}

/// A cone-shaped range sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSensor {
    range: f64,
    cone_half_width: f64,
    noise: f64,
    min_reading: f64,
}

impl Default for RangeSensor {
    fn default() -> Self {
        RangeSensor {
            range: DEFAULT_RANGE,
            cone_half_width: DEFAULT_CONE_HALF_WIDTH,
            noise: DEFAULT_NOISE,
            min_reading: DEFAULT_MIN_READING,
        }
    }
}

impl RangeSensor {
    /// Creates a range sensor.
    ///
    /// # Arguments
    /// * `range` - Maximum detection range, reported when nothing is in the cone
    /// * `cone_half_width` - Half-width of the detection cone in degrees
    /// * `noise` - Amplitude of the uniform noise added to every reading (0 disables it)
    /// * `min_reading` - Lowest value a reading can take
    ///
    /// # Errors
    /// Returns `SensingError::InvalidParameter` if `range` is not positive, the cone is not
    /// within `(0, 180]`, `noise` is negative, or `min_reading` is negative or beyond `range`.
    pub fn new(
        range: f64,
        cone_half_width: f64,
        noise: f64,
        min_reading: f64,
    ) -> Result<Self, SensingError> {
        if !(range.is_finite() && range > 0.0) {
            return Err(SensingError::InvalidParameter("range must be positive"));
        }
        if !(cone_half_width > 0.0 && cone_half_width <= 180.0) {
            return Err(SensingError::InvalidParameter(
                "cone half-width must be within (0, 180] degrees",
            ));
        }
        if !(noise.is_finite() && noise >= 0.0) {
            return Err(SensingError::InvalidParameter("noise must be non-negative"));
        }
        if !(min_reading >= 0.0 && min_reading <= range) {
            return Err(SensingError::InvalidParameter(
                "minimum reading must be within [0, range]",
            ));
        }
        Ok(RangeSensor {
            range,
            cone_half_width,
            noise,
            min_reading,
        })
    }

    /// Returns the maximum detection range.
    pub fn range(&self) -> f64 {
        self.range
    }

    /// Returns the cone half-width in degrees.
    pub fn cone_half_width(&self) -> f64 {
        self.cone_half_width
    }

    /// Returns the noise amplitude.
    pub fn noise(&self) -> f64 {
        self.noise
    }

    /// Returns the reading floor.
    pub fn min_reading(&self) -> f64 {
        self.min_reading
    }

    /// Absolute compass angle the given sensor looks along, in `[0, 360)`.
    pub fn absolute_angle(&self, heading: f64, direction: SensorDirection) -> f64 {
        normalize_heading(heading + direction.offset())
    }

    /// Distance to the nearest obstacle inside the cone and strictly within range.
    ///
    /// # Returns
    /// * `Option<f64>` - Noise-free distance, or `None` if nothing qualifies
    pub fn nearest(
        &self,
        pose: &Pose,
        direction: SensorDirection,
        field: &ObstacleField,
    ) -> Option<f64> {
        let sensor_angle = self.absolute_angle(pose.heading, direction);

        field
            .iter()
            .filter(|p| angular_difference(pose.bearing_to(p.x, p.y), sensor_angle) <= self.cone_half_width)
            .map(|p| pose.distance_to(p.x, p.y))
            .filter(|d| *d < self.range)
            .min_by(f64::total_cmp)
    }

    /// Noise-free reading: the nearest hit, or the full range.
    pub fn cast(&self, pose: &Pose, direction: SensorDirection, field: &ObstacleField) -> f64 {
        self.nearest(pose, direction, field).unwrap_or(self.range)
    }

    /// A full sensor reading: cast, add uniform noise, clamp to the floor.
    pub fn read<R: Rng + ?Sized>(
        &self,
        pose: &Pose,
        direction: SensorDirection,
        field: &ObstacleField,
        rng: &mut R,
    ) -> f64 {
        let noise = if self.noise > 0.0 {
            rng.random_range(-self.noise..=self.noise)
        } else {
            0.0
        };
        self.clamp_reading(self.cast(pose, direction, field) + noise)
    }

    /// Applies the reading floor to a value obtained elsewhere.
    ///
    /// Non-finite values are treated as "nothing seen" and map to the range.
    pub fn clamp_reading(&self, raw: f64) -> f64 {
        if !raw.is_finite() {
            return self.range;
        }
        raw.max(self.min_reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::WorldPoint;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const EPSILON: f64 = 1e-9;

    fn field_of(points: &[(f64, f64)]) -> ObstacleField {
        points.iter().copied().map(WorldPoint::from).collect()
    }

    fn quiet_sensor() -> RangeSensor {
        RangeSensor::new(DEFAULT_RANGE, DEFAULT_CONE_HALF_WIDTH, 0.0, DEFAULT_MIN_READING).unwrap()
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("front".parse::<SensorDirection>().unwrap(), SensorDirection::Front);
        assert_eq!("left".parse::<SensorDirection>().unwrap(), SensorDirection::Left);
        assert_eq!("back".parse::<SensorDirection>().unwrap(), SensorDirection::Back);
        // Names are exact: no case folding, no trimming
        for bad in ["Front", "FRONT", " front", "left ", "BACK"] {
            assert!(matches!(
                bad.parse::<SensorDirection>(),
                Err(SensingError::UnknownDirection(s)) if s == bad
            ));
        }
        assert!(matches!(
            "up".parse::<SensorDirection>(),
            Err(SensingError::UnknownDirection(s)) if s == "up"
        ));
        assert!("".parse::<SensorDirection>().is_err());
    }

    #[test]
    fn test_direction_offsets() {
        let offsets: Vec<f64> = SensorDirection::ALL.iter().map(|d| d.offset()).collect();
        assert_eq!(offsets, vec![0.0, 90.0, 180.0, 270.0]);
        assert_eq!(SensorDirection::Right.to_string(), "right");
    }

    #[test]
    fn test_constructor() {
        let sensor = RangeSensor::new(15.0, 45.0, 0.5, 0.2).unwrap();
        assert_eq!(sensor.range(), 15.0);
        assert_eq!(sensor.cone_half_width(), 45.0);
        assert_eq!(sensor.noise(), 0.5);
        assert_eq!(sensor.min_reading(), 0.2);
        assert_eq!(RangeSensor::default().range(), DEFAULT_RANGE);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(matches!(RangeSensor::new(0.0, 30.0, 0.2, 0.1), Err(SensingError::InvalidParameter(_))));
        assert!(matches!(RangeSensor::new(20.0, 0.0, 0.2, 0.1), Err(SensingError::InvalidParameter(_))));
        assert!(matches!(RangeSensor::new(20.0, 190.0, 0.2, 0.1), Err(SensingError::InvalidParameter(_))));
        assert!(matches!(RangeSensor::new(20.0, 30.0, -0.1, 0.1), Err(SensingError::InvalidParameter(_))));
        assert!(matches!(RangeSensor::new(20.0, 30.0, 0.2, 25.0), Err(SensingError::InvalidParameter(_))));
        assert!(RangeSensor::new(20.0, 180.0, 0.0, 0.0).is_ok());
    }

    #[test]
    fn test_front_hit() {
        let sensor = quiet_sensor();
        let field = field_of(&[(0.0, 5.0)]);
        let pose = Pose::origin();
        assert!((sensor.cast(&pose, SensorDirection::Front, &field) - 5.0).abs() < EPSILON);
        // Nothing behind
        assert_eq!(sensor.cast(&pose, SensorDirection::Back, &field), DEFAULT_RANGE);
    }

    #[test]
    fn test_sensor_follows_heading() {
        let sensor = quiet_sensor();
        let field = field_of(&[(4.0, 0.0)]);
        let facing_north = Pose::origin();
        assert!((sensor.cast(&facing_north, SensorDirection::Right, &field) - 4.0).abs() < EPSILON);
        assert_eq!(sensor.cast(&facing_north, SensorDirection::Front, &field), DEFAULT_RANGE);

        let facing_east = Pose::new(0.0, 0.0, 90.0);
        assert!((sensor.cast(&facing_east, SensorDirection::Front, &field) - 4.0).abs() < EPSILON);
        let facing_south = Pose::new(0.0, 0.0, 180.0);
        assert!((sensor.cast(&facing_south, SensorDirection::Left, &field) - 4.0).abs() < EPSILON);
    }

    #[test]
    fn test_cone_edges() {
        let sensor = quiet_sensor();
        let pose = Pose::origin();
        // 30° off the front axis is inside, 31° is outside
        let inside = (30.0_f64 - 1e-6).to_radians();
        let outside = 31.0_f64.to_radians();
        let field_in = field_of(&[(10.0 * inside.sin(), 10.0 * inside.cos())]);
        let field_out = field_of(&[(10.0 * outside.sin(), 10.0 * outside.cos())]);
        assert!((sensor.cast(&pose, SensorDirection::Front, &field_in) - 10.0).abs() < 1e-6);
        assert_eq!(sensor.cast(&pose, SensorDirection::Front, &field_out), DEFAULT_RANGE);
    }

    #[test]
    fn test_cone_across_north() {
        let sensor = quiet_sensor();
        // Heading 350° looks across the 0°/360° seam
        let pose = Pose::new(0.0, 0.0, 350.0);
        let field = field_of(&[(1.0, 6.0)]);
        let expected = (1.0_f64 + 36.0).sqrt();
        assert!((sensor.cast(&pose, SensorDirection::Front, &field) - expected).abs() < EPSILON);
    }

    #[test]
    fn test_nearest_wins_and_range_is_strict() {
        let sensor = quiet_sensor();
        let pose = Pose::origin();
        let field = field_of(&[(0.0, 12.0), (0.5, 7.0), (0.0, 20.0)]);
        let expected = (0.25_f64 + 49.0).sqrt();
        assert!((sensor.cast(&pose, SensorDirection::Front, &field) - expected).abs() < EPSILON);

        let at_range = field_of(&[(0.0, 20.0)]);
        assert!(sensor.nearest(&pose, SensorDirection::Front, &at_range).is_none());
    }

    #[test]
    fn test_reading_noise_and_floor() {
        let sensor = RangeSensor::default();
        let pose = Pose::origin();
        let mut rng = StdRng::seed_from_u64(42);

        let field = field_of(&[(0.0, 5.0)]);
        for _ in 0..200 {
            let reading = sensor.read(&pose, SensorDirection::Front, &field, &mut rng);
            assert!((reading - 5.0).abs() <= DEFAULT_NOISE + EPSILON);
        }

        // Obstacle on top of the sensor: floor applies
        let touching = field_of(&[(0.0, 0.0)]);
        for _ in 0..200 {
            let reading = sensor.read(&pose, SensorDirection::Front, &touching, &mut rng);
            assert!(reading >= DEFAULT_MIN_READING);
        }
    }

    #[test]
    fn test_clamp_reading() {
        let sensor = RangeSensor::default();
        assert_eq!(sensor.clamp_reading(-3.0), DEFAULT_MIN_READING);
        assert_eq!(sensor.clamp_reading(4.0), 4.0);
        assert_eq!(sensor.clamp_reading(f64::NAN), DEFAULT_RANGE);
        assert_eq!(sensor.clamp_reading(f64::INFINITY), DEFAULT_RANGE);
        assert_eq!(sensor.clamp_reading(f64::NEG_INFINITY), DEFAULT_RANGE);
    }
}
