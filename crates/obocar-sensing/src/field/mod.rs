//! Obstacle fields and the point types they are made of.

/// Obstacle collections and the policies that generate them.
pub mod obstacles;
mod point_types;

pub use obstacles::{ObstacleField, ObstaclePolicy};
pub use point_types::WorldPoint;
