use obocar_kinematics::Pose;
use obocar_sensing::{ObstacleField, ObstaclePolicy, RangeSensor, SensorDirection, WorldPoint};

fn main() {
    // Circle of obstacles at radius 15, plus one close obstacle ahead.
    let mut rng = rand::rng();
    let mut field = ObstacleField::generate(ObstaclePolicy::Circle, &mut rng);
    field.push(WorldPoint::new(0.0, 5.0));

    println!("Obstacle field ({} points):", field.len());
    for p in field.iter() {
        println!("  ({:>6.1}, {:>6.1})", p.x, p.y);
    }

    let sensor = RangeSensor::default();

    // Sweep the heading a full turn and read all four sensors at each step.
    println!("\nheading   front   right    back    left");
    for step in 0..8 {
        let pose = Pose::new(0.0, 0.0, step as f64 * 45.0);
        let readings: Vec<String> = SensorDirection::ALL
            .iter()
            .map(|&d| format!("{:>7.2}", sensor.read(&pose, d, &field, &mut rng)))
            .collect();
        println!("{:>7.1} {}", pose.heading, readings.join(" "));
    }

    // Noise-free cast for comparison.
    let pose = Pose::origin();
    println!(
        "\nNoise-free front reading at the origin: {:.2}",
        sensor.cast(&pose, SensorDirection::Front, &field)
    );
    println!(
        "Obstacles within 10 units: {}",
        field.count_within(WorldPoint::from(pose), 10.0)
    );
}
