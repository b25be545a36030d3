use obocar_vehicle::*;

fn main() -> Result<(), VehicleError> {
    let config = VehicleConfig {
        obstacles: ObstaclePolicy::Wall,
        seed: Some(3),
        ..VehicleConfig::default()
    };
    let mut car = Vehicle::new(config)?;

    println!("Obstacles: {}", car.get_obstacles().len());
    println!("Start: {:?}\n", car.status());

    for _ in 0..12 {
        let front = car.sensor("front")?;
        let right = car.sensor("right")?;
        let left = car.sensor("left")?;

        if front > 4.0 {
            car.forward(2.0);
        } else if right >= left {
            car.right(45.0);
        } else {
            car.left(45.0);
        }
        println!(
            "F:{:>5.1} R:{:>5.1} L:{:>5.1}  ->  {}",
            front,
            right,
            left,
            car.last_event().map(Event::description).unwrap_or_default()
        );
    }

    println!("\nFinal: {:?}", car.status());
    println!("Events logged: {}", car.get_event_log().len());
    Ok(())
}
