use obocar_kinematics::*;

fn main() {
    let side = 3.0;
    let turn = 90.0;
    let num_sides = 4;

    let mut current_pose = Pose::origin();

    println!("Initializing dead-reckoning run...");
    println!("  Side length: {}", side);
    println!("  Turn:        {}°", turn);
    println!("  Start pose:  {}", current_pose);
    println!("\nDriving...");

    for i in 0..num_sides {
        let step = current_pose
            .advanced(side)
            .and_then(|pose| pose.rotated(turn));
        match step {
            Ok(new_pose) => {
                current_pose = new_pose;
                println!("Side {:>2}: Pose: {}", i + 1, current_pose);
            }
            Err(e) => {
                eprintln!("Error on side {}: {}", i + 1, e);
                break;
            }
        }
    }

    println!("\nRun complete.");
    println!(
        "Closure error: {:.6} units, heading {:.1}°",
        current_pose.distance_to(0.0, 0.0),
        current_pose.heading
    );
}
