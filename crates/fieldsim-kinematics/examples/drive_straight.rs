use fieldsim_kinematics::*;

fn main() {
    let chassis = Chassis::new(14.0, 14.0, 14.0, 0.0);
    let limits = DriveLimits::new(6.0, 15.0, 15.0);
    let start = Pose::new(0.0, -48.0, 0.0);
    let command = TankCommand::new(1.0, 1.0);
    let dt = 1.0 / 60.0;
    let num_steps = 90;

    // Same two barriers as the skills field, in canvas pixels
    let obstacles = [Rect::new(195.0, 462.0, 190.0, 25.0), Rect::new(195.0, 88.0, 190.0, 25.0)];

    match TankDrive::new(start, chassis, limits) {
        Ok(mut tank) => {
            println!("Initializing simulation...");
            println!("  Chassis: {}", chassis);
            println!("  Limits:  {}", limits);
            println!("  Start:   {}", tank.pose());
            println!("  dt:      {:.4} s, {} steps", dt, num_steps);
            println!("\nSimulating...");

            for i in 0..num_steps {
                match tank.update_pose(command, &obstacles[..], dt) {
                    Ok(pose) => {
                        if (i + 1) % 10 == 0 {
                            let wheels = tank.wheels();
                            println!("Step {:>3}: Pose: {pose} Wheels: {wheels}", i + 1);
                        }
                    }
                    Err(e) => {
                        eprintln!("Error during simulation step {}: {}", i + 1, e);
                        break;
                    }
                }
            }

            println!("\nSimulation complete.");
            println!("Final Pose: {}", tank.pose());
        }
        Err(e) => {
            eprintln!("Failed to build tank drive: {}", e);
        }
    }
}
