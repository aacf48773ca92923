use cu_tf::{Header, LookupTime, PointStamped, TimeSpec, TransformBuffer, TransformStamped};
use cu29_clock::CuDuration;
use glam::DQuat;
use std::f64::consts::FRAC_PI_2;

const SECOND: u64 = 1_000_000_000;

fn main() {
    println!("Cu TF - Transform Buffer Demo");
    println!("=============================");

    let buffer = TransformBuffer::new(10 * SECOND);

    // The camera is bolted to the robot: one static transform is enough
    let camera_mount = TransformStamped::new(
        CuDuration(0),
        "robot",
        "camera",
        [0.2, 0.0, 0.5],
        DQuat::from_rotation_z(FRAC_PI_2).to_array(),
    );
    buffer
        .set_transform(&camera_mount, "urdf", true)
        .expect("valid static transform");

    // The robot drives along x in the world
    for i in 0..=4u64 {
        let robot_pose = TransformStamped::new(
            CuDuration(i * SECOND),
            "world",
            "robot",
            [i as f64, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        );
        buffer
            .set_transform(&robot_pose, "odometry", false)
            .expect("valid robot pose");
    }

    println!("\nKnown frames:");
    print!("{}", buffer.frames_as_string().expect("buffer readable"));

    let halfway = LookupTime::Time(CuDuration(5 * SECOND / 2));
    match buffer.lookup_transform("world", "camera", halfway) {
        Ok(tf) => println!(
            "\nworld <- camera at {halfway}: translation {:?}, rotation {:?}",
            tf.translation, tf.rotation
        ),
        Err(e) => println!("\nlookup failed: {e}"),
    }

    let detection = PointStamped {
        header: Header::new(CuDuration(3 * SECOND), "camera"),
        point: [1.0, 0.0, 0.0],
    };
    match buffer.transform(&detection, "world", TimeSpec::FromMsg) {
        Ok(p) => println!(
            "camera detection {:?} is at {:?} in {}",
            detection.point, p.point, p.header.frame_id
        ),
        Err(e) => println!("cannot place detection: {e}"),
    }

    // Out of the retained window and unknown frames are soft failures for can_transform
    for (target, source, time) in [
        ("world", "camera", LookupTime::Time(CuDuration(9 * SECOND))),
        ("world", "gripper", LookupTime::Latest),
    ] {
        match buffer.can_transform_with_diagnostic(target, source, time) {
            Ok((true, _)) => println!("{source} -> {target} at {time}: available"),
            Ok((false, reason)) => println!(
                "{source} -> {target} at {time}: not available ({})",
                reason.unwrap_or_default()
            ),
            Err(e) => println!("{source} -> {target}: invalid query: {e}"),
        }
    }
}
