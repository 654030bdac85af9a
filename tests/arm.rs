use approx::assert_abs_diff_eq;
use parking_lot::Mutex;
use robot_arm::{
    forward, solve, ActuatorDriver, ArmConfig, ArmController, ArmError, ArmGeometry, GripperState,
    IkError, Joint, MemoryDriver, TargetPosition,
};
use std::sync::Arc;

const ARM: &str = r#"
    [geometry]
    upper_arm = 10.0
    lower_arm = 10.0

    [channels]
    shoulder = 4
    upper = 5
    lower = 6
    grip = 7

    [calibration.shoulder]
    min_output = 150
    max_output = 600

    [calibration.upper]
    min_output = 150
    max_output = 600

    [calibration.lower]
    min_output = 600
    max_output = 150

    [calibration.grip]
    min_output = 200
    max_output = 380

    [mount.shoulder]
    offset_deg = 90.0

    [mount.lower]
    offset_deg = 180.0

    [gripper.open]
    grip_angle = 10.0
    lift_angle = 30.0
"#;

fn controller() -> ArmController<MemoryDriver> {
    let config = ArmConfig::from_toml(ARM).unwrap();
    ArmController::new(config, MemoryDriver::new()).unwrap()
}

#[test]
fn move_maps_through_calibration() {
    let mut controller = controller();
    let angles = controller.move_to(10.0, 0.0, 0.0).unwrap();

    let geometry = controller.config().geometry;
    let reached = forward(&angles, &geometry);
    assert_abs_diff_eq!(reached.x, 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(reached.z, 0.0, epsilon = 1e-9);

    // shoulder 90 -> mid range, upper 60, lower 180 - 120 = 60 on a reversed servo
    assert_eq!(
        controller.driver().writes(),
        &[(4, 375), (5, 300), (6, 450)]
    );
}

#[test]
fn rejected_targets_keep_last_position() {
    let mut controller = controller();
    controller.move_to(6.0, 6.0, 4.0).unwrap();
    let before: Vec<_> = [Joint::Shoulder, Joint::Upper, Joint::Lower]
        .iter()
        .map(|&joint| controller.last_output(joint))
        .collect();

    for target in [(25.0, 0.0, 0.0), (0.0, 0.0, 21.0), (f64::NAN, 1.0, 1.0)] {
        let result = controller.move_to(target.0, target.1, target.2);
        assert!(matches!(result, Err(ArmError::Ik(_))));
    }

    let after: Vec<_> = [Joint::Shoulder, Joint::Upper, Joint::Lower]
        .iter()
        .map(|&joint| controller.last_output(joint))
        .collect();
    assert_eq!(before, after);
    assert_eq!(controller.driver().writes().len(), 3);
}

#[test]
fn folded_reach_is_rejected() {
    let geometry = ArmGeometry::new(10.0, 5.0).unwrap();
    let result = solve(TargetPosition::new(3.0, 0.0, 0.0), &geometry);

    assert!(matches!(result, Err(IkError::TooClose { .. })));
}

#[test]
fn gripper_uses_configured_presets() {
    let mut controller = controller();

    assert_eq!(controller.mapper().gripper_preset(GripperState::Open).lift_angle, 30.0);

    controller.grip_open().unwrap();
    controller.grip_close().unwrap();

    // grip 10 and 90 degrees on 200..380, lift 30 and 0 on the reversed lower servo
    assert_eq!(
        controller.driver().writes(),
        &[(7, 210), (6, 525), (7, 290), (6, 600)]
    );
    assert_eq!(controller.last_output(Joint::Grip), Some(290));
}

#[test]
fn controllers_share_one_board() {
    let board = Arc::new(Mutex::new(MemoryDriver::new()));
    let config = ArmConfig::from_toml(ARM).unwrap();

    let mut arm = ArmController::new(config.clone(), Arc::clone(&board)).unwrap();
    let mut gripper = ArmController::new(config, Arc::clone(&board)).unwrap();

    arm.move_to(10.0, 0.0, 0.0).unwrap();
    gripper.grip_close().unwrap();

    let board = board.lock();
    assert_eq!(board.writes().len(), 5);
    assert_eq!(board.value(7), Some(290));
    assert_eq!(board.value(6), Some(600));
}

#[test]
fn boxed_backend_is_interchangeable() {
    let config = ArmConfig::from_toml(ARM).unwrap();
    let driver: Box<dyn ActuatorDriver> = Box::new(MemoryDriver::new());
    let mut controller = ArmController::new(config, driver).unwrap();

    assert!(controller.move_to(0.0, 12.0, 5.0).is_ok());
    assert!(controller.grip_open().is_ok());
}
