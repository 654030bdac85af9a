use crate::{
    config::ArmConfig,
    driver::ActuatorDriver,
    error::{ArmError, ConfigError, DriverError},
    ik::InverseKinematics,
    mapper::ActuatorMapper,
    types::{GripperState, Joint, JointAngles, TargetPosition},
};
use log::{debug, warn};
use std::collections::HashMap;

/// Output value bound for one actuator channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointCommand {
    pub joint: Joint,
    pub channel: u8,
    pub value: u16,
}

/// Solves targets and drives the arm through a single actuator driver.
pub struct ArmController<D> {
    config: ArmConfig,
    solver: InverseKinematics,
    mapper: ActuatorMapper,
    driver: D,
    last_outputs: HashMap<Joint, u16>,
}

impl<D: ActuatorDriver> ArmController<D> {
    /// Take ownership of the driver. `config` is validated again since its
    /// fields may have been edited after loading.
    pub fn new(config: ArmConfig, driver: D) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(ArmController {
            solver: InverseKinematics::new(config.geometry),
            mapper: ActuatorMapper::new(config.calibration.clone(), config.gripper),
            config,
            driver,
            last_outputs: HashMap::new(),
        })
    }

    pub fn config(&self) -> &ArmConfig {
        &self.config
    }

    pub fn mapper(&self) -> &ActuatorMapper {
        &self.mapper
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Last value written to `joint`, if it was ever commanded.
    pub fn last_output(&self, joint: Joint) -> Option<u16> {
        self.last_outputs.get(&joint).copied()
    }

    fn command(&self, joint: Joint, servo_angle: f64) -> JointCommand {
        JointCommand {
            joint,
            channel: self.config.channel(joint),
            value: self.mapper.to_output(joint, servo_angle),
        }
    }

    /// Solve `target` and compute the shoulder, upper and lower commands
    /// without touching the driver.
    pub fn plan(&self, target: TargetPosition) -> Result<(JointAngles, [JointCommand; 3]), ArmError> {
        let angles = self.solver.solve(target)?;

        let commands = angles
            .joints()
            .map(|(joint, angle)| self.command(joint, self.config.mount(joint).servo_angle(angle)));

        Ok((angles, commands))
    }

    /// Move the end effector to `(x, y, z)`.
    ///
    /// Nothing is written unless all three joints solve. On failure the arm
    /// stays where it was last commanded.
    pub fn move_to(&mut self, x: f64, y: f64, z: f64) -> Result<JointAngles, ArmError> {
        let target = TargetPosition::new(x, y, z);

        let (angles, commands) = match self.plan(target) {
            Ok(plan) => plan,
            Err(e) => {
                warn!("Rejecting move to ({}, {}, {}): {}", x, y, z, e);
                return Err(e);
            }
        };

        debug!(
            "Solved angles -> shoulder: {:.2}, upper: {:.2}, lower: {:.2}",
            angles.shoulder, angles.upper, angles.lower
        );

        self.apply(&commands)?;
        Ok(angles)
    }

    pub fn grip_open(&mut self) -> Result<(), ArmError> {
        self.grip(GripperState::Open)
    }

    pub fn grip_close(&mut self) -> Result<(), ArmError> {
        self.grip(GripperState::Closed)
    }

    /// Write the preset for `state` to the gripper and the lower joint.
    pub fn grip(&mut self, state: GripperState) -> Result<(), ArmError> {
        let preset = self.mapper.gripper_preset(state);
        debug!(
            "Gripper {} -> grip: {:.1}, lift: {:.1}",
            state, preset.grip_angle, preset.lift_angle
        );

        let commands = [
            self.command(Joint::Grip, preset.grip_angle),
            self.command(Joint::Lower, preset.lift_angle),
        ];

        self.apply(&commands)
    }

    /// Write `commands` in order. If one fails, the joints already written
    /// are put back to their previous output before the error is returned.
    fn apply(&mut self, commands: &[JointCommand]) -> Result<(), ArmError> {
        let mut written = Vec::with_capacity(commands.len());

        for command in commands {
            if let Err(e) = self.driver.write(command.channel, command.value) {
                warn!("Write to {} on channel {} failed: {}", command.joint, command.channel, e);
                return Err(self.rollback(&written, e));
            }

            let previous = self.last_outputs.insert(command.joint, command.value);
            written.push((*command, previous));
        }

        Ok(())
    }

    /// Undo `written` newest first. Joints that were never commanded before
    /// have nothing to go back to and are reported as stranded.
    fn rollback(&mut self, written: &[(JointCommand, Option<u16>)], source: DriverError) -> ArmError {
        let mut stranded = Vec::new();

        for (command, previous) in written.iter().rev() {
            let previous = match *previous {
                Some(previous) => previous,
                None => {
                    stranded.push(command.joint);
                    continue;
                }
            };

            match self.driver.write(command.channel, previous) {
                Ok(()) => {
                    debug!("Restored {} to {}", command.joint, previous);
                    self.last_outputs.insert(command.joint, previous);
                }
                Err(e) => {
                    warn!("Could not restore {}: {}", command.joint, e);
                    stranded.push(command.joint);
                }
            }
        }

        if stranded.is_empty() {
            ArmError::Driver(source)
        } else {
            ArmError::PartialMove { source, stranded }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::JointMount;
    use crate::driver::MemoryDriver;
    use crate::error::{DriverError, IkError};
    use crate::types::ArmGeometry;
    use strum::IntoEnumIterator;

    fn config(l1: f64, l2: f64) -> ArmConfig {
        let channels = Joint::iter().map(|joint| (joint, joint as u8)).collect();
        ArmConfig::new(ArmGeometry::new(l1, l2).unwrap(), channels).unwrap()
    }

    /// Accepts a fixed number of writes, then fails. Writes to `dead`
    /// always fail.
    struct FlakyDriver {
        budget: usize,
        dead: Option<u8>,
        inner: MemoryDriver,
    }

    impl FlakyDriver {
        fn new(budget: usize) -> Self {
            FlakyDriver {
                budget,
                dead: None,
                inner: MemoryDriver::new(),
            }
        }
    }

    impl ActuatorDriver for FlakyDriver {
        fn write(&mut self, channel: u8, value: u16) -> Result<(), DriverError> {
            if self.budget == 0 || self.dead == Some(channel) {
                return Err(DriverError::Device("bus timeout".into()));
            }
            self.budget -= 1;
            self.inner.write(channel, value)
        }
    }

    #[test]
    fn move_writes_three_joints() {
        let mut controller = ArmController::new(config(10.0, 10.0), MemoryDriver::new()).unwrap();
        let angles = controller.move_to(10.0, 0.0, 0.0).unwrap();

        assert_eq!(angles.shoulder, 0.0);
        // Upper solves to 60 degrees, lower to -120 and saturates at 0.
        assert_eq!(controller.driver().writes(), &[(0, 0), (1, 60), (2, 0)]);
        assert_eq!(controller.last_output(Joint::Upper), Some(60));
        assert_eq!(controller.last_output(Joint::Grip), None);
    }

    #[test]
    fn mount_offsets_bring_angles_into_range() {
        let config = config(10.0, 10.0)
            .with_mount(Joint::Shoulder, JointMount::new(90.0, false))
            .with_mount(Joint::Lower, JointMount::new(180.0, false));
        let mut controller = ArmController::new(config, MemoryDriver::new()).unwrap();

        controller.move_to(10.0, 0.0, 0.0).unwrap();
        assert_eq!(controller.driver().writes(), &[(0, 90), (1, 60), (2, 60)]);
    }

    #[test]
    fn failed_solve_writes_nothing() {
        let mut controller = ArmController::new(config(10.0, 10.0), MemoryDriver::new()).unwrap();
        controller.move_to(10.0, 0.0, 0.0).unwrap();
        let before = controller.driver().writes().len();

        let result = controller.move_to(25.0, 0.0, 0.0);
        assert!(matches!(result, Err(ArmError::Ik(IkError::OutOfReach { .. }))));
        assert_eq!(controller.driver().writes().len(), before);
        assert_eq!(controller.last_output(Joint::Upper), Some(60));
    }

    #[test]
    fn plan_leaves_driver_untouched() {
        let controller = ArmController::new(config(10.0, 5.0), MemoryDriver::new()).unwrap();

        let (_, commands) = controller.plan(TargetPosition::new(12.0, 0.0, 3.0)).unwrap();
        assert_eq!(commands.map(|c| c.joint), [Joint::Shoulder, Joint::Upper, Joint::Lower]);
        assert!(controller.driver().writes().is_empty());

        let result = controller.plan(TargetPosition::new(3.0, 0.0, 0.0));
        assert!(matches!(result, Err(ArmError::Ik(IkError::TooClose { .. }))));
    }

    #[test]
    fn grip_presets_ignore_prior_state() {
        let mut controller = ArmController::new(config(10.0, 10.0), MemoryDriver::new()).unwrap();

        controller.grip_open().unwrap();
        controller.grip_close().unwrap();
        let fresh = controller.driver().writes().to_vec();
        assert_eq!(fresh, vec![(3, 0), (2, 0), (3, 90), (2, 0)]);

        controller.driver_mut().clear();
        controller.move_to(4.0, 7.0, 6.0).unwrap();
        controller.driver_mut().clear();

        controller.grip_open().unwrap();
        controller.grip_close().unwrap();
        assert_eq!(controller.driver().writes(), fresh.as_slice());
    }

    #[test]
    fn first_move_failure_strands_new_joints() {
        let mut controller = ArmController::new(config(10.0, 10.0), FlakyDriver::new(1)).unwrap();

        let result = controller.move_to(10.0, 0.0, 0.0);
        match result {
            Err(ArmError::PartialMove { source, stranded }) => {
                assert!(matches!(source, DriverError::Device(_)));
                assert_eq!(stranded, vec![Joint::Shoulder]);
            }
            other => panic!("expected a partial move, got {:?}", other),
        }
        assert_eq!(controller.last_output(Joint::Shoulder), Some(0));
        assert_eq!(controller.last_output(Joint::Upper), None);
    }

    #[test]
    fn failed_write_restores_earlier_joints() {
        let mut controller = ArmController::new(config(10.0, 10.0), FlakyDriver::new(usize::MAX)).unwrap();
        controller.move_to(10.0, 0.0, 0.0).unwrap();

        // Shoulder swings to 90 before the upper joint write fails.
        controller.driver_mut().dead = Some(Joint::Upper as u8);
        let result = controller.move_to(0.0, 12.0, 5.0);

        assert!(matches!(result, Err(ArmError::Driver(DriverError::Device(_)))));
        assert_eq!(controller.driver().inner.value(0), Some(0));
        assert_eq!(controller.driver().inner.writes()[3..], [(0, 90), (0, 0)]);
        assert_eq!(controller.last_output(Joint::Shoulder), Some(0));
        assert_eq!(controller.last_output(Joint::Upper), Some(60));
    }

    #[test]
    fn failed_grip_restores_gripper() {
        let mut controller = ArmController::new(config(10.0, 10.0), FlakyDriver::new(usize::MAX)).unwrap();
        controller.grip_open().unwrap();

        controller.driver_mut().dead = Some(Joint::Lower as u8);
        let result = controller.grip_close();

        assert!(matches!(result, Err(ArmError::Driver(_))));
        assert_eq!(controller.driver().inner.value(3), Some(0));
        assert_eq!(controller.last_output(Joint::Grip), Some(0));
    }

    #[test]
    fn edited_config_is_checked_again() {
        let mut shared = config(10.0, 10.0);
        shared.channels.insert(Joint::Grip, 0);
        let result = ArmController::new(shared, MemoryDriver::new());
        assert!(matches!(result, Err(ConfigError::DuplicateChannel { channel: 0, .. })));

        let mut missing = config(10.0, 10.0);
        missing.channels.remove(&Joint::Lower);
        let result = ArmController::new(missing, MemoryDriver::new());
        assert!(matches!(
            result,
            Err(ConfigError::MissingJoint { joint: Joint::Lower, .. })
        ));
    }
}
