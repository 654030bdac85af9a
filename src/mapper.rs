use crate::calibration::CalibrationTable;
use crate::constants::{GRIP_CLOSED_ANGLE, GRIP_LIFT_ANGLE, GRIP_OPEN_ANGLE, MAX_ANGLE};
use crate::types::{clamp_angle, GripperPreset, GripperState, Joint};
use serde::Deserialize;

/// Servo angles for both gripper states.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GripperPresets {
    pub open: GripperPreset,
    pub closed: GripperPreset,
}

impl Default for GripperPresets {
    fn default() -> Self {
        GripperPresets {
            open: GripperPreset {
                grip_angle: GRIP_OPEN_ANGLE,
                lift_angle: GRIP_LIFT_ANGLE,
            },
            closed: GripperPreset {
                grip_angle: GRIP_CLOSED_ANGLE,
                lift_angle: GRIP_LIFT_ANGLE,
            },
        }
    }
}

/// Converts servo-space angles into the values the actuator driver expects.
#[derive(Debug, Clone, Default)]
pub struct ActuatorMapper {
    calibration: CalibrationTable,
    presets: GripperPresets,
}

impl ActuatorMapper {
    pub fn new(calibration: CalibrationTable, presets: GripperPresets) -> Self {
        ActuatorMapper {
            calibration,
            presets,
        }
    }

    pub fn calibration(&self) -> &CalibrationTable {
        &self.calibration
    }

    /// Saturate `angle_deg` to 0..=180 and interpolate it linearly into the
    /// joint's output range.
    pub fn to_output(&self, joint: Joint, angle_deg: f64) -> u16 {
        let calibration = self.calibration.get(joint);
        let min = calibration.min_output() as f64;
        let max = calibration.max_output() as f64;

        let fraction = clamp_angle(angle_deg) / MAX_ANGLE;
        (min + (max - min) * fraction).round() as u16
    }

    pub fn gripper_preset(&self, state: GripperState) -> GripperPreset {
        match state {
            GripperState::Open => self.presets.open,
            GripperState::Closed => self.presets.closed,
        }
    }
}
