use crate::error::ConfigError;
use crate::types::Joint;
use serde::Deserialize;
use std::collections::HashMap;
use strum::IntoEnumIterator;

/// Output range of one actuator over the 0..=180 degree servo domain.
///
/// `min_output` may be larger than `max_output` for servos mounted in
/// reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ChannelCalibration {
    pub(crate) min_output: u16,
    pub(crate) max_output: u16,
}

impl ChannelCalibration {
    pub fn new(joint: Joint, min_output: u16, max_output: u16) -> Result<Self, ConfigError> {
        if min_output == max_output {
            return Err(ConfigError::InvalidCalibration {
                joint,
                value: min_output,
            });
        }

        Ok(ChannelCalibration {
            min_output,
            max_output,
        })
    }

    /// Calibration for servos that take the angle itself.
    pub fn passthrough() -> Self {
        ChannelCalibration {
            min_output: 0,
            max_output: 180,
        }
    }

    pub fn min_output(&self) -> u16 {
        self.min_output
    }

    pub fn max_output(&self) -> u16 {
        self.max_output
    }
}

/// How a solved joint angle lands in servo space: `offset_deg ± angle`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct JointMount {
    pub offset_deg: f64,
    pub inverted: bool,
}

impl JointMount {
    pub fn new(offset_deg: f64, inverted: bool) -> Self {
        JointMount {
            offset_deg,
            inverted,
        }
    }

    pub fn servo_angle(&self, joint_angle: f64) -> f64 {
        if self.inverted {
            self.offset_deg - joint_angle
        } else {
            self.offset_deg + joint_angle
        }
    }
}

impl Default for JointMount {
    fn default() -> Self {
        JointMount {
            offset_deg: 0.0,
            inverted: false,
        }
    }
}

/// Calibration for every joint of the arm.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    calibrations: HashMap<Joint, ChannelCalibration>,
}

impl CalibrationTable {
    /// Build the table, requiring an entry for each joint.
    pub fn new(calibrations: HashMap<Joint, ChannelCalibration>) -> Result<Self, ConfigError> {
        for joint in Joint::iter() {
            match calibrations.get(&joint) {
                None => {
                    return Err(ConfigError::MissingJoint {
                        section: "calibration",
                        joint,
                    })
                }
                // Deserialized entries skip the constructor.
                Some(calibration) => {
                    ChannelCalibration::new(joint, calibration.min_output, calibration.max_output)?;
                }
            }
        }

        Ok(CalibrationTable { calibrations })
    }

    /// Every joint takes the angle directly.
    pub fn passthrough() -> Self {
        let calibrations = Joint::iter()
            .map(|joint| (joint, ChannelCalibration::passthrough()))
            .collect();

        CalibrationTable { calibrations }
    }

    pub fn get(&self, joint: Joint) -> ChannelCalibration {
        self.calibrations
            .get(&joint)
            .copied()
            .unwrap_or_else(ChannelCalibration::passthrough)
    }
}

impl Default for CalibrationTable {
    fn default() -> Self {
        CalibrationTable::passthrough()
    }
}
