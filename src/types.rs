use serde::Deserialize;
use strum_macros::{Display, EnumIter};

use crate::error::ConfigError;

/// Logical actuator of the arm.
#[derive(Debug, Display, EnumIter, Clone, Copy, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Joint {
    Shoulder = 0, // yaw, around the base axis
    Upper = 1,    // pitch of the upper arm
    Lower = 2,    // pitch of the lower arm, relative to the upper arm
    Grip = 3,
}

/// Link lengths of the two pitch links, in the same unit as targets.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawGeometry")]
pub struct ArmGeometry {
    upper_arm: f64,
    lower_arm: f64,
}

#[derive(Deserialize)]
struct RawGeometry {
    upper_arm: f64,
    lower_arm: f64,
}

impl TryFrom<RawGeometry> for ArmGeometry {
    type Error = ConfigError;

    fn try_from(raw: RawGeometry) -> Result<Self, Self::Error> {
        ArmGeometry::new(raw.upper_arm, raw.lower_arm)
    }
}

impl ArmGeometry {
    pub fn new(upper_arm: f64, lower_arm: f64) -> Result<Self, ConfigError> {
        for length in [upper_arm, lower_arm] {
            if !length.is_finite() || length <= 0.0 {
                return Err(ConfigError::InvalidGeometry(length));
            }
        }

        Ok(ArmGeometry {
            upper_arm,
            lower_arm,
        })
    }

    /// Length of the upper arm (L1).
    pub fn upper_arm(&self) -> f64 {
        self.upper_arm
    }

    /// Length of the lower arm (L2).
    pub fn lower_arm(&self) -> f64 {
        self.lower_arm
    }

    /// Distance from the shoulder with the arm fully extended.
    pub fn reach(&self) -> f64 {
        self.upper_arm + self.lower_arm
    }

    /// Distance from the shoulder with the arm fully folded.
    pub fn fold(&self) -> f64 {
        (self.upper_arm - self.lower_arm).abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl TargetPosition {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        TargetPosition { x, y, z }
    }

    pub fn distance_to(&self, other: &TargetPosition) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2))
            .sqrt()
    }
}

impl From<(f64, f64, f64)> for TargetPosition {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        TargetPosition { x, y, z }
    }
}

/// Solved joint angles in degrees, not yet clamped to any servo range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointAngles {
    pub shoulder: f64,
    pub upper: f64,
    pub lower: f64,
}

impl JointAngles {
    /// Angles paired with their joint, in write order.
    pub fn joints(&self) -> [(Joint, f64); 3] {
        [
            (Joint::Shoulder, self.shoulder),
            (Joint::Upper, self.upper),
            (Joint::Lower, self.lower),
        ]
    }
}

#[derive(Debug, Display, EnumIter, Clone, Copy, Eq, PartialEq, Hash)]
pub enum GripperState {
    Open,
    Closed,
}

/// Servo angles written when the gripper changes state.
///
/// `lift_angle` goes to the lower joint so the arm backs off the piece
/// while the jaws move.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GripperPreset {
    pub grip_angle: f64,
    pub lift_angle: f64,
}

pub(crate) fn clamp_angle(angle: f64) -> f64 {
    use crate::constants::{MAX_ANGLE, MIN_ANGLE};
    angle.max(MIN_ANGLE).min(MAX_ANGLE)
}
