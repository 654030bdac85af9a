use thiserror::Error;

use crate::types::Joint;

/// Reasons a target cannot be solved.
///
/// None of these are fatal; the caller decides whether to hold position,
/// drop the command or tell the operator.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum IkError {
    #[error("target at distance {distance} is beyond the arm reach of {reach}")]
    OutOfReach { distance: f64, reach: f64 },

    #[error("target at distance {distance} is inside the folded reach of {fold}")]
    TooClose { distance: f64, fold: f64 },

    #[error("law of cosines out of domain: cos(theta2) = {cos_theta}")]
    MathDomain { cos_theta: f64 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid link length {0} (must be finite and > 0)")]
    InvalidGeometry(f64),

    #[error("invalid calibration for {joint}: min_output and max_output are both {value}")]
    InvalidCalibration { joint: Joint, value: u16 },

    #[error("missing {section} entry for joint {joint}")]
    MissingJoint { section: &'static str, joint: Joint },

    #[error("channel {channel} is assigned to both {} and {}", .joints[0], .joints[1])]
    DuplicateChannel { channel: u8, joints: [Joint; 2] },

    #[error("no configuration file found")]
    NoConfigFound,
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("invalid response data: expected length {expected_len} but got {actual_len}. Raw data: {raw_data:02x?}")]
    InvalidResponse {
        expected_len: usize,
        actual_len: usize,
        raw_data: Vec<u8>,
    },

    #[error("device error: {0}")]
    Device(String),

    #[error("no device found")]
    NoDeviceFound,

    #[error("value {value} out of range for channel {channel}")]
    ValueOutOfRange { channel: u8, value: u16 },
}

#[derive(Debug, Error)]
pub enum ArmError {
    #[error(transparent)]
    Ik(#[from] IkError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("actuator write failed: {0}")]
    Driver(#[from] DriverError),

    /// A write failed partway and the joints in `stranded` could not be put
    /// back where they were.
    #[error("actuator write failed, {stranded:?} left at new position: {source}")]
    PartialMove {
        source: DriverError,
        stranded: Vec<Joint>,
    },
}
