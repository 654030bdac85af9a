use crate::calibration::{CalibrationTable, ChannelCalibration, JointMount};
use crate::error::ConfigError;
use crate::mapper::GripperPresets;
use crate::types::{ArmGeometry, Joint};
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use strum::IntoEnumIterator;

/// Arm configuration, loaded once at startup.
///
/// ```toml
/// [geometry]
/// upper_arm = 10.0
/// lower_arm = 10.0
///
/// [channels]
/// shoulder = 0
/// upper = 1
/// lower = 2
/// grip = 3
///
/// [calibration.shoulder]
/// min_output = 150
/// max_output = 600
/// # .. one table per joint
///
/// [mount.upper]
/// offset_deg = 90.0
///
/// [gripper.closed]
/// grip_angle = 90.0
/// lift_angle = 10.0
/// ```
#[derive(Debug, Clone)]
pub struct ArmConfig {
    pub geometry: ArmGeometry,
    pub channels: HashMap<Joint, u8>,
    pub calibration: CalibrationTable,
    pub mount: HashMap<Joint, JointMount>,
    pub gripper: GripperPresets,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    geometry: ArmGeometry,
    channels: HashMap<Joint, u8>,
    calibration: HashMap<Joint, ChannelCalibration>,
    #[serde(default)]
    mount: HashMap<Joint, JointMount>,
    #[serde(default)]
    gripper: GripperPresets,
}

impl ArmConfig {
    pub fn new(geometry: ArmGeometry, channels: HashMap<Joint, u8>) -> Result<Self, ConfigError> {
        let config = ArmConfig {
            geometry,
            channels,
            calibration: CalibrationTable::default(),
            mount: HashMap::new(),
            gripper: GripperPresets::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn with_calibration(mut self, calibration: CalibrationTable) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn with_mount(mut self, joint: Joint, mount: JointMount) -> Self {
        self.mount.insert(joint, mount);
        self
    }

    pub fn with_gripper(mut self, gripper: GripperPresets) -> Self {
        self.gripper = gripper;
        self
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text)?;

        let config = ArmConfig {
            geometry: raw.geometry,
            channels: raw.channels,
            calibration: CalibrationTable::new(raw.calibration)?,
            mount: raw.mount,
            gripper: raw.gripper,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Load the first file in `paths` that exists.
    pub fn try_from_file<P: AsRef<Path>>(
        paths: impl IntoIterator<Item = P>,
    ) -> Result<Self, ConfigError> {
        for path in paths {
            let path = path.as_ref();
            if path.exists() {
                debug!("Reading configuration from {}", path.display());
                return Self::from_file(path);
            }
        }

        Err(ConfigError::NoConfigFound)
    }

    /// Every joint needs its own channel.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut assigned: HashMap<u8, Joint> = HashMap::new();

        for joint in Joint::iter() {
            let channel = match self.channels.get(&joint) {
                Some(&channel) => channel,
                None => {
                    return Err(ConfigError::MissingJoint {
                        section: "channels",
                        joint,
                    })
                }
            };

            if let Some(&other) = assigned.get(&channel) {
                return Err(ConfigError::DuplicateChannel {
                    channel,
                    joints: [other, joint],
                });
            }
            assigned.insert(channel, joint);
        }

        Ok(())
    }

    /// Physical channel of `joint`. Validated configs have one for every joint.
    pub fn channel(&self, joint: Joint) -> u8 {
        self.channels.get(&joint).copied().unwrap_or(joint as u8)
    }

    pub fn mount(&self, joint: Joint) -> JointMount {
        self.mount.get(&joint).copied().unwrap_or_default()
    }
}
