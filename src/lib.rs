pub mod constants;
mod types;
mod error;
mod ik;
mod calibration;
mod mapper;
mod driver;
mod config;
mod controller;
pub mod transport;

pub use calibration::{CalibrationTable, ChannelCalibration, JointMount};
pub use config::ArmConfig;
pub use controller::{ArmController, JointCommand};
pub use driver::{ActuatorDriver, MemoryDriver};
pub use error::{ArmError, ConfigError, DriverError, IkError};
pub use ik::{forward, solve, InverseKinematics};
pub use mapper::{ActuatorMapper, GripperPresets};
pub use types::{ArmGeometry, GripperPreset, GripperState, Joint, JointAngles, TargetPosition};

#[cfg(feature = "hid")]
pub use transport::XArmBus;
