// Servo angle domain
pub const MIN_ANGLE: f64 = 0.0;
pub const MAX_ANGLE: f64 = 180.0;

// Slack allowed on the reach checks, in the geometry's linear units.
pub const REACH_TOLERANCE: f64 = 1e-6;
pub const COS_TOLERANCE: f64 = 1e-9;

// Gripper presets used when the config has none.
pub const GRIP_OPEN_ANGLE: f64 = 0.0;
pub const GRIP_CLOSED_ANGLE: f64 = 90.0;
pub const GRIP_LIFT_ANGLE: f64 = 0.0;

// xArm servo board
pub const VENDOR_ID: u16 = 0x0483;
pub const PRODUCT_ID: u16 = 0x5750;
pub const SIGNATURE: u8 = 0x55;

// Command constants
pub const CMD_SERVO_MOVE: u8 = 0x03;
pub const CMD_GET_BATTERY_VOLTAGE: u8 = 0x0f;
pub const CMD_SERVO_STOP: u8 = 0x14;

pub const MAX_BOARD_POSITION: u16 = 1000;
pub const DEFAULT_MOVE_DURATION_MS: u16 = 20;
