//! xArm servo board over USB HID.
//!
//! Frames are `0x55 0x55 <len> <cmd> <data..>` where `len` counts the
//! command byte and itself. The framing lives outside the `hid` feature so
//! it can be exercised without a board attached.

use crate::constants::*;
use crate::error::DriverError;

pub fn encode_frame(cmd: u8, data: &[u8]) -> Vec<u8> {
    let mut frame = vec![SIGNATURE, SIGNATURE, (data.len() + 2) as u8, cmd];
    frame.extend_from_slice(data);
    frame
}

/// Strip the header off a response frame and return its payload.
pub fn decode_frame(buf: &[u8], cmd: u8) -> Result<&[u8], DriverError> {
    if buf.len() < 4 {
        return Err(DriverError::InvalidResponse {
            expected_len: 4,
            actual_len: buf.len(),
            raw_data: buf.to_vec(),
        });
    }

    if buf[0] != SIGNATURE || buf[1] != SIGNATURE {
        return Err(DriverError::Device(format!(
            "Invalid signature: {:02x} {:02x}",
            buf[0], buf[1]
        )));
    }

    if buf[3] != cmd {
        return Err(DriverError::Device(format!(
            "Unexpected command in response: {:02x} (expected {:02x})",
            buf[3], cmd
        )));
    }

    let end = 2 + buf[2] as usize;
    if end < 4 || buf.len() < end {
        return Err(DriverError::InvalidResponse {
            expected_len: end,
            actual_len: buf.len(),
            raw_data: buf.to_vec(),
        });
    }

    Ok(&buf[4..end])
}

/// Payload of a `CMD_SERVO_MOVE` for the given `(servo, position)` pairs.
pub fn servo_move_payload(movements: &[(u8, u16)], duration_ms: u16) -> Vec<u8> {
    let mut data = vec![
        movements.len() as u8,
        (duration_ms & 0xff) as u8,
        ((duration_ms & 0xff00) >> 8) as u8,
    ];

    for &(servo, position) in movements {
        data.extend_from_slice(&[
            servo,
            (position & 0xff) as u8,
            ((position & 0xff00) >> 8) as u8,
        ]);
    }

    data
}

pub fn servo_off_payload(servo: Option<u8>) -> Vec<u8> {
    match servo {
        Some(id) => vec![1u8, id],
        None => vec![6u8, 1, 2, 3, 4, 5, 6],
    }
}

/// Battery voltage from a `CMD_GET_BATTERY_VOLTAGE` payload (millivolts, LE).
pub fn parse_battery_voltage(data: &[u8]) -> Result<f32, DriverError> {
    if data.len() < 2 {
        return Err(DriverError::InvalidResponse {
            expected_len: 2,
            actual_len: data.len(),
            raw_data: data.to_vec(),
        });
    }

    Ok((data[0] as u16 | ((data[1] as u16) << 8)) as f32 / 1000.0)
}

#[cfg(feature = "hid")]
pub use self::hid::XArmBus;

#[cfg(feature = "hid")]
mod hid {
    use super::*;
    use crate::driver::ActuatorDriver;
    use hidapi::{HidApi, HidDevice};
    use log::{debug, info};

    const READ_TIMEOUT_MS: i32 = 1000;

    /// Servo board driver. Channel numbers are servo ids on the bus and
    /// values are board positions in `0..=1000`.
    pub struct XArmBus {
        device: HidDevice,
        move_duration_ms: u16,
    }

    impl XArmBus {
        pub fn open() -> Result<Self, DriverError> {
            let api = HidApi::new().map_err(|e| DriverError::Device(e.to_string()))?;
            let device = api
                .open(VENDOR_ID, PRODUCT_ID)
                .map_err(|_| DriverError::NoDeviceFound)?;

            info!("Connected to servo board via USB HID");

            Ok(XArmBus {
                device,
                move_duration_ms: DEFAULT_MOVE_DURATION_MS,
            })
        }

        /// Time the board takes to reach each written position.
        pub fn with_move_duration(mut self, duration_ms: u16) -> Self {
            self.move_duration_ms = duration_ms;
            self
        }

        fn send(&self, cmd: u8, data: &[u8]) -> Result<(), DriverError> {
            // Report id goes in front of the frame.
            let mut report = vec![0];
            report.extend(encode_frame(cmd, data));

            self.device
                .write(&report)
                .map_err(|e| DriverError::Device(e.to_string()))?;
            Ok(())
        }

        fn recv(&self, cmd: u8) -> Result<Vec<u8>, DriverError> {
            let mut buf = [0u8; 64];
            let len = self
                .device
                .read_timeout(&mut buf, READ_TIMEOUT_MS)
                .map_err(|e| DriverError::Device(e.to_string()))?;

            decode_frame(&buf[..len], cmd).map(|data| data.to_vec())
        }

        pub fn battery_voltage(&mut self) -> Result<f32, DriverError> {
            self.send(CMD_GET_BATTERY_VOLTAGE, &[])?;
            let data = self.recv(CMD_GET_BATTERY_VOLTAGE)?;
            parse_battery_voltage(&data)
        }

        /// Release one servo, or all of them when `servo` is `None`.
        pub fn servo_off(&mut self, servo: Option<u8>) -> Result<(), DriverError> {
            self.send(CMD_SERVO_STOP, &servo_off_payload(servo))
        }
    }

    impl ActuatorDriver for XArmBus {
        fn write(&mut self, channel: u8, value: u16) -> Result<(), DriverError> {
            if value > MAX_BOARD_POSITION {
                return Err(DriverError::ValueOutOfRange { channel, value });
            }

            debug!("Servo {} -> position {}", channel, value);
            self.send(
                CMD_SERVO_MOVE,
                &servo_move_payload(&[(channel, value)], self.move_duration_ms),
            )
        }
    }
}
