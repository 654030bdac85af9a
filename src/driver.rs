use crate::error::DriverError;
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Anything that can put an output value on an actuator channel.
///
/// The value is whatever the backend expects: PWM ticks, board positions or
/// plain degrees for angle servos.
pub trait ActuatorDriver {
    fn write(&mut self, channel: u8, value: u16) -> Result<(), DriverError>;
}

impl<D: ActuatorDriver + ?Sized> ActuatorDriver for &mut D {
    fn write(&mut self, channel: u8, value: u16) -> Result<(), DriverError> {
        (**self).write(channel, value)
    }
}

impl<D: ActuatorDriver + ?Sized> ActuatorDriver for Box<D> {
    fn write(&mut self, channel: u8, value: u16) -> Result<(), DriverError> {
        (**self).write(channel, value)
    }
}

/// One board shared between several owners. Each write holds the lock, so
/// writes from different controllers never interleave on the bus.
impl<D: ActuatorDriver> ActuatorDriver for Arc<Mutex<D>> {
    fn write(&mut self, channel: u8, value: u16) -> Result<(), DriverError> {
        self.lock().write(channel, value)
    }
}

/// Driver without hardware behind it, for dry runs and tests. Keeps every
/// write so a run can be inspected afterwards; the history is unbounded, so
/// long-running callers should `clear` it.
#[derive(Debug, Default, Clone)]
pub struct MemoryDriver {
    writes: Vec<(u8, u16)>,
    channels: HashMap<u8, u16>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes in the order they were issued.
    pub fn writes(&self) -> &[(u8, u16)] {
        &self.writes
    }

    /// Last value written to `channel`.
    pub fn value(&self, channel: u8) -> Option<u16> {
        self.channels.get(&channel).copied()
    }

    pub fn clear(&mut self) {
        self.writes.clear();
    }
}

impl ActuatorDriver for MemoryDriver {
    fn write(&mut self, channel: u8, value: u16) -> Result<(), DriverError> {
        debug!("Channel {} <- {}", channel, value);
        self.writes.push((channel, value));
        self.channels.insert(channel, value);
        Ok(())
    }
}
