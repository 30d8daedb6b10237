//! Gyro Sensor - Rotation rate and integrated angle
//!
//! The control sets a rotation rate; the model integrates it into an
//! angle over elapsed tick time. Integration is pure arithmetic over
//! (previous state, elapsed), so replaying the same tick sequence
//! reproduces the same angle.

use std::mem;
use std::time::Duration;

use crate::error::DeviceError;
use crate::state::analog::{AnalogSampler, AnalogSensor};
use crate::types::{DeviceKind, PortId};

use super::{DeviceNode, snapshot_changed};

/// Rate readings span -440..=440 deg/s, like the physical sensor.
pub const GYRO_MAX_RATE: i32 = 440;

/// Simulated gyro sensor.
pub struct GyroSensorNode {
    port: PortId,
    rate: i32,
    angle: f64,
    selected: bool,
    sampler: AnalogSampler,
    rendered: (i32, i64, bool),
}

impl GyroSensorNode {
    pub fn new(port: PortId) -> Self {
        Self {
            port,
            rate: 0,
            angle: 0.0,
            selected: false,
            sampler: AnalogSampler::new(),
            rendered: (0, 0, false),
        }
    }

    /// Set the rotation rate in deg/s. Clamped to the sensor range.
    pub fn set_rate(&mut self, dps: i32) {
        self.rate = dps.clamp(-GYRO_MAX_RATE, GYRO_MAX_RATE);
    }

    #[inline]
    pub fn rate(&self) -> i32 {
        self.rate
    }

    /// Integrated angle in whole degrees.
    #[inline]
    pub fn angle(&self) -> i64 {
        self.angle.round() as i64
    }

    /// Zero the integrated angle, like the hardware reset command.
    pub fn reset_angle(&mut self) {
        self.angle = 0.0;
    }

    pub fn set_selected(&mut self, on: bool) {
        self.selected = on;
    }

    #[inline]
    pub fn selected(&self) -> bool {
        self.selected
    }
}

impl AnalogSensor for GyroSensorNode {
    fn query(&mut self) -> i32 {
        self.rate
    }

    fn reading_changed(&mut self, previous: i32, current: i32) {
        log::trace!("gyro {}: rate {} -> {}", self.port, previous, current);
    }

    fn device_kind(&self) -> DeviceKind {
        DeviceKind::Gyro
    }
}

impl DeviceNode for GyroSensorNode {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Gyro
    }

    fn port(&self) -> PortId {
        self.port
    }

    fn update_state(&mut self, elapsed: Duration) -> Result<(), DeviceError> {
        self.angle += self.rate as f64 * elapsed.as_secs_f64();

        let mut sampler = mem::take(&mut self.sampler);
        sampler.poll(self);
        self.sampler = sampler;
        Ok(())
    }

    fn did_change(&mut self) -> bool {
        let current = (self.rate, self.angle(), self.selected);
        snapshot_changed(&mut self.rendered, current)
    }
}
