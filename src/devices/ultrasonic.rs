//! Ultrasonic Sensor - Distance in centimeters

use std::mem;
use std::time::Duration;

use crate::error::DeviceError;
use crate::state::analog::{AnalogSampler, AnalogSensor};
use crate::types::{DeviceKind, PortId};

use super::{DeviceNode, snapshot_changed};

/// Distance readings span 0..=255 cm, like the physical sensor.
pub const ULTRASONIC_MAX_CM: i32 = 255;

/// Simulated ultrasonic distance sensor.
pub struct UltrasonicSensorNode {
    port: PortId,
    distance: i32,
    selected: bool,
    sampler: AnalogSampler,
    rendered: (i32, bool),
}

impl UltrasonicSensorNode {
    pub fn new(port: PortId) -> Self {
        Self {
            port,
            distance: ULTRASONIC_MAX_CM,
            selected: false,
            sampler: AnalogSampler::new(),
            rendered: (ULTRASONIC_MAX_CM, false),
        }
    }

    /// Set the simulated distance. Clamped to 0..=255 cm.
    pub fn set_distance(&mut self, cm: i32) {
        self.distance = cm.clamp(0, ULTRASONIC_MAX_CM);
    }

    #[inline]
    pub fn distance(&self) -> i32 {
        self.distance
    }

    pub fn set_selected(&mut self, on: bool) {
        self.selected = on;
    }

    #[inline]
    pub fn selected(&self) -> bool {
        self.selected
    }
}

impl AnalogSensor for UltrasonicSensorNode {
    fn query(&mut self) -> i32 {
        self.distance
    }

    fn reading_changed(&mut self, previous: i32, current: i32) {
        log::trace!(
            "ultrasonic {}: distance {} -> {}",
            self.port,
            previous,
            current
        );
    }

    fn device_kind(&self) -> DeviceKind {
        DeviceKind::Ultrasonic
    }
}

impl DeviceNode for UltrasonicSensorNode {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Ultrasonic
    }

    fn port(&self) -> PortId {
        self.port
    }

    fn update_state(&mut self, _elapsed: Duration) -> Result<(), DeviceError> {
        let mut sampler = mem::take(&mut self.sampler);
        sampler.poll(self);
        self.sampler = sampler;
        Ok(())
    }

    fn did_change(&mut self) -> bool {
        let current = (self.distance, self.selected);
        snapshot_changed(&mut self.rendered, current)
    }
}
