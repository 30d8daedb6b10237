//! Touch Sensor - Pressure pad on an input port
//!
//! The simplest analog pipeline and the template for the others: a raw
//! pin value (0..=4095) quantizes through the press threshold into a
//! 0/1 logical reading, and reading transitions drive the owned button
//! decoder. User programs listen on the decoder; the pad itself is the
//! interactive control, so there is no overlay selection.

use std::mem;
use std::time::Duration;

use crate::error::DeviceError;
use crate::state::analog::{AnalogSampler, AnalogSensor};
use crate::state::button::Button;
use crate::types::{ANALOG_RAW_MAX, DeviceKind, PortId, TOUCH_SENSE_THRESHOLD};

use super::{DeviceNode, snapshot_changed};

/// Simulated touch sensor.
pub struct TouchSensorNode {
    port: PortId,
    raw: i32,
    button: Button,
    sampler: AnalogSampler,
    rendered: bool,
}

impl TouchSensorNode {
    pub fn new(port: PortId) -> Self {
        Self {
            port,
            raw: 0,
            button: Button::new(),
            sampler: AnalogSampler::new(),
            rendered: false,
        }
    }

    /// Set the simulated pin value. Clamped to the raw range.
    ///
    /// Takes effect on the next tick; the decoder only sees quantized
    /// transitions, never the raw value.
    pub fn set_raw(&mut self, raw: i32) {
        self.raw = raw.clamp(0, ANALOG_RAW_MAX);
    }

    /// Drive the pad fully down.
    pub fn press(&mut self) {
        self.set_raw(ANALOG_RAW_MAX);
    }

    /// Release the pad.
    pub fn release(&mut self) {
        self.set_raw(0);
    }

    /// The simulated pin value.
    #[inline]
    pub fn raw(&self) -> i32 {
        self.raw
    }

    /// Current debounced state as seen by the decoder.
    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.button.is_pressed()
    }

    /// Latched since-last-check state. Clears the latch.
    pub fn was_pressed(&mut self) -> bool {
        self.button.was_pressed()
    }

    /// The owned gesture decoder, for event subscription.
    pub fn button(&self) -> &Button {
        &self.button
    }

    pub fn button_mut(&mut self) -> &mut Button {
        &mut self.button
    }
}

impl AnalogSensor for TouchSensorNode {
    fn query(&mut self) -> i32 {
        (self.raw > TOUCH_SENSE_THRESHOLD) as i32
    }

    fn reading_changed(&mut self, _previous: i32, current: i32) {
        self.button.update(current > 0);
    }

    fn device_kind(&self) -> DeviceKind {
        DeviceKind::Touch
    }
}

impl DeviceNode for TouchSensorNode {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Touch
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
        let pressed = self.button.is_pressed();
        snapshot_changed(&mut self.rendered, pressed)
    }
}

// =============================================================================
// TESTS
// =============================================================================
