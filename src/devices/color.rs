//! Color Sensor - Surface color and light intensity
//!
//! Three operating modes sharing one port: detected color, reflected
//! light percent, ambient light percent. The interactive control is a
//! color grid in color mode and a percent wheel otherwise.

use std::mem;
use std::time::Duration;

use crate::error::DeviceError;
use crate::state::analog::{AnalogSampler, AnalogSensor};
use crate::types::{ColorSensorMode, DeviceKind, PortId, SensorColor};

use super::{DeviceNode, snapshot_changed};

type Snapshot = (ColorSensorMode, SensorColor, i32, i32, bool);

/// Simulated color sensor.
pub struct ColorSensorNode {
    port: PortId,
    mode: ColorSensorMode,
    color: SensorColor,
    reflected: i32,
    ambient: i32,
    selected: bool,
    sampler: AnalogSampler,
    rendered: Snapshot,
}

impl ColorSensorNode {
    pub fn new(port: PortId) -> Self {
        Self {
            port,
            mode: ColorSensorMode::default(),
            color: SensorColor::None,
            reflected: 0,
            ambient: 0,
            selected: false,
            sampler: AnalogSampler::new(),
            rendered: (ColorSensorMode::default(), SensorColor::None, 0, 0, false),
        }
    }

    /// Switch operating mode. A mode switch is a render-worthy change.
    pub fn set_mode(&mut self, mode: ColorSensorMode) {
        if self.mode != mode {
            log::trace!("color sensor {}: mode {}", self.port, mode.label());
        }
        self.mode = mode;
    }

    pub fn set_color(&mut self, color: SensorColor) {
        self.color = color;
    }

    /// Set reflected light percent. Clamped to 0..=100.
    pub fn set_reflected(&mut self, percent: i32) {
        self.reflected = percent.clamp(0, 100);
    }

    /// Set ambient light percent. Clamped to 0..=100.
    pub fn set_ambient(&mut self, percent: i32) {
        self.ambient = percent.clamp(0, 100);
    }

    pub fn set_selected(&mut self, on: bool) {
        self.selected = on;
    }

    #[inline]
    pub fn mode(&self) -> ColorSensorMode {
        self.mode
    }

    #[inline]
    pub fn color(&self) -> SensorColor {
        self.color
    }

    #[inline]
    pub fn reflected(&self) -> i32 {
        self.reflected
    }

    #[inline]
    pub fn ambient(&self) -> i32 {
        self.ambient
    }

    #[inline]
    pub fn selected(&self) -> bool {
        self.selected
    }

    /// The quantized reading for the active mode.
    pub fn reading(&self) -> i32 {
        match self.mode {
            ColorSensorMode::Color => self.color as i32,
            ColorSensorMode::Reflected => self.reflected,
            ColorSensorMode::Ambient => self.ambient,
        }
    }

    fn snapshot(&self) -> Snapshot {
        (
            self.mode,
            self.color,
            self.reflected,
            self.ambient,
            self.selected,
        )
    }
}

impl AnalogSensor for ColorSensorNode {
    fn query(&mut self) -> i32 {
        self.reading()
    }

    fn reading_changed(&mut self, previous: i32, current: i32) {
        log::trace!(
            "color sensor {}: reading {} -> {}",
            self.port,
            previous,
            current
        );
    }

    fn device_kind(&self) -> DeviceKind {
        DeviceKind::Color
    }
}

impl DeviceNode for ColorSensorNode {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Color
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
        let current = self.snapshot();
        snapshot_changed(&mut self.rendered, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_follows_mode() {
        let mut node = ColorSensorNode::new(PortId::THREE);
        node.set_color(SensorColor::Red);
        node.set_reflected(40);
        node.set_ambient(7);

        node.set_mode(ColorSensorMode::Color);
        assert_eq!(node.reading(), SensorColor::Red as i32);

        node.set_mode(ColorSensorMode::Reflected);
        assert_eq!(node.reading(), 40);

        node.set_mode(ColorSensorMode::Ambient);
        assert_eq!(node.reading(), 7);
    }

    #[test]
    fn test_percent_values_clamp() {
        let mut node = ColorSensorNode::new(PortId::THREE);
        node.set_reflected(150);
        assert_eq!(node.reflected(), 100);
        node.set_ambient(-3);
        assert_eq!(node.ambient(), 0);
    }

    #[test]
    fn test_mode_switch_marks_change() {
        let mut node = ColorSensorNode::new(PortId::THREE);
        let _ = node.did_change(); // Settle the initial snapshot

        node.set_mode(ColorSensorMode::Reflected);
        assert!(node.did_change());
        assert!(!node.did_change());
    }

    #[test]
    fn test_selection_marks_change() {
        let mut node = ColorSensorNode::new(PortId::THREE);
        let _ = node.did_change();

        node.set_selected(true);
        assert!(node.did_change());
        assert!(!node.did_change());
    }

    #[test]
    fn test_same_value_is_not_a_change() {
        let mut node = ColorSensorNode::new(PortId::THREE);
        node.set_color(SensorColor::Blue);
        let _ = node.did_change();

        node.set_color(SensorColor::Blue);
        assert!(!node.did_change());
    }
}
