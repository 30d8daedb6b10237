//! Devices Module - Per-port simulated device models
//!
//! One model per physical device kind. Each model advances its state on
//! the simulation tick and reports render-worthy changes through an
//! edge-triggered snapshot compare:
//!
//! - **Touch** - Raw pin, threshold, one button decoder
//! - **Color** - Color / reflected / ambient modes
//! - **Ultrasonic** - Distance in cm
//! - **Gyro** - Rotation rate, integrated angle
//! - **Motor** - Commanded speed, integrated angle, medium or large
//! - **Brick** - Five face buttons and the status light
//!
//! External inputs (what a user does to the simulated hardware) land on
//! the models between ticks, through the board's command queue. The
//! models themselves only mutate state inside `update_state`, so event
//! dispatch always happens on the tick thread.

use std::time::Duration;

use crate::error::DeviceError;
use crate::types::{DeviceKind, PortId};

mod brick;
mod color;
mod gyro;
mod motor;
mod touch;
mod ultrasonic;

pub use brick::BrickNode;
pub use color::ColorSensorNode;
pub use gyro::GyroSensorNode;
pub use motor::MotorNode;
pub use touch::TouchSensorNode;
pub use ultrasonic::UltrasonicSensorNode;

// =============================================================================
// NODE CONTRACT
// =============================================================================

/// Contract every simulated device fulfils toward the tick loop.
///
/// `update_state` must be deterministic given the previous state, the
/// elapsed time and the external inputs applied since the last tick.
/// `did_change` compares the observable state against the snapshot taken
/// at the last true read and refreshes that snapshot, so it reads true
/// exactly once per render-worthy change.
pub trait DeviceNode {
    /// Device tag for display and control lookup.
    fn kind(&self) -> DeviceKind;

    /// The port this device occupies.
    fn port(&self) -> PortId;

    /// Advance the physical model by the elapsed time.
    fn update_state(&mut self, elapsed: Duration) -> Result<(), DeviceError>;

    /// Whether observable state differs from the last render snapshot.
    fn did_change(&mut self) -> bool;
}

/// Compare-and-refresh for render snapshots.
///
/// Returns true and stores `current` when it differs from the snapshot.
#[inline]
pub(crate) fn snapshot_changed<T: PartialEq>(snapshot: &mut T, current: T) -> bool {
    if *snapshot != current {
        *snapshot = current;
        true
    } else {
        false
    }
}

// =============================================================================
// INPUT NODE
// =============================================================================

/// A sensor occupying one of the four input ports.
///
/// Closed set: the simulator knows exactly which sensor kinds exist.
/// Typed accessors return None when the port holds a different kind, so
/// callers null-check instead of downcasting.
pub enum InputNode {
    Touch(TouchSensorNode),
    Color(ColorSensorNode),
    Ultrasonic(UltrasonicSensorNode),
    Gyro(GyroSensorNode),
}

impl InputNode {
    /// Create a sensor of the given kind. None for non-sensor kinds.
    pub fn new(kind: DeviceKind, port: PortId) -> Option<Self> {
        match kind {
            DeviceKind::Touch => Some(Self::Touch(TouchSensorNode::new(port))),
            DeviceKind::Color => Some(Self::Color(ColorSensorNode::new(port))),
            DeviceKind::Ultrasonic => Some(Self::Ultrasonic(UltrasonicSensorNode::new(port))),
            DeviceKind::Gyro => Some(Self::Gyro(GyroSensorNode::new(port))),
            _ => None,
        }
    }

    /// Whether an interactive control overlay is open for this sensor.
    ///
    /// Touch has no overlay (the pad itself is the control) and always
    /// reads false.
    pub fn selected(&self) -> bool {
        match self {
            Self::Touch(_) => false,
            Self::Color(node) => node.selected(),
            Self::Ultrasonic(node) => node.selected(),
            Self::Gyro(node) => node.selected(),
        }
    }

    /// Open or close the interactive control overlay. No-op for touch.
    pub fn set_selected(&mut self, on: bool) {
        match self {
            Self::Touch(_) => {}
            Self::Color(node) => node.set_selected(on),
            Self::Ultrasonic(node) => node.set_selected(on),
            Self::Gyro(node) => node.set_selected(on),
        }
    }

    pub fn as_touch(&self) -> Option<&TouchSensorNode> {
        match self {
            Self::Touch(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_touch_mut(&mut self) -> Option<&mut TouchSensorNode> {
        match self {
            Self::Touch(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<&ColorSensorNode> {
        match self {
            Self::Color(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_color_mut(&mut self) -> Option<&mut ColorSensorNode> {
        match self {
            Self::Color(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_ultrasonic(&self) -> Option<&UltrasonicSensorNode> {
        match self {
            Self::Ultrasonic(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_ultrasonic_mut(&mut self) -> Option<&mut UltrasonicSensorNode> {
        match self {
            Self::Ultrasonic(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_gyro(&self) -> Option<&GyroSensorNode> {
        match self {
            Self::Gyro(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_gyro_mut(&mut self) -> Option<&mut GyroSensorNode> {
        match self {
            Self::Gyro(node) => Some(node),
            _ => None,
        }
    }
}

impl DeviceNode for InputNode {
    fn kind(&self) -> DeviceKind {
        match self {
            Self::Touch(node) => node.kind(),
            Self::Color(node) => node.kind(),
            Self::Ultrasonic(node) => node.kind(),
            Self::Gyro(node) => node.kind(),
        }
    }

    fn port(&self) -> PortId {
        match self {
            Self::Touch(node) => node.port(),
            Self::Color(node) => node.port(),
            Self::Ultrasonic(node) => node.port(),
            Self::Gyro(node) => node.port(),
        }
    }

    fn update_state(&mut self, elapsed: Duration) -> Result<(), DeviceError> {
        match self {
            Self::Touch(node) => node.update_state(elapsed),
            Self::Color(node) => node.update_state(elapsed),
            Self::Ultrasonic(node) => node.update_state(elapsed),
            Self::Gyro(node) => node.update_state(elapsed),
        }
    }

    fn did_change(&mut self) -> bool {
        match self {
            Self::Touch(node) => node.did_change(),
            Self::Color(node) => node.did_change(),
            Self::Ultrasonic(node) => node.did_change(),
            Self::Gyro(node) => node.did_change(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_non_sensor_kinds() {
        assert!(InputNode::new(DeviceKind::Touch, PortId::ONE).is_some());
        assert!(InputNode::new(DeviceKind::Gyro, PortId::TWO).is_some());
        assert!(InputNode::new(DeviceKind::LargeMotor, PortId::ONE).is_none());
        assert!(InputNode::new(DeviceKind::Brick, PortId::ONE).is_none());
    }

    #[test]
    fn test_typed_accessors_null_check() {
        let mut node = InputNode::new(DeviceKind::Color, PortId::THREE).unwrap();
        assert!(node.as_color().is_some());
        assert!(node.as_touch().is_none());
        assert!(node.as_gyro_mut().is_none());
        assert_eq!(node.kind(), DeviceKind::Color);
        assert_eq!(node.port(), PortId::THREE);
    }

    #[test]
    fn test_touch_has_no_overlay_selection() {
        let mut node = InputNode::new(DeviceKind::Touch, PortId::ONE).unwrap();
        node.set_selected(true);
        assert!(!node.selected());

        let mut node = InputNode::new(DeviceKind::Ultrasonic, PortId::ONE).unwrap();
        node.set_selected(true);
        assert!(node.selected());
    }

    #[test]
    fn test_snapshot_changed_refreshes_on_true() {
        let mut snapshot = 0i32;
        assert!(snapshot_changed(&mut snapshot, 5));
        assert!(!snapshot_changed(&mut snapshot, 5));
        assert!(snapshot_changed(&mut snapshot, 6));
        assert_eq!(snapshot, 6);
    }
}
