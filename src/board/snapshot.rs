//! Snapshot Module - Read-only copies of board state
//!
//! The render path never touches live device state. The tick thread
//! produces a [`BoardSnapshot`] on request and the display layer reads
//! that copy, so no locking exists anywhere between the two.
//!
//! Snapshots compare with `==`, which is what the display views use for
//! their own dirty tracking.

use crate::types::{
    BrickButtons, ColorSensorMode, DeviceKind, PORT_COUNT, PortId, SensorColor, StatusLight,
};

use super::Board;

// =============================================================================
// PER-DEVICE SNAPSHOTS
// =============================================================================

/// Observable state of one input sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSnapshot {
    pub kind: DeviceKind,
    pub port: PortId,
    /// Whether the interactive control overlay is open.
    pub selected: bool,
    pub detail: InputDetail,
}

/// Kind-specific observable state.
#[derive(Debug, Clone, PartialEq)]
pub enum InputDetail {
    Touch {
        raw: i32,
        pressed: bool,
    },
    Color {
        mode: ColorSensorMode,
        color: SensorColor,
        reflected: i32,
        ambient: i32,
    },
    Ultrasonic {
        cm: i32,
    },
    Gyro {
        rate: i32,
        angle: i64,
    },
}

/// Observable state of one motor.
#[derive(Debug, Clone, PartialEq)]
pub struct MotorSnapshot {
    pub kind: DeviceKind,
    pub port: PortId,
    pub speed: i32,
    pub angle: i64,
}

/// Observable state of the brick itself.
#[derive(Debug, Clone, PartialEq)]
pub struct BrickSnapshot {
    pub buttons: BrickButtons,
    pub light: StatusLight,
}

// =============================================================================
// BOARD SNAPSHOT
// =============================================================================

/// Everything the display layer can observe, copied at one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub inputs: [Option<InputSnapshot>; PORT_COUNT],
    pub motors: [Option<MotorSnapshot>; PORT_COUNT],
    pub brick: BrickSnapshot,
    /// The screen frame, row-major intensity bytes.
    pub screen: Vec<u8>,
}

impl BoardSnapshot {
    /// The input snapshot on a port, if a sensor is attached.
    pub fn input(&self, port: PortId) -> Option<&InputSnapshot> {
        self.inputs[port.index()?].as_ref()
    }

    /// The motor snapshot on a port, if a motor is attached.
    pub fn motor(&self, port: PortId) -> Option<&MotorSnapshot> {
        self.motors[port.index()?].as_ref()
    }
}

impl Board {
    /// Copy the observable state of every device and the screen.
    pub fn snapshot(&self) -> BoardSnapshot {
        use crate::devices::{DeviceNode, InputNode};

        let inputs = std::array::from_fn(|i| {
            let port = PortId::NUMBERED[i];
            self.input(port).map(|node| {
                let detail = match node {
                    InputNode::Touch(touch) => InputDetail::Touch {
                        raw: touch.raw(),
                        pressed: touch.is_pressed(),
                    },
                    InputNode::Color(color) => InputDetail::Color {
                        mode: color.mode(),
                        color: color.color(),
                        reflected: color.reflected(),
                        ambient: color.ambient(),
                    },
                    InputNode::Ultrasonic(us) => InputDetail::Ultrasonic { cm: us.distance() },
                    InputNode::Gyro(gyro) => InputDetail::Gyro {
                        rate: gyro.rate(),
                        angle: gyro.angle(),
                    },
                };
                InputSnapshot {
                    kind: node.kind(),
                    port,
                    selected: node.selected(),
                    detail,
                }
            })
        });

        let motors = std::array::from_fn(|i| {
            let port = PortId::NUMBERED[i];
            self.motor(port).map(|motor| MotorSnapshot {
                kind: motor.kind(),
                port,
                speed: motor.speed(),
                angle: motor.angle(),
            })
        });

        BoardSnapshot {
            inputs,
            motors,
            brick: BrickSnapshot {
                buttons: self.brick().pressed_mask(),
                light: self.brick().light(),
            },
            screen: self.screen().pixels().to_vec(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Command;
    use std::time::Duration;

    #[test]
    fn test_empty_board_snapshot() {
        let board = Board::new();
        let snap = board.snapshot();

        assert!(snap.inputs.iter().all(Option::is_none));
        assert!(snap.motors.iter().all(Option::is_none));
        assert_eq!(snap.brick.buttons, BrickButtons::NONE);
        assert_eq!(snap.brick.light, StatusLight::Off);
        assert!(snap.screen.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_snapshot_reflects_device_state() {
        let mut board = Board::new();
        board.attach_sensor(DeviceKind::Touch, PortId::ONE);
        board.attach_sensor(DeviceKind::Ultrasonic, PortId::TWO);
        board.attach_motor(DeviceKind::LargeMotor, PortId::THREE);

        board.apply(Command::PressTouch { port: PortId::ONE }).unwrap();
        board
            .apply(Command::SetDistance {
                port: PortId::TWO,
                cm: 120,
            })
            .unwrap();
        board
            .apply(Command::SetMotorSpeed {
                port: PortId::THREE,
                percent: 50,
            })
            .unwrap();
        board.step(Duration::from_millis(32));

        let snap = board.snapshot();
        assert!(matches!(
            snap.input(PortId::ONE).unwrap().detail,
            InputDetail::Touch { pressed: true, .. }
        ));
        assert!(matches!(
            snap.input(PortId::TWO).unwrap().detail,
            InputDetail::Ultrasonic { cm: 120 }
        ));
        assert_eq!(snap.motor(PortId::THREE).unwrap().speed, 50);
        assert!(snap.input(PortId::FOUR).is_none());
        assert!(snap.input(PortId::BRICK).is_none());
    }

    #[test]
    fn test_identical_states_compare_equal() {
        let mut board = Board::new();
        board.attach_sensor(DeviceKind::Gyro, PortId::ONE);

        let a = board.snapshot();
        let b = board.snapshot();
        assert_eq!(a, b);

        board.apply(Command::SetGyroRate { port: PortId::ONE, dps: 45 }).unwrap();
        let c = board.snapshot();
        assert_ne!(a, c);
    }
}
