//! Board Module - The simulated brick and its ports
//!
//! Owns every device model: four input slots, four output slots, the
//! brick node and the screen. Slots are fixed-size arrays of optional
//! nodes, populated lazily on first attach and cached for the session.
//!
//! All external mutation arrives as a [`Command`] through one queue and
//! is applied between ticks by the thread that also steps the devices,
//! so device state is only ever touched from one place. The render path
//! reads, never writes.
//!
//! # Step order
//!
//! One tick advances input nodes, then the brick, then the motors, then
//! settles the screen. A device that fails to step is logged and skipped
//! for the frame; the rest of the frame still runs.

use std::time::Duration;

use crate::devices::{BrickNode, DeviceNode, InputNode, MotorNode};
use crate::error::{BoardError, DeviceError};
use crate::types::{
    BrickButton, ColorSensorMode, DeviceKind, PORT_COUNT, PortId, SensorColor, StatusLight,
};

mod screen;
mod snapshot;

pub use screen::{Frame, ScreenBuffer};
pub use snapshot::{BoardSnapshot, BrickSnapshot, InputDetail, InputSnapshot, MotorSnapshot};

// =============================================================================
// COMMANDS
// =============================================================================

/// External mutation of the board, queued and applied between ticks.
///
/// Commands come from interactive controls and from user programs. They
/// stage inputs; event dispatch happens when the tick decodes them.
#[derive(Debug, Clone)]
pub enum Command {
    /// Attach a sensor to an input port, replacing any other kind there.
    AttachSensor { kind: DeviceKind, port: PortId },
    /// Attach a motor to an output port, replacing any other kind there.
    AttachMotor { kind: DeviceKind, port: PortId },
    /// Remove the sensor on an input port.
    DetachSensor { port: PortId },
    /// Remove the motor on an output port.
    DetachMotor { port: PortId },

    /// Set a touch sensor's raw pin value.
    SetTouchRaw { port: PortId, raw: i32 },
    /// Drive a touch pad fully down.
    PressTouch { port: PortId },
    /// Release a touch pad.
    ReleaseTouch { port: PortId },

    /// Switch a color sensor's operating mode.
    SetColorMode { port: PortId, mode: ColorSensorMode },
    /// Set the surface color a color sensor sees.
    SetColor { port: PortId, color: SensorColor },
    /// Set reflected light percent.
    SetReflected { port: PortId, percent: i32 },
    /// Set ambient light percent.
    SetAmbient { port: PortId, percent: i32 },

    /// Set an ultrasonic sensor's distance in cm.
    SetDistance { port: PortId, cm: i32 },

    /// Set a gyro's rotation rate in deg/s.
    SetGyroRate { port: PortId, dps: i32 },
    /// Zero a gyro's integrated angle.
    ResetGyroAngle { port: PortId },

    /// Command a motor speed in percent.
    SetMotorSpeed { port: PortId, percent: i32 },
    /// Stop a motor.
    StopMotor { port: PortId },
    /// Zero a motor's angle counter.
    ClearMotorCounts { port: PortId },

    /// Press or release a brick face button.
    SetBrickButton { button: BrickButton, pressed: bool },
    /// Set the brick status light pattern.
    SetStatusLight { light: StatusLight },

    /// Open or close a sensor's interactive control overlay.
    SetSelected { port: PortId, on: bool },

    /// Replace the whole screen frame.
    WriteScreen { frame: Vec<u8> },
    /// Black out the screen.
    ClearScreen,
}

// =============================================================================
// STEP REPORT
// =============================================================================

/// What one tick produced: devices needing a display refresh, whether
/// the screen needs a redraw, and any per-device failures.
#[derive(Default)]
pub struct StepReport {
    pub changed: Vec<(DeviceKind, PortId)>,
    pub screen_changed: bool,
    pub errors: Vec<DeviceError>,
}

/// Step one device behind the per-device error boundary.
///
/// A failing device is logged and reported; its change flag is treated
/// as false for the frame so nothing stale renders.
pub(crate) fn step_device(node: &mut dyn DeviceNode, elapsed: Duration, report: &mut StepReport) {
    match node.update_state(elapsed) {
        Ok(()) => {
            if node.did_change() {
                report.changed.push((node.kind(), node.port()));
            }
        }
        Err(err) => {
            log::warn!("device step failed: {err}");
            report.errors.push(err);
        }
    }
}

// =============================================================================
// BOARD
// =============================================================================

/// The simulated brick: ports, devices, screen.
pub struct Board {
    inputs: [Option<InputNode>; PORT_COUNT],
    motors: [Option<MotorNode>; PORT_COUNT],
    brick: BrickNode,
    screen: ScreenBuffer,
}

impl Board {
    /// An empty board: no sensors, no motors, black screen.
    pub fn new() -> Self {
        Self {
            inputs: Default::default(),
            motors: Default::default(),
            brick: BrickNode::new(),
            screen: ScreenBuffer::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Slots
    // -------------------------------------------------------------------------

    /// The sensor on an input port, if any.
    pub fn input(&self, port: PortId) -> Option<&InputNode> {
        self.inputs[port.index()?].as_ref()
    }

    pub fn input_mut(&mut self, port: PortId) -> Option<&mut InputNode> {
        self.inputs[port.index()?].as_mut()
    }

    /// The motor on an output port, if any.
    pub fn motor(&self, port: PortId) -> Option<&MotorNode> {
        self.motors[port.index()?].as_ref()
    }

    pub fn motor_mut(&mut self, port: PortId) -> Option<&mut MotorNode> {
        self.motors[port.index()?].as_mut()
    }

    pub fn brick(&self) -> &BrickNode {
        &self.brick
    }

    pub fn brick_mut(&mut self) -> &mut BrickNode {
        &mut self.brick
    }

    pub fn screen(&self) -> &ScreenBuffer {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut ScreenBuffer {
        &mut self.screen
    }

    /// Attach a sensor, reusing the cached node when the kind matches.
    ///
    /// Returns None for malformed configuration (non-sensor kind or the
    /// brick pseudo-port); callers null-check instead of handling errors.
    pub fn attach_sensor(&mut self, kind: DeviceKind, port: PortId) -> Option<&mut InputNode> {
        if !kind.is_sensor() {
            return None;
        }
        let idx = port.index()?;
        let replace = match &self.inputs[idx] {
            Some(node) => node.kind() != kind,
            None => true,
        };
        if replace {
            log::debug!("attach {kind} on port {port}");
            self.inputs[idx] = InputNode::new(kind, port);
        }
        self.inputs[idx].as_mut()
    }

    /// Attach a motor, reusing the cached node when the kind matches.
    pub fn attach_motor(&mut self, kind: DeviceKind, port: PortId) -> Option<&mut MotorNode> {
        if !kind.is_motor() {
            return None;
        }
        let idx = port.index()?;
        let replace = match &self.motors[idx] {
            Some(node) => node.kind() != kind,
            None => true,
        };
        if replace {
            log::debug!("attach {kind} on output port {port}");
            self.motors[idx] = Some(match kind {
                DeviceKind::MediumMotor => MotorNode::medium(port),
                _ => MotorNode::large(port),
            });
        }
        self.motors[idx].as_mut()
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Apply one queued command.
    pub fn apply(&mut self, command: Command) -> Result<(), BoardError> {
        match command {
            Command::AttachSensor { kind, port } => {
                self.attach_sensor(kind, port)
                    .map(|_| ())
                    .ok_or(DeviceError::InvalidPort { kind, port })?;
            }
            Command::AttachMotor { kind, port } => {
                self.attach_motor(kind, port)
                    .map(|_| ())
                    .ok_or(DeviceError::InvalidPort { kind, port })?;
            }
            Command::DetachSensor { port } => {
                if let Some(idx) = port.index() {
                    self.inputs[idx] = None;
                }
            }
            Command::DetachMotor { port } => {
                if let Some(idx) = port.index() {
                    self.motors[idx] = None;
                }
            }

            Command::SetTouchRaw { port, raw } => self.touch_at(port)?.set_raw(raw),
            Command::PressTouch { port } => self.touch_at(port)?.press(),
            Command::ReleaseTouch { port } => self.touch_at(port)?.release(),

            Command::SetColorMode { port, mode } => self.color_at(port)?.set_mode(mode),
            Command::SetColor { port, color } => self.color_at(port)?.set_color(color),
            Command::SetReflected { port, percent } => self.color_at(port)?.set_reflected(percent),
            Command::SetAmbient { port, percent } => self.color_at(port)?.set_ambient(percent),

            Command::SetDistance { port, cm } => self.ultrasonic_at(port)?.set_distance(cm),

            Command::SetGyroRate { port, dps } => self.gyro_at(port)?.set_rate(dps),
            Command::ResetGyroAngle { port } => self.gyro_at(port)?.reset_angle(),

            Command::SetMotorSpeed { port, percent } => self.motor_at(port)?.set_speed(percent),
            Command::StopMotor { port } => self.motor_at(port)?.stop(),
            Command::ClearMotorCounts { port } => self.motor_at(port)?.clear_counts(),

            Command::SetBrickButton { button, pressed } => {
                self.brick.set_pressed(button, pressed);
            }
            Command::SetStatusLight { light } => self.brick.set_light(light),

            Command::SetSelected { port, on } => {
                let node = self.input_mut(port).ok_or(DeviceError::NoDevice { port })?;
                node.set_selected(on);
            }

            Command::WriteScreen { frame } => self.screen.write(&frame)?,
            Command::ClearScreen => self.screen.clear(),
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Tick
    // -------------------------------------------------------------------------

    /// Advance every device by the elapsed time.
    ///
    /// Order: input nodes, brick, motors, then the screen settles.
    pub fn step(&mut self, elapsed: Duration) -> StepReport {
        let mut report = StepReport::default();

        for slot in self.inputs.iter_mut() {
            if let Some(node) = slot {
                step_device(node, elapsed, &mut report);
            }
        }

        step_device(&mut self.brick, elapsed, &mut report);

        for slot in self.motors.iter_mut() {
            if let Some(node) = slot {
                step_device(node, elapsed, &mut report);
            }
        }

        report.screen_changed = self.screen.did_change();
        report
    }

    // -------------------------------------------------------------------------
    // Typed slot access for commands
    // -------------------------------------------------------------------------

    fn touch_at(&mut self, port: PortId) -> Result<&mut crate::devices::TouchSensorNode, DeviceError> {
        let node = self.sensor_slot(port, DeviceKind::Touch)?;
        let found = node.kind();
        node.as_touch_mut().ok_or(DeviceError::KindMismatch {
            port,
            expected: DeviceKind::Touch,
            found,
        })
    }

    fn color_at(&mut self, port: PortId) -> Result<&mut crate::devices::ColorSensorNode, DeviceError> {
        let node = self.sensor_slot(port, DeviceKind::Color)?;
        let found = node.kind();
        node.as_color_mut().ok_or(DeviceError::KindMismatch {
            port,
            expected: DeviceKind::Color,
            found,
        })
    }

    fn ultrasonic_at(
        &mut self,
        port: PortId,
    ) -> Result<&mut crate::devices::UltrasonicSensorNode, DeviceError> {
        let node = self.sensor_slot(port, DeviceKind::Ultrasonic)?;
        let found = node.kind();
        node.as_ultrasonic_mut().ok_or(DeviceError::KindMismatch {
            port,
            expected: DeviceKind::Ultrasonic,
            found,
        })
    }

    fn gyro_at(&mut self, port: PortId) -> Result<&mut crate::devices::GyroSensorNode, DeviceError> {
        let node = self.sensor_slot(port, DeviceKind::Gyro)?;
        let found = node.kind();
        node.as_gyro_mut().ok_or(DeviceError::KindMismatch {
            port,
            expected: DeviceKind::Gyro,
            found,
        })
    }

    fn motor_at(&mut self, port: PortId) -> Result<&mut MotorNode, DeviceError> {
        let idx = port
            .index()
            .ok_or(DeviceError::InvalidMotorPort { port })?;
        self.motors[idx]
            .as_mut()
            .ok_or(DeviceError::NoDevice { port })
    }

    fn sensor_slot(
        &mut self,
        port: PortId,
        expected: DeviceKind,
    ) -> Result<&mut InputNode, DeviceError> {
        let idx = port.index().ok_or(DeviceError::InvalidPort {
            kind: expected,
            port,
        })?;
        self.inputs[idx]
            .as_mut()
            .ok_or(DeviceError::NoDevice { port })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SCREEN_PIXELS;

    const TICK: Duration = Duration::from_millis(32);

    #[test]
    fn test_slots_start_absent() {
        let board = Board::new();
        for port in PortId::NUMBERED {
            assert!(board.input(port).is_none());
            assert!(board.motor(port).is_none());
        }
        assert!(board.input(PortId::BRICK).is_none());
        assert!(board.motor(PortId::BRICK).is_none());
    }

    #[test]
    fn test_attach_caches_per_kind_and_port() {
        let mut board = Board::new();
        board
            .attach_sensor(DeviceKind::Gyro, PortId::TWO)
            .unwrap()
            .as_gyro_mut()
            .unwrap()
            .set_rate(90);

        // Same kind on the same port reuses the node.
        let node = board.attach_sensor(DeviceKind::Gyro, PortId::TWO).unwrap();
        assert_eq!(node.as_gyro().unwrap().rate(), 90);

        // A different kind replaces it.
        let node = board.attach_sensor(DeviceKind::Touch, PortId::TWO).unwrap();
        assert_eq!(node.kind(), DeviceKind::Touch);
    }

    #[test]
    fn test_attach_rejects_malformed_config() {
        let mut board = Board::new();
        assert!(board.attach_sensor(DeviceKind::LargeMotor, PortId::ONE).is_none());
        assert!(board.attach_sensor(DeviceKind::Brick, PortId::ONE).is_none());
        assert!(board.attach_sensor(DeviceKind::Touch, PortId::BRICK).is_none());
        assert!(board.attach_motor(DeviceKind::Touch, PortId::ONE).is_none());
        assert!(board.attach_motor(DeviceKind::LargeMotor, PortId::BRICK).is_none());
    }

    #[test]
    fn test_inputs_and_motors_share_port_numbers() {
        let mut board = Board::new();
        board.attach_sensor(DeviceKind::Touch, PortId::ONE);
        board.attach_motor(DeviceKind::LargeMotor, PortId::ONE);

        assert!(board.input(PortId::ONE).is_some());
        assert!(board.motor(PortId::ONE).is_some());
    }

    #[test]
    fn test_commands_reach_typed_nodes() {
        let mut board = Board::new();
        board.attach_sensor(DeviceKind::Ultrasonic, PortId::THREE);

        board
            .apply(Command::SetDistance {
                port: PortId::THREE,
                cm: 57,
            })
            .unwrap();

        let node = board.input(PortId::THREE).unwrap();
        assert_eq!(node.as_ultrasonic().unwrap().distance(), 57);
    }

    #[test]
    fn test_command_errors_name_the_failure() {
        let mut board = Board::new();
        board.attach_sensor(DeviceKind::Color, PortId::ONE);

        // Empty port.
        let err = board
            .apply(Command::SetTouchRaw {
                port: PortId::TWO,
                raw: 3000,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            BoardError::Device(DeviceError::NoDevice { port: PortId::TWO })
        ));

        // Wrong kind.
        let err = board
            .apply(Command::PressTouch { port: PortId::ONE })
            .unwrap_err();
        assert!(matches!(
            err,
            BoardError::Device(DeviceError::KindMismatch { .. })
        ));

        // Brick pseudo-port.
        let err = board
            .apply(Command::SetGyroRate {
                port: PortId::BRICK,
                dps: 10,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            BoardError::Device(DeviceError::InvalidPort { .. })
        ));

        // Motor command on the brick pseudo-port: the error names no
        // motor kind, whatever motor the caller had in mind.
        board.attach_motor(DeviceKind::MediumMotor, PortId::ONE);
        let err = board
            .apply(Command::SetMotorSpeed {
                port: PortId::BRICK,
                percent: 50,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            BoardError::Device(DeviceError::InvalidMotorPort { port: PortId::BRICK })
        ));
        assert!(!err.to_string().contains("large"));
    }

    #[test]
    fn test_step_order_inputs_brick_motors() {
        let mut board = Board::new();
        board.attach_sensor(DeviceKind::Touch, PortId::FOUR);
        board.attach_motor(DeviceKind::LargeMotor, PortId::ONE);

        board.apply(Command::PressTouch { port: PortId::FOUR }).unwrap();
        board
            .apply(Command::SetBrickButton {
                button: BrickButton::Enter,
                pressed: true,
            })
            .unwrap();
        board
            .apply(Command::SetMotorSpeed {
                port: PortId::ONE,
                percent: 100,
            })
            .unwrap();

        let report = board.step(TICK);
        assert_eq!(
            report.changed,
            vec![
                (DeviceKind::Touch, PortId::FOUR),
                (DeviceKind::Brick, PortId::BRICK),
                (DeviceKind::LargeMotor, PortId::ONE),
            ]
        );
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_quiet_tick_reports_nothing() {
        let mut board = Board::new();
        board.attach_sensor(DeviceKind::Touch, PortId::ONE);

        let first = board.step(TICK);
        assert!(first.changed.is_empty());
        assert!(!first.screen_changed);
    }

    #[test]
    fn test_screen_write_flows_through_step() {
        let mut board = Board::new();
        let mut frame = vec![0u8; SCREEN_PIXELS];
        frame[0] = 255;

        board.apply(Command::WriteScreen { frame: frame.clone() }).unwrap();
        let report = board.step(TICK);
        assert!(report.screen_changed);

        // Same frame again settles back to quiet.
        board.apply(Command::WriteScreen { frame }).unwrap();
        let report = board.step(TICK);
        assert!(!report.screen_changed);
    }

    #[test]
    fn test_detach_empties_the_slot() {
        let mut board = Board::new();
        board.attach_sensor(DeviceKind::Touch, PortId::ONE);
        board.apply(Command::DetachSensor { port: PortId::ONE }).unwrap();
        assert!(board.input(PortId::ONE).is_none());

        // Detaching an empty slot is idempotent.
        board.apply(Command::DetachSensor { port: PortId::ONE }).unwrap();
    }

    // =========================================================================
    // Error isolation
    // =========================================================================

    /// Always fails to step.
    struct FaultyNode;

    impl DeviceNode for FaultyNode {
        fn kind(&self) -> DeviceKind {
            DeviceKind::Gyro
        }

        fn port(&self) -> PortId {
            PortId::ONE
        }

        fn update_state(&mut self, _elapsed: Duration) -> Result<(), DeviceError> {
            Err(DeviceError::Faulted {
                kind: DeviceKind::Gyro,
                port: PortId::ONE,
                reason: "stuck axis".into(),
            })
        }

        fn did_change(&mut self) -> bool {
            true
        }
    }

    #[test]
    fn test_faulty_device_does_not_abort_the_frame() {
        let mut report = StepReport::default();
        let mut faulty = FaultyNode;
        let mut healthy = crate::devices::GyroSensorNode::new(PortId::TWO);
        healthy.set_rate(90);

        step_device(&mut faulty, TICK, &mut report);
        step_device(&mut healthy, TICK, &mut report);

        // The failure is reported, not rendered; the healthy device
        // still makes it into the frame.
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.changed, vec![(DeviceKind::Gyro, PortId::TWO)]);
    }
}
