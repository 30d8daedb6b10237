//! Concrete panel views over board snapshots.
//!
//! One view per device kind, each caching the lines it last rendered.
//! `did_change` compares against that cache, so redraws happen only
//! when a panel's text actually moved. The selectable sensors also
//! implement [`ControlView`] and translate control input into board
//! commands.

use crate::board::{BoardSnapshot, Command, InputDetail};
use crate::types::{
    BrickButton, ColorSensorMode, DeviceKind, PortId, SensorColor, StatusLight,
};
use crate::view::{ControlInput, ControlView, DisplayView};

/// Step of the ultrasonic distance slider in cm.
const DISTANCE_STEP: i32 = 5;

/// Step of the gyro rotation slider in deg/s.
const RATE_STEP: i32 = 15;

/// Step of the light-percent wheel.
const PERCENT_STEP: i32 = 5;

/// Step of the motor speed control in percent.
const SPEED_STEP: i32 = 10;

// =============================================================================
// SHARED PLUMBING
// =============================================================================

/// Text cache every panel shares: current lines vs rendered lines.
struct PanelText {
    lines: Vec<String>,
    rendered: Vec<String>,
}

impl PanelText {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            rendered: Vec::new(),
        }
    }

    fn set(&mut self, lines: Vec<String>) {
        self.lines = lines;
    }

    fn take_dirty(&mut self) -> bool {
        if self.lines != self.rendered {
            self.rendered = self.lines.clone();
            true
        } else {
            false
        }
    }
}

// =============================================================================
// TOUCH
// =============================================================================

pub struct TouchPanel {
    port: PortId,
    text: PanelText,
}

impl TouchPanel {
    pub fn new(port: PortId) -> Self {
        Self {
            port,
            text: PanelText::new(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.text.lines
    }
}

impl DisplayView for TouchPanel {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Touch
    }

    fn port(&self) -> PortId {
        self.port
    }

    fn update_state(&mut self, board: &BoardSnapshot) {
        let Some(snap) = board.input(self.port) else {
            self.text.set(vec!["(detached)".to_string()]);
            return;
        };
        if let InputDetail::Touch { raw, pressed } = snap.detail {
            let state = if pressed { "PRESSED" } else { "released" };
            self.text.set(vec![
                format!("touch  port {}", self.port),
                format!("{state}  raw {raw}"),
            ]);
        }
    }

    fn did_change(&mut self) -> bool {
        self.text.take_dirty()
    }
}

// =============================================================================
// COLOR
// =============================================================================

pub struct ColorPanel {
    port: PortId,
    selected: bool,
    mode: ColorSensorMode,
    color: SensorColor,
    reflected: i32,
    ambient: i32,
    text: PanelText,
}

impl ColorPanel {
    pub fn new(port: PortId) -> Self {
        Self {
            port,
            selected: false,
            mode: ColorSensorMode::default(),
            color: SensorColor::default(),
            reflected: 0,
            ambient: 0,
            text: PanelText::new(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.text.lines
    }
}

impl DisplayView for ColorPanel {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Color
    }

    fn port(&self) -> PortId {
        self.port
    }

    fn update_state(&mut self, board: &BoardSnapshot) {
        let Some(snap) = board.input(self.port) else {
            self.text.set(vec!["(detached)".to_string()]);
            return;
        };
        self.selected = snap.selected;
        if let InputDetail::Color {
            mode,
            color,
            reflected,
            ambient,
        } = snap.detail
        {
            self.mode = mode;
            self.color = color;
            self.reflected = reflected;
            self.ambient = ambient;

            let reading = match mode {
                ColorSensorMode::Color => color.label().to_string(),
                ColorSensorMode::Reflected => format!("{reflected}%"),
                ColorSensorMode::Ambient => format!("{ambient}%"),
            };
            self.text.set(vec![
                format!("color  port {}", self.port),
                format!("{}  {}", mode.label(), reading),
            ]);
        }
    }

    fn did_change(&mut self) -> bool {
        self.text.take_dirty()
    }

    fn selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, on: bool) {
        self.selected = on;
    }
}

impl ControlView for ColorPanel {
    fn handle(&mut self, input: ControlInput) -> Option<Command> {
        let port = self.port;
        match input {
            ControlInput::NextMode => {
                let mode = match self.mode {
                    ColorSensorMode::Color => ColorSensorMode::Reflected,
                    ColorSensorMode::Reflected => ColorSensorMode::Ambient,
                    ColorSensorMode::Ambient => ColorSensorMode::Color,
                };
                Some(Command::SetColorMode { port, mode })
            }
            ControlInput::Increase | ControlInput::Decrease => {
                let up = input == ControlInput::Increase;
                match self.mode {
                    // Color mode: walk the palette grid.
                    ColorSensorMode::Color => {
                        let step = if up { 1 } else { SensorColor::COUNT as i32 - 1 };
                        let next = (self.color as i32 + step) % SensorColor::COUNT as i32;
                        SensorColor::from_code(next as u8)
                            .map(|color| Command::SetColor { port, color })
                    }
                    // Light modes: percent wheel.
                    ColorSensorMode::Reflected => {
                        let step = if up { PERCENT_STEP } else { -PERCENT_STEP };
                        Some(Command::SetReflected {
                            port,
                            percent: self.reflected + step,
                        })
                    }
                    ColorSensorMode::Ambient => {
                        let step = if up { PERCENT_STEP } else { -PERCENT_STEP };
                        Some(Command::SetAmbient {
                            port,
                            percent: self.ambient + step,
                        })
                    }
                }
            }
        }
    }
}

// =============================================================================
// ULTRASONIC
// =============================================================================

pub struct UltrasonicPanel {
    port: PortId,
    selected: bool,
    cm: i32,
    text: PanelText,
}

impl UltrasonicPanel {
    pub fn new(port: PortId) -> Self {
        Self {
            port,
            selected: false,
            cm: 0,
            text: PanelText::new(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.text.lines
    }
}

impl DisplayView for UltrasonicPanel {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Ultrasonic
    }

    fn port(&self) -> PortId {
        self.port
    }

    fn update_state(&mut self, board: &BoardSnapshot) {
        let Some(snap) = board.input(self.port) else {
            self.text.set(vec!["(detached)".to_string()]);
            return;
        };
        self.selected = snap.selected;
        if let InputDetail::Ultrasonic { cm } = snap.detail {
            self.cm = cm;
            self.text.set(vec![
                format!("ultrasonic  port {}", self.port),
                format!("{cm} cm"),
            ]);
        }
    }

    fn did_change(&mut self) -> bool {
        self.text.take_dirty()
    }

    fn selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, on: bool) {
        self.selected = on;
    }
}

impl ControlView for UltrasonicPanel {
    fn handle(&mut self, input: ControlInput) -> Option<Command> {
        let step = match input {
            ControlInput::Increase => DISTANCE_STEP,
            ControlInput::Decrease => -DISTANCE_STEP,
            ControlInput::NextMode => return None,
        };
        Some(Command::SetDistance {
            port: self.port,
            cm: self.cm + step,
        })
    }
}

// =============================================================================
// GYRO
// =============================================================================

pub struct GyroPanel {
    port: PortId,
    selected: bool,
    rate: i32,
    text: PanelText,
}

impl GyroPanel {
    pub fn new(port: PortId) -> Self {
        Self {
            port,
            selected: false,
            rate: 0,
            text: PanelText::new(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.text.lines
    }
}

impl DisplayView for GyroPanel {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Gyro
    }

    fn port(&self) -> PortId {
        self.port
    }

    fn update_state(&mut self, board: &BoardSnapshot) {
        let Some(snap) = board.input(self.port) else {
            self.text.set(vec!["(detached)".to_string()]);
            return;
        };
        self.selected = snap.selected;
        if let InputDetail::Gyro { rate, angle } = snap.detail {
            self.rate = rate;
            self.text.set(vec![
                format!("gyro  port {}", self.port),
                format!("{rate} deg/s  angle {angle}"),
            ]);
        }
    }

    fn did_change(&mut self) -> bool {
        self.text.take_dirty()
    }

    fn selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, on: bool) {
        self.selected = on;
    }
}

impl ControlView for GyroPanel {
    fn handle(&mut self, input: ControlInput) -> Option<Command> {
        let step = match input {
            ControlInput::Increase => RATE_STEP,
            ControlInput::Decrease => -RATE_STEP,
            ControlInput::NextMode => return None,
        };
        Some(Command::SetGyroRate {
            port: self.port,
            dps: self.rate + step,
        })
    }
}

// =============================================================================
// MOTOR
// =============================================================================

pub struct MotorPanel {
    kind: DeviceKind,
    port: PortId,
    speed: i32,
    text: PanelText,
}

impl MotorPanel {
    pub fn new(kind: DeviceKind, port: PortId) -> Self {
        Self {
            kind,
            port,
            speed: 0,
            text: PanelText::new(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.text.lines
    }
}

impl DisplayView for MotorPanel {
    fn kind(&self) -> DeviceKind {
        self.kind
    }

    fn port(&self) -> PortId {
        self.port
    }

    fn update_state(&mut self, board: &BoardSnapshot) {
        let Some(snap) = board.motor(self.port) else {
            self.text.set(vec!["(detached)".to_string()]);
            return;
        };
        self.kind = snap.kind;
        self.speed = snap.speed;
        let letter = [b'A', b'B', b'C', b'D'][self.port.index().unwrap_or(0)] as char;
        self.text.set(vec![
            format!("{}  port {letter}", snap.kind),
            format!("speed {}%  angle {}", snap.speed, snap.angle),
        ]);
    }

    fn did_change(&mut self) -> bool {
        self.text.take_dirty()
    }
}

impl ControlView for MotorPanel {
    fn handle(&mut self, input: ControlInput) -> Option<Command> {
        let step = match input {
            ControlInput::Increase => SPEED_STEP,
            ControlInput::Decrease => -SPEED_STEP,
            ControlInput::NextMode => return Some(Command::StopMotor { port: self.port }),
        };
        Some(Command::SetMotorSpeed {
            port: self.port,
            percent: self.speed + step,
        })
    }
}

// =============================================================================
// BRICK
// =============================================================================

pub struct BrickPanel {
    buttons: [bool; BrickButton::COUNT],
    light: StatusLight,
    text: PanelText,
}

impl BrickPanel {
    pub fn new() -> Self {
        Self {
            buttons: [false; BrickButton::COUNT],
            light: StatusLight::Off,
            text: PanelText::new(),
        }
    }

    pub fn button_held(&self, button: BrickButton) -> bool {
        self.buttons[button.index()]
    }

    pub fn light(&self) -> StatusLight {
        self.light
    }

    pub fn lines(&self) -> &[String] {
        &self.text.lines
    }
}

impl Default for BrickPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayView for BrickPanel {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Brick
    }

    fn port(&self) -> PortId {
        PortId::BRICK
    }

    fn update_state(&mut self, board: &BoardSnapshot) {
        for button in BrickButton::ALL {
            self.buttons[button.index()] = board.brick.buttons.contains(button.flag());
        }
        self.light = board.brick.light;

        let held: Vec<&str> = BrickButton::ALL
            .iter()
            .filter(|b| self.buttons[b.index()])
            .map(|b| b.label())
            .collect();
        let held = if held.is_empty() {
            "-".to_string()
        } else {
            held.join(" ")
        };
        self.text.set(vec![
            format!("buttons: {held}"),
            format!("light: {:?}", self.light),
        ]);
    }

    fn did_change(&mut self) -> bool {
        self.text.take_dirty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
