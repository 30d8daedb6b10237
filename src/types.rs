//! Core types for brick-sim.
//!
//! These types define the foundation that everything builds on.
//! They flow through the device models, the tick loop, and the display layer.

use std::fmt;
use std::time::Duration;

// =============================================================================
// Simulation constants
// =============================================================================

/// Brick LCD width in pixels.
pub const SCREEN_WIDTH: usize = 178;

/// Brick LCD height in pixels.
pub const SCREEN_HEIGHT: usize = 128;

/// Pixel count of one full screen frame.
pub const SCREEN_PIXELS: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

/// Raw analog value above which a touch sensor reads "pressed".
///
/// Raw readings span 0..=4095. The boundary is shared with existing
/// programs and must not move.
pub const TOUCH_SENSE_THRESHOLD: i32 = 2500;

/// Upper bound of a raw analog pin reading.
pub const ANALOG_RAW_MAX: i32 = 4095;

/// Simulation tick rate in frames per second.
pub const SIM_FPS: u32 = 32;

/// Interval between simulation ticks (1000ms / 32 = 31.25ms).
pub const TICK_INTERVAL: Duration = Duration::from_nanos(31_250_000);

/// Number of numbered device ports on the brick (inputs 1-4, outputs A-D).
pub const PORT_COUNT: usize = 4;

// =============================================================================
// PortId
// =============================================================================

/// A device port selector.
///
/// Physical ports carry codes 1..=4. The brick itself (its buttons, light
/// and screen) is addressed with code -1 and has no removable device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortId(i8);

impl PortId {
    /// The brick pseudo-port (wire code -1).
    pub const BRICK: Self = Self(-1);

    pub const ONE: Self = Self(1);
    pub const TWO: Self = Self(2);
    pub const THREE: Self = Self(3);
    pub const FOUR: Self = Self(4);

    /// All numbered ports in order.
    pub const NUMBERED: [Self; PORT_COUNT] = [Self::ONE, Self::TWO, Self::THREE, Self::FOUR];

    /// Create a port from its wire code. Accepts 1..=4 and -1.
    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            1..=4 => Some(Self(code)),
            -1 => Some(Self::BRICK),
            _ => None,
        }
    }

    /// The wire code (1..=4, or -1 for the brick).
    #[inline]
    pub const fn code(self) -> i8 {
        self.0
    }

    /// Zero-based slot index for numbered ports. None for the brick.
    #[inline]
    pub const fn index(self) -> Option<usize> {
        match self.0 {
            1..=4 => Some(self.0 as usize - 1),
            _ => None,
        }
    }

    /// Whether this is the brick pseudo-port.
    #[inline]
    pub const fn is_brick(self) -> bool {
        self.0 == -1
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_brick() {
            write!(f, "brick")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

// =============================================================================
// DeviceKind
// =============================================================================

/// Tag identifying what kind of device occupies a port.
///
/// Consumed by the sampling layer (capability dispatch) and the display
/// layer (renderer/control selection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DeviceKind {
    Touch = 0,
    Color = 1,
    Ultrasonic = 2,
    Gyro = 3,
    MediumMotor = 4,
    LargeMotor = 5,
    Brick = 6,
}

impl DeviceKind {
    /// Number of kinds, for fixed-size lookup tables.
    pub const COUNT: usize = 7;

    /// All kinds in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Touch,
        Self::Color,
        Self::Ultrasonic,
        Self::Gyro,
        Self::MediumMotor,
        Self::LargeMotor,
        Self::Brick,
    ];

    /// Stable index for fixed-size lookup tables.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether this kind plugs into an input port (1-4).
    #[inline]
    pub const fn is_sensor(self) -> bool {
        matches!(self, Self::Touch | Self::Color | Self::Ultrasonic | Self::Gyro)
    }

    /// Whether this kind plugs into an output port (A-D).
    #[inline]
    pub const fn is_motor(self) -> bool {
        matches!(self, Self::MediumMotor | Self::LargeMotor)
    }

    /// Human-readable label for panels and logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Touch => "touch",
            Self::Color => "color",
            Self::Ultrasonic => "ultrasonic",
            Self::Gyro => "gyro",
            Self::MediumMotor => "medium motor",
            Self::LargeMotor => "large motor",
            Self::Brick => "brick",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// ButtonEvent
// =============================================================================

/// Gesture events produced by a button decoder.
///
/// The numeric codes are shared between the touch sensor event enum and
/// the brick button event enum in user programs. They are wire-level
/// constants and must be preserved exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ButtonEvent {
    /// Fired on the down edge.
    Pressed = 4,
    /// Fired after a completed press-and-release cycle.
    Bumped = 1,
    /// Fired on the up edge.
    Released = 3,
}

impl ButtonEvent {
    /// The wire code exposed to user programs.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a wire code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            4 => Some(Self::Pressed),
            1 => Some(Self::Bumped),
            3 => Some(Self::Released),
            _ => None,
        }
    }
}

// =============================================================================
// Brick buttons
// =============================================================================

/// One of the brick's physical face buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BrickButton {
    Up = 0,
    Enter = 1,
    Down = 2,
    Left = 3,
    Right = 4,
}

impl BrickButton {
    /// Number of face buttons.
    pub const COUNT: usize = 5;

    /// All buttons in layout order.
    pub const ALL: [Self; Self::COUNT] =
        [Self::Up, Self::Enter, Self::Down, Self::Left, Self::Right];

    /// Stable index for fixed-size lookup tables.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The corresponding mask bit.
    #[inline]
    pub const fn flag(self) -> BrickButtons {
        match self {
            Self::Up => BrickButtons::UP,
            Self::Enter => BrickButtons::ENTER,
            Self::Down => BrickButtons::DOWN,
            Self::Left => BrickButtons::LEFT,
            Self::Right => BrickButtons::RIGHT,
        }
    }

    /// Human-readable label for panels and logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Enter => "enter",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

bitflags::bitflags! {
    /// Pressed-state of the brick's face buttons as a bitfield.
    ///
    /// Combine with bitwise OR: `BrickButtons::UP | BrickButtons::ENTER`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BrickButtons: u8 {
        const NONE = 0;
        const UP = 1 << 0;
        const ENTER = 1 << 1;
        const DOWN = 1 << 2;
        const LEFT = 1 << 3;
        const RIGHT = 1 << 4;
    }
}

// =============================================================================
// Status light
// =============================================================================

/// Brick status light patterns.
///
/// Codes follow the EV3 firmware values used by `setStatusLight`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum StatusLight {
    #[default]
    Off = 0,
    Green = 1,
    Red = 2,
    Orange = 3,
    GreenFlash = 4,
    RedFlash = 5,
    OrangeFlash = 6,
    GreenPulse = 7,
    RedPulse = 8,
    OrangePulse = 9,
}

impl StatusLight {
    /// Decode a firmware pattern code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Off),
            1 => Some(Self::Green),
            2 => Some(Self::Red),
            3 => Some(Self::Orange),
            4 => Some(Self::GreenFlash),
            5 => Some(Self::RedFlash),
            6 => Some(Self::OrangeFlash),
            7 => Some(Self::GreenPulse),
            8 => Some(Self::RedPulse),
            9 => Some(Self::OrangePulse),
            _ => None,
        }
    }

    /// Base color of the pattern, if lit.
    pub const fn base_color(self) -> Option<Rgb> {
        match self {
            Self::Off => None,
            Self::Green | Self::GreenFlash | Self::GreenPulse => Some(Rgb::from_hex(0x4CAF50)),
            Self::Red | Self::RedFlash | Self::RedPulse => Some(Rgb::from_hex(0xF44336)),
            Self::Orange | Self::OrangeFlash | Self::OrangePulse => Some(Rgb::from_hex(0xFF9800)),
        }
    }

    /// Whether the pattern blinks.
    #[inline]
    pub const fn is_animated(self) -> bool {
        !matches!(self, Self::Off | Self::Green | Self::Red | Self::Orange)
    }
}

// =============================================================================
// Color sensor
// =============================================================================

/// Operating mode of the color sensor.
///
/// Codes follow the LMS2012 COL-* mode numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ColorSensorMode {
    /// Reflected light intensity, 0-100%.
    Reflected = 0,
    /// Ambient light intensity, 0-100%.
    Ambient = 1,
    /// Detected surface color.
    #[default]
    Color = 2,
}

impl ColorSensorMode {
    /// Decode an LMS mode number.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Reflected),
            1 => Some(Self::Ambient),
            2 => Some(Self::Color),
            _ => None,
        }
    }

    /// Human-readable label for panels.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Reflected => "reflected",
            Self::Ambient => "ambient",
            Self::Color => "color",
        }
    }
}

/// Surface colors the color sensor can report in color mode.
///
/// Codes follow the EV3 firmware palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SensorColor {
    #[default]
    None = 0,
    Black = 1,
    Blue = 2,
    Green = 3,
    Yellow = 4,
    Red = 5,
    White = 6,
    Brown = 7,
}

impl SensorColor {
    /// Number of palette entries.
    pub const COUNT: usize = 8;

    /// All palette entries in firmware order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::None,
        Self::Black,
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Red,
        Self::White,
        Self::Brown,
    ];

    /// Decode a firmware color code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Black),
            2 => Some(Self::Blue),
            3 => Some(Self::Green),
            4 => Some(Self::Yellow),
            5 => Some(Self::Red),
            6 => Some(Self::White),
            7 => Some(Self::Brown),
            _ => None,
        }
    }

    /// Display color for panels. None reads as a dark gray swatch.
    pub const fn rgb(self) -> Rgb {
        match self {
            Self::None => Rgb::from_hex(0x3F3F3F),
            Self::Black => Rgb::from_hex(0x000000),
            Self::Blue => Rgb::from_hex(0x0057A6),
            Self::Green => Rgb::from_hex(0x00852B),
            Self::Yellow => Rgb::from_hex(0xFAC80A),
            Self::Red => Rgb::from_hex(0xB40000),
            Self::White => Rgb::from_hex(0xF4F4F4),
            Self::Brown => Rgb::from_hex(0x532115),
        }
    }

    /// Human-readable label for panels and logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Black => "black",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::White => "white",
            Self::Brown => "brown",
        }
    }
}

// =============================================================================
// Rgb
// =============================================================================

/// Opaque RGB color with 8-bit channels.
///
/// Used for themes and the terminal front-end. Integer channels give
/// exact comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a 0xRRGGBB literal.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Ports
    // =========================================================================

    #[test]
    fn test_port_codes_roundtrip() {
        for code in 1..=4i8 {
            let port = PortId::from_code(code).unwrap();
            assert_eq!(port.code(), code);
            assert_eq!(port.index(), Some(code as usize - 1));
            assert!(!port.is_brick());
        }

        let brick = PortId::from_code(-1).unwrap();
        assert!(brick.is_brick());
        assert_eq!(brick.code(), -1);
        assert_eq!(brick.index(), None);
    }

    #[test]
    fn test_port_rejects_out_of_range() {
        assert!(PortId::from_code(0).is_none());
        assert!(PortId::from_code(5).is_none());
        assert!(PortId::from_code(-2).is_none());
    }

    #[test]
    fn test_port_display() {
        assert_eq!(PortId::ONE.to_string(), "1");
        assert_eq!(PortId::BRICK.to_string(), "brick");
    }

    // =========================================================================
    // Event codes
    // =========================================================================

    #[test]
    fn test_button_event_codes_are_fixed() {
        // Shared with user programs; never renumber.
        assert_eq!(ButtonEvent::Pressed.code(), 4);
        assert_eq!(ButtonEvent::Bumped.code(), 1);
        assert_eq!(ButtonEvent::Released.code(), 3);
    }

    #[test]
    fn test_button_event_from_code() {
        assert_eq!(ButtonEvent::from_code(4), Some(ButtonEvent::Pressed));
        assert_eq!(ButtonEvent::from_code(1), Some(ButtonEvent::Bumped));
        assert_eq!(ButtonEvent::from_code(3), Some(ButtonEvent::Released));
        assert_eq!(ButtonEvent::from_code(0), None);
        assert_eq!(ButtonEvent::from_code(2), None);
    }

    // =========================================================================
    // Brick buttons
    // =========================================================================

    #[test]
    fn test_brick_button_flags_are_distinct() {
        let mut seen = BrickButtons::NONE;
        for button in BrickButton::ALL {
            let flag = button.flag();
            assert!(!seen.intersects(flag));
            seen |= flag;
        }
        assert_eq!(seen.bits().count_ones() as usize, BrickButton::COUNT);
    }

    // =========================================================================
    // Screen and tick constants
    // =========================================================================

    #[test]
    fn test_screen_geometry() {
        assert_eq!(SCREEN_WIDTH, 178);
        assert_eq!(SCREEN_HEIGHT, 128);
        assert_eq!(SCREEN_PIXELS, 178 * 128);
    }

    #[test]
    fn test_tick_interval_is_32_hz() {
        assert_eq!(TICK_INTERVAL, Duration::from_secs(1) / SIM_FPS);
        assert_eq!(TICK_INTERVAL.as_nanos(), 31_250_000);
    }

    // =========================================================================
    // Sensor enums
    // =========================================================================

    #[test]
    fn test_touch_threshold() {
        assert_eq!(TOUCH_SENSE_THRESHOLD, 2500);
        assert!(TOUCH_SENSE_THRESHOLD < ANALOG_RAW_MAX);
    }

    #[test]
    fn test_sensor_color_codes_roundtrip() {
        for color in SensorColor::ALL {
            assert_eq!(SensorColor::from_code(color as u8), Some(color));
        }
        assert_eq!(SensorColor::from_code(8), None);
    }

    #[test]
    fn test_color_mode_codes() {
        assert_eq!(ColorSensorMode::Reflected as u8, 0);
        assert_eq!(ColorSensorMode::Ambient as u8, 1);
        assert_eq!(ColorSensorMode::Color as u8, 2);
        assert_eq!(ColorSensorMode::default(), ColorSensorMode::Color);
    }

    #[test]
    fn test_status_light_colors() {
        assert!(StatusLight::Off.base_color().is_none());
        assert!(StatusLight::Green.base_color().is_some());
        assert!(!StatusLight::Green.is_animated());
        assert!(StatusLight::GreenPulse.is_animated());
        assert_eq!(StatusLight::from_code(9), Some(StatusLight::OrangePulse));
        assert_eq!(StatusLight::from_code(10), None);
    }

    #[test]
    fn test_rgb_from_hex() {
        let c = Rgb::from_hex(0x3ADCFE);
        assert_eq!((c.r, c.g, c.b), (0x3A, 0xDC, 0xFE));
    }

    #[test]
    fn test_device_kind_table_indices() {
        for (i, kind) in DeviceKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert!(DeviceKind::Touch.is_sensor());
        assert!(!DeviceKind::Touch.is_motor());
        assert!(DeviceKind::LargeMotor.is_motor());
        assert!(!DeviceKind::Brick.is_sensor());
    }
}
