//! # brick-sim
//!
//! Simulation engine for a visual LEGO EV3 brick, with a terminal
//! front-end.
//!
//! The engine models the brick's ports as typed device nodes (touch,
//! color, ultrasonic, gyro, motors, the brick itself) advanced on a
//! fixed 32 Hz tick. Changes are edge-triggered everywhere: devices
//! compare against their last render snapshot, the screen compares
//! bytes against the last rendered frame, and button gestures fire only
//! on transitions.
//!
//! ## Architecture
//!
//! ```text
//! SimHandle (commands) → queue → SimHost thread
//!     SimClock.on_tick → Board.step(elapsed)
//!         InputNodes → BrickNode → MotorNodes → ScreenBuffer
//!     changed devices → HostEvent::Stepped → views → renderer
//! ```
//!
//! One thread owns all device state; every mutation arrives as a
//! [`board::Command`] through the host's queue, and the render path
//! reads [`board::BoardSnapshot`] copies. Blocking waits
//! ([`host::SimHandle::wait_until`]) park the calling thread on a gate
//! the gesture decoder opens, strictly after that edge's callbacks.
//!
//! ## Modules
//!
//! - [`types`] - Ports, device kinds, event codes, shared constants
//! - [`state`] - Gesture decoding and analog sampling state machines
//! - [`devices`] - Per-port simulated device models
//! - [`board`] - Port slots, command application, the screen buffer
//! - [`clock`] - Frame-skip tick scheduling with epoch cancellation
//! - [`host`] - The simulation thread and its cloneable handle
//! - [`view`] - Display/control contracts and the view cache
//! - [`layout`] - Taffy flexbox arrangement of the front-end panels
//! - [`theme`] - Color presets for the board
//! - [`frontend`] - Crossterm renderer and key routing

pub mod board;
pub mod clock;
pub mod devices;
pub mod error;
pub mod frontend;
pub mod host;
pub mod layout;
pub mod state;
pub mod theme;
pub mod types;
pub mod view;

// Re-export the common surface.
pub use types::*;

pub use board::{Board, BoardSnapshot, Command, Frame, ScreenBuffer, StepReport};
pub use clock::{SimClock, Tick, TickTask};
pub use devices::{
    BrickNode, ColorSensorNode, DeviceNode, GyroSensorNode, InputNode, MotorNode, TouchSensorNode,
    UltrasonicSensorNode,
};
pub use error::{BoardError, DeviceError, FrameError, HostError};
pub use host::{HostEvent, SimHandle, SimHost, WaitTarget};
pub use state::analog::{AnalogSampler, AnalogSensor};
pub use state::button::{Button, EventWaiter, HandlerId};
pub use theme::BoardTheme;
pub use view::{ControlInput, ControlView, DisplayView, ViewCache};
