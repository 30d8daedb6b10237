//! Error types shared across the simulator.
//!
//! Device faults are per-device, never whole-frame fatal: the tick loop
//! catches them at the device boundary, logs, and keeps going.

use thiserror::Error;

use crate::types::{DeviceKind, PortId};

/// Errors raised by device models and board commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// A command addressed a port with nothing attached.
    #[error("no device on port {port}")]
    NoDevice { port: PortId },

    /// A command addressed a port holding a different device kind.
    #[error("port {port} holds a {found} sensor, expected {expected}")]
    KindMismatch {
        port: PortId,
        expected: DeviceKind,
        found: DeviceKind,
    },

    /// A device kind cannot live on the addressed port.
    #[error("{kind} cannot attach to port {port}")]
    InvalidPort { kind: DeviceKind, port: PortId },

    /// A motor command addressed a port outside the output bank. The
    /// command itself names no motor kind, so neither does the error.
    #[error("no motor port {port}")]
    InvalidMotorPort { port: PortId },

    /// A device model failed while advancing its state.
    #[error("{kind} on port {port}: {reason}")]
    Faulted {
        kind: DeviceKind,
        port: PortId,
        reason: String,
    },
}

/// Everything a queued board command can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Errors raised by the simulation host toward calling threads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The simulation thread has shut down.
    #[error("simulation host is not running")]
    HostGone,

    /// A wait targeted a port with no button-bearing device.
    #[error("no button to wait on at port {port}")]
    NoButton { port: PortId },
}

/// Errors raised by the screen buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// A frame write did not cover the whole screen.
    #[error("frame holds {got} bytes, screen needs {want}")]
    BadFrameLength { got: usize, want: usize },

    /// An interleave target cannot hold the whole screen.
    #[error("output holds {got} bytes, interleave needs {want}")]
    BadOutputLength { got: usize, want: usize },
}
