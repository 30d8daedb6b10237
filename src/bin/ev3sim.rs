//! Interactive EV3 brick simulator in the terminal.
//!
//! Boots a board with one of every sensor, two motors, and a small
//! scripted user program that reacts to the simulated hardware:
//! bumping the touch sensor on port 1 toggles the status light and
//! draws on the brick screen.
//!
//! Run with: cargo run --bin ev3sim

use std::io;
use std::sync::mpsc;
use std::thread;

use brick_sim::board::Frame;
use brick_sim::frontend::{Frontend, TerminalGuard};
use brick_sim::host::{SimHost, WaitTarget};
use brick_sim::theme;
use brick_sim::types::{ButtonEvent, DeviceKind, PortId, StatusLight};

fn main() -> io::Result<()> {
    // Host events feed the front-end through a channel; the callback
    // itself stays trivial.
    let (event_tx, event_rx) = mpsc::channel();
    let (_host, handle) = SimHost::spawn(move |event| {
        let _ = event_tx.send(event);
    })?;

    // Populate the board.
    let setup = [
        (DeviceKind::Touch, PortId::ONE),
        (DeviceKind::Color, PortId::TWO),
        (DeviceKind::Ultrasonic, PortId::THREE),
        (DeviceKind::Gyro, PortId::FOUR),
    ];
    for (kind, port) in setup {
        let _ = handle.attach_sensor(kind, port);
    }
    let _ = handle.attach_motor(DeviceKind::LargeMotor, PortId::ONE);
    let _ = handle.attach_motor(DeviceKind::MediumMotor, PortId::TWO);
    let _ = handle.start();

    // Scripted user program: wait for touch bumps, toggle the light and
    // paint the screen. Blocking waits live on their own thread.
    let program_handle = handle.clone();
    let _program = thread::Builder::new()
        .name("user-program".to_string())
        .spawn(move || {
            let mut lit = false;
            loop {
                if program_handle
                    .wait_until(WaitTarget::Touch(PortId::ONE), ButtonEvent::Bumped)
                    .is_err()
                {
                    break;
                }
                lit = !lit;
                let light = if lit {
                    StatusLight::GreenPulse
                } else {
                    StatusLight::Off
                };
                let _ = program_handle.set_status_light(light);

                let mut frame = Frame::new();
                if lit {
                    frame.fill_rect(20, 20, 138, 88, 255);
                    frame.fill_rect(30, 30, 118, 68, 0);
                }
                let _ = program_handle.write_screen(frame.as_bytes().to_vec());
            }
        })?;

    // Terminal loop until 'q'. The guard restores the terminal even if
    // drawing fails.
    let _guard = TerminalGuard::enter()?;
    let mut frontend = Frontend::new(handle, event_rx, theme::classic());
    frontend.run(&mut io::stdout())
}
