//! Key routing for the board front-end.
//!
//! Converts crossterm key events into front-end actions. Terminals only
//! report key presses, so button-like inputs are expressed as taps (the
//! front-end stages the matching release a moment later) or as holds
//! toggled on and off.
//!
//! Bindings:
//!
//! - `q` / `Esc`      quit
//! - `r`              start/stop the simulation clock
//! - `1`-`4`          select an input port
//! - `Tab`            toggle the selected port's control overlay
//! - `+`/`-`          drive the selected overlay (or motor speed)
//! - `m`              cycle the selected sensor's mode
//! - `Space`          tap the selected touch sensor
//! - `t`              hold/release the selected touch sensor
//! - arrows / `Enter` tap the matching brick face button

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::types::{BrickButton, PortId};
use crate::view::ControlInput;

/// What one key press asks the front-end to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Toggle the simulation clock between Running and Stopped.
    ToggleRun,
    /// Make a numbered port the target of overlay controls.
    SelectPort(PortId),
    /// Open or close the selected port's control overlay.
    ToggleOverlay,
    /// Feed the selected overlay.
    Control(ControlInput),
    /// Press-and-release the selected touch sensor.
    TapTouch,
    /// Toggle a sustained hold on the selected touch sensor.
    HoldTouch,
    /// Press-and-release a brick face button.
    TapBrick(BrickButton),
}

/// Map a key event to an action. Repeats and releases are ignored.
pub fn route_key(event: KeyEvent) -> Option<Action> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    match event.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('r') => Some(Action::ToggleRun),

        KeyCode::Char(c @ '1'..='4') => {
            PortId::from_code(c as i8 - b'0' as i8).map(Action::SelectPort)
        }
        KeyCode::Tab => Some(Action::ToggleOverlay),

        KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::Control(ControlInput::Increase)),
        KeyCode::Char('-') => Some(Action::Control(ControlInput::Decrease)),
        KeyCode::Char('m') => Some(Action::Control(ControlInput::NextMode)),

        KeyCode::Char(' ') => Some(Action::TapTouch),
        KeyCode::Char('t') => Some(Action::HoldTouch),

        KeyCode::Up => Some(Action::TapBrick(BrickButton::Up)),
        KeyCode::Down => Some(Action::TapBrick(BrickButton::Down)),
        KeyCode::Left => Some(Action::TapBrick(BrickButton::Left)),
        KeyCode::Right => Some(Action::TapBrick(BrickButton::Right)),
        KeyCode::Enter => Some(Action::TapBrick(BrickButton::Enter)),

        _ => None,
    }
}
