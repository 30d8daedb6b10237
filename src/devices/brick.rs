//! Brick - Face buttons and status light
//!
//! The brick itself, addressed as port -1. Five face buttons each own a
//! gesture decoder, numerically the same event enum user programs use
//! for touch sensors. Physical presses staged between ticks feed the
//! decoders inside `update_state`, so brick button events dispatch on
//! the tick thread like every other device event.

use std::time::Duration;

use crate::error::DeviceError;
use crate::state::button::Button;
use crate::types::{BrickButton, BrickButtons, DeviceKind, PortId, StatusLight};

use super::{DeviceNode, snapshot_changed};

/// The simulated brick: buttons and status light.
///
/// The screen lives on the board, not here; the brick view draws both.
pub struct BrickNode {
    pressed: BrickButtons,
    buttons: [Button; BrickButton::COUNT],
    light: StatusLight,
    rendered: (BrickButtons, StatusLight),
}

impl BrickNode {
    pub fn new() -> Self {
        Self {
            pressed: BrickButtons::NONE,
            buttons: std::array::from_fn(|_| Button::new()),
            light: StatusLight::Off,
            rendered: (BrickButtons::NONE, StatusLight::Off),
        }
    }

    /// Stage a physical press or release. Decoded on the next tick.
    pub fn set_pressed(&mut self, button: BrickButton, on: bool) {
        self.pressed.set(button.flag(), on);
    }

    /// Set the status light pattern.
    pub fn set_light(&mut self, light: StatusLight) {
        self.light = light;
    }

    #[inline]
    pub fn light(&self) -> StatusLight {
        self.light
    }

    /// Decoded state of one button.
    #[inline]
    pub fn is_pressed(&self, button: BrickButton) -> bool {
        self.buttons[button.index()].is_pressed()
    }

    /// Latched since-last-check state of one button. Clears the latch.
    pub fn was_pressed(&mut self, button: BrickButton) -> bool {
        self.buttons[button.index()].was_pressed()
    }

    /// Decoded state of all buttons as a mask.
    pub fn pressed_mask(&self) -> BrickButtons {
        let mut mask = BrickButtons::NONE;
        for button in BrickButton::ALL {
            if self.is_pressed(button) {
                mask |= button.flag();
            }
        }
        mask
    }

    /// The decoder for one button, for event subscription.
    pub fn button(&self, button: BrickButton) -> &Button {
        &self.buttons[button.index()]
    }

    pub fn button_mut(&mut self, button: BrickButton) -> &mut Button {
        &mut self.buttons[button.index()]
    }
}

impl Default for BrickNode {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceNode for BrickNode {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Brick
    }

    fn port(&self) -> PortId {
        PortId::BRICK
    }

    fn update_state(&mut self, _elapsed: Duration) -> Result<(), DeviceError> {
        for button in BrickButton::ALL {
            let down = self.pressed.contains(button.flag());
            self.buttons[button.index()].update(down);
        }
        Ok(())
    }

    fn did_change(&mut self) -> bool {
        let current = (self.pressed_mask(), self.light);
        snapshot_changed(&mut self.rendered, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ButtonEvent;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tick(brick: &mut BrickNode) {
        brick.update_state(Duration::from_millis(32)).unwrap();
    }

    #[test]
    fn test_presses_decode_on_tick() {
        let mut brick = BrickNode::new();
        let bumps = Arc::new(AtomicUsize::new(0));
        let bumps_clone = bumps.clone();
        brick
            .button_mut(BrickButton::Enter)
            .on_event(ButtonEvent::Bumped, move || {
                bumps_clone.fetch_add(1, Ordering::SeqCst);
            });

        brick.set_pressed(BrickButton::Enter, true);
        assert!(!brick.is_pressed(BrickButton::Enter)); // Staged only

        tick(&mut brick);
        assert!(brick.is_pressed(BrickButton::Enter));

        brick.set_pressed(BrickButton::Enter, false);
        tick(&mut brick);
        assert_eq!(bumps.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_buttons_latch_independently() {
        let mut brick = BrickNode::new();

        brick.set_pressed(BrickButton::Up, true);
        tick(&mut brick);
        brick.set_pressed(BrickButton::Up, false);
        tick(&mut brick);

        assert!(brick.was_pressed(BrickButton::Up));
        assert!(!brick.was_pressed(BrickButton::Up));
        assert!(!brick.was_pressed(BrickButton::Down));
    }

    #[test]
    fn test_pressed_mask_combines_buttons() {
        let mut brick = BrickNode::new();
        brick.set_pressed(BrickButton::Left, true);
        brick.set_pressed(BrickButton::Right, true);
        tick(&mut brick);

        assert_eq!(
            brick.pressed_mask(),
            BrickButtons::LEFT | BrickButtons::RIGHT
        );
    }

    #[test]
    fn test_light_change_marks_dirty() {
        let mut brick = BrickNode::new();
        let _ = brick.did_change();

        brick.set_light(StatusLight::GreenPulse);
        assert!(brick.did_change());
        assert!(!brick.did_change());
        assert_eq!(brick.light(), StatusLight::GreenPulse);
    }

    #[test]
    fn test_held_button_changes_once() {
        let mut brick = BrickNode::new();
        let _ = brick.did_change();

        brick.set_pressed(BrickButton::Down, true);
        tick(&mut brick);
        assert!(brick.did_change());

        tick(&mut brick);
        assert!(!brick.did_change()); // Held, not a new edge
    }
}
