//! Frontend Module - Crossterm board renderer and input routing
//!
//! The terminal face of the simulator: draws the board from snapshots,
//! routes keys into board commands, and listens to host events through
//! a channel registered as the host's callback.
//!
//! Terminals only deliver key presses, so taps (brick buttons, touch
//! taps) are expressed as a press command followed by a release staged
//! one tick interval later. The release travels through the same queue
//! as every other command, so the decoder sees a real down-up cycle.

use std::io::{self, Write};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event};
use crossterm::{cursor, execute, terminal};

use crate::board::{BoardSnapshot, Command, StepReport};
use crate::error::HostError;
use crate::host::{HostEvent, SimHandle};
use crate::layout::{BoardLayout, PanelRect, compute_board_layout};
use crate::theme::BoardTheme;
use crate::types::{DeviceKind, PORT_COUNT, PortId, TICK_INTERVAL};
use crate::view::{ControlView, DisplayView, ViewCache};

mod input;
mod render;
mod views;

pub use input::{Action, route_key};
pub use views::{BrickPanel, ColorPanel, GyroPanel, MotorPanel, TouchPanel, UltrasonicPanel};

// =============================================================================
// PANEL
// =============================================================================

/// The one concrete view type the front-end caches.
pub enum Panel {
    Touch(TouchPanel),
    Color(ColorPanel),
    Ultrasonic(UltrasonicPanel),
    Gyro(GyroPanel),
    Motor(MotorPanel),
    Brick(BrickPanel),
}

impl Panel {
    /// Build the panel matching a device kind. None for unknown kinds.
    pub fn for_device(kind: DeviceKind, port: PortId) -> Option<Self> {
        match kind {
            DeviceKind::Touch => Some(Self::Touch(TouchPanel::new(port))),
            DeviceKind::Color => Some(Self::Color(ColorPanel::new(port))),
            DeviceKind::Ultrasonic => Some(Self::Ultrasonic(UltrasonicPanel::new(port))),
            DeviceKind::Gyro => Some(Self::Gyro(GyroPanel::new(port))),
            DeviceKind::MediumMotor | DeviceKind::LargeMotor => {
                Some(Self::Motor(MotorPanel::new(kind, port)))
            }
            DeviceKind::Brick => Some(Self::Brick(BrickPanel::new())),
        }
    }

    /// The cached text lines for rendering.
    pub fn lines(&self) -> &[String] {
        match self {
            Self::Touch(p) => p.lines(),
            Self::Color(p) => p.lines(),
            Self::Ultrasonic(p) => p.lines(),
            Self::Gyro(p) => p.lines(),
            Self::Motor(p) => p.lines(),
            Self::Brick(p) => p.lines(),
        }
    }

    /// The interactive control, for panels that have one.
    pub fn control(&mut self) -> Option<&mut dyn ControlView> {
        match self {
            Self::Color(p) => Some(p),
            Self::Ultrasonic(p) => Some(p),
            Self::Gyro(p) => Some(p),
            Self::Motor(p) => Some(p),
            Self::Touch(_) | Self::Brick(_) => None,
        }
    }
}

impl DisplayView for Panel {
    fn kind(&self) -> DeviceKind {
        match self {
            Self::Touch(p) => p.kind(),
            Self::Color(p) => p.kind(),
            Self::Ultrasonic(p) => p.kind(),
            Self::Gyro(p) => p.kind(),
            Self::Motor(p) => p.kind(),
            Self::Brick(p) => p.kind(),
        }
    }

    fn port(&self) -> PortId {
        match self {
            Self::Touch(p) => p.port(),
            Self::Color(p) => p.port(),
            Self::Ultrasonic(p) => p.port(),
            Self::Gyro(p) => p.port(),
            Self::Motor(p) => p.port(),
            Self::Brick(p) => p.port(),
        }
    }

    fn update_state(&mut self, board: &BoardSnapshot) {
        match self {
            Self::Touch(p) => p.update_state(board),
            Self::Color(p) => p.update_state(board),
            Self::Ultrasonic(p) => p.update_state(board),
            Self::Gyro(p) => p.update_state(board),
            Self::Motor(p) => p.update_state(board),
            Self::Brick(p) => p.update_state(board),
        }
    }

    fn did_change(&mut self) -> bool {
        match self {
            Self::Touch(p) => p.did_change(),
            Self::Color(p) => p.did_change(),
            Self::Ultrasonic(p) => p.did_change(),
            Self::Gyro(p) => p.did_change(),
            Self::Motor(p) => p.did_change(),
            Self::Brick(p) => p.did_change(),
        }
    }

    fn selected(&self) -> bool {
        match self {
            Self::Color(p) => p.selected(),
            Self::Ultrasonic(p) => p.selected(),
            Self::Gyro(p) => p.selected(),
            _ => false,
        }
    }

    fn set_selected(&mut self, on: bool) {
        match self {
            Self::Color(p) => p.set_selected(on),
            Self::Ultrasonic(p) => p.set_selected(on),
            Self::Gyro(p) => p.set_selected(on),
            _ => {}
        }
    }
}

// =============================================================================
// FRONTEND
// =============================================================================

/// How long the blink phase of an animated status light lasts.
const BLINK_INTERVAL: Duration = Duration::from_millis(400);

/// The terminal front-end loop state.
pub struct Frontend {
    handle: SimHandle,
    events: Receiver<HostEvent>,
    theme: BoardTheme,
    cache: ViewCache<Panel>,
    layout: BoardLayout,
    selected: PortId,
    running: bool,
    touch_held: [bool; PORT_COUNT],
    /// Releases staged for taps, flushed when their instant passes.
    deferred: Vec<(Instant, Command)>,
    blink_on: bool,
    last_blink: Instant,
    redraw_all: bool,
}

impl Frontend {
    /// Build a front-end over a host handle and its event channel.
    ///
    /// `events` must be the receiving end of the callback registered at
    /// [`crate::host::SimHost::spawn`].
    pub fn new(handle: SimHandle, events: Receiver<HostEvent>, theme: BoardTheme) -> Self {
        Self {
            handle,
            events,
            theme,
            cache: ViewCache::new(),
            layout: BoardLayout::default(),
            selected: PortId::ONE,
            running: false,
            touch_held: [false; PORT_COUNT],
            deferred: Vec::new(),
            blink_on: true,
            last_blink: Instant::now(),
            redraw_all: true,
        }
    }

    /// Run until the user quits. Assumes raw mode is already on.
    pub fn run<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let (width, height) = terminal::size()?;
        self.relayout(width, height);

        loop {
            if event::poll(Duration::from_millis(33))? {
                match event::read()? {
                    Event::Key(key) => {
                        if let Some(action) = route_key(key) {
                            if action == Action::Quit {
                                return Ok(());
                            }
                            if let Err(HostError::HostGone) = self.apply(action) {
                                return Ok(());
                            }
                        }
                    }
                    Event::Resize(w, h) => self.relayout(w, h),
                    _ => {}
                }
            }

            self.flush_deferred();
            if self.drain_host_events(out)?.is_none() {
                return Ok(());
            }
            self.tick_blink(out)?;
            out.flush()?;
        }
    }

    fn relayout(&mut self, width: u16, height: u16) {
        if let Ok(layout) = compute_board_layout(width, height) {
            self.layout = layout;
            self.redraw_all = true;
        }
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    fn apply(&mut self, action: Action) -> Result<(), HostError> {
        match action {
            Action::Quit => Ok(()),
            Action::ToggleRun => {
                if self.running {
                    self.handle.kill()
                } else {
                    self.handle.start()
                }
            }
            Action::SelectPort(port) => {
                self.selected = port;
                self.redraw_all = true;
                Ok(())
            }
            Action::ToggleOverlay => {
                let port = self.selected;
                let on = !self
                    .selected_panel()
                    .map(|panel| panel.selected())
                    .unwrap_or(false);
                self.redraw_all = true;
                self.handle.send(Command::SetSelected { port, on })
            }
            Action::Control(input) => {
                let command = self
                    .selected_panel()
                    .and_then(|panel| panel.control())
                    .and_then(|control| control.handle(input));
                match command {
                    Some(command) => self.handle.send(command),
                    None => Ok(()),
                }
            }
            Action::TapTouch => {
                let port = self.selected;
                self.handle.press_touch(port)?;
                self.defer(Command::ReleaseTouch { port });
                Ok(())
            }
            Action::HoldTouch => {
                let Some(idx) = self.selected.index() else {
                    return Ok(());
                };
                self.touch_held[idx] = !self.touch_held[idx];
                if self.touch_held[idx] {
                    self.handle.press_touch(self.selected)
                } else {
                    self.handle.release_touch(self.selected)
                }
            }
            Action::TapBrick(button) => {
                self.handle.set_brick_button(button, true)?;
                self.defer(Command::SetBrickButton {
                    button,
                    pressed: false,
                });
                Ok(())
            }
        }
    }

    /// The panel for whatever device sits on the selected port.
    fn selected_panel(&mut self) -> Option<&mut Panel> {
        let port = self.selected;
        for kind in DeviceKind::ALL {
            if self.cache.get(kind, port).is_some() {
                return self.cache.get_mut(kind, port);
            }
        }
        None
    }

    /// Stage a command two tick intervals out, enough for the press to
    /// decode before the release lands.
    fn defer(&mut self, command: Command) {
        self.deferred
            .push((Instant::now() + TICK_INTERVAL * 2, command));
    }

    fn flush_deferred(&mut self) {
        let now = Instant::now();
        let mut i = 0;
        while i < self.deferred.len() {
            if self.deferred[i].0 <= now {
                let (_, command) = self.deferred.swap_remove(i);
                let _ = self.handle.send(command);
            } else {
                i += 1;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Host events and drawing
    // -------------------------------------------------------------------------

    /// Drain queued host events. None means the host is gone.
    fn drain_host_events<W: Write>(&mut self, out: &mut W) -> io::Result<Option<()>> {
        loop {
            match self.events.try_recv() {
                Ok(HostEvent::Started) => {
                    self.running = true;
                    self.redraw_all = true;
                }
                Ok(HostEvent::Stopped) => {
                    self.running = false;
                    self.redraw_all = true;
                }
                Ok(HostEvent::Stepped {
                    changed,
                    screen_changed,
                }) => {
                    let report = StepReport {
                        changed,
                        screen_changed,
                        errors: Vec::new(),
                    };
                    match self.handle.snapshot() {
                        Ok(snapshot) => self.draw_step(out, &report, &snapshot)?,
                        Err(HostError::HostGone) => return Ok(None),
                        Err(err) => log::warn!("snapshot failed: {err}"),
                    }
                }
                Ok(HostEvent::DeviceFault(err)) => log::warn!("device fault: {err}"),
                Ok(HostEvent::CommandRejected(err)) => log::warn!("command rejected: {err}"),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(None),
            }
        }
        if self.redraw_all {
            if let Ok(snapshot) = self.handle.snapshot() {
                self.draw_full(out, &snapshot)?;
            }
            self.redraw_all = false;
        }
        Ok(Some(()))
    }

    /// Make sure every attached device has a cached panel.
    fn sync_views(&mut self, snapshot: &BoardSnapshot) {
        for slot in snapshot.inputs.iter().flatten() {
            let (kind, port) = (slot.kind, slot.port);
            self.cache.get_or_create(kind, port, || {
                Box::new(Panel::for_device(kind, port).unwrap_or(Panel::Brick(BrickPanel::new())))
            });
        }
        for slot in snapshot.motors.iter().flatten() {
            let (kind, port) = (slot.kind, slot.port);
            self.cache.get_or_create(kind, port, || {
                Box::new(Panel::for_device(kind, port).unwrap_or(Panel::Brick(BrickPanel::new())))
            });
        }
        self.cache.get_or_create(DeviceKind::Brick, PortId::BRICK, || {
            Box::new(Panel::Brick(BrickPanel::new()))
        });
    }

    /// Redraw only what one tick changed.
    fn draw_step<W: Write>(
        &mut self,
        out: &mut W,
        report: &StepReport,
        snapshot: &BoardSnapshot,
    ) -> io::Result<()> {
        self.sync_views(snapshot);
        let dirty = self.cache.propagate(report, snapshot);
        for (kind, port) in dirty {
            self.draw_device(out, kind, port)?;
        }
        if report.screen_changed {
            render::draw_screen(out, self.layout.screen, &snapshot.screen, &self.theme)?;
        }
        Ok(())
    }

    /// Redraw the whole board (resize, selection change, start/stop).
    fn draw_full<W: Write>(&mut self, out: &mut W, snapshot: &BoardSnapshot) -> io::Result<()> {
        execute!(out, terminal::Clear(terminal::ClearType::All))?;
        self.sync_views(snapshot);

        // Refresh every cached view, then draw them all.
        let mut devices = Vec::new();
        for kind in DeviceKind::ALL {
            for port in PortId::NUMBERED.into_iter().chain([PortId::BRICK]) {
                if let Some(view) = self.cache.get_mut(kind, port) {
                    view.update_state(snapshot);
                    let _ = view.did_change();
                    devices.push((kind, port));
                }
            }
        }
        for (kind, port) in devices {
            self.draw_device(out, kind, port)?;
        }
        render::draw_screen(out, self.layout.screen, &snapshot.screen, &self.theme)?;
        render::draw_status(out, self.layout.status, self.running, &self.theme)?;
        Ok(())
    }

    fn draw_device(&mut self, out: &mut impl Write, kind: DeviceKind, port: PortId) -> io::Result<()> {
        let highlight = port == self.selected && !port.is_brick();
        let rect = self.device_rect(kind, port);
        let theme = self.theme.clone();
        let blink_on = self.blink_on;
        let Some(panel) = self.cache.get_mut(kind, port) else {
            return Ok(());
        };

        if let Panel::Brick(brick) = panel {
            render::draw_buttons(out, rect, |b| brick.button_held(b), &theme)?;
            return render::draw_light(out, self.layout.light, brick.light(), blink_on, &theme);
        }

        let selected = highlight || panel.selected();
        let lines: Vec<String> = panel.lines().to_vec();
        render::draw_panel(out, rect, &lines, selected, &theme)
    }

    fn device_rect(&self, kind: DeviceKind, port: PortId) -> PanelRect {
        match port.index() {
            Some(idx) if kind.is_motor() => self.layout.motors[idx],
            Some(idx) => self.layout.inputs[idx],
            None => self.layout.buttons,
        }
    }

    /// Advance the status-light blink phase.
    fn tick_blink<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if self.last_blink.elapsed() < BLINK_INTERVAL {
            return Ok(());
        }
        self.blink_on = !self.blink_on;
        self.last_blink = Instant::now();

        let theme = self.theme.clone();
        let blink_on = self.blink_on;
        let light_rect = self.layout.light;
        if let Some(Panel::Brick(brick)) = self.cache.get_mut(DeviceKind::Brick, PortId::BRICK) {
            if brick.light().is_animated() {
                render::draw_light(out, light_rect, brick.light(), blink_on, &theme)?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// TERMINAL GUARD
// =============================================================================

/// Raw-mode guard: restores the terminal on drop, panics included.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(
            io::stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide
        )?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_for_device_covers_all_kinds() {
        for kind in DeviceKind::ALL {
            let port = if kind == DeviceKind::Brick {
                PortId::BRICK
            } else {
                PortId::ONE
            };
            let panel = Panel::for_device(kind, port).unwrap();
            assert_eq!(panel.kind(), kind);
            assert_eq!(panel.port(), port);
        }
    }

    #[test]
    fn test_only_selectable_panels_expose_controls() {
        assert!(Panel::for_device(DeviceKind::Touch, PortId::ONE)
            .unwrap()
            .control()
            .is_none());
        assert!(Panel::for_device(DeviceKind::Color, PortId::ONE)
            .unwrap()
            .control()
            .is_some());
        assert!(Panel::for_device(DeviceKind::LargeMotor, PortId::ONE)
            .unwrap()
            .control()
            .is_some());
        assert!(Panel::for_device(DeviceKind::Brick, PortId::BRICK)
            .unwrap()
            .control()
            .is_none());
    }
}
