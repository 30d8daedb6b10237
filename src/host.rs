//! Host Module - The simulation thread and its handle
//!
//! One dedicated thread owns the board and the clock. Everything else
//! talks to it through a cloneable [`SimHandle`]: commands go in through
//! a channel, observable state comes back as snapshots, and blocking
//! waits park the calling thread on a gate the tick loop opens.
//!
//! The thread sleeps until the next scheduled wakeup or the next queued
//! message, whichever comes first. Queued commands apply between ticks,
//! so device mutation never races a step.
//!
//! Lifecycle and per-device errors surface through the event callback
//! registered at spawn; the host never owns a logger or a renderer.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::board::{Board, BoardSnapshot, Command};
use crate::clock::{SimClock, Tick, TickTask};
use crate::error::{BoardError, DeviceError, HostError};
use crate::state::button::EventWaiter;
use crate::types::{BrickButton, ButtonEvent, DeviceKind, PortId, StatusLight};

// =============================================================================
// EVENTS
// =============================================================================

/// What the host reports to its registered callback.
#[derive(Debug)]
pub enum HostEvent {
    /// The clock entered Running.
    Started,
    /// The clock entered Stopped.
    Stopped,
    /// One tick advanced the board; the named devices changed.
    Stepped {
        changed: Vec<(DeviceKind, PortId)>,
        screen_changed: bool,
    },
    /// A device failed to step. The frame still ran.
    DeviceFault(DeviceError),
    /// A queued command could not apply.
    CommandRejected(BoardError),
}

/// Which button a blocking wait listens on.
#[derive(Debug, Clone, Copy)]
pub enum WaitTarget {
    /// The touch sensor on an input port.
    Touch(PortId),
    /// One of the brick's face buttons.
    Brick(BrickButton),
}

enum HostMessage {
    Command(Command),
    Start,
    Kill,
    Wait {
        target: WaitTarget,
        event: ButtonEvent,
        reply: Sender<Result<EventWaiter, HostError>>,
    },
    Snapshot {
        reply: Sender<BoardSnapshot>,
    },
    Shutdown,
}

/// Callback the host reports events through.
pub type EventSink = Box<dyn Fn(HostEvent) + Send>;

// =============================================================================
// HANDLE
// =============================================================================

/// Cloneable handle to the simulation thread.
///
/// Every method that talks to the thread returns [`HostError::HostGone`]
/// once the thread has shut down.
#[derive(Clone)]
pub struct SimHandle {
    tx: Sender<HostMessage>,
}

impl SimHandle {
    /// Queue a raw board command.
    pub fn send(&self, command: Command) -> Result<(), HostError> {
        self.tx
            .send(HostMessage::Command(command))
            .map_err(|_| HostError::HostGone)
    }

    /// Signal "program started": start the tick stream.
    pub fn start(&self) -> Result<(), HostError> {
        self.tx.send(HostMessage::Start).map_err(|_| HostError::HostGone)
    }

    /// Signal "program killed": cancel the tick stream. Idempotent.
    pub fn kill(&self) -> Result<(), HostError> {
        self.tx.send(HostMessage::Kill).map_err(|_| HostError::HostGone)
    }

    /// Copy the board's observable state.
    pub fn snapshot(&self) -> Result<BoardSnapshot, HostError> {
        let (reply, rx) = mpsc::channel();
        self.tx
            .send(HostMessage::Snapshot { reply })
            .map_err(|_| HostError::HostGone)?;
        rx.recv().map_err(|_| HostError::HostGone)
    }

    /// Block the calling thread until a button event next fires.
    ///
    /// No timeout exists by contract: waiting on an event nobody
    /// triggers blocks forever, like waiting on a physical button.
    /// Never call this from the host's own event callback.
    pub fn wait_until(&self, target: WaitTarget, event: ButtonEvent) -> Result<(), HostError> {
        let (reply, rx) = mpsc::channel();
        self.tx
            .send(HostMessage::Wait { target, event, reply })
            .map_err(|_| HostError::HostGone)?;
        let waiter = rx.recv().map_err(|_| HostError::HostGone)??;
        waiter.wait();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Typed conveniences over send()
    // -------------------------------------------------------------------------

    pub fn attach_sensor(&self, kind: DeviceKind, port: PortId) -> Result<(), HostError> {
        self.send(Command::AttachSensor { kind, port })
    }

    pub fn attach_motor(&self, kind: DeviceKind, port: PortId) -> Result<(), HostError> {
        self.send(Command::AttachMotor { kind, port })
    }

    pub fn press_touch(&self, port: PortId) -> Result<(), HostError> {
        self.send(Command::PressTouch { port })
    }

    pub fn release_touch(&self, port: PortId) -> Result<(), HostError> {
        self.send(Command::ReleaseTouch { port })
    }

    pub fn set_distance(&self, port: PortId, cm: i32) -> Result<(), HostError> {
        self.send(Command::SetDistance { port, cm })
    }

    pub fn set_gyro_rate(&self, port: PortId, dps: i32) -> Result<(), HostError> {
        self.send(Command::SetGyroRate { port, dps })
    }

    pub fn set_motor_speed(&self, port: PortId, percent: i32) -> Result<(), HostError> {
        self.send(Command::SetMotorSpeed { port, percent })
    }

    pub fn set_brick_button(&self, button: BrickButton, pressed: bool) -> Result<(), HostError> {
        self.send(Command::SetBrickButton { button, pressed })
    }

    pub fn set_status_light(&self, light: StatusLight) -> Result<(), HostError> {
        self.send(Command::SetStatusLight { light })
    }

    pub fn write_screen(&self, frame: Vec<u8>) -> Result<(), HostError> {
        self.send(Command::WriteScreen { frame })
    }
}

// =============================================================================
// HOST
// =============================================================================

/// Owns the simulation thread. Dropping it joins the thread.
pub struct SimHost {
    handle: Option<JoinHandle<()>>,
    tx: Sender<HostMessage>,
    running: Arc<AtomicBool>,
}

impl SimHost {
    /// Spawn the simulation thread with an event callback.
    ///
    /// The callback runs on the simulation thread; keep it short and
    /// never block in it (forward into a channel if the consumer is
    /// slow).
    pub fn spawn<F>(on_event: F) -> io::Result<(Self, SimHandle)>
    where
        F: Fn(HostEvent) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = thread::Builder::new()
            .name("brick-sim".to_string())
            .spawn(move || {
                sim_loop(rx, Box::new(on_event), running_clone);
            })?;

        let host = Self {
            handle: Some(handle),
            tx: tx.clone(),
            running,
        };
        Ok((host, SimHandle { tx }))
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Shut the thread down and join it. Idempotent.
    pub fn stop(&mut self) {
        let _ = self.tx.send(HostMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SimHost {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// THREAD BODY
// =============================================================================

/// How long the thread sleeps between queue checks while the clock is
/// stopped.
const IDLE_WAIT: Duration = Duration::from_millis(50);

fn sim_loop(rx: Receiver<HostMessage>, on_event: EventSink, running: Arc<AtomicBool>) {
    let mut board = Board::new();
    let mut clock = SimClock::new();
    let mut task: Option<TickTask> = None;

    log::debug!("simulation thread up");

    loop {
        let timeout = match &task {
            Some(task) => task.due.saturating_duration_since(Instant::now()),
            None => IDLE_WAIT,
        };

        match rx.recv_timeout(timeout) {
            Ok(HostMessage::Command(command)) => {
                if let Err(err) = board.apply(command) {
                    log::warn!("command rejected: {err}");
                    on_event(HostEvent::CommandRejected(err));
                }
            }
            Ok(HostMessage::Start) => {
                task = Some(clock.start(Instant::now()));
                on_event(HostEvent::Started);
            }
            Ok(HostMessage::Kill) => {
                clock.stop();
                task = None;
                on_event(HostEvent::Stopped);
            }
            Ok(HostMessage::Wait { target, event, reply }) => {
                let _ = reply.send(register_waiter(&mut board, target, event));
            }
            Ok(HostMessage::Snapshot { reply }) => {
                let _ = reply.send(board.snapshot());
            }
            Ok(HostMessage::Shutdown) => break,
            Err(RecvTimeoutError::Timeout) => {
                if let Some(current) = task.take() {
                    task = run_tick(&mut board, &mut clock, current, &on_event);
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    running.store(false, Ordering::SeqCst);
    log::debug!("simulation thread down");
}

/// Judge one wakeup and step the board if the clock says so.
fn run_tick(
    board: &mut Board,
    clock: &mut SimClock,
    task: TickTask,
    on_event: &EventSink,
) -> Option<TickTask> {
    match clock.on_tick(&task, Instant::now()) {
        Tick::Stale => None,
        Tick::Skip { next } => Some(next),
        Tick::Step { elapsed, next } => {
            let report = board.step(elapsed);
            for err in report.errors {
                on_event(HostEvent::DeviceFault(err));
            }
            if !report.changed.is_empty() || report.screen_changed {
                on_event(HostEvent::Stepped {
                    changed: report.changed,
                    screen_changed: report.screen_changed,
                });
            }
            Some(next)
        }
    }
}

fn register_waiter(
    board: &mut Board,
    target: WaitTarget,
    event: ButtonEvent,
) -> Result<EventWaiter, HostError> {
    match target {
        WaitTarget::Touch(port) => {
            let touch = board
                .input_mut(port)
                .and_then(|node| node.as_touch_mut())
                .ok_or(HostError::NoButton { port })?;
            Ok(touch.button_mut().waiter(event))
        }
        WaitTarget::Brick(button) => Ok(board.brick_mut().button_mut(button).waiter(event)),
    }
}

// =============================================================================
// TESTS
// =============================================================================
