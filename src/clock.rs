//! Clock Module - Tick scheduling for the simulation loop
//!
//! The simulation advances at a nominal 32 Hz. The clock does not own a
//! thread or a timer; the host schedules wakeups and reports each one
//! back here, and the clock decides what the wakeup means.
//!
//! Two rules shape that decision:
//!
//! - Frames are skipped, never accumulated. A wakeup is measured against
//!   the previous wakeup; only a gap longer than one tick interval
//!   advances the devices, and the gap itself is the elapsed time they
//!   advance by. Wakeups that arrive early update the reference point
//!   and do nothing else.
//! - Every stop or restart bumps an epoch. A wakeup scheduled before the
//!   bump reports as stale and must be dropped, so a stop/start cycle
//!   can never leave two tick streams running.
//!
//! # Example
//!
//! ```ignore
//! let mut clock = SimClock::new();
//! let mut task = clock.start(Instant::now());
//! loop {
//!     sleep_until(task.due);
//!     match clock.on_tick(&task, Instant::now()) {
//!         Tick::Stale => break,
//!         Tick::Skip { next } => task = next,
//!         Tick::Step { elapsed, next } => {
//!             board.step(elapsed);
//!             task = next;
//!         }
//!     }
//! }
//! ```

use std::time::{Duration, Instant};

use crate::types::TICK_INTERVAL;

// =============================================================================
// TYPES
// =============================================================================

/// One scheduled wakeup. Valid only for the epoch that issued it.
#[derive(Debug, Clone, Copy)]
pub struct TickTask {
    epoch: u64,
    /// When the host should call back.
    pub due: Instant,
}

/// What a wakeup means.
#[derive(Debug, Clone, Copy)]
pub enum Tick {
    /// The task belongs to a stopped or superseded run. Drop it.
    Stale,
    /// Not enough wall time has passed. Reschedule, advance nothing.
    Skip { next: TickTask },
    /// Advance the devices by `elapsed`, then reschedule.
    Step { elapsed: Duration, next: TickTask },
}

// =============================================================================
// CLOCK
// =============================================================================

/// Frame-skip tick scheduler.
pub struct SimClock {
    running: bool,
    epoch: u64,
    last_seen: Option<Instant>,
    interval: Duration,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            running: false,
            epoch: 0,
            last_seen: None,
            interval: TICK_INTERVAL,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Begin a run. Supersedes any outstanding tasks and schedules the
    /// first wakeup one interval out.
    pub fn start(&mut self, now: Instant) -> TickTask {
        self.epoch += 1;
        self.running = true;
        self.last_seen = Some(now);
        log::debug!("clock start, epoch {}", self.epoch);
        TickTask {
            epoch: self.epoch,
            due: now + self.interval,
        }
    }

    /// End the run. Idempotent; outstanding tasks turn stale.
    pub fn stop(&mut self) {
        if self.running {
            log::debug!("clock stop, epoch {}", self.epoch);
        }
        self.epoch += 1;
        self.running = false;
        self.last_seen = None;
    }

    /// Judge one wakeup.
    ///
    /// The reference point moves on every live wakeup, stepped or
    /// skipped, so the next gap is always measured from the most recent
    /// callback rather than from the most recent step.
    pub fn on_tick(&mut self, task: &TickTask, now: Instant) -> Tick {
        if !self.running || task.epoch != self.epoch {
            return Tick::Stale;
        }
        let Some(last) = self.last_seen else {
            return Tick::Stale;
        };

        let elapsed = now.saturating_duration_since(last);
        self.last_seen = Some(now);
        let next = TickTask {
            epoch: self.epoch,
            due: now + self.interval,
        };

        if elapsed > self.interval {
            Tick::Step { elapsed, next }
        } else {
            Tick::Skip { next }
        }
    }
}

impl Default for SimClock {
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

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_first_wakeup_is_one_interval_out() {
        let mut clock = SimClock::new();
        let t0 = Instant::now();
        let task = clock.start(t0);
        assert_eq!(task.due, t0 + TICK_INTERVAL);
        assert!(clock.is_running());
    }

    #[test]
    fn test_early_wakeups_never_step() {
        let mut clock = SimClock::new();
        let t0 = Instant::now();
        let mut task = clock.start(t0);

        // Gaps of 10, 10, 10 and 5 ms, all inside one interval.
        let mut now = t0;
        for gap in [10u64, 10, 10, 5] {
            now += ms(gap);
            match clock.on_tick(&task, now) {
                Tick::Skip { next } => task = next,
                other => panic!("expected skip, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_late_wakeup_steps_by_real_elapsed() {
        let mut clock = SimClock::new();
        let t0 = Instant::now();
        let task = clock.start(t0);

        match clock.on_tick(&task, t0 + ms(40)) {
            Tick::Step { elapsed, .. } => assert_eq!(elapsed, ms(40)),
            other => panic!("expected step, got {other:?}"),
        }
    }

    #[test]
    fn test_skip_moves_the_reference_point() {
        let mut clock = SimClock::new();
        let t0 = Instant::now();
        let task = clock.start(t0);

        let Tick::Skip { next } = clock.on_tick(&task, t0 + ms(10)) else {
            panic!("expected skip");
        };

        // 50 ms since start, but only 40 ms since the last wakeup.
        match clock.on_tick(&next, t0 + ms(50)) {
            Tick::Step { elapsed, .. } => assert_eq!(elapsed, ms(40)),
            other => panic!("expected step, got {other:?}"),
        }
    }

    #[test]
    fn test_steps_measure_between_wakeups() {
        let mut clock = SimClock::new();
        let t0 = Instant::now();
        let task = clock.start(t0);

        let Tick::Step { elapsed, next } = clock.on_tick(&task, t0 + ms(40)) else {
            panic!("expected step");
        };
        assert_eq!(elapsed, ms(40));

        let Tick::Step { elapsed, .. } = clock.on_tick(&next, t0 + ms(80)) else {
            panic!("expected step");
        };
        assert_eq!(elapsed, ms(40));
    }

    #[test]
    fn test_stop_turns_outstanding_tasks_stale() {
        let mut clock = SimClock::new();
        let t0 = Instant::now();
        let task = clock.start(t0);

        clock.stop();
        assert!(!clock.is_running());
        assert!(matches!(clock.on_tick(&task, t0 + ms(40)), Tick::Stale));
    }

    #[test]
    fn test_restart_keeps_exactly_one_stream() {
        let mut clock = SimClock::new();
        let t0 = Instant::now();
        let old = clock.start(t0);

        clock.stop();
        let new = clock.start(t0 + ms(5));

        // The superseded task stays dead even though the clock runs.
        assert!(matches!(clock.on_tick(&old, t0 + ms(40)), Tick::Stale));
        assert!(matches!(
            clock.on_tick(&new, t0 + ms(45)),
            Tick::Step { .. }
        ));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut clock = SimClock::new();
        clock.stop();
        clock.stop();
        assert!(!clock.is_running());

        let task = clock.start(Instant::now());
        assert!(matches!(
            clock.on_tick(&task, task.due + ms(10)),
            Tick::Step { .. }
        ));
    }
}
