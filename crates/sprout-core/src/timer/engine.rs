//! Pomodoro engine implementation.
//!
//! The engine is a plain state machine over `(mode, running, seconds_left)`.
//! It does not own a clock or a thread: the caller is responsible for calling
//! `tick()` once per elapsed second while the engine is running (see
//! [`TimerDriver`](super::TimerDriver) for the async tick source).
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --pause--> Idle (same seconds_left)
//! Running --tick(seconds_left == 1)--> Expired --auto mode switch--> Idle(next mode)
//! any --reset--> Idle(total)
//! any --set_mode--> seconds_left = total(new mode), running unchanged
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = PomodoroEngine::new(Preferences::open_default());
//! engine.start();
//! // Once per second:
//! engine.tick(); // Returns Some(Event::SessionCompleted) on expiry
//! ```

use chrono::Utc;

use super::mode::Mode;
use crate::events::{Event, Snapshot};
use crate::storage::Preferences;

/// Preference key holding the last selected mode.
pub const MODE_KEY: &str = "sprout:mode";

/// Countdown/mode state machine.
///
/// Invariants: `seconds_left <= mode.duration_secs()`, and `running` is
/// never true while `seconds_left == 0`.
#[derive(Debug)]
pub struct PomodoroEngine {
    mode: Mode,
    running: bool,
    seconds_left: u64,
    prefs: Preferences,
}

impl PomodoroEngine {
    /// Create an idle engine, restoring the last mode from `prefs`.
    ///
    /// Falls back to focus when nothing usable is stored.
    pub fn new(prefs: Preferences) -> Self {
        let mode = prefs.load(MODE_KEY, Mode::Focus);
        tracing::debug!(%mode, backend = prefs.backend_name(), "engine initialized");
        Self {
            mode,
            running: false,
            seconds_left: mode.duration_secs(),
            prefs,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn seconds_left(&self) -> u64 {
        self.seconds_left
    }

    pub fn total_secs(&self) -> u64 {
        self.mode.duration_secs()
    }

    /// 0.0 .. 1.0 progress within the current session.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.seconds_left as f64 / total as f64)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.mode,
            running: self.running,
            seconds_left: self.seconds_left,
            total_secs: self.total_secs(),
            progress: self.progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Switch to `mode` and restart its countdown.
    ///
    /// `running` is left as it was: switching mode while running keeps the
    /// countdown going from the new total.
    pub fn set_mode(&mut self, mode: Mode) -> Option<Event> {
        let from = self.mode;
        self.apply_mode(mode);
        Some(Event::ModeChanged {
            from,
            to: mode,
            seconds_left: self.seconds_left,
            at: Utc::now(),
        })
    }

    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        Some(Event::TimerStarted {
            mode: self.mode,
            seconds_left: self.seconds_left,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        Some(Event::TimerPaused {
            mode: self.mode,
            seconds_left: self.seconds_left,
            at: Utc::now(),
        })
    }

    /// Stop and refill the countdown for the current mode.
    pub fn reset(&mut self) -> Option<Event> {
        self.running = false;
        self.seconds_left = self.total_secs();
        Some(Event::TimerReset {
            mode: self.mode,
            seconds_left: self.seconds_left,
            at: Utc::now(),
        })
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `Some(Event::SessionCompleted)` when the countdown expires;
    /// by then the engine is already idle in the next mode.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }

        if self.seconds_left > 1 {
            self.seconds_left -= 1;
            return None;
        }

        let finished = self.mode;
        self.seconds_left = 0;
        self.running = false;
        let next = finished.next();
        tracing::debug!(mode = %finished, next = %next, "session completed");
        self.apply_mode(next);

        Some(Event::SessionCompleted {
            mode: finished,
            next_mode: next,
            seconds_left: 0,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Mode-change reaction shared by explicit selection and expiry.
    fn apply_mode(&mut self, mode: Mode) {
        if mode != self.mode {
            tracing::debug!(from = %self.mode, to = %mode, "mode changed");
        }
        self.mode = mode;
        self.seconds_left = mode.duration_secs();
        self.prefs.save(MODE_KEY, &mode);
    }
}
