use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Mode;

/// Every state change in the engine produces an Event.
/// The terminal front end renders from snapshots and reacts to events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ModeChanged {
        from: Mode,
        to: Mode,
        seconds_left: u64,
        at: DateTime<Utc>,
    },
    TimerStarted {
        mode: Mode,
        seconds_left: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: Mode,
        seconds_left: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: Mode,
        seconds_left: u64,
        at: DateTime<Utc>,
    },
    /// Countdown hit zero. `seconds_left` is always 0 here; the engine has
    /// already moved on to `next_mode` with a full countdown.
    SessionCompleted {
        mode: Mode,
        next_mode: Mode,
        seconds_left: u64,
        at: DateTime<Utc>,
    },
}

/// Read model consumed by presentation code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub mode: Mode,
    pub running: bool,
    pub seconds_left: u64,
    pub total_secs: u64,
    /// 0.0 .. 1.0 progress within the current session.
    pub progress: f64,
    pub at: DateTime<Utc>,
}

impl Snapshot {
    /// Compare everything except the timestamp.
    pub fn same_state(&self, other: &Snapshot) -> bool {
        self.mode == other.mode
            && self.running == other.running
            && self.seconds_left == other.seconds_left
    }
}
