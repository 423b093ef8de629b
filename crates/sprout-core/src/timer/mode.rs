use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Session type. Each mode has a fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// 25 minute focus block
    #[default]
    Focus,
    /// 5 minute break
    Short,
    /// 15 minute break, only ever chosen by hand
    Long,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Focus, Mode::Short, Mode::Long];

    /// Session length in seconds.
    pub fn duration_secs(&self) -> u64 {
        match self {
            Mode::Focus => 25 * 60,
            Mode::Short => 5 * 60,
            Mode::Long => 15 * 60,
        }
    }

    /// Mode entered automatically when a session of this mode expires.
    ///
    /// Focus hands over to a short break; every break returns to focus.
    pub fn next(&self) -> Mode {
        match self {
            Mode::Focus => Mode::Short,
            Mode::Short | Mode::Long => Mode::Focus,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Focus => "focus",
            Mode::Short => "short",
            Mode::Long => "long",
        }
    }

    /// Human readable label shown under the clock.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Focus => "Focus",
            Mode::Short => "Short break",
            Mode::Long => "Long break",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "focus" => Ok(Mode::Focus),
            "short" => Ok(Mode::Short),
            "long" => Ok(Mode::Long),
            _ => Err(CoreError::InvalidMode(s.to_string())),
        }
    }
}
