mod driver;
mod engine;
mod mode;

pub use driver::{Command, TimerDriver, TimerHandle};
pub use engine::{PomodoroEngine, MODE_KEY};
pub use mode::Mode;
