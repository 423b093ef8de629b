pub mod config;
pub mod mode;
pub mod run;
pub mod status;

use sprout_core::{Config, PomodoroEngine, Preferences};

/// Build an idle engine with the preference store the config asks for.
pub fn open_engine(config: &Config) -> PomodoroEngine {
    let prefs = if config.storage.persist_mode {
        Preferences::open_default()
    } else {
        Preferences::in_memory()
    };
    PomodoroEngine::new(prefs)
}
