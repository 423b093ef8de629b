use clap::Subcommand;
use sprout_core::{Config, Mode};

use super::open_engine;

#[derive(Subcommand)]
pub enum ModeAction {
    /// Print the selected mode
    Show,
    /// Select a mode (focus, short, long)
    Set {
        /// Mode name
        mode: Mode,
    },
}

pub fn run(action: ModeAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut engine = open_engine(&config);

    match action {
        ModeAction::Show => {
            println!("{}", engine.mode());
        }
        ModeAction::Set { mode } => {
            if !config.storage.persist_mode {
                tracing::warn!("storage.persist_mode is off; the mode will not be kept");
            }
            if let Some(event) = engine.set_mode(mode) {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
        }
    }
    Ok(())
}
