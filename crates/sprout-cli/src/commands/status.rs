use sprout_core::Config;

use super::open_engine;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let engine = open_engine(&config);
    println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
    Ok(())
}
