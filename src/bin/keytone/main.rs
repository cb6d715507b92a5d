//! keytone - play sine tones from the computer keyboard
//!
//! Run with: cargo run
//! Logging goes to stderr; set KEYTONE_LOG (e.g. `KEYTONE_LOG=debug`) and
//! redirect it (`2>keytone.log`) to keep it out of the terminal view.

mod app;
mod terminal;
mod ui;

use keytone::SynthConfig;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("KEYTONE_LOG", "warn")).init();

    app::run(SynthConfig::default())
}
