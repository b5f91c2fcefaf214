//! keytone - play the computer keyboard like a piano
//!
//! Run with: cargo run
//!
//! Environment:
//!   KEYTONE_WAVE  starting wave shape (sine, square, sawtooth, triangle)
//!   KEYTONE_LOG   write tracing output to this file

mod app;
mod ui;

use std::{fs::File, sync::Mutex};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing::Level;

use app::KeyTone;
use keytone::{dsp::WaveShape, EngineConfig};

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    init_logging()?;

    let mut config = EngineConfig::default();
    if let Ok(name) = std::env::var("KEYTONE_WAVE") {
        let shape: WaveShape = name.parse()?;
        config = config.wave_shape(shape);
    }

    KeyTone::new(config).run()
}

/// The terminal belongs to the UI, so logs only go to a file when asked for.
fn init_logging() -> EyreResult<()> {
    let Some(path) = std::env::var_os("KEYTONE_LOG") else {
        return Ok(());
    };
    let file = File::create(&path)
        .wrap_err_with(|| format!("failed to create log file {}", path.to_string_lossy()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(Level::DEBUG)
        .init();
    Ok(())
}
