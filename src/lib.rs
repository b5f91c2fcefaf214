pub mod config; // Startup configuration
pub mod dsp;
pub mod engine; // cpal output stream
pub mod error;
pub mod io; // Key input and analysis tap
pub mod synth; // Voice lifecycle, polyphony and mixing

pub use config::EngineConfig;
pub use engine::AudioEngine;
pub use error::{ConfigError, EngineError};

pub const MAX_BLOCK_SIZE: usize = 2048;
