use std::fmt;

/// Startup configuration that would leave the engine without a defined sound.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonPositive { name: &'static str, value: f64 },
    SustainOutOfRange(f32),
    UnknownWaveShape(String),
    GainTooHigh { gain: f32, polyphony: usize },
    ZeroPolyphony,
    InvalidSampleRate(f32),
}

/// Failures surfaced by the realtime engine and its control handle.
#[derive(Debug)]
pub enum EngineError {
    Config(ConfigError),
    NoOutputDevice,
    DeviceConfig(String),
    UnsupportedSampleFormat(String),
    BuildStream(String),
    PlayStream(String),
    QueueFull,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositive { name, value } => {
                write!(f, "{name} must be positive, got {value}")
            }
            ConfigError::SustainOutOfRange(level) => {
                write!(f, "sustain level must be between 0 and 1 (exclusive), got {level}")
            }
            ConfigError::UnknownWaveShape(name) => write!(
                f,
                "unknown wave shape '{name}' (expected sine, square, sawtooth or triangle)"
            ),
            ConfigError::GainTooHigh { gain, polyphony } => write!(
                f,
                "master gain {gain} clips with {polyphony} voices (max {})",
                1.0 / *polyphony as f32
            ),
            ConfigError::ZeroPolyphony => write!(f, "max polyphony must be at least 1"),
            ConfigError::InvalidSampleRate(rate) => write!(f, "invalid sample rate {rate}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Config(e) => write!(f, "configuration error: {e}"),
            EngineError::NoOutputDevice => write!(f, "no default output device available"),
            EngineError::DeviceConfig(e) => write!(f, "failed to fetch output config: {e}"),
            EngineError::UnsupportedSampleFormat(format) => {
                write!(f, "unsupported sample format {format}")
            }
            EngineError::BuildStream(e) => write!(f, "failed to build output stream: {e}"),
            EngineError::PlayStream(e) => write!(f, "failed to start output stream: {e}"),
            EngineError::QueueFull => write!(f, "control queue is full"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        EngineError::Config(e)
    }
}
