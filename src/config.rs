//! Engine configuration, fixed at startup.

use tracing::error;

use crate::{
    dsp::{amplify::headroom_gain, EnvelopeParams, WaveShape},
    error::ConfigError,
    io::analysis::ANALYSIS_WINDOW,
    synth::note::{FrequencyTable, KEYBOARD},
};

/// Voices that may be held at once: every key of the keyboard together.
pub const MAX_POLYPHONY: usize = KEYBOARD.len();

const CONTROL_QUEUE_SIZE: usize = 256;

/// Everything the engine needs before it starts.
///
/// Built with chained setters and checked once by [`EngineConfig::validate`];
/// the engine refuses to start on an invalid config.
///
/// ```
/// use keytone::{config::EngineConfig, dsp::WaveShape};
///
/// let config = EngineConfig::default()
///     .attack(0.02)
///     .release(0.8)
///     .wave_shape(WaveShape::Triangle);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub envelope: EnvelopeParams,
    pub wave_shape: WaveShape,
    pub max_polyphony: usize,
    /// `None` picks the largest gain that cannot clip at `max_polyphony`.
    pub master_gain: Option<f32>,
    pub queue_capacity: usize,
    pub analysis_window: usize,
    pub table: FrequencyTable,
}

impl EngineConfig {
    pub fn attack(mut self, seconds: f64) -> Self {
        self.envelope.attack = seconds;
        self
    }

    pub fn decay(mut self, seconds: f64) -> Self {
        self.envelope.decay = seconds;
        self
    }

    pub fn sustain(mut self, level: f32) -> Self {
        self.envelope.sustain = level;
        self
    }

    pub fn release(mut self, seconds: f64) -> Self {
        self.envelope.release = seconds;
        self
    }

    /// Extra time after the release before a voice is reclaimed.
    pub fn margin(mut self, seconds: f64) -> Self {
        self.envelope.margin = seconds;
        self
    }

    pub fn envelope(mut self, params: EnvelopeParams) -> Self {
        self.envelope = params;
        self
    }

    pub fn wave_shape(mut self, shape: WaveShape) -> Self {
        self.wave_shape = shape;
        self
    }

    pub fn max_polyphony(mut self, voices: usize) -> Self {
        self.max_polyphony = voices;
        self
    }

    pub fn master_gain(mut self, gain: f32) -> Self {
        self.master_gain = Some(gain);
        self
    }

    pub fn queue_capacity(mut self, events: usize) -> Self {
        self.queue_capacity = events;
        self
    }

    pub fn analysis_window(mut self, samples: usize) -> Self {
        self.analysis_window = samples;
        self
    }

    pub fn table(mut self, table: FrequencyTable) -> Self {
        self.table = table;
        self
    }

    /// The gain the mix bus will use.
    pub fn effective_master_gain(&self) -> f32 {
        self.master_gain.unwrap_or_else(|| headroom_gain(self.max_polyphony))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check().inspect_err(|e| error!(%e, "rejecting engine config"))
    }

    fn check(&self) -> Result<(), ConfigError> {
        self.envelope.validate()?;

        if self.max_polyphony == 0 {
            return Err(ConfigError::ZeroPolyphony);
        }

        let gain = self.effective_master_gain();
        if !(gain > 0.0 && gain.is_finite()) {
            return Err(ConfigError::NonPositive {
                name: "master gain",
                value: gain as f64,
            });
        }
        if gain * self.max_polyphony as f32 > 1.0 + f32::EPSILON {
            return Err(ConfigError::GainTooHigh {
                gain,
                polyphony: self.max_polyphony,
            });
        }

        for (name, value) in [
            ("queue capacity", self.queue_capacity),
            ("analysis window", self.analysis_window),
        ] {
            if value == 0 {
                return Err(ConfigError::NonPositive { name, value: 0.0 });
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            envelope: EnvelopeParams::default(),
            wave_shape: WaveShape::Sine,
            max_polyphony: MAX_POLYPHONY,
            master_gain: None,
            queue_capacity: CONTROL_QUEUE_SIZE,
            analysis_window: ANALYSIS_WINDOW,
            table: FrequencyTable::keyboard(),
        }
    }
}
