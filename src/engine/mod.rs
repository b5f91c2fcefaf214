//! Realtime audio engine: owns the output stream and hands out the control
//! handle and the scope.
//!
//! ```text
//!   UI thread                         audio callback (cpal)
//!   ─────────                         ─────────────────────
//!   SynthHandle ──rtrb SynthMessage──▶ PolySynth::render_block
//!                                          │
//!   Scope  ◀────────rtrb f32─────────── AnalysisTap
//! ```
//!
//! Nothing is shared behind a lock: the callback owns the [`PolySynth`], and
//! both directions are single-producer single-consumer rings.

mod stream;

use std::{thread, time::Duration};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    SampleFormat, Stream,
};
use tracing::{info, warn};

use crate::{
    config::EngineConfig,
    error::EngineError,
    io::analysis::{analysis_channel, Scope},
    synth::{control_channel, PolySynth, SynthHandle},
    MAX_BLOCK_SIZE,
};

use self::stream::build_stream;

pub struct AudioEngine {
    stream: Stream,
    sample_rate: f32,
    channels: u16,
}

impl AudioEngine {
    /// Open the default output device and start rendering.
    ///
    /// Returns the engine, a handle for note and shape events, and the scope
    /// fed with the mixed output.
    pub fn start(config: EngineConfig) -> Result<(Self, SynthHandle, Scope), EngineError> {
        config.validate()?;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(EngineError::NoOutputDevice)?;
        let supported = device
            .default_output_config()
            .map_err(|e| EngineError::DeviceConfig(e.to_string()))?;

        let sample_format = supported.sample_format();
        let stream_config: cpal::StreamConfig = supported.into();
        let sample_rate = stream_config.sample_rate.0 as f32;
        let channels = stream_config.channels;

        info!(
            device = %device.name().unwrap_or_else(|_| "unknown".into()),
            sample_rate,
            channels,
            ?sample_format,
            "opening output stream"
        );

        let (handle, rx) = control_channel(config.queue_capacity);
        let (tap, scope) = analysis_channel(config.analysis_window);
        let synth = PolySynth::new(&config, sample_rate, rx, Some(tap))?;

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, synth)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, synth)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, synth)?,
            other => return Err(EngineError::UnsupportedSampleFormat(format!("{other:?}"))),
        };
        stream
            .play()
            .map_err(|e| EngineError::PlayStream(e.to_string()))?;

        let engine = Self {
            stream,
            sample_rate,
            channels,
        };
        Ok((engine, handle, scope))
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Silence every voice and close the stream.
    ///
    /// Queues the shutdown, then waits one block period so the callback
    /// applies it and renders silence before the stream is paused. If the
    /// queue is full the voices are torn down when the stream is dropped.
    pub fn stop(self, mut handle: SynthHandle) {
        match handle.shutdown() {
            Ok(()) => thread::sleep(drain_period(self.sample_rate)),
            Err(e) => warn!(%e, "could not queue shutdown, closing stream anyway"),
        }
        if let Err(e) = self.stream.pause() {
            warn!(%e, "failed to pause output stream");
        }
        info!("audio engine stopped");
    }
}

/// Time for the callback to render one full block.
fn drain_period(sample_rate: f32) -> Duration {
    Duration::from_secs_f64(MAX_BLOCK_SIZE as f64 / f64::from(sample_rate.max(1.0)))
}
