use rtrb::Consumer;
use tracing::{debug, info};

use crate::{
    config::EngineConfig,
    error::ConfigError,
    io::analysis::AnalysisTap,
    synth::{
        bus::MixingBus,
        clock::SampleClock,
        message::{MessageReceiver, SynthMessage},
        registry::VoiceRegistry,
    },
};

/// Render-thread core: owns the registry, the bus and the clock, and is the
/// only writer of voice state.
///
/// Control events are applied at the top of each block, in arrival order, so
/// rendering never sees a half-applied change. Reaping runs once per block.
pub struct PolySynth<R: MessageReceiver = Consumer<SynthMessage>> {
    registry: VoiceRegistry,
    bus: MixingBus,
    clock: SampleClock,
    rx: R,
    shut_down: bool,
}

impl<R: MessageReceiver> PolySynth<R> {
    pub fn new(
        config: &EngineConfig,
        sample_rate: f32,
        rx: R,
        tap: Option<AnalysisTap>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if !(sample_rate > 0.0 && sample_rate.is_finite()) {
            return Err(ConfigError::InvalidSampleRate(sample_rate));
        }

        let registry = VoiceRegistry::new(
            config.table.clone(),
            config.envelope,
            config.wave_shape,
            config.max_polyphony,
        );
        let mut bus = MixingBus::new(config.effective_master_gain());
        if let Some(tap) = tap {
            bus = bus.with_tap(tap);
        }

        Ok(Self {
            registry,
            bus,
            clock: SampleClock::new(sample_rate),
            rx,
            shut_down: false,
        })
    }

    pub fn render_block(&mut self, out: &mut [f32]) {
        while let Some(msg) = self.rx.pop() {
            self.handle_message(msg);
        }

        if self.shut_down {
            self.bus.render_silence(out);
            self.clock.advance(out.len() as u64);
            return;
        }

        self.registry.reap(self.clock.now());
        self.bus.render_block(&mut self.registry, &mut self.clock, out);
    }

    /// Apply one control event at the current engine time.
    pub fn handle_message(&mut self, msg: SynthMessage) {
        if self.shut_down {
            return;
        }

        let now = self.clock.now();
        match msg {
            SynthMessage::NoteOn { note } => {
                self.registry.note_on(note, now);
            }
            SynthMessage::NoteOff { note } => {
                self.registry.note_off(note, now);
            }
            SynthMessage::SetWaveShape(shape) => {
                debug!(%shape, "wave shape selected");
                self.registry.set_wave_shape(shape);
            }
            SynthMessage::AllNotesOff => self.registry.release_all(now),
            SynthMessage::Shutdown => self.shutdown(),
        }
    }

    /// Silence and drop every voice. Later events are ignored and every
    /// block renders silence.
    pub fn shutdown(&mut self) {
        info!(voices = self.registry.len(), "shutting down voices");
        self.registry.clear();
        self.shut_down = true;
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn registry(&self) -> &VoiceRegistry {
        &self.registry
    }

    pub fn sample_rate(&self) -> f32 {
        self.clock.sample_rate()
    }
}
