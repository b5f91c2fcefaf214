use crate::{
    dsp::{Envelope, EnvelopeParams, EnvelopeState, ToneSource, WaveShape},
    synth::note::NoteId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Active,    // Key held, envelope in attack/decay/sustain
    Releasing, // Key released, tail still sounding until the stop deadline
}

/// One sounding (or decaying) note: a tone source shaped by its own envelope.
pub struct Voice {
    note: NoteId,
    tone: ToneSource,
    envelope: Envelope,
    started_at: f64,
    stop_at: Option<f64>,
}

impl Voice {
    /// Create the voice and trigger its envelope at `now`.
    ///
    /// The wave shape is copied in, so later shape changes never reach a voice
    /// that is already sounding.
    pub fn start(
        note: NoteId,
        frequency: f32,
        shape: WaveShape,
        params: EnvelopeParams,
        now: f64,
    ) -> Self {
        let mut envelope = Envelope::new(params);
        envelope.trigger_on(now);

        Self {
            note,
            tone: ToneSource::new(shape, frequency),
            envelope,
            started_at: now,
            stop_at: None,
        }
    }

    /// Key up: start the release tail and schedule the stop deadline.
    ///
    /// Only the first release counts.
    pub fn release(&mut self, now: f64) {
        if self.stop_at.is_some() {
            return;
        }

        self.envelope.trigger_off(now);
        self.stop_at = Some(now + self.envelope.params().release_deadline());
    }

    /// True once the stop deadline has passed. Never true for a held voice.
    pub fn is_reclaimable(&self, now: f64) -> bool {
        self.stop_at.is_some_and(|stop| now >= stop)
    }

    /// Instantaneous output at `now`, advancing the tone by one sample.
    #[inline]
    pub fn next_sample(&mut self, now: f64, sample_rate: f32) -> f32 {
        let level = self.envelope.amplitude_at(now);
        let tone = self.tone.next_sample(sample_rate);
        tone * level
    }

    pub fn amplitude_at(&self, t: f64) -> f32 {
        self.envelope.amplitude_at(t)
    }

    pub fn envelope_state(&self, t: f64) -> EnvelopeState {
        self.envelope.state_at(t)
    }

    pub fn state(&self) -> VoiceState {
        if self.stop_at.is_some() {
            VoiceState::Releasing
        } else {
            VoiceState::Active
        }
    }

    pub fn note(&self) -> NoteId {
        self.note
    }

    pub fn frequency(&self) -> f32 {
        self.tone.frequency()
    }

    pub fn shape(&self) -> WaveShape {
        self.tone.shape()
    }

    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    pub fn scheduled_stop(&self) -> Option<f64> {
        self.stop_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice_at(now: f64) -> Voice {
        Voice::start(
            NoteId(b'N'),
            440.0,
            WaveShape::Sine,
            EnvelopeParams::default(),
            now,
        )
    }

    #[test]
    fn held_voice_is_never_reclaimable() {
        let voice = voice_at(0.0);
        assert_eq!(voice.state(), VoiceState::Active);
        assert!(!voice.is_reclaimable(0.0));
        assert!(!voice.is_reclaimable(1e9));
        assert_eq!(voice.scheduled_stop(), None);
    }

    #[test]
    fn reclaimable_exactly_at_deadline() {
        let params = EnvelopeParams::default();
        let mut voice = voice_at(0.0);
        voice.release(1.0);

        let deadline = 1.0 + params.release_deadline();
        assert_eq!(voice.scheduled_stop(), Some(deadline));
        assert_eq!(voice.state(), VoiceState::Releasing);
        assert!(!voice.is_reclaimable(1.0));
        assert!(!voice.is_reclaimable(1.0 + params.release));
        assert!(!voice.is_reclaimable(deadline - 1e-6));
        assert!(voice.is_reclaimable(deadline));
        assert!(voice.is_reclaimable(deadline + 5.0));
    }

    #[test]
    fn second_release_keeps_first_deadline() {
        let mut voice = voice_at(0.0);
        voice.release(1.0);
        let first = voice.scheduled_stop();
        voice.release(1.3);
        assert_eq!(voice.scheduled_stop(), first);
    }

    #[test]
    fn output_is_tone_times_envelope() {
        let sample_rate = 48_000.0;
        let mut voice = voice_at(0.0);
        let mut reference = ToneSource::new(WaveShape::Sine, 440.0);

        // skip into the attack so the envelope is non-zero
        for i in 0..240 {
            let now = i as f64 / sample_rate as f64;
            let expected = reference.next_sample(sample_rate) * voice.amplitude_at(now);
            let actual = voice.next_sample(now, sample_rate);
            assert!((actual - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn first_sample_is_silent() {
        let mut voice = voice_at(2.0);
        assert_eq!(voice.next_sample(2.0, 48_000.0), 0.0);
        assert_eq!(voice.envelope_state(2.0), EnvelopeState::Attack);
    }
}
