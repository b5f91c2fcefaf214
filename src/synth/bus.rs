use crate::{
    dsp::amplify::clip,
    io::analysis::AnalysisTap,
    synth::{clock::SampleClock, registry::VoiceRegistry, voice::Voice},
};

/// Sums every live voice, applies the fixed master attenuation and feeds the
/// result to the output and the analysis tap.
pub struct MixingBus {
    master_gain: f32,
    tap: Option<AnalysisTap>,
}

impl MixingBus {
    pub fn new(master_gain: f32) -> Self {
        Self {
            master_gain,
            tap: None,
        }
    }

    pub fn with_tap(mut self, tap: AnalysisTap) -> Self {
        self.tap = Some(tap);
        self
    }

    pub fn master_gain(&self) -> f32 {
        self.master_gain
    }

    /// One output sample at `now`. No voices gives silence.
    #[inline]
    pub fn render_frame<'a>(
        &mut self,
        voices: impl IntoIterator<Item = &'a mut Voice>,
        now: f64,
        sample_rate: f32,
    ) -> f32 {
        let sum: f32 = voices
            .into_iter()
            .map(|voice| voice.next_sample(now, sample_rate))
            .sum();
        // the gain already bounds the sum; clip is the backstop
        let out = clip(sum * self.master_gain);

        if let Some(tap) = self.tap.as_mut() {
            tap.push(out);
        }
        out
    }

    /// Fill `out` frame by frame, advancing `clock` one frame per sample.
    pub fn render_block(
        &mut self,
        registry: &mut VoiceRegistry,
        clock: &mut SampleClock,
        out: &mut [f32],
    ) {
        let sample_rate = clock.sample_rate();
        for sample in out.iter_mut() {
            *sample = self.render_frame(registry.voices_mut(), clock.now(), sample_rate);
            clock.advance(1);
        }
    }

    /// Render silence (still feeding the tap so the scope settles to zero).
    pub fn render_silence(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        if let Some(tap) = self.tap.as_mut() {
            for &s in out.iter() {
                tap.push(s);
            }
        }
    }
}
