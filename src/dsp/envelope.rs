use crate::error::ConfigError;

/*
Envelope Generator
==================

The envelope is the time-varying gain that turns a raw oscillator into a
note: it fades in when the key goes down, settles while the key is held and
fades out when the key comes up.

Vocabulary
----------

  level       The envelope's output (0.0 to 1.0). Multiplies the tone sample.

  segment     One piece of the curve (attack, decay, sustain, release). Each
              segment has a start time, a start value and a shape.

  trigger     note-on (`trigger_on`) or note-off (`trigger_off`). Triggers
              are the only thing that changes envelope state; everything else
              is a pure function of time.

  anchor      The level captured at `trigger_off`. Release starts from the
              anchor, never from the sustain level, so releasing in the middle
              of the attack does not click.

  margin      Extra time after the release duration before the voice is
              considered finished and its resources can be reclaimed.


The Shape
---------

  Level
    1.0 ┐    ╱╲
        │   ╱  ╲_
    S   │  ╱     ‾‾‾‾‾‾‾‾‾‾‾‾╲
        │ ╱                   ╲_
    0.0 └╱──────────────────────‾‾‾‾──────→ Time
        Attack Decay  Sustain  Release  |
        linear  exp    hold    exp(-t/τ)| finished (release + margin)

  Attack   linear ramp 0 → 1 over `attack` seconds:

               level = elapsed / attack

  Decay    exponential ramp 1 → S over `decay` seconds. With the start value
           fixed at 1.0 the exponential-ramp law v0 * (v1 / v0)^x reduces to

               level = S ^ ((elapsed - attack) / decay)

           which needs S > 0 (zero has no logarithm).

  Sustain  hold S until released.

  Release  asymptotic decay toward 0 with time constant τ = release / 5:

               level = anchor * e^(-(t - t_off) / τ)

           After five time constants the level is under 0.7% of the anchor,
           which is inaudible. The curve never reaches 0 mathematically, so
           "finished" is a deadline (t_off + release + margin), not a
           threshold on the level.


Evaluation Model
----------------

There is no per-sample state to advance. `amplitude_at(t)` looks at the two
trigger timestamps and evaluates the segment that contains `t`. The render
loop samples it with the engine clock; tests sample it at arbitrary times.

    ┌──────┐ trigger_on ┌────────┐ t ≥ A ┌───────┐ t ≥ A+D ┌─────────┐
    │ Idle │──────────→ │ Attack │─────→ │ Decay │───────→ │ Sustain │
    └──────┘            └────────┘       └───────┘         └─────────┘
        │                    │               │                  │
        │                    └──── trigger_off (any of these) ──┘
        │                                    ↓
        └──── trigger_off ────────────→ ┌─────────┐ deadline ┌──────────┐
                                        │ Release │────────→ │ Finished │
                                        └─────────┘          └──────────┘
*/

/// Levels below this are flushed to exactly zero so long release tails never
/// produce subnormal floats.
pub const DENORMAL_FLOOR: f32 = 1e-20;

/// Time constants per release duration. τ = release / RELEASE_TIME_CONSTANTS.
pub const RELEASE_TIME_CONSTANTS: f64 = 5.0;

/// Fixed envelope shape shared by every voice of an engine.
///
/// All times are in seconds. Validated once at startup; an envelope built from
/// invalid params has no defined shape.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    /// Seconds to ramp 0 → 1.
    pub attack: f64,
    /// Seconds to ramp 1 → sustain.
    pub decay: f64,
    /// Level held while the key is down, strictly between 0 and 1.
    pub sustain: f32,
    /// Seconds for the release tail to become inaudible.
    pub release: f64,
    /// Extra seconds after `release` before the voice may be reclaimed.
    pub margin: f64,
}

impl EnvelopeParams {
    pub const fn new(attack: f64, decay: f64, sustain: f32, release: f64, margin: f64) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
            margin,
        }
    }

    /// Reject shapes the curve math cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("attack", self.attack)?;
        positive("decay", self.decay)?;
        positive("release", self.release)?;
        // margin may be zero, never negative or unbounded
        if !(self.margin >= 0.0 && self.margin.is_finite()) {
            return Err(ConfigError::NonPositive {
                name: "margin",
                value: self.margin,
            });
        }
        if !(self.sustain > 0.0 && self.sustain < 1.0) {
            return Err(ConfigError::SustainOutOfRange(self.sustain));
        }
        Ok(())
    }

    /// Release time constant τ.
    pub fn time_constant(&self) -> f64 {
        self.release / RELEASE_TIME_CONSTANTS
    }

    /// Seconds from `trigger_off` until the envelope is finished.
    pub fn release_deadline(&self) -> f64 {
        self.release + self.margin
    }
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self::new(0.05, 0.1, 0.7, 0.5, 0.1)
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    // also catches NaN
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

/// The segment an envelope is in at a given time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,     // never triggered, or evaluated before trigger_on
    Attack,   // linear ramp up to 1.0
    Decay,    // exponential ramp down to sustain
    Sustain,  // holding sustain while the key is down
    Release,  // exponential tail from the anchor toward 0
    Finished, // past the release deadline, level is 0
}

#[derive(Debug, Clone, Copy)]
struct ReleaseMark {
    at: f64,
    anchor: f32,
}

pub struct Envelope {
    params: EnvelopeParams,
    triggered_at: Option<f64>,
    released: Option<ReleaseMark>,
}

impl Envelope {
    pub fn new(params: EnvelopeParams) -> Self {
        Self {
            params,
            triggered_at: None,
            released: None,
        }
    }

    pub fn params(&self) -> &EnvelopeParams {
        &self.params
    }

    /// Gate high: level restarts from 0 at `now` and the attack/decay
    /// segments are scheduled from there.
    pub fn trigger_on(&mut self, now: f64) {
        self.triggered_at = Some(now);
        self.released = None;
    }

    /// Gate low: anchor the current level at `now` and start the release tail.
    ///
    /// Whatever attack/decay was still pending is dropped. Only the first call
    /// has any effect.
    pub fn trigger_off(&mut self, now: f64) {
        if self.released.is_some() {
            return;
        }

        let anchor = self.amplitude_at(now);
        self.released = Some(ReleaseMark { at: now, anchor });
    }

    /// Level at time `t`. Pure: no state changes.
    pub fn amplitude_at(&self, t: f64) -> f32 {
        if let Some(mark) = self.released {
            if t >= mark.at {
                return self.release_level(mark, t - mark.at);
            }
        }

        match self.triggered_at {
            Some(start) => self.held_level(t - start),
            None => 0.0,
        }
    }

    /// Segment at time `t`.
    pub fn state_at(&self, t: f64) -> EnvelopeState {
        if let Some(mark) = self.released {
            if t >= mark.at {
                return if t - mark.at >= self.params.release_deadline() {
                    EnvelopeState::Finished
                } else {
                    EnvelopeState::Release
                };
            }
        }

        let Some(start) = self.triggered_at else {
            return EnvelopeState::Idle;
        };
        let elapsed = t - start;
        if elapsed < 0.0 {
            EnvelopeState::Idle
        } else if elapsed < self.params.attack {
            EnvelopeState::Attack
        } else if elapsed < self.params.attack + self.params.decay {
            EnvelopeState::Decay
        } else {
            EnvelopeState::Sustain
        }
    }

    /// Time at which the envelope becomes `Finished`, once released.
    pub fn finished_at(&self) -> Option<f64> {
        self.released.map(|mark| mark.at + self.params.release_deadline())
    }

    pub fn is_released(&self) -> bool {
        self.released.is_some()
    }

    /// Attack/decay/sustain curve, `elapsed` seconds after trigger_on.
    fn held_level(&self, elapsed: f64) -> f32 {
        let p = &self.params;
        if elapsed <= 0.0 {
            0.0
        } else if elapsed < p.attack {
            (elapsed / p.attack) as f32
        } else if elapsed < p.attack + p.decay {
            let progress = (elapsed - p.attack) / p.decay;
            (p.sustain as f64).powf(progress) as f32
        } else {
            p.sustain
        }
    }

    fn release_level(&self, mark: ReleaseMark, elapsed: f64) -> f32 {
        if elapsed >= self.params.release_deadline() {
            return 0.0;
        }

        let level = mark.anchor as f64 * (-elapsed / self.params.time_constant()).exp();
        flush_denormal(level as f32)
    }
}

#[inline]
fn flush_denormal(level: f32) -> f32 {
    if level < DENORMAL_FLOOR {
        0.0
    } else {
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn reference() -> Envelope {
        Envelope::new(EnvelopeParams::new(0.05, 0.10, 0.7, 0.5, 0.1))
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn untriggered_envelope_is_silent() {
        let env = reference();
        assert_eq!(env.amplitude_at(0.0), 0.0);
        assert_eq!(env.amplitude_at(10.0), 0.0);
        assert_eq!(env.state_at(1.0), EnvelopeState::Idle);
        assert_eq!(env.finished_at(), None);
    }

    #[test]
    fn reference_attack_decay_sustain() {
        let mut env = reference();
        env.trigger_on(0.0);

        assert_eq!(env.amplitude_at(0.0), 0.0);
        assert!(close(env.amplitude_at(0.025), 0.5));
        assert!(close(env.amplitude_at(0.05), 1.0));
        assert!(close(env.amplitude_at(0.15), 0.7));
        assert!(close(env.amplitude_at(3.0), 0.7));
        assert!(close(env.amplitude_at(1_000.0), 0.7));

        assert_eq!(env.state_at(0.01), EnvelopeState::Attack);
        assert_eq!(env.state_at(0.1), EnvelopeState::Decay);
        assert_eq!(env.state_at(0.2), EnvelopeState::Sustain);
    }

    #[test]
    fn reference_release_tail() {
        let mut env = reference();
        env.trigger_on(0.0);
        env.trigger_off(1.0);

        assert!(close(env.amplitude_at(1.0), 0.7));
        let expected = 0.7 * (-1.0f32).exp();
        assert!(close(env.amplitude_at(1.1), expected));
        assert!((env.amplitude_at(1.1) - 0.257).abs() < 1e-3);

        assert_eq!(env.state_at(1.4), EnvelopeState::Release);
        assert_eq!(env.state_at(1.6), EnvelopeState::Finished);
        assert_eq!(env.amplitude_at(1.6), 0.0);
        let finished = env.finished_at().unwrap();
        assert!((finished - 1.6).abs() < 1e-9);
    }

    #[test]
    fn release_is_inaudible_by_release_duration() {
        let mut env = reference();
        env.trigger_on(0.0);
        env.trigger_off(1.0);

        // five time constants: e^-5 ≈ 0.0067
        assert!(env.amplitude_at(1.5) < 0.7 * 0.007);
    }

    #[test]
    fn release_during_attack_is_continuous() {
        for t_off in [0.001, 0.01, 0.025, 0.049] {
            let mut env = reference();
            env.trigger_on(0.0);
            let before = env.amplitude_at(t_off);
            env.trigger_off(t_off);
            assert!(close(env.amplitude_at(t_off), before), "jump at {t_off}");
            assert!(env.amplitude_at(t_off + 1e-6) <= before + EPS);
        }
    }

    #[test]
    fn release_during_decay_is_continuous() {
        for t_off in [0.05, 0.07, 0.1, 0.149] {
            let mut env = reference();
            env.trigger_on(0.0);
            let before = env.amplitude_at(t_off);
            env.trigger_off(t_off);
            assert!(close(env.amplitude_at(t_off), before), "jump at {t_off}");
        }
    }

    #[test]
    fn second_trigger_off_is_ignored() {
        let mut env = reference();
        env.trigger_on(0.0);
        env.trigger_off(1.0);
        env.trigger_off(1.2);

        let finished = env.finished_at().unwrap();
        assert!((finished - 1.6).abs() < 1e-9);
        assert!(close(env.amplitude_at(1.0), 0.7));
    }

    #[test]
    fn attack_rises_and_decay_falls() {
        let mut env = reference();
        env.trigger_on(0.0);

        let mut last = 0.0;
        for i in 0..=50 {
            let level = env.amplitude_at(i as f64 * 0.001);
            assert!(level >= last);
            last = level;
        }
        for i in 50..=150 {
            let level = env.amplitude_at(i as f64 * 0.001);
            assert!(level <= last + 1e-6);
            last = level;
        }
    }

    #[test]
    fn release_falls_monotonically() {
        let mut env = reference();
        env.trigger_on(0.0);
        env.trigger_off(0.03);

        let mut last = env.amplitude_at(0.03);
        for i in 1..700 {
            let level = env.amplitude_at(0.03 + i as f64 * 0.001);
            assert!(level <= last);
            last = level;
        }
    }

    #[test]
    fn retrigger_restarts_from_zero() {
        let mut env = reference();
        env.trigger_on(0.0);
        env.trigger_off(1.0);
        env.trigger_on(2.0);

        assert_eq!(env.amplitude_at(2.0), 0.0);
        assert_eq!(env.state_at(2.01), EnvelopeState::Attack);
        assert_eq!(env.finished_at(), None);
    }

    #[test]
    fn tiny_levels_flush_to_zero() {
        let params = EnvelopeParams::new(0.01, 0.01, 0.5, 0.01, 100.0);
        let mut env = Envelope::new(params);
        env.trigger_on(0.0);
        env.trigger_off(1.0);

        assert_eq!(env.amplitude_at(50.0), 0.0);
        assert_eq!(env.state_at(50.0), EnvelopeState::Release);
    }

    #[test]
    fn validate_rejects_bad_shapes() {
        let ok = EnvelopeParams::default();
        assert!(ok.validate().is_ok());

        let zero_attack = EnvelopeParams { attack: 0.0, ..ok };
        assert!(matches!(
            zero_attack.validate(),
            Err(ConfigError::NonPositive { name: "attack", .. })
        ));

        let nan_decay = EnvelopeParams { decay: f64::NAN, ..ok };
        assert!(nan_decay.validate().is_err());

        let negative_release = EnvelopeParams { release: -0.5, ..ok };
        assert!(negative_release.validate().is_err());

        for sustain in [0.0, 1.0, -0.1, 1.5] {
            let bad = EnvelopeParams { sustain, ..ok };
            assert!(matches!(
                bad.validate(),
                Err(ConfigError::SustainOutOfRange(_))
            ));
        }

        let negative_margin = EnvelopeParams { margin: -0.1, ..ok };
        assert!(negative_margin.validate().is_err());
        let zero_margin = EnvelopeParams { margin: 0.0, ..ok };
        assert!(zero_margin.validate().is_ok());

        // an endless margin would keep released voices forever
        let endless_margin = EnvelopeParams { margin: f64::INFINITY, ..ok };
        assert!(matches!(
            endless_margin.validate(),
            Err(ConfigError::NonPositive { name: "margin", .. })
        ));
    }
}
