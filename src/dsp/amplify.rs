//! Gain staging primitives for the output bus.

/*
Headroom
========

Every voice peaks at ±1.0. Summing N of them can reach ±N, far outside the
[-1.0, +1.0] range the output device accepts. Anything outside that range is
clipped by the hardware, which sounds like harsh distortion.

The cure is attenuation: multiply the sum by a master gain small enough that
the worst case still fits.

    worst case = N × 1.0 × gain  ≤  1.0   ⇒   gain ≤ 1 / N

  voices   max gain    dB
     1      1.000      0.0
     4      0.250    -12.0
     8      0.125    -18.1
    27      0.037    -28.6

In practice voices rarely peak together (different frequencies drift in and
out of phase), so the average level is well below the worst case. A fixed gain
is still the only way to *guarantee* no clipping without a limiter.

dB = 20 × log₁₀(gain). Every halving of amplitude is about -6 dB.
*/

/// Largest master gain that keeps `voices` full-scale voices inside ±1.0.
#[inline]
pub fn headroom_gain(voices: usize) -> f32 {
    1.0 / voices.max(1) as f32
}

/// Hard limit a sample to the output range.
#[inline]
pub fn clip(sample: f32) -> f32 {
    sample.clamp(-1.0, 1.0)
}

/// Convert a linear gain to decibels.
#[inline]
pub fn gain_to_db(gain: f32) -> f32 {
    20.0 * gain.max(f32::MIN_POSITIVE).log10()
}
