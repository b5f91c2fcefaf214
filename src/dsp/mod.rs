//! Low-level DSP primitives used by the voice layer.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They stay focused on the signal math
//! so the synth layer can own lifecycle and mixing.

/// Gain staging and headroom helpers.
pub mod amplify;
/// Attack/decay/sustain/release envelope evaluated as a function of time.
pub mod envelope;
/// Tone source and the closed set of wave shapes.
pub mod oscillator;

pub use envelope::{Envelope, EnvelopeParams, EnvelopeState};
pub use oscillator::{ToneSource, WaveShape};
