use std::{f32::consts::TAU, fmt, str::FromStr};

use crate::error::ConfigError;

/*
Tone Source
===========

A naive (non-band-limited) periodic oscillator. Phase runs from 0.0 to 1.0
once per cycle and each shape is a fixed function of phase:

  Sine      sin(2π·phase)                      fundamental only
  Square    +1 for the first half, -1 after    odd harmonics, 1/n
  Sawtooth  ramp -1 → +1, starting at 0        all harmonics, 1/n
  Triangle  0 → +1 → 0 → -1 → 0                odd harmonics, 1/n²

Every shape starts its cycle at (or crossing) zero so a fresh voice does not
begin with a step, and every shape stays inside [-1, +1].

Phase advances by frequency / sample_rate per sample and wraps, so the only
state a tone source keeps is that phase.
*/

/// The closed set of waveforms a voice can use.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WaveShape {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl WaveShape {
    pub const ALL: [WaveShape; 4] = [
        WaveShape::Sine,
        WaveShape::Square,
        WaveShape::Sawtooth,
        WaveShape::Triangle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WaveShape::Sine => "sine",
            WaveShape::Square => "square",
            WaveShape::Sawtooth => "sawtooth",
            WaveShape::Triangle => "triangle",
        }
    }

    /// The shape after this one, wrapping around.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Value of this shape at `phase` (0.0..1.0).
    #[inline]
    pub fn sample_at(self, phase: f32) -> f32 {
        match self {
            WaveShape::Sine => (TAU * phase).sin(),
            WaveShape::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            WaveShape::Sawtooth => 2.0 * (phase + 0.5).fract() - 1.0,
            WaveShape::Triangle => 1.0 - 4.0 * ((phase + 0.25).fract() - 0.5).abs(),
        }
    }
}

impl fmt::Display for WaveShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WaveShape {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" => Ok(WaveShape::Sine),
            "square" => Ok(WaveShape::Square),
            "sawtooth" | "saw" => Ok(WaveShape::Sawtooth),
            "triangle" => Ok(WaveShape::Triangle),
            _ => Err(ConfigError::UnknownWaveShape(s.to_string())),
        }
    }
}

impl TryFrom<u8> for WaveShape {
    type Error = ConfigError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or_else(|| ConfigError::UnknownWaveShape(index.to_string()))
    }
}

/// A single oscillator at a fixed frequency. Owned by one voice.
pub struct ToneSource {
    shape: WaveShape,
    frequency: f32,
    phase: f32,
}

impl ToneSource {
    pub fn new(shape: WaveShape, frequency: f32) -> Self {
        Self {
            shape,
            frequency,
            phase: 0.0,
        }
    }

    pub fn shape(&self) -> WaveShape {
        self.shape
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Emit the sample at the current phase, then advance one sample period.
    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let out = self.shape.sample_at(self.phase);
        self.phase = (self.phase + self.frequency / sample_rate).fract();
        out
    }

    /// Fill `out` with consecutive samples.
    pub fn render(&mut self, out: &mut [f32], sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(sample_rate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    #[test]
    fn valid_sine() {
        let mut tone = ToneSource::new(WaveShape::Sine, 440.0);
        let mut buffer = vec![0.0f32; 128];
        tone.render(&mut buffer, SAMPLE_RATE);

        let sample_index = 12;
        let expected = (TAU * 440.0 * sample_index as f32 / SAMPLE_RATE).sin();
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn every_shape_stays_in_range_and_starts_near_zero() {
        for shape in WaveShape::ALL {
            let mut tone = ToneSource::new(shape, 1_046.5);
            let mut buffer = vec![0.0f32; 4_800];
            tone.render(&mut buffer, SAMPLE_RATE);

            assert!(buffer.iter().all(|s| s.abs() <= 1.0), "{shape} out of range");
            if shape != WaveShape::Square {
                assert!(buffer[0].abs() < 1e-6, "{shape} starts with a step");
            }
        }
    }

    #[test]
    fn triangle_and_saw_hit_their_corners() {
        assert!((WaveShape::Triangle.sample_at(0.25) - 1.0).abs() < 1e-6);
        assert!((WaveShape::Triangle.sample_at(0.75) + 1.0).abs() < 1e-6);
        assert!((WaveShape::Sawtooth.sample_at(0.25) - 0.5).abs() < 1e-6);
        assert_eq!(WaveShape::Square.sample_at(0.1), 1.0);
        assert_eq!(WaveShape::Square.sample_at(0.6), -1.0);
    }

    #[test]
    fn parse_accepts_known_names_only() {
        assert_eq!("Sine".parse::<WaveShape>(), Ok(WaveShape::Sine));
        assert_eq!(" square ".parse::<WaveShape>(), Ok(WaveShape::Square));
        assert_eq!("saw".parse::<WaveShape>(), Ok(WaveShape::Sawtooth));
        assert_eq!("triangle".parse::<WaveShape>(), Ok(WaveShape::Triangle));
        assert!(matches!(
            "noise".parse::<WaveShape>(),
            Err(ConfigError::UnknownWaveShape(_))
        ));
    }

    #[test]
    fn index_out_of_range_is_rejected() {
        assert_eq!(WaveShape::try_from(3), Ok(WaveShape::Triangle));
        assert!(WaveShape::try_from(4).is_err());
    }

    #[test]
    fn next_cycles_through_all_shapes() {
        let mut shape = WaveShape::Sine;
        for _ in 0..WaveShape::ALL.len() {
            shape = shape.next();
        }
        assert_eq!(shape, WaveShape::Sine);
    }
}
