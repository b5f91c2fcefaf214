//! Note identity and the fixed keyboard frequency table.

use std::fmt;

use crate::error::ConfigError;

/*
Keyboard Layout
===============

Two rows of a QWERTY keyboard form a piano: the bottom row is the white keys
of the lower octave, the home row its black keys, and the top row plus the
number row continue upward.

      S   D       G   H   J           2   3       5   6   7       9
    Z   X   C   V   B   N   M       Q   W   E   R   T   Y   U   I   O
    C4  D4  E4  F4  G4  A4  B4      C5  D5  E5  F5  G5  A5  B5  C6  D6

27 keys, C4 (261.63 Hz) to D6 (1174.66 Hz), equal temperament, A4 = 440 Hz.

A NoteId is the ASCII code of the upper-case key label, so the same id comes
out whether the key was typed with or without shift.
*/

/// Stable identifier of a logical note: the ASCII code of its key label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(pub u8);

impl NoteId {
    /// Id for a key label. Letters are case-insensitive; non-ASCII has no id.
    pub fn from_char(c: char) -> Option<Self> {
        if c.is_ascii() {
            Some(Self(c.to_ascii_uppercase() as u8))
        } else {
            None
        }
    }

    /// Key label this id was derived from.
    pub fn key_char(self) -> char {
        self.0 as char
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key_char())
    }
}

/// Key label → frequency (Hz), ascending pitch.
pub const KEYBOARD: [(char, f32); 27] = [
    ('Z', 261.63),
    ('S', 277.18),
    ('X', 293.66),
    ('D', 311.13),
    ('C', 329.63),
    ('V', 349.23),
    ('G', 369.99),
    ('B', 392.00),
    ('H', 415.30),
    ('N', 440.00),
    ('J', 466.16),
    ('M', 493.88),
    ('Q', 523.25),
    ('2', 554.37),
    ('W', 587.33),
    ('3', 622.25),
    ('E', 659.26),
    ('R', 698.46),
    ('5', 739.99),
    ('T', 783.99),
    ('6', 830.61),
    ('Y', 880.00),
    ('7', 932.33),
    ('U', 987.77),
    ('I', 1046.50),
    ('9', 1108.73),
    ('O', 1174.66),
];

const ASCII_RANGE: usize = 128;

/// Immutable NoteId → frequency map, indexed directly by key code.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    by_code: [Option<f32>; ASCII_RANGE],
    order: Vec<NoteId>,
}

impl FrequencyTable {
    /// The 27-key two-octave layout.
    pub fn keyboard() -> Self {
        let mut by_code = [None; ASCII_RANGE];
        let mut order = Vec::with_capacity(KEYBOARD.len());
        for (label, freq) in KEYBOARD {
            let id = NoteId(label as u8);
            by_code[id.0 as usize] = Some(freq);
            order.push(id);
        }
        Self { by_code, order }
    }

    /// Build a custom layout. Every frequency must be positive and every
    /// label ASCII; later duplicates replace earlier ones.
    pub fn from_entries(entries: &[(char, f32)]) -> Result<Self, ConfigError> {
        let mut by_code = [None; ASCII_RANGE];
        let mut order = Vec::with_capacity(entries.len());
        for &(label, freq) in entries {
            if !(freq > 0.0 && freq.is_finite()) {
                return Err(ConfigError::NonPositive {
                    name: "frequency",
                    value: freq as f64,
                });
            }
            let Some(id) = NoteId::from_char(label) else {
                continue;
            };
            if by_code[id.0 as usize].replace(freq).is_none() {
                order.push(id);
            }
        }
        Ok(Self { by_code, order })
    }

    pub fn frequency(&self, note: NoteId) -> Option<f32> {
        self.by_code.get(note.0 as usize).copied().flatten()
    }

    pub fn contains(&self, note: NoteId) -> bool {
        self.frequency(note).is_some()
    }

    /// Notes in table order.
    pub fn notes(&self) -> &[NoteId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::keyboard()
    }
}
