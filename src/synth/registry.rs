use std::collections::HashMap;

use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::{
    dsp::{EnvelopeParams, WaveShape},
    synth::{
        note::{FrequencyTable, NoteId},
        voice::Voice,
    },
};

/*
Voice Registry
==============

Voices live in an arena (a slot map). Two indexes point into it:

  active     NoteId → voice, for keys that are currently held. At most one
             entry per NoteId, so key-repeat cannot stack voices.

  decaying   voices whose key was released, oldest release first. They are
             no longer reachable by NoteId but still render their tail.

    note_on(N)   ──→ arena.insert ──→ active[N]
    note_off(N)  ──→ active.remove(N) ──→ decaying.push      (voice keeps sounding)
    reap(now)    ──→ decaying entries past their stop deadline ──→ arena.remove

Removing N from `active` at note-off (rather than at reclamation) lets the same
key start a fresh voice immediately while the old tail fades out.

Capacity
--------

At most `max_voices` voices are held at once; a note-on past that is ignored.
Decaying voices are never cut short: every tail renders until its stop
deadline, however many keys are pressed meanwhile. Tails overlapping a full
chord can briefly push the mix past the headroom, which the bus clip absorbs.

The arena and the decaying list are reserved for a full chord of held voices
plus one tail per key, so ordinary playing never grows a collection on the
render thread.
*/

/// Arena slots reserved per held voice: the voice itself and one tail.
const SLOTS_PER_VOICE: usize = 2;

slotmap::new_key_type! {
    pub struct VoiceKey;
}

pub struct VoiceRegistry {
    table: FrequencyTable,
    params: EnvelopeParams,
    wave_shape: WaveShape,
    max_voices: usize,
    voices: SlotMap<VoiceKey, Voice>,
    active: HashMap<NoteId, VoiceKey>,
    decaying: Vec<VoiceKey>,
}

impl VoiceRegistry {
    pub fn new(
        table: FrequencyTable,
        params: EnvelopeParams,
        wave_shape: WaveShape,
        max_voices: usize,
    ) -> Self {
        let max_voices = max_voices.max(1);
        Self {
            table,
            params,
            wave_shape,
            max_voices,
            voices: SlotMap::with_capacity_and_key(SLOTS_PER_VOICE * max_voices),
            active: HashMap::with_capacity(max_voices),
            decaying: Vec::with_capacity(SLOTS_PER_VOICE * max_voices),
        }
    }

    /// Start a voice for `note` unless one is already held or the note is
    /// not in the table. Returns whether a voice was created.
    pub fn note_on(&mut self, note: NoteId, now: f64) -> bool {
        if self.active.contains_key(&note) {
            trace!(%note, "note already held");
            return false;
        }
        let Some(frequency) = self.table.frequency(note) else {
            trace!(%note, "ignoring unmapped note");
            return false;
        };

        if self.active.len() >= self.max_voices {
            debug!(%note, max_voices = self.max_voices, "all voices held, note dropped");
            return false;
        }

        let voice = Voice::start(note, frequency, self.wave_shape, self.params, now);
        let key = self.voices.insert(voice);
        self.active.insert(note, key);
        true
    }

    /// Release the held voice for `note`. The id becomes free at once; the
    /// voice keeps rendering until `reap` reclaims it.
    pub fn note_off(&mut self, note: NoteId, now: f64) -> bool {
        let Some(key) = self.active.remove(&note) else {
            return false;
        };

        if let Some(voice) = self.voices.get_mut(key) {
            voice.release(now);
            self.decaying.push(key);
        }
        true
    }

    /// Destroy every decaying voice whose stop deadline has passed.
    /// Returns how many were reclaimed.
    pub fn reap(&mut self, now: f64) -> usize {
        let voices = &mut self.voices;
        let before = self.decaying.len();

        self.decaying.retain(|&key| match voices.get(key) {
            Some(voice) if voice.is_reclaimable(now) => {
                voices.remove(key);
                false
            }
            Some(_) => true,
            None => false,
        });

        before - self.decaying.len()
    }

    /// Release every held voice (all notes off).
    pub fn release_all(&mut self, now: f64) {
        for (_, key) in self.active.drain() {
            if let Some(voice) = self.voices.get_mut(key) {
                voice.release(now);
                self.decaying.push(key);
            }
        }
    }

    /// Silence and drop every voice immediately.
    pub fn clear(&mut self) {
        self.active.clear();
        self.decaying.clear();
        self.voices.clear();
    }

    /// Select the shape for voices started from now on.
    pub fn set_wave_shape(&mut self, shape: WaveShape) {
        self.wave_shape = shape;
    }

    pub fn wave_shape(&self) -> WaveShape {
        self.wave_shape
    }

    /// Held voice for `note`, if any.
    pub fn get(&self, note: NoteId) -> Option<&Voice> {
        self.active.get(&note).and_then(|&key| self.voices.get(key))
    }

    pub fn is_held(&self, note: NoteId) -> bool {
        self.active.contains_key(&note)
    }

    /// Every live voice, held or decaying.
    pub fn voices(&self) -> impl Iterator<Item = &Voice> {
        self.voices.values()
    }

    pub fn voices_mut(&mut self) -> impl Iterator<Item = &mut Voice> {
        self.voices.values_mut()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn decaying_count(&self) -> usize {
        self.decaying.len()
    }

    /// Number of live voices, held or decaying.
    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn max_voices(&self) -> usize {
        self.max_voices
    }

    pub fn params(&self) -> &EnvelopeParams {
        &self.params
    }

    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }
}
