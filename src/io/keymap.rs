//! Key input adapter: terminal key and pointer events → note events.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::synth::note::{FrequencyTable, NoteId};

/// How long a note sounds per key press when the terminal cannot report key
/// releases. Auto-repeat keeps extending it while the key is held.
pub const DEFAULT_GATE: Duration = Duration::from_millis(350);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEvent {
    On(NoteId),
    Off(NoteId),
}

/// Whether key releases are observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMode {
    /// The terminal reports press, repeat and release.
    KeyRelease,
    /// Presses only: each press holds the note for `hold`.
    Timed { hold: Duration },
}

/// Turns raw input into note-on/note-off pairs, filtering anything outside
/// the frequency table so the core only ever sees mapped notes.
pub struct KeyInputAdapter {
    table: FrequencyTable,
    mode: GateMode,
    /// held note → gate deadline (only used in timed mode)
    held: HashMap<NoteId, Option<Instant>>,
    pointer: Option<NoteId>,
}

impl KeyInputAdapter {
    pub fn new(table: FrequencyTable, mode: GateMode) -> Self {
        Self {
            table,
            mode,
            held: HashMap::new(),
            pointer: None,
        }
    }

    pub fn mode(&self) -> GateMode {
        self.mode
    }

    pub fn frequency(&self, note: NoteId) -> Option<f32> {
        self.table.frequency(note)
    }

    /// Playable notes, in keyboard order.
    pub fn notes(&self) -> &[NoteId] {
        self.table.notes()
    }

    /// Map a key code to a note in the table.
    pub fn note_for(&self, code: KeyCode) -> Option<NoteId> {
        match code {
            KeyCode::Char(c) => NoteId::from_char(c).filter(|&n| self.table.contains(n)),
            _ => None,
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent, now: Instant) -> Option<NoteEvent> {
        let note = self.note_for(key.code)?;

        match (self.mode, key.kind) {
            (GateMode::KeyRelease, KeyEventKind::Press | KeyEventKind::Repeat) => {
                self.press(note, None)
            }
            (GateMode::KeyRelease, KeyEventKind::Release) => self.release(note),
            (GateMode::Timed { hold }, KeyEventKind::Press | KeyEventKind::Repeat) => {
                self.press(note, Some(now + hold))
            }
            (GateMode::Timed { .. }, KeyEventKind::Release) => None,
        }
    }

    /// Pointer pressed on an on-screen key.
    pub fn pointer_down(&mut self, note: NoteId) -> Vec<NoteEvent> {
        let mut events = self.pointer_up();
        if self.table.contains(note) {
            self.pointer = Some(note);
            events.extend(self.press(note, None));
        }
        events
    }

    /// Pointer released, or dragged off the key it went down on.
    pub fn pointer_up(&mut self) -> Vec<NoteEvent> {
        self.pointer
            .take()
            .and_then(|note| self.release(note))
            .into_iter()
            .collect()
    }

    /// Pointer dragged to `target` (None when off the keyboard). Leaving the
    /// pressed key releases it.
    pub fn pointer_moved(&mut self, target: Option<NoteId>) -> Vec<NoteEvent> {
        match self.pointer {
            Some(current) if Some(current) != target => self.pointer_up(),
            _ => Vec::new(),
        }
    }

    /// Releases for timed gates that have run out.
    pub fn expire(&mut self, now: Instant) -> Vec<NoteEvent> {
        let expired: Vec<NoteId> = self
            .held
            .iter()
            .filter(|(_, deadline)| deadline.is_some_and(|d| now >= d))
            .map(|(&note, _)| note)
            .collect();

        expired
            .into_iter()
            .filter_map(|note| self.release(note))
            .collect()
    }

    /// Release everything (focus lost, quitting).
    pub fn release_all(&mut self) -> Vec<NoteEvent> {
        self.pointer = None;
        let mut notes: Vec<NoteId> = self.held.drain().map(|(note, _)| note).collect();
        notes.sort();
        notes.into_iter().map(NoteEvent::Off).collect()
    }

    pub fn is_held(&self, note: NoteId) -> bool {
        self.held.contains_key(&note)
    }

    pub fn held_notes(&self) -> impl Iterator<Item = NoteId> + '_ {
        self.held.keys().copied()
    }

    fn press(&mut self, note: NoteId, deadline: Option<Instant>) -> Option<NoteEvent> {
        match self.held.insert(note, deadline) {
            None => Some(NoteEvent::On(note)),
            // repeat: extend the gate, no new event
            Some(_) => None,
        }
    }

    fn release(&mut self, note: NoteId) -> Option<NoteEvent> {
        self.held.remove(&note).map(|_| NoteEvent::Off(note))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(c: char) -> KeyEvent {
        KeyEvent::new_with_kind(KeyCode::Char(c), KeyModifiers::NONE, KeyEventKind::Press)
    }

    fn repeat(c: char) -> KeyEvent {
        KeyEvent::new_with_kind(KeyCode::Char(c), KeyModifiers::NONE, KeyEventKind::Repeat)
    }

    fn release(c: char) -> KeyEvent {
        KeyEvent::new_with_kind(KeyCode::Char(c), KeyModifiers::NONE, KeyEventKind::Release)
    }

    fn adapter(mode: GateMode) -> KeyInputAdapter {
        KeyInputAdapter::new(FrequencyTable::keyboard(), mode)
    }

    const Z: NoteId = NoteId(b'Z');

    #[test]
    fn press_repeat_release_yields_one_pair() {
        let mut keys = adapter(GateMode::KeyRelease);
        let now = Instant::now();

        assert_eq!(keys.handle_key(&press('z'), now), Some(NoteEvent::On(Z)));
        assert_eq!(keys.handle_key(&repeat('z'), now), None);
        assert_eq!(keys.handle_key(&press('Z'), now), None);
        assert!(keys.is_held(Z));
        assert_eq!(keys.handle_key(&release('z'), now), Some(NoteEvent::Off(Z)));
        assert_eq!(keys.handle_key(&release('z'), now), None);
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        let mut keys = adapter(GateMode::KeyRelease);
        let now = Instant::now();

        assert_eq!(keys.handle_key(&press('a'), now), None);
        assert_eq!(keys.handle_key(&press('1'), now), None);
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(keys.handle_key(&esc, now), None);
        assert_eq!(keys.held_notes().count(), 0);
    }

    #[test]
    fn timed_gate_releases_after_hold() {
        let hold = Duration::from_millis(100);
        let mut keys = adapter(GateMode::Timed { hold });
        let t0 = Instant::now();

        assert_eq!(keys.handle_key(&press('q'), t0), Some(NoteEvent::On(NoteId(b'Q'))));
        assert!(keys.expire(t0 + Duration::from_millis(50)).is_empty());

        // auto-repeat extends the gate
        keys.handle_key(&press('q'), t0 + Duration::from_millis(80));
        assert!(keys.expire(t0 + Duration::from_millis(120)).is_empty());

        assert_eq!(
            keys.expire(t0 + Duration::from_millis(180)),
            vec![NoteEvent::Off(NoteId(b'Q'))]
        );
        assert!(!keys.is_held(NoteId(b'Q')));
    }

    #[test]
    fn pointer_drag_off_releases() {
        let mut keys = adapter(GateMode::KeyRelease);

        assert_eq!(keys.pointer_down(Z), vec![NoteEvent::On(Z)]);
        assert!(keys.pointer_moved(Some(Z)).is_empty());
        assert_eq!(keys.pointer_moved(None), vec![NoteEvent::Off(Z)]);
        assert!(keys.pointer_up().is_empty());
    }

    #[test]
    fn pointer_on_new_key_moves_the_note() {
        let mut keys = adapter(GateMode::KeyRelease);
        let x = NoteId(b'X');

        keys.pointer_down(Z);
        assert_eq!(keys.pointer_down(x), vec![NoteEvent::Off(Z), NoteEvent::On(x)]);
        assert_eq!(keys.pointer_up(), vec![NoteEvent::Off(x)]);
    }

    #[test]
    fn release_all_clears_every_source() {
        let mut keys = adapter(GateMode::KeyRelease);
        let now = Instant::now();
        keys.handle_key(&press('x'), now);
        keys.pointer_down(Z);

        assert_eq!(
            keys.release_all(),
            vec![NoteEvent::Off(NoteId(b'X')), NoteEvent::Off(Z)]
        );
        assert_eq!(keys.held_notes().count(), 0);
        assert!(keys.pointer_up().is_empty());
    }
}
