use rtrb::{Consumer, Producer, RingBuffer};
use tracing::warn;

use crate::{dsp::WaveShape, error::EngineError, synth::note::NoteId};

/// Control events from the input context to the render thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn { note: NoteId },
    NoteOff { note: NoteId },
    SetWaveShape(WaveShape),
    AllNotesOff,
    Shutdown,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

/// Input-side handle. Every call is wait-free; a full queue is reported, not
/// waited on.
pub struct SynthHandle {
    tx: Producer<SynthMessage>,
}

impl SynthHandle {
    pub fn note_on(&mut self, note: NoteId) -> Result<(), EngineError> {
        self.send(SynthMessage::NoteOn { note })
    }

    pub fn note_off(&mut self, note: NoteId) -> Result<(), EngineError> {
        self.send(SynthMessage::NoteOff { note })
    }

    pub fn set_wave_shape(&mut self, shape: WaveShape) -> Result<(), EngineError> {
        self.send(SynthMessage::SetWaveShape(shape))
    }

    pub fn all_notes_off(&mut self) -> Result<(), EngineError> {
        self.send(SynthMessage::AllNotesOff)
    }

    pub fn shutdown(&mut self) -> Result<(), EngineError> {
        self.send(SynthMessage::Shutdown)
    }

    pub fn send(&mut self, msg: SynthMessage) -> Result<(), EngineError> {
        self.tx.push(msg).map_err(|_| {
            warn!(?msg, "control queue full, event dropped");
            EngineError::QueueFull
        })
    }
}

/// Create a connected handle / receiver pair holding up to `capacity` events.
pub fn control_channel(capacity: usize) -> (SynthHandle, Consumer<SynthMessage>) {
    let (tx, rx) = RingBuffer::<SynthMessage>::new(capacity.max(1));
    (SynthHandle { tx }, rx)
}
