// Purpose: Voice lifecycle, polyphony, mixing
// This layer sits above the DSP primitives and owns every voice

pub mod bus;
pub mod clock;
pub mod message;
pub mod note;
pub mod poly;
pub mod registry;
pub mod voice;

pub use message::{control_channel, SynthHandle, SynthMessage};
pub use note::{FrequencyTable, NoteId};
pub use poly::PolySynth;
pub use registry::VoiceRegistry;
pub use voice::Voice;
