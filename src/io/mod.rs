// Purpose - external interfaces: input translation and the analysis tap

pub mod analysis;
pub mod keymap;

pub use analysis::{analysis_channel, AnalysisTap, Scope, ANALYSIS_WINDOW};
pub use keymap::{GateMode, KeyInputAdapter, NoteEvent};
