//! Real-world scenario benchmarks.
//!
//! These model actual playing: chords held on the keyboard, and fast
//! playing where voices are started, released and reclaimed every block.

mod churn;
mod voices;

pub use churn::bench_churn;
pub use voices::bench_voices;
