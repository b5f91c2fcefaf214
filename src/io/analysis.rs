//! Analysis tap: post-mix samples from the render thread to the visualizer.

use std::collections::VecDeque;

use rtrb::{Consumer, Producer, RingBuffer};

/// Samples kept in the visualizer's rolling window.
pub const ANALYSIS_WINDOW: usize = 2048;

/// Ring capacity in windows. Gives the visualizer several frames of slack
/// before the render thread starts dropping samples.
const TAP_RING_WINDOWS: usize = 8;

/// Render-thread end. Never blocks: samples are dropped when the ring is full.
pub struct AnalysisTap {
    tx: Producer<f32>,
    dropped: u64,
}

impl AnalysisTap {
    #[inline]
    pub fn push(&mut self, sample: f32) {
        if self.tx.push(sample).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
        }
    }

    /// Samples dropped because the visualizer fell behind.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Visualizer end: a rolling window of the most recent output samples.
///
/// The window always holds exactly `capacity` samples (zeros until audio
/// arrives). Nothing here can write back into the engine.
pub struct Scope {
    rx: Consumer<f32>,
    window: VecDeque<f32>,
    capacity: usize,
}

impl Scope {
    /// Move every pending sample into the window, keeping the newest
    /// `capacity`. Returns how many samples arrived.
    pub fn poll(&mut self) -> usize {
        let mut received = 0;
        while let Ok(sample) = self.rx.pop() {
            if self.window.len() == self.capacity {
                self.window.pop_front();
            }
            self.window.push_back(sample);
            received += 1;
        }
        received
    }

    /// Oldest to newest.
    pub fn samples(&self) -> impl ExactSizeIterator<Item = f32> + '_ {
        self.window.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.window.iter().copied().collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn peak(&self) -> f32 {
        self.window.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    pub fn rms(&self) -> f32 {
        if self.window.is_empty() {
            return 0.0;
        }
        (self.window.iter().map(|&x| x * x).sum::<f32>() / self.window.len() as f32).sqrt()
    }
}

/// Create a connected tap/scope pair with a `window`-sample rolling window.
pub fn analysis_channel(window: usize) -> (AnalysisTap, Scope) {
    let window = window.max(1);
    let (tx, rx) = RingBuffer::<f32>::new(window * TAP_RING_WINDOWS);

    let tap = AnalysisTap { tx, dropped: 0 };
    let scope = Scope {
        rx,
        window: std::iter::repeat(0.0).take(window).collect(),
        capacity: window,
    };
    (tap, scope)
}
