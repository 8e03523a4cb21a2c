use std::collections::VecDeque;
use crate::drivers::{Bit, Channel};
/// Zooming in never leaves fewer points than this.
pub const MIN_WINDOW_LEN: usize = 2;
/// Points replaced by every append: one vertical edge plus one hold.
const POINTS_PER_SAMPLE: usize = 2;
/// Snapshot of one channel's window, ready for plotting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceFrame {
    pub channel: Channel,
    pub x: Vec<u64>,
    pub y: Vec<u8>,
}
impl TraceFrame {
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.x
            .iter()
            .zip(&self.y)
            .map(|(&t, &v)| [t as f64, f64::from(v)])
            .collect()
    }
    pub fn len(&self) -> usize {
        self.x.len()
    }
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}
/// Fixed-length scrolling step plot of bit values.
///
/// `x` holds synthetic time indexes and `y` the bit at each point. Both queues
/// always have the same length and `x` never decreases.
#[derive(Clone, Debug)]
pub struct BitTraceBuffer {
    x: VecDeque<u64>,
    y: VecDeque<u8>,
}
impl BitTraceBuffer {
    /// Window of `window_len` points, all at time zero with value zero.
    pub fn zeroed(window_len: usize) -> Self {
        Self {
            x: std::iter::repeat(0).take(window_len).collect(),
            y: std::iter::repeat(0).take(window_len).collect(),
        }
    }
    pub fn len(&self) -> usize {
        self.x.len()
    }
    pub fn last(&self) -> Option<(u64, u8)> {
        Some((*self.x.back()?, *self.y.back()?))
    }
    /// Scrolls the window by one sample.
    ///
    /// The two oldest points are dropped and `(t+1, previous)` then `(t+1, bit)`
    /// are pushed, which draws the vertical edge followed by the new level. An
    /// empty window is seeded with the single point `(0, bit)`.
    pub fn append(&mut self, bit: Bit) {
        let Some((last_time, last_value)) = self.last() else {
            self.push(0, bit.value());
            return;
        };
        self.drop_front(POINTS_PER_SAMPLE.min(self.len()));
        let new_time = last_time + 1;
        self.push(new_time, last_value);
        self.push(new_time, bit.value());
    }
    /// Prepends up to `step` zero points without growing past `max_len`.
    pub fn zoom_out(&mut self, step: usize, max_len: usize) -> usize {
        let added = step.min(max_len.saturating_sub(self.len()));
        for _ in 0..added {
            self.x.push_front(0);
            self.y.push_front(0);
        }
        added
    }
    /// Drops up to `step` of the oldest points, stopping at [`MIN_WINDOW_LEN`].
    pub fn zoom_in(&mut self, step: usize) -> usize {
        let removed = step.min(self.len().saturating_sub(MIN_WINDOW_LEN));
        self.drop_front(removed);
        removed
    }
    /// Resets to a zeroed window of `window_len` points.
    pub fn clear_to(&mut self, window_len: usize) {
        *self = Self::zeroed(window_len);
    }
    pub fn snapshot(&self, channel: Channel) -> TraceFrame {
        TraceFrame {
            channel,
            x: self.x.iter().copied().collect(),
            y: self.y.iter().copied().collect(),
        }
    }
    fn push(&mut self, time: u64, value: u8) {
        self.x.push_back(time);
        self.y.push_back(value);
    }
    fn drop_front(&mut self, count: usize) {
        self.x.drain(..count);
        self.y.drain(..count);
    }
}
