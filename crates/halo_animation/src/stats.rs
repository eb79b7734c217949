//! Rolling frame-time statistics

use std::collections::VecDeque;

/// Samples kept when no capacity is configured
pub const DEFAULT_FRAME_HISTORY: usize = 60;

/// Bounded history of frame deltas used for FPS reporting
#[derive(Clone, Debug)]
pub struct FrameStats {
    history: VecDeque<f64>,
    capacity: usize,
    average: f64,
    last_frame_time: f64,
}

impl FrameStats {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            average: 0.0,
            last_frame_time: 0.0,
        }
    }

    /// Record one frame delta, evicting the oldest sample when full
    pub fn record(&mut self, delta_ms: f64) {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(delta_ms);
        self.last_frame_time = delta_ms;
        self.average = self.history.iter().sum::<f64>() / self.history.len() as f64;
    }

    /// Average frame time in milliseconds, 0 with no samples
    pub fn average_frame_time(&self) -> f64 {
        self.average
    }

    pub fn last_frame_time(&self) -> f64 {
        self.last_frame_time
    }

    /// Frames per second derived from the rolling average, 0 with no samples
    pub fn fps(&self) -> f64 {
        if self.average <= 0.0 {
            return 0.0;
        }
        1000.0 / self.average
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.average = 0.0;
        self.last_frame_time = 0.0;
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_HISTORY)
    }
}
