use serde::{Deserialize, Serialize};

/// Exponentially smoothed average of episode rewards.
///
/// The first value is taken as is; afterwards
/// `avg = smoothing * value + (1 - smoothing) * avg`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunningAverage {
    smoothing: f32,
    value: Option<f32>,
}

impl RunningAverage {
    pub fn new(smoothing: f32) -> Self {
        RunningAverage { smoothing, value: None }
    }

    /// Fold in a new value and return the updated average.
    pub fn update(&mut self, value: f32) -> f32 {
        let next = match self.value {
            None => value,
            Some(previous) => self.smoothing * value + (1.0 - self.smoothing) * previous,
        };
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f32> {
        self.value
    }
}

impl Default for RunningAverage {
    fn default() -> Self {
        Self::new(0.05)
    }
}
