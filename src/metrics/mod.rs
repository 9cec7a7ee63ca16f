pub mod statistics;
pub mod tracker;

pub use statistics::RunningAverage;
pub use tracker::{EpisodeSummary, TrainingMetrics};
