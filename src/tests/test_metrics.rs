use approx::assert_abs_diff_eq;

use crate::metrics::{EpisodeSummary, RunningAverage, TrainingMetrics};

#[test]
fn test_running_average_takes_first_value() {
    let mut avg = RunningAverage::default();
    assert_eq!(avg.value(), None);
    assert_eq!(avg.update(10.0), 10.0);
    assert_abs_diff_eq!(avg.update(30.0), 11.0, epsilon = 1e-5);
    assert_abs_diff_eq!(avg.update(11.0), 11.0, epsilon = 1e-5);
}

#[test]
fn test_training_metrics() {
    let mut metrics = TrainingMetrics::new();
    metrics.record_episode(&EpisodeSummary {
        episode: 0,
        reward: 12.0,
        running_average: 12.0,
        epsilon: 0.9,
        steps: 12,
        mean_q: 0.1,
    });
    metrics.record_update(2.0, true);
    metrics.record_update(4.0, false);
    metrics.record_update(6.0, true);

    assert_eq!(metrics.episodes(), 1);
    assert_eq!(metrics.episode_lengths, vec![12]);
    assert_eq!(metrics.swaps, 2);
    assert_abs_diff_eq!(metrics.recent_loss(2).unwrap(), 5.0, epsilon = 1e-6);
    assert_eq!(metrics.recent_loss(0), None);
}
