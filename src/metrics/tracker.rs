use serde::{Deserialize, Serialize};

/// Everything recorded about one finished episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub reward: f32,
    pub running_average: f32,
    /// Epsilon after this episode's decay
    pub epsilon: f32,
    pub steps: usize,
    /// Mean of every Q-value the online network produced during the episode
    pub mean_q: f32,
}

/// Stores training metrics over a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Rewards per episode
    pub episode_rewards: Vec<f32>,

    /// Smoothed episode rewards
    pub running_averages: Vec<f32>,

    /// Episode lengths
    pub episode_lengths: Vec<usize>,

    /// Epsilon values (for exploration)
    pub epsilons: Vec<f32>,

    /// Mean Q-value estimate per episode
    pub mean_q_values: Vec<f32>,

    /// Loss of every learning step
    pub losses: Vec<f32>,

    /// Learning steps that ended with an online/offline swap
    pub swaps: u64,
}

impl TrainingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_episode(&mut self, summary: &EpisodeSummary) {
        self.episode_rewards.push(summary.reward);
        self.running_averages.push(summary.running_average);
        self.episode_lengths.push(summary.steps);
        self.epsilons.push(summary.epsilon);
        self.mean_q_values.push(summary.mean_q);
    }

    pub fn record_update(&mut self, loss: f32, swapped: bool) {
        self.losses.push(loss);
        if swapped {
            self.swaps += 1;
        }
    }

    pub fn episodes(&self) -> usize {
        self.episode_rewards.len()
    }

    /// Mean loss over the last `window` learning steps.
    pub fn recent_loss(&self, window: usize) -> Option<f32> {
        if self.losses.is_empty() || window == 0 {
            return None;
        }
        let start = self.losses.len().saturating_sub(window);
        let recent = &self.losses[start..];
        Some(recent.iter().sum::<f32>() / recent.len() as f32)
    }
}
