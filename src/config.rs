//! Training configuration.
//!
//! Every field has a default, so a JSON file only needs the keys it changes:
//!
//! ```json
//! { "batch_size": 64, "gamma": 0.99, "network": { "hidden_layers": [32, 32] } }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{DdqnError, Result};
use crate::model::{ModelPaths, DEFAULT_SWAP_PROBABILITY};
use crate::optimizer::{Adam, OptimizerWrapper, RMSProp, SGD};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    Sgd,
    Adam,
    #[default]
    RmsProp,
}

impl OptimizerKind {
    pub fn build(self) -> OptimizerWrapper {
        match self {
            OptimizerKind::Sgd => OptimizerWrapper::SGD(SGD::new()),
            OptimizerKind::Adam => OptimizerWrapper::Adam(Adam::default()),
            OptimizerKind::RmsProp => OptimizerWrapper::RMSProp(RMSProp::default()),
        }
    }
}

/// Shape and optimizer of each of the two Q-networks
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub hidden_layers: Vec<usize>,
    pub optimizer: OptimizerKind,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            hidden_layers: vec![64, 64],
            optimizer: OptimizerKind::RmsProp,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    #[serde(flatten)]
    pub paths: ModelPaths,
    /// Write both networks once training finishes.
    pub save_on_finish: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        PersistenceConfig {
            paths: ModelPaths::default(),
            save_on_finish: false,
        }
    }
}

/// Hyperparameters of one training run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub buffer_capacity: usize,
    pub batch_size: usize,
    /// Discount factor
    pub gamma: f32,
    pub epsilon_start: f32,
    pub epsilon_floor: f32,
    /// Subtracted from epsilon after every episode
    pub epsilon_decay: f32,
    pub num_episodes: usize,
    /// Episodes are cut off after this many steps
    pub max_steps_per_episode: usize,
    /// Learning starts once the buffer holds more than this many transitions
    pub learn_start: usize,
    /// Training stops once the running average exceeds this
    pub solved_threshold: f32,
    /// Weight of the newest episode in the running average
    pub reward_smoothing: f32,
    pub learning_rate: f32,
    pub swap_probability: f64,
    pub seed: Option<u64>,
    pub network: NetworkConfig,
    pub persistence: PersistenceConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            buffer_capacity: 1_000_000,
            batch_size: 128,
            gamma: 0.94,
            epsilon_start: 1.0,
            epsilon_floor: 0.1,
            epsilon_decay: 0.001,
            num_episodes: 1200,
            max_steps_per_episode: 200,
            learn_start: 1000,
            solved_threshold: 195.0,
            reward_smoothing: 0.05,
            learning_rate: 1e-4,
            swap_probability: DEFAULT_SWAP_PROBABILITY,
            seed: None,
            network: NetworkConfig::default(),
            persistence: PersistenceConfig::default(),
        }
    }
}

impl TrainingConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TrainingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        fn unit_interval(name: &str, value: f32) -> Result<()> {
            if !(0.0..=1.0).contains(&value) {
                return Err(DdqnError::invalid_parameter(name, format!("{} is outside [0, 1]", value)));
            }
            Ok(())
        }

        if self.buffer_capacity == 0 {
            return Err(DdqnError::invalid_parameter("buffer_capacity", "must be greater than 0"));
        }
        if self.batch_size == 0 {
            return Err(DdqnError::invalid_parameter("batch_size", "must be greater than 0"));
        }
        if self.max_steps_per_episode == 0 {
            return Err(DdqnError::invalid_parameter("max_steps_per_episode", "must be greater than 0"));
        }
        unit_interval("gamma", self.gamma)?;
        unit_interval("epsilon_start", self.epsilon_start)?;
        unit_interval("epsilon_floor", self.epsilon_floor)?;
        if self.epsilon_floor > self.epsilon_start {
            return Err(DdqnError::invalid_parameter("epsilon_floor", "must not exceed epsilon_start"));
        }
        if !(self.epsilon_decay >= 0.0) {
            return Err(DdqnError::invalid_parameter("epsilon_decay", "must be non-negative"));
        }
        if !(self.reward_smoothing > 0.0 && self.reward_smoothing <= 1.0) {
            return Err(DdqnError::invalid_parameter("reward_smoothing", "must lie in (0, 1]"));
        }
        if !(self.learning_rate > 0.0) {
            return Err(DdqnError::invalid_parameter("learning_rate", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.swap_probability) {
            return Err(DdqnError::invalid_parameter("swap_probability", "must lie in [0, 1]"));
        }
        if self.network.hidden_layers.iter().any(|&width| width == 0) {
            return Err(DdqnError::invalid_parameter("network.hidden_layers", "widths must be positive"));
        }
        Ok(())
    }
}
