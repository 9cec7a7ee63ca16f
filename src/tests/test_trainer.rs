use ndarray::{array, Array1};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Map;
use tempfile::tempdir;

use crate::approximator::QFunctionApproximator;
use crate::config::{NetworkConfig, OptimizerKind, PersistenceConfig, TrainingConfig};
use crate::environment::{Environment, RoomNavigation, StepOutcome};
use crate::error::{DdqnError, Result};
use crate::model::ModelPaths;
use crate::network::NeuralNetwork;
use crate::replay_buffer::ExperienceReplay;
use crate::trainer::{build_model, root_rng, run_training_on, train_loop_ddqn};

/// Two-feature corridor paying 1 per step that optionally ends after a fixed number of steps.
struct Corridor {
    position: f32,
    steps: usize,
    terminate_after: Option<usize>,
}

impl Corridor {
    fn endless() -> Self {
        Corridor { position: 0.0, steps: 0, terminate_after: None }
    }

    fn ending_after(steps: usize) -> Self {
        Corridor { position: 0.0, steps: 0, terminate_after: Some(steps) }
    }

    fn observation(&self) -> Array1<f32> {
        array![self.position, self.steps as f32 / 10.0]
    }
}

impl Environment for Corridor {
    fn reset(&mut self) -> Result<Array1<f32>> {
        self.position = 0.0;
        self.steps = 0;
        Ok(self.observation())
    }

    fn step(&mut self, action: usize) -> Result<StepOutcome> {
        if action >= 2 {
            return Err(DdqnError::InvalidAction { action, num_actions: 2 });
        }
        self.position += if action == 0 { -0.1 } else { 0.1 };
        self.steps += 1;
        Ok(StepOutcome {
            state: self.observation(),
            reward: 1.0,
            terminal: self.terminate_after.map_or(false, |limit| self.steps >= limit),
            info: Map::new(),
        })
    }

    fn num_actions(&self) -> usize {
        2
    }

    fn observation_shape(&self) -> Vec<usize> {
        vec![2]
    }
}

fn small_config() -> TrainingConfig {
    TrainingConfig {
        buffer_capacity: 1000,
        batch_size: 4,
        num_episodes: 4,
        max_steps_per_episode: 5,
        learn_start: 10,
        solved_threshold: 1000.0,
        epsilon_decay: 0.1,
        learning_rate: 0.01,
        seed: Some(3),
        network: NetworkConfig {
            hidden_layers: vec![8],
            optimizer: OptimizerKind::Sgd,
        },
        ..TrainingConfig::default()
    }
}

#[test]
fn test_step_cap_is_not_terminal() {
    let config = small_config();
    let mut env = Corridor::endless();
    let mut rng = root_rng(&config);
    let mut model = build_model(&config, 2, 2, &mut rng).unwrap();
    let mut buffer = ExperienceReplay::new(config.buffer_capacity, 2).unwrap();

    let report = train_loop_ddqn(&config, &mut env, &mut model, &mut buffer, &mut rng).unwrap();
    assert_eq!(report.episodes_run, 4);
    assert_eq!(report.metrics.episode_lengths, vec![5; 4]);
    assert_eq!(buffer.buffer_length(), 20);
    assert!(buffer.iter().all(|t| !t.terminal));
}

#[test]
fn test_natural_terminal_is_stored() {
    let config = small_config();
    let mut env = Corridor::ending_after(3);
    let mut rng = root_rng(&config);
    let mut model = build_model(&config, 2, 2, &mut rng).unwrap();
    let mut buffer = ExperienceReplay::new(config.buffer_capacity, 2).unwrap();

    train_loop_ddqn(&config, &mut env, &mut model, &mut buffer, &mut rng).unwrap();
    let flags: Vec<bool> = buffer.iter().map(|t| t.terminal).collect();
    assert_eq!(flags.len(), 12);
    for (i, flag) in flags.iter().enumerate() {
        assert_eq!(*flag, i % 3 == 2);
    }
}

#[test]
fn test_learning_starts_after_learn_start() {
    let config = small_config();
    let mut env = Corridor::endless();
    let mut rng = root_rng(&config);
    let mut model = build_model(&config, 2, 2, &mut rng).unwrap();
    let mut buffer = ExperienceReplay::new(config.buffer_capacity, 2).unwrap();

    // 20 transitions, learning once the buffer holds more than 10
    let report = train_loop_ddqn(&config, &mut env, &mut model, &mut buffer, &mut rng).unwrap();
    assert_eq!(report.learning_steps, 10);
    assert_eq!(model.update_count(), 10);
    assert_eq!(report.metrics.losses.len(), 10);
    assert_eq!(report.metrics.swaps, model.swap_count());
}

#[test]
fn test_epsilon_and_running_average_per_episode() {
    let config = small_config();
    let mut env = Corridor::endless();
    let mut rng = root_rng(&config);
    let mut model = build_model(&config, 2, 2, &mut rng).unwrap();
    let mut buffer = ExperienceReplay::new(config.buffer_capacity, 2).unwrap();

    let report = train_loop_ddqn(&config, &mut env, &mut model, &mut buffer, &mut rng).unwrap();
    assert_eq!(report.rewards, vec![5.0; 4]);
    assert!(report.running_averages.iter().all(|avg| (avg - 5.0).abs() < 1e-5));
    let epsilons = &report.metrics.epsilons;
    assert!((epsilons[0] - 0.9).abs() < 1e-6);
    assert!((epsilons[3] - 0.6).abs() < 1e-6);
}

#[test]
fn test_stops_once_solved() {
    let config = TrainingConfig {
        solved_threshold: 4.0,
        ..small_config()
    };
    let mut env = Corridor::endless();
    let mut rng = root_rng(&config);
    let mut model = build_model(&config, 2, 2, &mut rng).unwrap();
    let mut buffer = ExperienceReplay::new(config.buffer_capacity, 2).unwrap();

    let report = train_loop_ddqn(&config, &mut env, &mut model, &mut buffer, &mut rng).unwrap();
    assert!(report.solved);
    assert_eq!(report.episodes_run, 1);
}

#[test]
fn test_incompatible_model_is_rejected() {
    let config = small_config();
    let mut env = Corridor::endless();
    let mut rng = root_rng(&config);
    let mut model = build_model(&config, 3, 2, &mut rng).unwrap();
    let mut buffer = ExperienceReplay::new(config.buffer_capacity, 2).unwrap();

    let result = train_loop_ddqn(&config, &mut env, &mut model, &mut buffer, &mut StdRng::seed_from_u64(0));
    assert!(matches!(result, Err(DdqnError::DimensionMismatch { .. })));
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let config = small_config();
    let first = run_training_on(&config, &mut RoomNavigation::new(), None).unwrap();
    let second = run_training_on(&config, &mut RoomNavigation::new(), None).unwrap();
    assert_eq!(first.rewards, second.rewards);
    assert_eq!(first.metrics.losses, second.metrics.losses);
}

#[test]
fn test_run_training_saves_when_asked() {
    let dir = tempdir().unwrap();
    let mut config = small_config();
    config.persistence.paths = ModelPaths::in_dir(dir.path(), "rooms");
    config.persistence.save_on_finish = true;

    run_training_on(&config, &mut RoomNavigation::new(), None).unwrap();
    assert!(config.persistence.paths.online.exists());
    assert!(config.persistence.paths.offline.exists());
}

#[test]
fn test_natural_terminal_on_cap_step_is_stored_as_terminal() {
    let config = small_config();
    let mut env = Corridor::ending_after(5);
    let mut rng = root_rng(&config);
    let mut model = build_model(&config, 2, 2, &mut rng).unwrap();
    let mut buffer = ExperienceReplay::new(config.buffer_capacity, 2).unwrap();

    let report = train_loop_ddqn(&config, &mut env, &mut model, &mut buffer, &mut rng).unwrap();
    assert_eq!(report.metrics.episode_lengths, vec![5; 4]);
    let flags: Vec<bool> = buffer.iter().map(|t| t.terminal).collect();
    assert_eq!(flags.len(), 20);
    for (i, flag) in flags.iter().enumerate() {
        assert_eq!(*flag, i % 5 == 4);
    }
}

#[test]
fn test_resume_loads_saved_networks() {
    let dir = tempdir().unwrap();
    let paths = ModelPaths::in_dir(dir.path(), "corridor");
    let mut config = small_config();
    config.num_episodes = 1;
    config.persistence.paths = paths.clone();
    config.persistence.save_on_finish = true;
    run_training_on(&config, &mut Corridor::endless(), None).unwrap();

    // No episodes reach the learn gate, so the resumed networks are saved back unchanged
    let resumed_dir = tempdir().unwrap();
    let resumed_paths = ModelPaths::in_dir(resumed_dir.path(), "corridor");
    let resumed_config = TrainingConfig {
        seed: Some(99),
        persistence: PersistenceConfig {
            paths: resumed_paths.clone(),
            save_on_finish: true,
        },
        ..config.clone()
    };
    run_training_on(&resumed_config, &mut Corridor::endless(), Some(&paths)).unwrap();

    let original = NeuralNetwork::load(&paths.online).unwrap();
    let resumed = NeuralNetwork::load(&resumed_paths.online).unwrap();
    assert_eq!(resumed.parameters(), original.parameters());
}

#[test]
fn test_resume_from_missing_snapshot_fails() {
    let dir = tempdir().unwrap();
    let paths = ModelPaths::in_dir(dir.path(), "absent");
    let result = run_training_on(&small_config(), &mut Corridor::endless(), Some(&paths));
    assert!(matches!(result, Err(DdqnError::Io(_))));
}
