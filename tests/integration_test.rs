use ddqn::config::{NetworkConfig, OptimizerKind, TrainingConfig};
use ddqn::environment::{CartPole, Environment, RoomNavigation};
use ddqn::model::ModelPaths;
use ddqn::replay_buffer::ExperienceReplay;
use ddqn::trainer::{build_model, root_rng, run_training, train_loop_ddqn};
use tempfile::tempdir;

fn quick_config() -> TrainingConfig {
    TrainingConfig {
        buffer_capacity: 2000,
        batch_size: 16,
        num_episodes: 5,
        max_steps_per_episode: 50,
        learn_start: 32,
        epsilon_decay: 0.05,
        learning_rate: 1e-3,
        seed: Some(21),
        network: NetworkConfig {
            hidden_layers: vec![16, 16],
            optimizer: OptimizerKind::RmsProp,
        },
        ..TrainingConfig::default()
    }
}

#[test]
fn test_cart_pole_training_run() {
    let config = quick_config();
    let report = run_training(&config).unwrap();

    assert_eq!(report.episodes_run, 5);
    assert_eq!(report.rewards.len(), 5);
    assert_eq!(report.running_averages.len(), 5);
    assert!(!report.solved);
    // Every episode lasts at least one step and at most the cap
    assert!(report.rewards.iter().all(|&r| (1.0..=50.0).contains(&r)));
    assert_eq!(report.running_averages[0], report.rewards[0]);
    assert!(report.metrics.losses.iter().all(|l| l.is_finite()));
}

#[test]
fn test_rooms_training_run() {
    let config = TrainingConfig {
        max_steps_per_episode: 30,
        ..quick_config()
    };
    let mut env = RoomNavigation::new();
    let mut rng = root_rng(&config);
    let mut model = build_model(&config, env.state_size(), env.num_actions(), &mut rng).unwrap();
    let mut buffer = ExperienceReplay::new(config.buffer_capacity, env.state_size()).unwrap();

    let report = train_loop_ddqn(&config, &mut env, &mut model, &mut buffer, &mut rng).unwrap();
    // The default goal is at least 38 moves away, so every episode hits the step cap
    assert_eq!(buffer.buffer_length(), 150);
    assert_eq!(report.learning_steps, 150 - 32);
    assert!(report.metrics.episode_lengths.iter().all(|&steps| steps == 30));
    assert!(buffer.iter().all(|t| !t.terminal));
}

#[test]
fn test_resume_from_saved_model() {
    let dir = tempdir().unwrap();
    let paths = ModelPaths::in_dir(dir.path(), "cartpole");
    let config = quick_config();

    let mut env = CartPole::seeded(4);
    let mut rng = root_rng(&config);
    let mut model = build_model(&config, 4, 2, &mut rng).unwrap();
    let mut buffer = ExperienceReplay::new(config.buffer_capacity, 4).unwrap();
    train_loop_ddqn(&config, &mut env, &mut model, &mut buffer, &mut rng).unwrap();
    model.save_model(&paths).unwrap();

    let mut resumed = build_model(&config, 4, 2, &mut rng).unwrap();
    resumed.load(&paths).unwrap();

    let state = env.reset().unwrap();
    assert_eq!(
        resumed.get_q_values(state.view()).unwrap(),
        model.get_q_values(state.view()).unwrap()
    );
}
