//! The double-DQN training loop.
//!
//! Per episode: reset, then act / store / maybe-learn until the environment
//! terminates or the step cap is hit. Epsilon decays once per episode and a
//! smoothed episode reward decides when the task counts as solved.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::approximator::QFunctionApproximator;
use crate::config::TrainingConfig;
use crate::environment::{CartPole, Environment};
use crate::error::{DdqnError, Result};
use crate::metrics::{EpisodeSummary, RunningAverage, TrainingMetrics};
use crate::model::{DoubleQLearningModel, ModelPaths};
use crate::network::NeuralNetwork;
use crate::policy::{eps_greedy_policy, sample_action, EpsilonSchedule};
use crate::replay_buffer::{ExperienceReplay, Transition};
use crate::td_target::calculate_td_targets;

/// Outcome of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Total reward of every episode played
    pub rewards: Vec<f32>,
    /// Smoothed reward after every episode
    pub running_averages: Vec<f32>,
    /// Whether the running average crossed the solved threshold
    pub solved: bool,
    pub episodes_run: usize,
    pub learning_steps: u64,
    pub metrics: TrainingMetrics,
}

fn check_compatible<E, A>(env: &E, model: &DoubleQLearningModel<A>, replay_buffer: &ExperienceReplay) -> Result<()>
where
    E: Environment,
    A: QFunctionApproximator,
{
    let state_size = env.state_size();
    if state_size != model.input_dim() || state_size != replay_buffer.state_size() {
        return Err(DdqnError::dimension_mismatch(
            format!("{} state features", state_size),
            format!("model {}, replay buffer {}", model.input_dim(), replay_buffer.state_size()),
        ));
    }
    if env.num_actions() != model.num_actions() {
        return Err(DdqnError::dimension_mismatch(
            format!("{} actions", env.num_actions()),
            format!("{} actions", model.num_actions()),
        ));
    }
    Ok(())
}

/// Train `model` on `env`, sampling actions and minibatches from `rng`.
pub fn train_loop_ddqn<E, A, R>(
    config: &TrainingConfig,
    env: &mut E,
    model: &mut DoubleQLearningModel<A>,
    replay_buffer: &mut ExperienceReplay,
    rng: &mut R,
) -> Result<TrainingReport>
where
    E: Environment,
    A: QFunctionApproximator,
    R: Rng + ?Sized,
{
    config.validate()?;
    check_compatible(env, model, replay_buffer)?;

    let mut epsilon = EpsilonSchedule::new(config.epsilon_start, config.epsilon_floor, config.epsilon_decay)?;
    let mut running = RunningAverage::new(config.reward_smoothing);
    let mut metrics = TrainingMetrics::new();
    let mut learning_steps = 0u64;
    let mut solved = false;

    for episode in 0..config.num_episodes {
        let mut state = env.reset()?;
        let mut episode_reward = 0.0f32;
        let mut q_sum = 0.0f32;
        let mut q_count = 0usize;
        let mut steps = 0usize;

        loop {
            steps += 1;
            let q_values = model.get_q_values(state.view())?;
            q_sum += q_values.sum();
            q_count += q_values.len();

            let policy = eps_greedy_policy(q_values.view(), epsilon.value())?;
            let action = sample_action(policy.view(), rng)?;
            let outcome = env.step(action)?;

            // Hitting the step cap ends the episode but is not a terminal state,
            // so the stored transition keeps its bootstrap term.
            let capped = steps >= config.max_steps_per_episode;
            replay_buffer.add(Transition {
                state: state.clone(),
                action,
                reward: outcome.reward,
                next_state: outcome.state.clone(),
                terminal: outcome.terminal,
            });
            episode_reward += outcome.reward;

            if replay_buffer.buffer_length() > config.learn_start {
                let batch = replay_buffer.sample_minibatch_using(config.batch_size, rng)?;
                let (q_online_next, q_offline_next) = model.get_q_values_for_both_models(batch.next_states.view())?;
                let td_targets = calculate_td_targets(
                    q_online_next.view(),
                    q_offline_next.view(),
                    batch.rewards.view(),
                    batch.terminals.view(),
                    config.gamma,
                )?;
                let update = model.update(batch.states.view(), td_targets.view(), &batch.actions)?;
                if !update.loss.is_finite() {
                    warn!(episode, step = steps, loss = update.loss, "non-finite loss");
                }
                metrics.record_update(update.loss, update.swapped);
                learning_steps += 1;
            }

            state = outcome.state;
            if outcome.terminal || capped {
                break;
            }
        }

        let eps = epsilon.step();
        let running_average = running.update(episode_reward);
        let mean_q = if q_count > 0 { q_sum / q_count as f32 } else { 0.0 };

        let summary = EpisodeSummary {
            episode,
            reward: episode_reward,
            running_average,
            epsilon: eps,
            steps,
            mean_q,
        };
        metrics.record_episode(&summary);
        info!(
            episode,
            reward = episode_reward,
            epsilon = eps,
            running_average,
            mean_q,
            buffer = replay_buffer.buffer_length(),
            "episode finished"
        );

        if running_average > config.solved_threshold {
            info!(episode, running_average, "running average above solved threshold, stopping");
            solved = true;
            break;
        }
    }

    Ok(TrainingReport {
        rewards: metrics.episode_rewards.clone(),
        running_averages: metrics.running_averages.clone(),
        solved,
        episodes_run: metrics.episodes(),
        learning_steps,
        metrics,
    })
}

/// Root RNG of a run: seeded from the config when a seed is given.
pub fn root_rng(config: &TrainingConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Two freshly initialised Q-networks for an environment with `state_size`
/// features and `num_actions` actions.
pub fn build_model<R: Rng + ?Sized>(
    config: &TrainingConfig,
    state_size: usize,
    num_actions: usize,
    rng: &mut R,
) -> Result<DoubleQLearningModel<NeuralNetwork>> {
    let hidden = &config.network.hidden_layers;
    let online = NeuralNetwork::q_network(
        state_size,
        hidden,
        num_actions,
        config.network.optimizer.build(),
        config.learning_rate,
        rng,
    )?;
    let offline = NeuralNetwork::q_network(
        state_size,
        hidden,
        num_actions,
        config.network.optimizer.build(),
        config.learning_rate,
        rng,
    )?;
    let swap_rng = StdRng::seed_from_u64(rng.gen());
    DoubleQLearningModel::with_rng(online, offline, config.swap_probability, swap_rng)
}

/// Train on `env` and persist the model if the config asks for it.
///
/// With `resume`, both networks are first replaced by the snapshots at those
/// paths; a missing or malformed snapshot aborts the run.
pub fn run_training_on<E: Environment>(
    config: &TrainingConfig,
    env: &mut E,
    resume: Option<&ModelPaths>,
) -> Result<TrainingReport> {
    config.validate()?;
    let mut rng = root_rng(config);
    let mut model = build_model(config, env.state_size(), env.num_actions(), &mut rng)?;
    if let Some(paths) = resume {
        model.load(paths)?;
    }
    let mut replay_buffer = ExperienceReplay::new(config.buffer_capacity, env.state_size())?;

    let report = train_loop_ddqn(config, env, &mut model, &mut replay_buffer, &mut rng)?;
    if config.persistence.save_on_finish {
        model.save_model(&config.persistence.paths)?;
    }
    Ok(report)
}

/// Train on cart-pole with the given configuration.
pub fn run_training(config: &TrainingConfig) -> Result<TrainingReport> {
    let mut env = match config.seed {
        Some(seed) => CartPole::seeded(seed.wrapping_add(1)),
        None => CartPole::new(),
    };
    run_training_on(config, &mut env, None)
}

