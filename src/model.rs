//! Double Q-learning model: an online and an offline approximator whose roles
//! are swapped at random after each update.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Bernoulli, Distribution};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::approximator::QFunctionApproximator;
use crate::error::{DdqnError, Result};

/// Probability of exchanging online and offline parameters after an update.
pub const DEFAULT_SWAP_PROBABILITY: f64 = 0.5;

/// Files holding the two parameter snapshots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPaths {
    pub online: PathBuf,
    pub offline: PathBuf,
}

impl ModelPaths {
    /// `<dir>/<prefix>_online_model2.bin` and `<dir>/<prefix>_offline_model2.bin`.
    pub fn in_dir<P: AsRef<Path>>(dir: P, prefix: &str) -> Self {
        let dir = dir.as_ref();
        ModelPaths {
            online: dir.join(format!("{}_online_model2.bin", prefix)),
            offline: dir.join(format!("{}_offline_model2.bin", prefix)),
        }
    }
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self::in_dir("models", "")
    }
}

/// What a single [`DoubleQLearningModel::update`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpdateOutcome {
    /// Masked MSE of the online network before the gradient step.
    pub loss: f32,
    /// Whether online and offline parameters were exchanged afterwards.
    pub swapped: bool,
}

/// Two approximators of identical shape. The online one selects actions and is
/// trained; the offline one evaluates bootstrap actions.
pub struct DoubleQLearningModel<A: QFunctionApproximator> {
    online: A,
    offline: A,
    swap: Bernoulli,
    swap_probability: f64,
    rng: StdRng,
    update_count: u64,
    swap_count: u64,
}

fn check_same_shape<A: QFunctionApproximator>(online: &A, offline: &A) -> Result<()> {
    if online.input_dim() != offline.input_dim() || online.num_actions() != offline.num_actions() {
        return Err(DdqnError::dimension_mismatch(
            format!("online network {}x{}", online.input_dim(), online.num_actions()),
            format!("offline network {}x{}", offline.input_dim(), offline.num_actions()),
        ));
    }
    Ok(())
}

impl<A: QFunctionApproximator> DoubleQLearningModel<A> {
    /// Build a model with the default swap probability and an entropy-seeded RNG.
    pub fn new(online: A, offline: A) -> Result<Self> {
        Self::with_rng(online, offline, DEFAULT_SWAP_PROBABILITY, StdRng::from_entropy())
    }

    pub fn with_rng(online: A, offline: A, swap_probability: f64, rng: StdRng) -> Result<Self> {
        check_same_shape(&online, &offline)?;
        let swap = Bernoulli::new(swap_probability).map_err(|_| {
            DdqnError::invalid_parameter("swap_probability", format!("{} is outside [0, 1]", swap_probability))
        })?;
        Ok(DoubleQLearningModel {
            online,
            offline,
            swap,
            swap_probability,
            rng,
            update_count: 0,
            swap_count: 0,
        })
    }

    pub fn online(&self) -> &A {
        &self.online
    }

    pub fn offline(&self) -> &A {
        &self.offline
    }

    pub fn input_dim(&self) -> usize {
        self.online.input_dim()
    }

    pub fn num_actions(&self) -> usize {
        self.online.num_actions()
    }

    pub fn swap_probability(&self) -> f64 {
        self.swap_probability
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    pub fn swap_count(&self) -> u64 {
        self.swap_count
    }

    /// Q-values of a single state from the online network.
    pub fn get_q_values(&self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        let q_values = self.online.predict(state.insert_axis(Axis(0)))?;
        Ok(q_values.index_axis_move(Axis(0), 0))
    }

    /// Q-values of the same batch from both networks, `(online, offline)`.
    pub fn get_q_values_for_both_models(&self, states: ArrayView2<f32>) -> Result<(Array2<f32>, Array2<f32>)> {
        Ok((self.online.predict(states)?, self.offline.predict(states)?))
    }

    /// One gradient step of the online network toward `td_targets` for the taken
    /// `actions`, then with probability `swap_probability` the two parameter sets
    /// trade places.
    pub fn update(
        &mut self,
        states: ArrayView2<f32>,
        td_targets: ArrayView1<f32>,
        actions: &[usize],
    ) -> Result<UpdateOutcome> {
        if states.nrows() != td_targets.len() || states.nrows() != actions.len() {
            return Err(DdqnError::dimension_mismatch(
                format!("{} targets and actions", states.nrows()),
                format!("{} targets, {} actions", td_targets.len(), actions.len()),
            ));
        }
        let num_actions = self.num_actions();
        if let Some(&action) = actions.iter().find(|&&a| a >= num_actions) {
            return Err(DdqnError::InvalidAction { action, num_actions });
        }

        let loss = self.online.gradient_step(states, td_targets, actions)?;
        self.update_count += 1;

        let swapped = self.swap.sample(&mut self.rng);
        if swapped {
            self.switch_weights()?;
            self.swap_count += 1;
        }
        debug!(loss, swapped, updates = self.update_count, "double-Q update");

        Ok(UpdateOutcome { loss, swapped })
    }

    /// Exchange the parameters of the online and offline networks.
    ///
    /// Only parameters move; backend state such as optimizer accumulators stays
    /// with the online slot.
    fn switch_weights(&mut self) -> Result<()> {
        let offline_params = self.offline.parameters();
        let online_params = self.online.parameters();
        self.online.set_parameters(offline_params)?;
        self.offline.set_parameters(online_params)
    }

    /// Persist both networks, creating parent directories as needed.
    pub fn save_model(&self, paths: &ModelPaths) -> Result<()> {
        for path in [&paths.online, &paths.offline] {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
        }
        self.online.save(&paths.online)?;
        self.offline.save(&paths.offline)?;
        info!(online = %paths.online.display(), offline = %paths.offline.display(), "saved model");
        Ok(())
    }

    /// Replace both networks with the snapshots at `paths`. A missing file is an error.
    pub fn load(&mut self, paths: &ModelPaths) -> Result<()> {
        let online = A::load_from(&paths.online)?;
        let offline = A::load_from(&paths.offline)?;
        check_same_shape(&online, &offline)?;
        self.online = online;
        self.offline = offline;
        info!(online = %paths.online.display(), offline = %paths.offline.display(), "loaded model");
        Ok(())
    }
}
