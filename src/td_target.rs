use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::error::{DdqnError, Result};
use crate::policy::argmax;

/// Double Q-learning TD targets.
///
/// The online network picks the next action, the offline network values it:
///
/// ```text
/// target[i] = reward[i] + gamma * (1 - terminal[i]) * q_offline_next[i, argmax_a q_online_next[i, a]]
/// ```
///
/// Terminal rows get exactly `reward[i]`.
pub fn calculate_td_targets(
    q_online_next: ArrayView2<f32>,
    q_offline_next: ArrayView2<f32>,
    rewards: ArrayView1<f32>,
    terminals: ArrayView1<bool>,
    gamma: f32,
) -> Result<Array1<f32>> {
    let rows = q_online_next.nrows();
    if q_offline_next.dim() != q_online_next.dim() {
        return Err(DdqnError::dimension_mismatch(
            format!("{:?}", q_online_next.dim()),
            format!("{:?}", q_offline_next.dim()),
        ));
    }
    if rewards.len() != rows || terminals.len() != rows {
        return Err(DdqnError::dimension_mismatch(
            format!("{} rewards and terminal flags", rows),
            format!("{} rewards, {} terminal flags", rewards.len(), terminals.len()),
        ));
    }
    if rows > 0 && q_online_next.ncols() == 0 {
        return Err(DdqnError::invalid_parameter("q_online_next", "at least one action is required"));
    }

    let mut targets = Array1::zeros(rows);
    for i in 0..rows {
        if terminals[i] {
            targets[i] = rewards[i];
            continue;
        }
        let best_action = argmax(q_online_next.row(i)).unwrap_or(0);
        targets[i] = rewards[i] + gamma * q_offline_next[[i, best_action]];
    }
    Ok(targets)
}
