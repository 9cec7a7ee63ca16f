use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::error::{DdqnError, Result};

/// Loss over a batch of Q-value predictions where only the taken action carries a target
pub trait Loss: Send + Sync {
    /// Loss value for `predictions[N, A]` against `targets[N]` at the columns named by `actions`
    fn compute(
        &self,
        predictions: ArrayView2<f32>,
        targets: ArrayView1<f32>,
        actions: &[usize],
    ) -> Result<f32>;

    /// Gradient of the loss with respect to `predictions`
    fn gradient(
        &self,
        predictions: ArrayView2<f32>,
        targets: ArrayView1<f32>,
        actions: &[usize],
    ) -> Result<Array2<f32>>;
}

/// Mean squared error between `Q(s, a)` of the taken action and its TD target.
///
/// Equivalent to `mean((target - sum(q * one_hot(a), axis=1))^2)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaskedMse;

fn check_shapes(
    predictions: &ArrayView2<f32>,
    targets: &ArrayView1<f32>,
    actions: &[usize],
) -> Result<()> {
    let (rows, num_actions) = predictions.dim();
    if targets.len() != rows || actions.len() != rows {
        return Err(DdqnError::dimension_mismatch(
            format!("{} targets and actions", rows),
            format!("{} targets, {} actions", targets.len(), actions.len()),
        ));
    }
    if let Some(&action) = actions.iter().find(|&&a| a >= num_actions) {
        return Err(DdqnError::InvalidAction { action, num_actions });
    }
    Ok(())
}

impl Loss for MaskedMse {
    fn compute(
        &self,
        predictions: ArrayView2<f32>,
        targets: ArrayView1<f32>,
        actions: &[usize],
    ) -> Result<f32> {
        check_shapes(&predictions, &targets, actions)?;
        if actions.is_empty() {
            return Ok(0.0);
        }
        let sum: f32 = actions
            .iter()
            .zip(targets.iter())
            .enumerate()
            .map(|(i, (&a, &t))| {
                let diff = predictions[[i, a]] - t;
                diff * diff
            })
            .sum();
        Ok(sum / actions.len() as f32)
    }

    fn gradient(
        &self,
        predictions: ArrayView2<f32>,
        targets: ArrayView1<f32>,
        actions: &[usize],
    ) -> Result<Array2<f32>> {
        check_shapes(&predictions, &targets, actions)?;
        let mut grad = Array2::zeros(predictions.dim());
        if actions.is_empty() {
            return Ok(grad);
        }
        let scale = 2.0 / actions.len() as f32;
        for (i, (&a, &t)) in actions.iter().zip(targets.iter()).enumerate() {
            grad[[i, a]] = scale * (predictions[[i, a]] - t);
        }
        Ok(grad)
    }
}
