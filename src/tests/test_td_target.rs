use approx::assert_abs_diff_eq;
use ndarray::{array, Array1, Array2};

use crate::error::DdqnError;
use crate::td_target::calculate_td_targets;

#[test]
fn test_online_picks_offline_values() {
    // Online prefers action 1, so the offline value of action 1 is used.
    let targets = calculate_td_targets(
        array![[0.2, 0.9]].view(),
        array![[0.5, 0.3]].view(),
        array![1.0].view(),
        array![false].view(),
        0.99,
    )
    .unwrap();
    assert_abs_diff_eq!(targets[0], 1.297, epsilon = 1e-5);
}

#[test]
fn test_terminal_rows_get_reward_only() {
    let targets = calculate_td_targets(
        array![[0.2, 0.9], [4.0, 1.0]].view(),
        array![[0.5, 0.3], [100.0, -100.0]].view(),
        array![1.0, -2.5].view(),
        array![false, true].view(),
        0.99,
    )
    .unwrap();
    assert_abs_diff_eq!(targets[0], 1.297, epsilon = 1e-5);
    assert_eq!(targets[1], -2.5);
}

#[test]
fn test_ties_use_first_action() {
    let targets = calculate_td_targets(
        array![[1.0, 1.0]].view(),
        array![[2.0, 10.0]].view(),
        array![0.0].view(),
        array![false].view(),
        0.5,
    )
    .unwrap();
    assert_abs_diff_eq!(targets[0], 1.0, epsilon = 1e-6);
}

#[test]
fn test_zero_gamma_returns_rewards() {
    let targets = calculate_td_targets(
        array![[3.0, 1.0], [0.0, 8.0]].view(),
        array![[3.0, 1.0], [0.0, 8.0]].view(),
        array![0.5, 0.25].view(),
        array![false, false].view(),
        0.0,
    )
    .unwrap();
    assert_eq!(targets, array![0.5, 0.25]);
}

#[test]
fn test_empty_batch() {
    let empty = Array2::<f32>::zeros((0, 3));
    let targets = calculate_td_targets(
        empty.view(),
        empty.view(),
        Array1::<f32>::zeros(0).view(),
        Array1::<bool>::from_elem(0, false).view(),
        0.9,
    )
    .unwrap();
    assert!(targets.is_empty());
}

#[test]
fn test_shape_mismatch() {
    let result = calculate_td_targets(
        array![[0.2, 0.9]].view(),
        array![[0.5, 0.3, 0.1]].view(),
        array![1.0].view(),
        array![false].view(),
        0.99,
    );
    assert!(matches!(result, Err(DdqnError::DimensionMismatch { .. })));

    let result = calculate_td_targets(
        array![[0.2, 0.9]].view(),
        array![[0.5, 0.3]].view(),
        array![1.0, 2.0].view(),
        array![false].view(),
        0.99,
    );
    assert!(result.is_err());
}
