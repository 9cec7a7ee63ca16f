#[cfg(test)]
mod property_tests {
    use ddqn::policy::{argmax, eps_greedy_policy};
    use ddqn::replay_buffer::{ExperienceReplay, Transition};
    use ddqn::td_target::calculate_td_targets;
    use ndarray::{Array1, Array2};
    use proptest::prelude::*;

    fn q_values_strategy() -> impl Strategy<Value = Vec<f32>> {
        prop::collection::vec(-100.0f32..100.0, 1..=8)
    }

    proptest! {
        #[test]
        fn test_buffer_keeps_most_recent_in_order(capacity in 1usize..20, inserts in 0usize..60) {
            let mut buffer = ExperienceReplay::new(capacity, 1).unwrap();
            for i in 0..inserts {
                buffer.add(Transition {
                    state: Array1::from_elem(1, i as f32),
                    action: 0,
                    reward: i as f32,
                    next_state: Array1::from_elem(1, i as f32),
                    terminal: false,
                });
            }

            prop_assert_eq!(buffer.buffer_length(), inserts.min(capacity));
            let kept: Vec<f32> = buffer.iter().map(|t| t.reward).collect();
            let expected: Vec<f32> = (inserts.saturating_sub(capacity)..inserts).map(|i| i as f32).collect();
            prop_assert_eq!(kept, expected);
        }

        #[test]
        fn test_eps_greedy_is_a_distribution(q in q_values_strategy(), epsilon in 0.0f32..=1.0) {
            let q = Array1::from_vec(q);
            let policy = eps_greedy_policy(q.view(), epsilon).unwrap();
            let greedy = argmax(q.view()).unwrap();

            prop_assert!((policy.sum() - 1.0).abs() < 1e-4);
            prop_assert!(policy.iter().all(|&p| p >= 0.0));
            prop_assert!(policy.iter().all(|&p| p <= policy[greedy]));
        }

        #[test]
        fn test_terminal_targets_equal_rewards(
            rewards in prop::collection::vec(-10.0f32..10.0, 1..16),
            gamma in 0.0f32..=1.0,
            seed in any::<u32>(),
        ) {
            let rows = rewards.len();
            let q_online = Array2::from_shape_fn((rows, 3), |(i, j)| ((seed as usize + i * 7 + j * 3) % 11) as f32);
            let q_offline = Array2::from_shape_fn((rows, 3), |(i, j)| ((seed as usize + i * 5 + j) % 13) as f32);
            let terminals = Array1::from_shape_fn(rows, |i| i % 2 == 0);
            let rewards = Array1::from_vec(rewards);

            let targets = calculate_td_targets(
                q_online.view(),
                q_offline.view(),
                rewards.view(),
                terminals.view(),
                gamma,
            ).unwrap();

            for i in 0..rows {
                if terminals[i] {
                    prop_assert_eq!(targets[i], rewards[i]);
                } else {
                    let best = argmax(q_online.row(i)).unwrap();
                    prop_assert!((targets[i] - (rewards[i] + gamma * q_offline[[i, best]])).abs() < 1e-4);
                }
            }
        }
    }
}
