use ndarray::{array, Array1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Map;

use super::{Environment, StepOutcome};
use crate::error::{DdqnError, Result};

const GRAVITY: f32 = 9.8;
const MASS_CART: f32 = 1.0;
const MASS_POLE: f32 = 0.1;
const TOTAL_MASS: f32 = MASS_CART + MASS_POLE;
const LENGTH: f32 = 0.5; // half the pole's length
const POLE_MASS_LENGTH: f32 = MASS_POLE * LENGTH;
const FORCE_MAG: f32 = 10.0;
const TAU: f32 = 0.02;
const X_THRESHOLD: f32 = 2.4;
const THETA_THRESHOLD: f32 = 12.0 * 2.0 * std::f32::consts::PI / 360.0;

/// Classic cart-pole balancing task.
///
/// State is `[x, x_dot, theta, theta_dot]`; action 0 pushes left, 1 pushes right.
/// Every step yields reward 1; the episode ends once the cart leaves the track or
/// the pole tilts past 12 degrees.
#[derive(Debug, Clone)]
pub struct CartPole {
    x: f32,
    x_dot: f32,
    theta: f32,
    theta_dot: f32,
    rng: StdRng,
}

impl CartPole {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        CartPole {
            x: 0.0,
            x_dot: 0.0,
            theta: 0.0,
            theta_dot: 0.0,
            rng,
        }
    }

    fn get_state(&self) -> Array1<f32> {
        array![self.x, self.x_dot, self.theta, self.theta_dot]
    }
}

impl Default for CartPole {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for CartPole {
    fn reset(&mut self) -> Result<Array1<f32>> {
        self.x = self.rng.gen_range(-0.05..0.05);
        self.x_dot = self.rng.gen_range(-0.05..0.05);
        self.theta = self.rng.gen_range(-0.05..0.05);
        self.theta_dot = self.rng.gen_range(-0.05..0.05);
        Ok(self.get_state())
    }

    fn step(&mut self, action: usize) -> Result<StepOutcome> {
        let force = match action {
            0 => -FORCE_MAG,
            1 => FORCE_MAG,
            _ => return Err(DdqnError::InvalidAction { action, num_actions: 2 }),
        };

        let cos_theta = self.theta.cos();
        let sin_theta = self.theta.sin();

        let temp = (force + POLE_MASS_LENGTH * self.theta_dot * self.theta_dot * sin_theta) / TOTAL_MASS;
        let theta_acc = (GRAVITY * sin_theta - cos_theta * temp)
            / (LENGTH * (4.0 / 3.0 - MASS_POLE * cos_theta * cos_theta / TOTAL_MASS));
        let x_acc = temp - POLE_MASS_LENGTH * theta_acc * cos_theta / TOTAL_MASS;

        self.x += TAU * self.x_dot;
        self.x_dot += TAU * x_acc;
        self.theta += TAU * self.theta_dot;
        self.theta_dot += TAU * theta_acc;

        let terminal = self.x.abs() > X_THRESHOLD || self.theta.abs() > THETA_THRESHOLD;

        Ok(StepOutcome {
            state: self.get_state(),
            reward: 1.0,
            terminal,
            info: Map::new(),
        })
    }

    fn num_actions(&self) -> usize {
        2
    }

    fn observation_shape(&self) -> Vec<usize> {
        vec![4]
    }
}
