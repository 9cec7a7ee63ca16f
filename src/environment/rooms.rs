use ndarray::{array, Array1};
use serde_json::{Map, Value};

use super::{Environment, StepOutcome};
use crate::error::{DdqnError, Result};

const WIDTH: i32 = 600;
const HEIGHT: i32 = 360;

/// Grid moves available in [`RoomNavigation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomAction {
    Up = 0,
    Down = 1,
    Right = 2,
    Left = 3,
}

impl RoomAction {
    pub const ALL: [RoomAction; 4] = [RoomAction::Up, RoomAction::Down, RoomAction::Right, RoomAction::Left];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Three rooms joined by narrow openings on a 600x360 floor.
///
/// The agent is a square of side `cell` that starts in the top-left corner of
/// room one and moves one cell per step. Moves into a wall leave it in place.
/// Reaching the goal square in room three ends the episode with `goal_reward`;
/// every other step costs `step_penalty`. Observations are `[x / 600, y / 360]`.
#[derive(Debug, Clone)]
pub struct RoomNavigation {
    cell: i32,
    x: i32,
    y: i32,
    goal: (i32, i32),
    goal_reward: f32,
    step_penalty: f32,
}

impl RoomNavigation {
    pub fn new() -> Self {
        RoomNavigation {
            cell: 20,
            x: 0,
            y: 0,
            goal: (560, 200),
            goal_reward: 10.0,
            step_penalty: -0.1,
        }
    }

    /// Move the goal; `goal` is the top-left corner of the target cell.
    pub fn with_goal(mut self, goal: (i32, i32)) -> Self {
        self.goal = goal;
        self
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Whether the agent square at `(x, y)` overlaps a wall.
    fn collides(&self, x: i32, y: i32) -> bool {
        let size = self.cell;
        // Room 1 left and top
        if x < 0 || y < 0 {
            return true;
        }
        // Room 1 bottom
        if y + size > 200 && x < 200 {
            return true;
        }
        // Room 1 right
        if x + size > 200 && y < 160 && x < 400 {
            return true;
        }
        // Room 2 bottom
        if y + size > HEIGHT {
            return true;
        }
        // Room 2 right
        if x + size > 400 && y + size > 240 {
            return true;
        }
        // Room 3 top
        if x >= 400 && y < 40 {
            return true;
        }
        // Room 3 right
        x + size > WIDTH
    }

    fn observation(&self) -> Array1<f32> {
        array![self.x as f32 / WIDTH as f32, self.y as f32 / HEIGHT as f32]
    }
}

impl Default for RoomNavigation {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for RoomNavigation {
    fn reset(&mut self) -> Result<Array1<f32>> {
        self.x = 0;
        self.y = 0;
        Ok(self.observation())
    }

    fn step(&mut self, action: usize) -> Result<StepOutcome> {
        let action = RoomAction::from_index(action)
            .ok_or(DdqnError::InvalidAction { action, num_actions: RoomAction::ALL.len() })?;

        let (dx, dy) = match action {
            RoomAction::Up => (0, -self.cell),
            RoomAction::Down => (0, self.cell),
            RoomAction::Right => (self.cell, 0),
            RoomAction::Left => (-self.cell, 0),
        };
        let (next_x, next_y) = (self.x + dx, self.y + dy);
        let blocked = self.collides(next_x, next_y);
        if !blocked {
            self.x = next_x;
            self.y = next_y;
        }

        let terminal = (self.x, self.y) == self.goal;
        let reward = if terminal { self.goal_reward } else { self.step_penalty };

        let mut info = Map::new();
        info.insert("x".to_string(), Value::from(self.x));
        info.insert("y".to_string(), Value::from(self.y));
        info.insert("blocked".to_string(), Value::from(blocked));

        Ok(StepOutcome {
            state: self.observation(),
            reward,
            terminal,
            info,
        })
    }

    fn num_actions(&self) -> usize {
        RoomAction::ALL.len()
    }

    fn observation_shape(&self) -> Vec<usize> {
        vec![2]
    }
}
