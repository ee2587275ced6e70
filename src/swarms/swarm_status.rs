use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{core::Point, Float};

use super::Swarm;

/// The state of a [`PSO`](super::PSO) run, handed to every
/// [`SwarmObserver`](crate::traits::SwarmObserver) after each iteration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SwarmStatus {
    /// The swarm as it stands after the iteration's move
    pub swarm: Swarm,
    /// The best point found so far in the run. Its cost is `None` until some particle produces a
    /// finite cost.
    pub gbest: Point,
    /// The number of completed iterations
    pub iteration: usize,
    /// The best cost after each completed iteration
    pub cost_history: Vec<Float>,
    /// The number of single-point cost evaluations
    pub n_f_evals: usize,
    /// The number of NaN or infinite costs seen so far
    pub n_nonfinite: usize,
    /// A message describing the state of the run
    pub message: String,
}

impl SwarmStatus {
    /// Wrap a freshly initialized swarm.
    pub fn new(swarm: Swarm) -> Self {
        Self {
            gbest: swarm.global_best().clone(),
            swarm,
            message: "Initialized".to_string(),
            ..Default::default()
        }
    }
    /// Replace [`SwarmStatus::gbest`] with the swarm's overall best if it is strictly better.
    pub fn update_best(&mut self) {
        let candidate = self.swarm.global_best();
        if candidate.total_cmp(&self.gbest) == Ordering::Less {
            self.gbest = candidate.clone();
        }
    }
    /// The best point found so far.
    pub const fn get_best(&self) -> &Point {
        &self.gbest
    }
    /// The best cost found so far (`+inf` before any finite cost).
    pub fn best_cost(&self) -> Float {
        self.gbest.cost()
    }
    /// Updates the [`SwarmStatus::message`] field.
    pub fn update_message(&mut self, message: &str) {
        self.message = message.to_string();
    }
}
