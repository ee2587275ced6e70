use std::{ops::ControlFlow, sync::Arc};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::{
    core::Point,
    swarms::{SwarmParticle, SwarmStatus},
    traits::SwarmObserver,
};

/// An observer which emits the iteration and best cost through [`log::info!`] every `every`
/// iterations (and never if `every` is zero).
///
/// # Usage:
///
/// ```rust
/// use std::sync::Arc;
/// use parking_lot::RwLock;
/// use murmuration::prelude::*;
/// use murmuration::observers::LoggingObserver;
///
/// struct Sphere;
/// impl BatchCostFunction for Sphere {
///     fn evaluate_batch(&self, x: &DMatrix<Float>, _args: &()) -> Result<DVector<Float>, Infallible> {
///         Ok(DVector::from_iterator(
///             x.nrows(),
///             x.row_iter().map(|row| row.iter().map(|v| v * v).sum()),
///         ))
///     }
/// }
///
/// let mut pso = PSO::new(10, 2, SwarmOptions::new(0.5, 0.3, 0.9))
///     .with_seed(0)
///     .with_observer(Arc::new(RwLock::new(LoggingObserver::new(100))));
/// let result = pso.optimize(&Sphere, 1000, &()).unwrap();
/// // ^ With a logger installed, this logs the best cost every 100 iterations
/// assert!(result.cost < 1e-10);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct LoggingObserver {
    every: usize,
}

impl LoggingObserver {
    /// Log every `every` iterations.
    pub const fn new(every: usize) -> Self {
        Self { every }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new(1)
    }
}

impl SwarmObserver for LoggingObserver {
    fn callback(&mut self, iteration: usize, status: &SwarmStatus) -> ControlFlow<()> {
        if self.every > 0 && (iteration + 1) % self.every == 0 {
            log::info!(
                "iteration {iteration}: best cost {:e}",
                status.best_cost()
            );
        }
        ControlFlow::Continue(())
    }
}

/// An observer which stores the swarm particles' history as well as the history of global best
/// positions, in memory.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct TrackingSwarmObserver {
    /// The history of the swarm particles
    pub history: Vec<Vec<SwarmParticle>>,
    /// The history of the best position in the swarm
    pub best_history: Vec<Point>,
}

impl TrackingSwarmObserver {
    /// Finalize the observer by wrapping it in an [`Arc`] and [`RwLock`]
    pub fn build() -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(Self::default()))
    }
}

impl SwarmObserver for TrackingSwarmObserver {
    fn callback(&mut self, _iteration: usize, status: &SwarmStatus) -> ControlFlow<()> {
        self.history.push(status.swarm.particles.clone());
        self.best_history.push(status.get_best().clone());
        ControlFlow::Continue(())
    }
}
