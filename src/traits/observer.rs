use std::ops::ControlFlow;

use crate::swarms::SwarmStatus;

/// A trait for observers which are handed the [`SwarmStatus`] after every iteration of a
/// [`PSO`](crate::swarms::PSO) run.
///
/// This is the boundary for progress reporting: the status carries the iteration index and the
/// best cost so far, and rendering it is up to the implementor. Returning
/// [`ControlFlow::Break`] ends the run early with the best result found so far.
pub trait SwarmObserver {
    /// A function that is called at the end of every iteration.
    fn callback(&mut self, iteration: usize, status: &SwarmStatus) -> ControlFlow<()>;
}
