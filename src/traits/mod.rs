/// Module containing the [`AbortSignal`] trait.
pub mod abort_signal;
/// Module containing the [`BatchCostFunction`] trait.
pub mod cost_function;
/// Module containing the [`SwarmObserver`] trait.
pub mod observer;

pub use abort_signal::AbortSignal;
pub use cost_function::BatchCostFunction;
pub use observer::SwarmObserver;
