/// Basic implementations of [`AbortSignal`](crate::traits::AbortSignal)
pub mod abort_signals;
/// [`Args`] type for fixed cost function arguments.
pub mod args;
/// [`Bound`] type for binding variables to a range.
pub mod bound;
/// [`Point`] type for defining a point in the search space.
pub mod point;
/// [`OptimizationResult`] type for the result of a run.
pub mod summary;
/// Random sampling helpers.
pub mod utils;

pub use abort_signals::{AtomicAbortSignal, CtrlCAbortSignal, NopAbortSignal};
pub use args::Args;
pub use bound::{Bound, Bounds};
pub use point::Point;
pub use summary::OptimizationResult;
