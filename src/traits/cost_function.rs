use std::convert::Infallible;

use crate::{DMatrix, DVector, Float};

/// A trait which describes a batched cost function $`f(\mathbb{R}^{n \times d}) \to \mathbb{R}^n`$
///
/// The optimizer calls [`BatchCostFunction::evaluate_batch`] exactly once per iteration with the
/// positions of the whole swarm, one particle per row, and expects one cost per row in the same
/// order.
///
/// The `args: &U` field carries fixed arguments which are captured once per run and passed
/// unchanged to every call (see [`Args`](crate::core::Args) for a ready-made carrier). `E` is the
/// error type of the function; use [`std::convert::Infallible`] if evaluation never fails.
///
/// Costs which are NaN or infinite are not errors: the optimizer treats them as worse than any
/// finite cost.
pub trait BatchCostFunction<U = (), E = Infallible> {
    /// Evaluate the function at every row of `x`.
    ///
    /// # Errors
    ///
    /// Returns an `Err(E)` if the evaluation fails. The optimizer aborts the run and reports
    /// the error together with the current iteration.
    fn evaluate_batch(&self, x: &DMatrix<Float>, args: &U) -> Result<DVector<Float>, E>;
}

impl<T, U, E> BatchCostFunction<U, E> for &T
where
    T: BatchCostFunction<U, E> + ?Sized,
{
    fn evaluate_batch(&self, x: &DMatrix<Float>, args: &U) -> Result<DVector<Float>, E> {
        (**self).evaluate_batch(x, args)
    }
}
