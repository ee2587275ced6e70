#![allow(clippy::suboptimal_flops)]
use std::convert::Infallible;

use crate::{traits::BatchCostFunction, DMatrix, DVector, Float, PI};

/// A generalized spherical function with a single minimum, evaluated row by row.
///
/// ```math
/// f(\vec{x}) = \sum_{i=1}^{n} x_i^2
/// ```
/// The global minimum is at $`f(\vec{0}) = 0`$.
pub struct Sphere;
impl BatchCostFunction for Sphere {
    fn evaluate_batch(&self, x: &DMatrix<Float>, _args: &()) -> Result<DVector<Float>, Infallible> {
        Ok(DVector::from_iterator(
            x.nrows(),
            x.row_iter().map(|row| row.iter().map(|v| v * v).sum()),
        ))
    }
}

/// The Rastrigin function, a non-convex function with multiple modes, evaluated row by row.
///
/// ```math
/// f(\vec{x}) = 10n + \sum_{i=1}^{n} [x_i^2 - 10\cos(2\pi x_i)]
/// ```
/// where $`x_i \in [-5.12, 5.12]`$. The global minimum is $`f(\vec{0}) = 0`$.
pub struct Rastrigin;
impl BatchCostFunction for Rastrigin {
    fn evaluate_batch(&self, x: &DMatrix<Float>, _args: &()) -> Result<DVector<Float>, Infallible> {
        let n = x.ncols() as Float;
        Ok(DVector::from_iterator(
            x.nrows(),
            x.row_iter().map(|row| {
                10.0 * n
                    + row
                        .iter()
                        .map(|v| v * v - 10.0 * Float::cos(2.0 * PI * v))
                        .sum::<Float>()
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::dmatrix;

    use super::*;

    #[test]
    fn test_minima() {
        let x = dmatrix![0.0, 0.0; 1.0, 2.0];
        let sphere = Sphere.evaluate_batch(&x, &()).unwrap();
        assert_eq!(sphere.as_slice(), &[0.0, 5.0]);
        let rastrigin = Rastrigin.evaluate_batch(&x, &()).unwrap();
        assert_relative_eq!(rastrigin[0], 0.0);
        assert_relative_eq!(rastrigin[1], 5.0, epsilon = 1e-10);
    }
}
