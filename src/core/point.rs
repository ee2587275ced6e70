use crate::{DVector, Float};
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt::{Debug, Display},
};

/// Describes a point in the search space together with its cost.
#[derive(Clone, Default, Debug, Serialize, Deserialize)]
pub struct Point<I = DVector<Float>> {
    /// the point's position
    pub x: I,
    /// the point's cost (`None` if the point has not been assigned a finite cost)
    pub fx: Option<Float>,
}
impl<I> Point<I> {
    /// Convert the [`Point`] into a `I`-`Float` tuple, where a point without a cost reports
    /// `+inf`.
    pub fn destructure(self) -> (I, Float) {
        let fx = self.cost();
        (self.x, fx)
    }
    /// The cost of the point, or `+inf` if it has none.
    pub fn cost(&self) -> Float {
        self.fx.unwrap_or(Float::INFINITY)
    }
    /// Compare two points by their `fx` value. Points without a cost rank after every point
    /// which has one.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (&self.fx, &other.fx) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(s), Some(o)) => s.total_cmp(o),
        }
    }
    /// Returns `true` if `cost` is finite and strictly lower than the point's current cost.
    pub fn is_improved_by(&self, cost: Float) -> bool {
        cost.is_finite() && self.fx.map_or(true, |fx| cost < fx)
    }
    /// Move the point to a new position, resetting its cost
    pub fn set_position(&mut self, x: I) {
        self.x = x;
        self.fx = None;
    }
}

impl<I: Debug> Display for Point<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "x: {:?}, f(x): {:?}", self.x, self.fx)
    }
}

impl From<&[Float]> for Point {
    fn from(value: &[Float]) -> Self {
        Self {
            x: DVector::from_column_slice(value),
            fx: None,
        }
    }
}
impl From<Vec<Float>> for Point {
    fn from(value: Vec<Float>) -> Self {
        Self {
            x: DVector::from_vec(value),
            fx: None,
        }
    }
}
impl From<DVector<Float>> for Point {
    fn from(value: DVector<Float>) -> Self {
        Self { x: value, fx: None }
    }
}
