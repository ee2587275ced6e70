use crate::{error::ConfigurationError, DVector, Float};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Display,
    ops::{Deref, DerefMut},
};

/// An enum that describes a bound/limit on a single coordinate of the search space.
///
/// Infinite limits are allowed and turn into half-open (or absent) bounds.
#[derive(Default, Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Bound {
    #[default]
    /// `(-inf, +inf)`
    NoBound,
    /// `(min, +inf)`
    LowerBound(Float),
    /// `(-inf, max)`
    UpperBound(Float),
    /// `(min, max)`
    LowerAndUpperBound(Float, Float),
}
impl Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lower(), self.upper())
    }
}
impl From<(Float, Float)> for Bound {
    fn from(value: (Float, Float)) -> Self {
        // inverted or NaN pairs are kept as-is so that validation can report them
        if !(value.0 < value.1) {
            return Self::LowerAndUpperBound(value.0, value.1);
        }
        match (value.0.is_finite(), value.1.is_finite()) {
            (true, true) => Self::LowerAndUpperBound(value.0, value.1),
            (true, false) => Self::LowerBound(value.0),
            (false, true) => Self::UpperBound(value.1),
            (false, false) => Self::NoBound,
        }
    }
}
impl From<(Option<Float>, Option<Float>)> for Bound {
    fn from(value: (Option<Float>, Option<Float>)) -> Self {
        match (value.0, value.1) {
            (Some(lb), Some(ub)) => Self::LowerAndUpperBound(lb, ub),
            (Some(lb), None) => Self::LowerBound(lb),
            (None, Some(ub)) => Self::UpperBound(ub),
            (None, None) => Self::NoBound,
        }
    }
}
impl From<&Self> for Bound {
    fn from(value: &Self) -> Self {
        *value
    }
}

impl Bound {
    /// Checks whether the given `value` is compatible with the bounds.
    pub fn contains(&self, value: Float) -> bool {
        match self {
            Self::NoBound => true,
            Self::LowerBound(lb) => value >= *lb,
            Self::UpperBound(ub) => value <= *ub,
            Self::LowerAndUpperBound(lb, ub) => value >= *lb && value <= *ub,
        }
    }
    /// Clamps `value` to the nearest edge of the bound if it lies outside of it.
    pub fn clip(&self, value: Float) -> Float {
        match *self {
            Self::NoBound => value,
            Self::LowerBound(lb) => value.max(lb),
            Self::UpperBound(ub) => value.min(ub),
            Self::LowerAndUpperBound(lb, ub) => value.max(lb).min(ub),
        }
    }
    /// Returns the lower bound or `-inf` if there is none.
    pub const fn lower(&self) -> Float {
        match self {
            Self::NoBound => Float::NEG_INFINITY,
            Self::LowerBound(lb) => *lb,
            Self::UpperBound(_) => Float::NEG_INFINITY,
            Self::LowerAndUpperBound(lb, _) => *lb,
        }
    }
    /// Returns the upper bound or `+inf` if there is none.
    pub const fn upper(&self) -> Float {
        match self {
            Self::NoBound => Float::INFINITY,
            Self::LowerBound(_) => Float::INFINITY,
            Self::UpperBound(ub) => *ub,
            Self::LowerAndUpperBound(_, ub) => *ub,
        }
    }
    /// Checks if the given value is equal to one of the bounds.
    pub fn at_bound(&self, value: Float) -> bool {
        match self {
            Self::NoBound => false,
            Self::LowerBound(lb) => value == *lb,
            Self::UpperBound(ub) => value == *ub,
            Self::LowerAndUpperBound(lb, ub) => value == *lb || value == *ub,
        }
    }
    /// The finite interval from which initial values are drawn.
    ///
    /// A closed bound is used as-is. A half-open bound yields a window as wide as `default`,
    /// starting at its finite edge, and a missing bound yields `default`.
    pub fn sampling_range(&self, default: (Float, Float)) -> (Float, Float) {
        let width = default.1 - default.0;
        let (lb, ub) = (self.lower(), self.upper());
        match (lb.is_finite(), ub.is_finite()) {
            (true, true) => (lb, ub),
            (true, false) => (lb, lb + width),
            (false, true) => (ub - width, ub),
            (false, false) => default,
        }
    }
}

/// A struct that contains one [`Bound`] per dimension of the search space.
#[derive(Default, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Bounds(Vec<Bound>);

impl Bounds {
    /// Builds [`Bounds`] from separate lower and upper limit sequences.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the sequences differ in length.
    pub fn from_lower_upper(lower: &[Float], upper: &[Float]) -> Result<Self, ConfigurationError> {
        if lower.len() != upper.len() {
            return Err(ConfigurationError::DimensionMismatch {
                what: "upper bounds",
                expected: lower.len(),
                got: upper.len(),
            });
        }
        Ok(lower
            .iter()
            .zip(upper)
            .map(|(lb, ub)| Bound::from((*lb, *ub)))
            .collect::<Vec<_>>()
            .into())
    }
    /// Returns the inner Vector of bounds.
    pub fn into_inner(self) -> Vec<Bound> {
        self.0
    }
    /// Checks that there is one bound per dimension and that every lower limit is strictly less
    /// than its upper limit.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] describing the first problem found.
    pub fn validate(&self, dimension: usize) -> Result<(), ConfigurationError> {
        if self.len() != dimension {
            return Err(ConfigurationError::DimensionMismatch {
                what: "bounds",
                expected: dimension,
                got: self.len(),
            });
        }
        for (index, bound) in self.iter().enumerate() {
            let (lower, upper) = (bound.lower(), bound.upper());
            if !(lower < upper) {
                return Err(ConfigurationError::InvalidBounds {
                    index,
                    lower,
                    upper,
                });
            }
        }
        Ok(())
    }
    /// Checks whether every coordinate of `x` lies within its bound.
    pub fn contains(&self, x: &DVector<Float>) -> bool {
        x.iter().zip(self.iter()).all(|(v, b)| b.contains(*v))
    }
    /// Clamps every coordinate of `x` into its bound in place.
    pub fn clip(&self, x: &mut DVector<Float>) {
        x.iter_mut()
            .zip(self.iter())
            .for_each(|(v, b)| *v = b.clip(*v));
    }
    /// Returns a copy of `x` with every coordinate clamped into its bound.
    pub fn clipped(&self, x: &DVector<Float>) -> DVector<Float> {
        let mut x = x.clone();
        self.clip(&mut x);
        x
    }
}

impl From<Vec<Bound>> for Bounds {
    fn from(value: Vec<Bound>) -> Self {
        Self(value)
    }
}

impl<B: Into<Bound>> FromIterator<B> for Bounds {
    fn from_iter<T: IntoIterator<Item = B>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for Bounds {
    type Item = Bound;
    type IntoIter = std::vec::IntoIter<Bound>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Deref for Bounds {
    type Target = Vec<Bound>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Bounds {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
