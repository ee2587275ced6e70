//! Error types for the particle swarm optimizer.
//!
//! Configuration problems are reported before the cost function is ever called. Errors raised
//! while the swarm is running carry the iteration at which they occurred.

use std::convert::Infallible;

use thiserror::Error;

use crate::Float;

/// Invalid or incomplete swarm, topology, or bounds configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// The swarm needs at least one particle.
    #[error("number of particles must be at least 1 (got {n_particles})")]
    NoParticles {
        /// The invalid number of particles
        n_particles: usize,
    },

    /// The search space needs at least one dimension.
    #[error("dimension must be at least 1 (got {dimension})")]
    NoDimensions {
        /// The invalid dimension
        dimension: usize,
    },

    /// A key required by the options (or by the selected topology) is absent.
    #[error("missing required option \"{0}\"")]
    MissingOption(&'static str),

    /// An option has a value outside of its domain.
    #[error("invalid value for option \"{name}\": {value} ({reason})")]
    InvalidOption {
        /// The name of the option
        name: &'static str,
        /// The offending value
        value: Float,
        /// What the value should have been
        reason: &'static str,
    },

    /// Something which needs one entry per dimension has the wrong length.
    #[error("{what} has {got} entries, expected {expected}")]
    DimensionMismatch {
        /// What was being checked
        what: &'static str,
        /// The expected length
        expected: usize,
        /// The actual length
        got: usize,
    },

    /// A lower bound is not strictly less than its upper bound.
    #[error("invalid bounds at index {index}: lower ({lower}) must be less than upper ({upper})")]
    InvalidBounds {
        /// Index of the invalid bound pair
        index: usize,
        /// The lower bound value
        lower: Float,
        /// The upper bound value
        upper: Float,
    },

    /// A velocity clamp entry is not strictly positive.
    #[error("invalid velocity clamp at index {index}: {value} (must be > 0)")]
    InvalidVelocityClamp {
        /// Index of the invalid entry
        index: usize,
        /// The invalid value
        value: Float,
    },

    /// Custom initial positions do not match the number of particles.
    #[error("got {got} initial positions for {expected} particles")]
    ParticleCountMismatch {
        /// The number of particles in the swarm
        expected: usize,
        /// The number of positions given
        got: usize,
    },
}

impl ConfigurationError {
    /// Returns `true` if this is a bounds-related error.
    pub const fn is_bounds_error(&self) -> bool {
        matches!(self, Self::InvalidBounds { .. })
    }

    /// Returns `true` if this error concerns the [`SwarmOptions`](crate::swarms::SwarmOptions).
    pub const fn is_options_error(&self) -> bool {
        matches!(self, Self::MissingOption(_) | Self::InvalidOption { .. })
    }
}

/// The cost function returned a batch whose length does not match the number of particles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cost function returned {got} values for {expected} particles at iteration {iteration}")]
pub struct ShapeError {
    /// The iteration at which the mismatch occurred
    pub iteration: usize,
    /// The number of particles in the swarm
    pub expected: usize,
    /// The number of costs returned
    pub got: usize,
}

/// Any error which ends an optimization run without a result.
///
/// `E` is the error type of the user's [`BatchCostFunction`](crate::traits::BatchCostFunction).
#[derive(Debug, Error)]
pub enum SwarmError<E = Infallible> {
    /// The configuration was rejected before the swarm was initialized.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The cost function returned a batch of the wrong size.
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// The cost function itself failed.
    #[error("cost function failed at iteration {iteration}: {error}")]
    Cost {
        /// The iteration at which the cost function failed
        iteration: usize,
        /// The error returned by the cost function
        error: E,
    },
}

impl<E> SwarmError<E> {
    /// The iteration at which the run was aborted, or [`None`] if the swarm never started.
    pub const fn iteration(&self) -> Option<usize> {
        match self {
            Self::Configuration(_) => None,
            Self::Shape(err) => Some(err.iteration),
            Self::Cost { iteration, .. } => Some(*iteration),
        }
    }

    /// Returns `true` if this is a [`ConfigurationError`].
    pub const fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns `true` if this is a [`ShapeError`].
    pub const fn is_shape_error(&self) -> bool {
        matches!(self, Self::Shape(_))
    }
}
