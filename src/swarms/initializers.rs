use fastrand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    core::{utils::generate_random_vector_in_limits, utils::SampleFloat, Bounds},
    error::ConfigurationError,
    DVector, Float,
};

/// The range used for coordinates which have no bound.
pub const DEFAULT_SAMPLING_RANGE: (Float, Float) = (-1.0, 1.0);

/// The per-dimension intervals from which initial values are drawn: the bounds where they are
/// finite, [`DEFAULT_SAMPLING_RANGE`] elsewhere.
pub fn sampling_limits(dimension: usize, bounds: Option<&Bounds>) -> Vec<(Float, Float)> {
    bounds.map_or_else(
        || vec![DEFAULT_SAMPLING_RANGE; dimension],
        |bounds| {
            bounds
                .iter()
                .map(|b| b.sampling_range(DEFAULT_SAMPLING_RANGE))
                .collect()
        },
    )
}

fn validate_limits(
    what: &'static str,
    limits: &[(Float, Float)],
    dimension: usize,
) -> Result<(), ConfigurationError> {
    if limits.len() != dimension {
        return Err(ConfigurationError::DimensionMismatch {
            what,
            expected: dimension,
            got: limits.len(),
        });
    }
    for (index, &(lower, upper)) in limits.iter().enumerate() {
        if !(lower < upper) || !lower.is_finite() || !upper.is_finite() {
            return Err(ConfigurationError::InvalidBounds {
                index,
                lower,
                upper,
            });
        }
    }
    Ok(())
}

/// Methods to initialize the positions of particles in a swarm.
///
/// Whatever the method, the resulting positions are clipped to the bounds of the problem.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum SwarmPositionInitializer {
    /// Uniformly random within the bounds, or within [`DEFAULT_SAMPLING_RANGE`] for
    /// coordinates without them
    #[default]
    Uniform,
    /// Start all particles at the origin
    Zero,
    /// Uniformly random within the given limits for each dimension
    RandomInLimits(Vec<(Float, Float)>),
    /// Latin Hypercube sampling over the same region as [`SwarmPositionInitializer::Uniform`]
    LatinHypercube,
    /// One given position per particle
    Custom(Vec<DVector<Float>>),
}

impl SwarmPositionInitializer {
    /// Checks that the initializer can produce `n_particles` positions of length `dimension`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if limits or custom positions have the wrong shape, or if
    /// a limit is empty or not finite.
    pub fn validate(&self, n_particles: usize, dimension: usize) -> Result<(), ConfigurationError> {
        match self {
            Self::RandomInLimits(limits) => validate_limits("position limits", limits, dimension),
            Self::Custom(positions) => {
                if positions.len() != n_particles {
                    return Err(ConfigurationError::ParticleCountMismatch {
                        expected: n_particles,
                        got: positions.len(),
                    });
                }
                if let Some(position) = positions.iter().find(|p| p.len() != dimension) {
                    return Err(ConfigurationError::DimensionMismatch {
                        what: "initial position",
                        expected: dimension,
                        got: position.len(),
                    });
                }
                Ok(())
            }
            Self::Uniform | Self::Zero | Self::LatinHypercube => Ok(()),
        }
    }

    /// Generate the initial positions. The initializer must have passed
    /// [`SwarmPositionInitializer::validate`].
    pub fn positions(
        &self,
        n_particles: usize,
        dimension: usize,
        bounds: Option<&Bounds>,
        rng: &mut Rng,
    ) -> Vec<DVector<Float>> {
        let mut positions: Vec<DVector<Float>> = match self {
            Self::Uniform => {
                let limits = sampling_limits(dimension, bounds);
                (0..n_particles)
                    .map(|_| generate_random_vector_in_limits(&limits, rng))
                    .collect()
            }
            Self::Zero => (0..n_particles).map(|_| DVector::zeros(dimension)).collect(),
            Self::RandomInLimits(limits) => (0..n_particles)
                .map(|_| generate_random_vector_in_limits(limits, rng))
                .collect(),
            Self::LatinHypercube => {
                let limits = sampling_limits(dimension, bounds);
                let mut positions = vec![DVector::zeros(dimension); n_particles];
                for (d, (min, max)) in limits.iter().enumerate() {
                    let bin_size = (max - min) / n_particles as Float;
                    let mut bins: Vec<usize> = (0..n_particles).collect();
                    rng.shuffle(&mut bins);
                    for (position, &bin) in positions.iter_mut().zip(bins.iter()) {
                        let lower = min + bin as Float * bin_size;
                        position[d] = rng.range(lower, lower + bin_size);
                    }
                }
                positions
            }
            Self::Custom(positions) => positions.clone(),
        };
        if let Some(bounds) = bounds {
            positions.iter_mut().for_each(|x| bounds.clip(x));
        }
        positions
    }
}

/// Methods for setting the initial velocity of particles in a swarm
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum SwarmVelocityInitializer {
    /// Initialize all velocities to zero
    #[default]
    Zero,
    /// Initialize velocities uniformly within the given limits
    RandomInLimits(Vec<(Float, Float)>),
    /// Initialize velocities uniformly within `±fraction` of the width of the region positions
    /// are seeded in (see [`sampling_limits`])
    Scaled(Float),
}

impl SwarmVelocityInitializer {
    /// Checks that the initializer can produce velocities of length `dimension`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if limits have the wrong shape or if the fraction of
    /// [`SwarmVelocityInitializer::Scaled`] is not finite and positive.
    pub fn validate(&self, dimension: usize) -> Result<(), ConfigurationError> {
        match self {
            Self::Zero => Ok(()),
            Self::RandomInLimits(limits) => validate_limits("velocity limits", limits, dimension),
            Self::Scaled(fraction) => {
                if fraction.is_finite() && *fraction > 0.0 {
                    Ok(())
                } else {
                    Err(ConfigurationError::InvalidOption {
                        name: "velocity fraction",
                        value: *fraction,
                        reason: "must be finite and > 0",
                    })
                }
            }
        }
    }

    /// Generate the initial velocities. The initializer must have passed
    /// [`SwarmVelocityInitializer::validate`].
    pub fn velocities(
        &self,
        n_particles: usize,
        dimension: usize,
        bounds: Option<&Bounds>,
        rng: &mut Rng,
    ) -> Vec<DVector<Float>> {
        match self {
            Self::Zero => (0..n_particles).map(|_| DVector::zeros(dimension)).collect(),
            Self::RandomInLimits(limits) => (0..n_particles)
                .map(|_| generate_random_vector_in_limits(limits, rng))
                .collect(),
            Self::Scaled(fraction) => {
                let limits: Vec<(Float, Float)> = sampling_limits(dimension, bounds)
                    .into_iter()
                    .map(|(lower, upper)| {
                        let half_width = fraction * (upper - lower);
                        (-half_width, half_width)
                    })
                    .collect();
                (0..n_particles)
                    .map(|_| generate_random_vector_in_limits(&limits, rng))
                    .collect()
            }
        }
    }
}
