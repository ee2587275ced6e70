use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::{error::ConfigurationError, Float, PI};

use super::{SwarmOptions, SwarmParticle};

/// Swarm topologies which determine the flow of information
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwarmTopology {
    /// Each particle is connected to all others
    #[default]
    Global,
    /// Each particle is connected to its `k` nearest neighbors on a ring of particle indices
    /// (see [`SwarmOptions::k`] and [`SwarmOptions::p`])
    Ring,
}

/// The order of the Minkowski distance used to rank ring neighbors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Minkowski {
    /// `p = 1`: the number of steps around the ring
    Manhattan,
    /// `p = 2`: the straight-line (chord) distance between particles placed evenly on a circle
    Euclidean,
}

impl TryFrom<u32> for Minkowski {
    type Error = ConfigurationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Manhattan),
            2 => Ok(Self::Euclidean),
            _ => Err(ConfigurationError::InvalidOption {
                name: "p",
                value: value as Float,
                reason: "must be 1 or 2",
            }),
        }
    }
}

impl Minkowski {
    /// The distance between particles `i` and `j` on a ring of `n` particles.
    pub fn ring_distance(&self, i: usize, j: usize, n: usize) -> Float {
        let steps = i.abs_diff(j);
        let steps = steps.min(n - steps) as Float;
        match self {
            Self::Manhattan => steps,
            // circle of circumference n, so neighbors one step apart sit ~1 apart
            Self::Euclidean => (n as Float / PI) * Float::sin(PI * steps / n as Float),
        }
    }
}

/// A [`SwarmTopology`] resolved for a particular swarm size.
///
/// Ring neighborhoods depend only on particle indices, so they are computed once when the swarm
/// is built.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Topology {
    /// Every particle sees the whole swarm
    #[default]
    Global,
    /// Every particle sees itself and its `k` nearest ring neighbors
    Ring {
        /// The number of neighbors (not counting the particle itself)
        k: usize,
        /// The distance used to rank neighbors
        p: Minkowski,
        /// For each particle, the sorted indices of its neighborhood (itself included)
        neighborhoods: Vec<Vec<usize>>,
    },
}

impl Topology {
    /// Resolve `kind` for a swarm of `n_particles`, reading `k` and `p` from `options` when
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the ring topology is selected and `k` or `p` is
    /// missing, or `k` is not in `[1, n_particles - 1]`, or `p` is not `1` or `2`.
    pub fn new(
        kind: SwarmTopology,
        options: &SwarmOptions,
        n_particles: usize,
    ) -> Result<Self, ConfigurationError> {
        match kind {
            SwarmTopology::Global => Ok(Self::Global),
            SwarmTopology::Ring => {
                let k = options.k.ok_or(ConfigurationError::MissingOption("k"))?;
                let p = options.p.ok_or(ConfigurationError::MissingOption("p"))?;
                if k < 1 || k >= n_particles {
                    return Err(ConfigurationError::InvalidOption {
                        name: "k",
                        value: k as Float,
                        reason: "must be in [1, n_particles - 1]",
                    });
                }
                Ok(Self::ring(n_particles, k, Minkowski::try_from(p)?))
            }
        }
    }

    /// Build a ring topology. `k` must already be in `[1, n_particles - 1]`.
    pub fn ring(n_particles: usize, k: usize, p: Minkowski) -> Self {
        let neighborhoods = (0..n_particles)
            .map(|i| {
                let mut others: Vec<(Float, usize)> = (0..n_particles)
                    .filter(|&j| j != i)
                    .map(|j| (p.ring_distance(i, j, n_particles), j))
                    .collect();
                others.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                let mut neighborhood: Vec<usize> = std::iter::once(i)
                    .chain(others.into_iter().take(k).map(|(_, j)| j))
                    .collect();
                neighborhood.sort_unstable();
                neighborhood
            })
            .collect();
        Self::Ring {
            k,
            p,
            neighborhoods,
        }
    }

    /// The neighborhood of particle `index`, or [`None`] for the global topology (where it is
    /// the whole swarm).
    pub fn neighborhood(&self, index: usize) -> Option<&[usize]> {
        match self {
            Self::Global => None,
            Self::Ring { neighborhoods, .. } => neighborhoods.get(index).map(Vec::as_slice),
        }
    }

    /// The index of the particle whose personal best is the best one visible to particle
    /// `index`. Ties go to the lowest index.
    pub fn best_index(&self, index: usize, particles: &[SwarmParticle]) -> usize {
        match self.neighborhood(index) {
            Some(neighborhood) => argmin_best(neighborhood.iter().copied(), particles),
            None => argmin_best(0..particles.len(), particles),
        }
    }
}

/// The index with the lowest personal best among `indices`, keeping the first one seen on ties.
pub(crate) fn argmin_best<I>(indices: I, particles: &[SwarmParticle]) -> usize
where
    I: IntoIterator<Item = usize>,
{
    let mut indices = indices.into_iter();
    let first = indices.next().unwrap_or(0);
    indices.fold(first, |best, i| {
        if particles[i].best.total_cmp(&particles[best].best) == Ordering::Less {
            i
        } else {
            best
        }
    })
}
