use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{error::ConfigurationError, Float};

/// The swarm coefficients, plus the neighborhood parameters read by
/// [`SwarmTopology::Ring`](super::SwarmTopology::Ring).
///
/// These mirror the plain key-value options mapping (`c1`, `c2`, `w`, `k`, `p`), and can be built
/// from one with [`TryFrom`]:
///
/// ```rust
/// use std::collections::HashMap;
/// use murmuration::swarms::SwarmOptions;
///
/// let map = HashMap::from([
///     ("c1".to_string(), 0.5),
///     ("c2".to_string(), 0.3),
///     ("w".to_string(), 0.9),
///     ("k".to_string(), 2.0),
///     ("p".to_string(), 2.0),
/// ]);
/// let options = SwarmOptions::try_from(&map).unwrap();
/// assert_eq!(options, SwarmOptions::new(0.5, 0.3, 0.9).with_neighbors(2, 2));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwarmOptions {
    /// The cognitive weight $`c_1`$, pulling a particle toward its personal best.
    pub c1: Float,
    /// The social weight $`c_2`$, pulling a particle toward its neighborhood best.
    pub c2: Float,
    /// The inertia weight $`w`$, scaling the previous velocity.
    pub w: Float,
    /// The number of ring neighbors (only read by the ring topology).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<usize>,
    /// The Minkowski order used to measure ring distance, `1` or `2` (only read by the ring
    /// topology).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<u32>,
}

impl SwarmOptions {
    /// Create options with the given cognitive, social, and inertia weights.
    pub const fn new(c1: Float, c2: Float, w: Float) -> Self {
        Self {
            c1,
            c2,
            w,
            k: None,
            p: None,
        }
    }
    /// Set the ring topology parameters: `k` neighbors measured with Minkowski order `p`.
    pub const fn with_neighbors(mut self, k: usize, p: u32) -> Self {
        self.k = Some(k);
        self.p = Some(p);
        self
    }
    /// Checks that the weights are finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidOption`] naming the first offending weight.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (name, value) in [("c1", self.c1), ("c2", self.c2), ("w", self.w)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::InvalidOption {
                    name,
                    value,
                    reason: "must be finite and >= 0",
                });
            }
        }
        Ok(())
    }

    fn from_lookup<F>(get: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<Float>,
    {
        let required = |name: &'static str| get(name).ok_or(ConfigurationError::MissingOption(name));
        let integral = |name: &'static str| -> Result<Option<Float>, ConfigurationError> {
            match get(name) {
                Some(value) if value.fract() != 0.0 || value < 0.0 || !value.is_finite() => {
                    Err(ConfigurationError::InvalidOption {
                        name,
                        value,
                        reason: "must be a non-negative integer",
                    })
                }
                other => Ok(other),
            }
        };
        Ok(Self {
            c1: required("c1")?,
            c2: required("c2")?,
            w: required("w")?,
            k: integral("k")?.map(|k| k as usize),
            p: integral("p")?.map(|p| p as u32),
        })
    }
}

impl TryFrom<&HashMap<String, Float>> for SwarmOptions {
    type Error = ConfigurationError;

    fn try_from(value: &HashMap<String, Float>) -> Result<Self, Self::Error> {
        Self::from_lookup(|name| value.get(name).copied())
    }
}

impl TryFrom<&BTreeMap<String, Float>> for SwarmOptions {
    type Error = ConfigurationError;

    fn try_from(value: &BTreeMap<String, Float>) -> Result<Self, Self::Error> {
        Self::from_lookup(|name| value.get(name).copied())
    }
}
