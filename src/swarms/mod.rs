//! Particle swarm optimization.
//!
//! [`PSO`] drives a [`Swarm`] of [`SwarmParticle`]s through a fixed number of iterations. The
//! [`Topology`] decides which particles inform each other, the [`SwarmOptions`] hold the
//! coefficients of the velocity update, and the [`SwarmStatus`] is what observers get to see
//! after each iteration.

/// Position and velocity initializers.
pub mod initializers;
/// Swarm coefficients and their construction from key-value mappings.
pub mod options;
/// Module containing standard particle swarm optimization.
pub mod pso;
/// The swarm population.
pub mod swarm;
/// The state of a run as seen by observers.
pub mod swarm_status;
/// Global and ring topologies.
pub mod topology;

pub use initializers::{SwarmPositionInitializer, SwarmVelocityInitializer};
pub use options::SwarmOptions;
pub use pso::{PSOConfig, PSO};
pub use swarm::{Swarm, SwarmParticle};
pub use swarm_status::SwarmStatus;
pub use topology::{Minkowski, SwarmTopology, Topology};
