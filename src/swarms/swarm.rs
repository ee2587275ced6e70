use serde::{Deserialize, Serialize};

use crate::{
    core::Point,
    error::{ShapeError, SwarmError},
    traits::BatchCostFunction,
    DMatrix, DVector, Float,
};

use super::{topology::argmin_best, Topology};

/// A particle with a position, velocity, and best known position
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SwarmParticle {
    /// The position of the particle, with the cost it had at its last evaluation
    pub position: Point,
    /// The velocity of the particle
    pub velocity: DVector<Float>,
    /// The best position of the particle (as measured by the minimum finite value of `fx`)
    pub best: Point,
}

impl SwarmParticle {
    /// Create an unevaluated particle.
    pub fn new(position: DVector<Float>, velocity: DVector<Float>) -> Self {
        let position = Point::from(position);
        Self {
            best: position.clone(),
            position,
            velocity,
        }
    }
}

/// The mutable population of a [`PSO`](super::PSO) run.
///
/// Particle indices are fixed for the lifetime of the swarm. Besides the particles, the swarm
/// keeps the index of the particle holding each particle's neighborhood best and the index of the
/// particle holding the overall best, as of the last call to [`Swarm::update_swarm_best`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Swarm {
    /// The particles in the swarm
    pub particles: Vec<SwarmParticle>,
    /// The topology which decides which particles inform each other
    pub topology: Topology,
    nbest: Vec<usize>,
    gbest: usize,
}

impl Swarm {
    /// Build a swarm from one position and one velocity per particle.
    pub fn new(
        positions: Vec<DVector<Float>>,
        velocities: Vec<DVector<Float>>,
        topology: Topology,
    ) -> Self {
        let particles: Vec<SwarmParticle> = positions
            .into_iter()
            .zip(velocities)
            .map(|(x, v)| SwarmParticle::new(x, v))
            .collect();
        Self {
            nbest: vec![0; particles.len()],
            gbest: 0,
            particles,
            topology,
        }
    }
    /// The number of particles in the swarm.
    pub fn n_particles(&self) -> usize {
        self.particles.len()
    }
    /// The dimension of the search space.
    pub fn dimension(&self) -> usize {
        self.particles.first().map_or(0, |p| p.position.x.len())
    }
    /// The current positions of all particles, one particle per row.
    pub fn positions(&self) -> DMatrix<Float> {
        DMatrix::from_fn(self.n_particles(), self.dimension(), |i, j| {
            self.particles[i].position.x[j]
        })
    }
    /// Evaluate the whole swarm with a single call to `func`.
    ///
    /// # Errors
    ///
    /// Returns [`SwarmError::Cost`] if `func` fails and [`SwarmError::Shape`] if it does not
    /// return one cost per particle. Both carry `iteration`.
    pub fn evaluate<U, E, F>(
        &self,
        func: &F,
        args: &U,
        iteration: usize,
    ) -> Result<DVector<Float>, SwarmError<E>>
    where
        F: BatchCostFunction<U, E> + ?Sized,
    {
        let costs = func
            .evaluate_batch(&self.positions(), args)
            .map_err(|error| SwarmError::Cost { iteration, error })?;
        if costs.len() != self.n_particles() {
            return Err(ShapeError {
                iteration,
                expected: self.n_particles(),
                got: costs.len(),
            }
            .into());
        }
        Ok(costs)
    }
    /// Record `costs` at the current positions and move each particle's personal best to its
    /// position if the cost is finite and strictly lower. Returns the number of non-finite costs.
    pub fn update_personal_bests(&mut self, costs: &DVector<Float>) -> usize {
        let mut n_nonfinite = 0;
        for (particle, &cost) in self.particles.iter_mut().zip(costs.iter()) {
            particle.position.fx = Some(cost);
            if !cost.is_finite() {
                n_nonfinite += 1;
            } else if particle.best.is_improved_by(cost) {
                particle.best = particle.position.clone();
            }
        }
        n_nonfinite
    }
    /// Recompute the neighborhood best of every particle and the overall best.
    ///
    /// This only reads personal bests; positions and velocities are left alone.
    pub fn update_swarm_best(&mut self) {
        let n = self.n_particles();
        self.gbest = argmin_best(0..n, &self.particles);
        self.nbest = match self.topology {
            Topology::Global => vec![self.gbest; n],
            Topology::Ring { .. } => (0..n)
                .map(|i| self.topology.best_index(i, &self.particles))
                .collect(),
        };
    }
    /// The cost and position of the best personal best visible to particle `index`. The cost is
    /// `+inf` while none of those particles has a finite cost.
    pub fn best_for(&self, index: usize) -> (Float, &DVector<Float>) {
        let best = self.neighborhood_best(index);
        (best.cost(), &best.x)
    }
    /// The best personal best visible to particle `index`.
    pub fn neighborhood_best(&self, index: usize) -> &Point {
        &self.particles[self.nbest[index]].best
    }
    /// The lowest personal best in the whole swarm.
    pub fn global_best(&self) -> &Point {
        &self.particles[self.gbest].best
    }
}
