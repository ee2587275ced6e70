use std::{
    ops::ControlFlow,
    sync::Arc,
    time::{Duration, Instant},
};

use fastrand::Rng;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::{
    Swarm, SwarmOptions, SwarmPositionInitializer, SwarmStatus, SwarmTopology,
    SwarmVelocityInitializer, Topology,
};
use crate::{
    core::{utils::SampleFloat, Bound, Bounds, NopAbortSignal, OptimizationResult},
    error::{ConfigurationError, SwarmError},
    traits::{AbortSignal, BatchCostFunction, SwarmObserver},
    DVector, Float,
};

/// Everything that defines a [`PSO`] run apart from the cost function and the iteration budget.
///
/// This is plain data: it can be (de)serialized, and nothing is checked until
/// [`PSOConfig::validate`] runs at the start of [`PSO::optimize`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PSOConfig {
    /// The number of particles in the swarm
    pub n_particles: usize,
    /// The dimension of the search space
    pub dimension: usize,
    /// The swarm coefficients and ring parameters
    pub options: SwarmOptions,
    /// Which particles inform each other
    #[serde(default)]
    pub topology: SwarmTopology,
    /// Box constraints, enforced by clipping
    #[serde(default)]
    pub bounds: Option<Bounds>,
    /// The maximum absolute velocity in each dimension
    #[serde(default)]
    pub velocity_clamp: Option<Vec<Float>>,
    /// How initial positions are generated
    #[serde(default)]
    pub position_initializer: SwarmPositionInitializer,
    /// How initial velocities are generated
    #[serde(default)]
    pub velocity_initializer: SwarmVelocityInitializer,
    /// Relative tolerance on the best cost and the number of consecutive iterations it must hold
    /// for the run to stop early
    #[serde(default)]
    pub ftol: Option<(Float, usize)>,
    /// Wall-clock limit for a run
    #[serde(default)]
    pub max_duration: Option<Duration>,
    /// Seed of the random number stream (drawn from entropy if absent)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl PSOConfig {
    /// Create a configuration with the default topology, initializers, and no bounds.
    pub const fn new(n_particles: usize, dimension: usize, options: SwarmOptions) -> Self {
        Self {
            n_particles,
            dimension,
            options,
            topology: SwarmTopology::Global,
            bounds: None,
            velocity_clamp: None,
            position_initializer: SwarmPositionInitializer::Uniform,
            velocity_initializer: SwarmVelocityInitializer::Zero,
            ftol: None,
            max_duration: None,
            seed: None,
        }
    }

    /// Check the whole configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigurationError`] found. Sizes are checked first, then options and
    /// topology, then bounds, velocity clamp, tolerance, and initializers.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.n_particles < 1 {
            return Err(ConfigurationError::NoParticles {
                n_particles: self.n_particles,
            });
        }
        if self.dimension < 1 {
            return Err(ConfigurationError::NoDimensions {
                dimension: self.dimension,
            });
        }
        self.options.validate()?;
        Topology::new(self.topology, &self.options, self.n_particles)?;
        if let Some(bounds) = &self.bounds {
            bounds.validate(self.dimension)?;
        }
        if let Some(v_max) = &self.velocity_clamp {
            if v_max.len() != self.dimension {
                return Err(ConfigurationError::DimensionMismatch {
                    what: "velocity clamp",
                    expected: self.dimension,
                    got: v_max.len(),
                });
            }
            if let Some((index, &value)) = v_max.iter().enumerate().find(|(_, v)| !(**v > 0.0)) {
                return Err(ConfigurationError::InvalidVelocityClamp { index, value });
            }
        }
        if let Some((ftol, ftol_iter)) = self.ftol {
            if !ftol.is_finite() || ftol < 0.0 {
                return Err(ConfigurationError::InvalidOption {
                    name: "ftol",
                    value: ftol,
                    reason: "must be finite and >= 0",
                });
            }
            if ftol_iter < 1 {
                return Err(ConfigurationError::InvalidOption {
                    name: "ftol_iter",
                    value: ftol_iter as Float,
                    reason: "must be at least 1",
                });
            }
        }
        self.position_initializer
            .validate(self.n_particles, self.dimension)?;
        self.velocity_initializer.validate(self.dimension)
    }
}

/// Particle Swarm Optimizer
///
/// The PSO algorithm involves an ensemble of particles which are aware of the position of all or
/// nearby particles in the swarm. Every iteration, the whole swarm is evaluated with one call to
/// the [`BatchCostFunction`], personal and neighborhood bests are updated, and then each
/// particle's velocity is updated as follows:
///
/// ```math
/// v_i^{t+1} = \omega v_i^t + c_1 r_{1,i}^{t+1}(p^t_i - x^t_i) + c_2 r_{2,i}^{t+1}(g^t_i - x^t_i)
/// ```
/// where $`r_1`$ and $`r_2`$ are uniformly distributed random vectors in $`[0,1)`$, $`\omega`$ is
/// an inertial weight parameter, $`c_1`$ and $`c_2`$ are cognitive and social weights
/// respectively, $`p_i^t`$ is the particle's personal best position, and $`g_i^t`$ is the best
/// position in the particle's neighborhood (the whole swarm for [`SwarmTopology::Global`]). The
/// velocity is optionally clamped, added to the position, and the position is clipped to the
/// bounds. See [^1] for more information.
///
/// All random numbers come from a single stream owned by the optimizer, so two optimizers built
/// with the same seed and configuration produce identical runs.
///
/// [^1]: [Houssein, E. H., Gad, A. G., Hussain, K., & Suganthan, P. N. (2021). Major Advances in Particle Swarm Optimization: Theory, Analysis, and Application. In Swarm and Evolutionary Computation (Vol. 63, p. 100868). Elsevier BV.](https://doi.org/10.1016/j.swevo.2021.100868)
pub struct PSO {
    config: PSOConfig,
    rng: Rng,
    observers: Vec<Arc<RwLock<dyn SwarmObserver>>>,
    abort_signal: Box<dyn AbortSignal>,
    status: SwarmStatus,
}

impl PSO {
    /// Construct a new particle swarm optimizer with `n_particles` particles working in a
    /// `dimension` dimensional space.
    pub fn new(n_particles: usize, dimension: usize, options: SwarmOptions) -> Self {
        Self::from_config(PSOConfig::new(n_particles, dimension, options))
    }
    /// Construct a particle swarm optimizer from a full [`PSOConfig`].
    pub fn from_config(config: PSOConfig) -> Self {
        let rng = config.seed.map_or_else(Rng::new, Rng::with_seed);
        Self {
            config,
            rng,
            observers: Vec::default(),
            abort_signal: Box::new(NopAbortSignal),
            status: SwarmStatus::default(),
        }
    }
    /// Seed the random number stream.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self.rng = Rng::with_seed(seed);
        self
    }
    /// Sets the [`Bound`]s of the search space, one per dimension. Individual upper or lower
    /// bounds can be left open by setting them to `Float::INFINITY` or `Float::NEG_INFINITY`.
    pub fn with_bounds<I: IntoIterator<Item = B>, B: Into<Bound>>(mut self, bounds: I) -> Self {
        self.config.bounds = Some(bounds.into_iter().collect());
        self
    }
    /// Sets the topology used by the swarm (default = [`SwarmTopology::Global`]).
    pub const fn with_topology(mut self, topology: SwarmTopology) -> Self {
        self.config.topology = topology;
        self
    }
    /// Clamp each velocity coordinate to `[-v_max[d], v_max[d]]`.
    pub fn with_velocity_clamp<I: IntoIterator<Item = Float>>(mut self, v_max: I) -> Self {
        self.config.velocity_clamp = Some(v_max.into_iter().collect());
        self
    }
    /// Sets the method used to initialize positions (default = [`SwarmPositionInitializer::Uniform`]).
    pub fn with_position_initializer(mut self, initializer: SwarmPositionInitializer) -> Self {
        self.config.position_initializer = initializer;
        self
    }
    /// Sets the method used to initialize velocities (default = [`SwarmVelocityInitializer::Zero`]).
    pub fn with_velocity_initializer(mut self, initializer: SwarmVelocityInitializer) -> Self {
        self.config.velocity_initializer = initializer;
        self
    }
    /// Stop once the best cost changes by less than `ftol * (1 + |previous best|)` for `ftol_iter`
    /// consecutive iterations.
    pub const fn with_ftol(mut self, ftol: Float, ftol_iter: usize) -> Self {
        self.config.ftol = Some((ftol, ftol_iter));
        self
    }
    /// Stop at the first iteration which starts after `max_duration` has elapsed.
    pub const fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.config.max_duration = Some(max_duration);
        self
    }
    /// Adds a single [`SwarmObserver`] to the optimizer.
    pub fn with_observer(mut self, observer: Arc<RwLock<dyn SwarmObserver>>) -> Self {
        self.observers.push(observer);
        self
    }
    /// Sets the [`AbortSignal`] checked at the top of every iteration.
    pub fn with_abort_signal<A: AbortSignal + 'static>(mut self, abort_signal: A) -> Self {
        self.abort_signal = Box::new(abort_signal);
        self
    }
    /// The configuration of the optimizer.
    pub const fn config(&self) -> &PSOConfig {
        &self.config
    }
    /// The status at the end of the last run.
    pub const fn status(&self) -> &SwarmStatus {
        &self.status
    }

    fn initialize_swarm(&mut self, topology: Topology) -> Swarm {
        let PSOConfig {
            n_particles,
            dimension,
            ..
        } = self.config;
        let bounds = self.config.bounds.as_ref();
        let positions =
            self.config
                .position_initializer
                .positions(n_particles, dimension, bounds, &mut self.rng);
        let mut velocities =
            self.config
                .velocity_initializer
                .velocities(n_particles, dimension, bounds, &mut self.rng);
        if let Some(v_max) = &self.config.velocity_clamp {
            velocities.iter_mut().for_each(|v| clamp_velocity(v, v_max));
        }
        Swarm::new(positions, velocities, topology)
    }

    fn update_swarm(&mut self) {
        let Self {
            config,
            rng,
            status,
            ..
        } = self;
        let swarm = &mut status.swarm;
        let SwarmOptions { c1, c2, w, .. } = config.options;
        let nbests: Vec<DVector<Float>> = (0..swarm.n_particles())
            .map(|i| swarm.best_for(i).1.clone())
            .collect();
        for (particle, nbest) in swarm.particles.iter_mut().zip(nbests) {
            let dim = particle.position.x.len();
            let rv1 = DVector::from_fn(dim, |_, _| rng.float());
            let rv2 = DVector::from_fn(dim, |_, _| rng.float());
            particle.velocity = particle.velocity.scale(w)
                + rv1
                    .component_mul(&(&particle.best.x - &particle.position.x))
                    .scale(c1)
                + rv2
                    .component_mul(&(nbest - &particle.position.x))
                    .scale(c2);
            if let Some(v_max) = &config.velocity_clamp {
                clamp_velocity(&mut particle.velocity, v_max);
            }
            let mut new_position = &particle.position.x + &particle.velocity;
            if let Some(bounds) = &config.bounds {
                bounds.clip(&mut new_position);
            }
            particle.position.set_position(new_position);
        }
    }

    /// Minimize `func` with a swarm, running exactly `iters` iterations unless the run is ended
    /// early by an [`AbortSignal`], an observer, the time limit, or the `ftol` criterion.
    ///
    /// `args` is passed unchanged to every call of `func`. Each iteration evaluates the swarm,
    /// updates personal and neighborhood bests, moves the particles, records the best cost, and
    /// then calls every [`SwarmObserver`]. The returned result holds the best point ever
    /// observed, so its cost is the minimum of its cost history.
    ///
    /// # Errors
    ///
    /// Returns [`SwarmError::Configuration`] before `func` is ever called if the configuration is
    /// invalid. Returns [`SwarmError::Shape`] if `func` does not return one cost per particle
    /// and [`SwarmError::Cost`] if `func` fails; both carry the iteration index and end the run
    /// without a result.
    pub fn optimize<U, E, F>(
        &mut self,
        func: &F,
        iters: usize,
        args: &U,
    ) -> Result<OptimizationResult, SwarmError<E>>
    where
        F: BatchCostFunction<U, E> + ?Sized,
    {
        self.config.validate()?;
        let topology = Topology::new(
            self.config.topology,
            &self.config.options,
            self.config.n_particles,
        )?;
        let swarm = self.initialize_swarm(topology);
        log::debug!(
            "initialized swarm: {} particles, {} dimensions, {:?} topology",
            self.config.n_particles,
            self.config.dimension,
            self.config.topology
        );
        self.status = SwarmStatus::new(swarm);
        self.status.update_message("Running");
        self.abort_signal.reset();
        let start = Instant::now();
        let n_particles = self.config.n_particles;
        let mut ftol_count = 0;
        let mut message = format!("Maximum number of iterations reached ({iters})");
        for iteration in 0..iters {
            if self.abort_signal.is_aborted() {
                message = "Abort signal received".to_string();
                break;
            }
            if self
                .config
                .max_duration
                .is_some_and(|max_duration| start.elapsed() >= max_duration)
            {
                message = "Time limit reached".to_string();
                break;
            }
            let costs = self.status.swarm.evaluate(func, args, iteration)?;
            self.status.n_f_evals += n_particles;
            let n_nonfinite = self.status.swarm.update_personal_bests(&costs);
            if n_nonfinite > 0 {
                log::warn!(
                    "{n_nonfinite} of {n_particles} particles returned a non-finite cost at iteration {iteration}"
                );
                self.status.n_nonfinite += n_nonfinite;
            }
            self.status.swarm.update_swarm_best();
            let previous = self.status.best_cost();
            self.status.update_best();
            self.update_swarm();
            let best = self.status.best_cost();
            self.status.cost_history.push(best);
            self.status.iteration = iteration + 1;
            log::trace!("iteration {iteration}: best cost {best:e}");

            let mut flow = ControlFlow::Continue(());
            for observer in &self.observers {
                if observer
                    .write()
                    .callback(iteration, &self.status)
                    .is_break()
                {
                    flow = ControlFlow::Break(());
                }
            }
            if flow.is_break() {
                message = "Observer requested termination".to_string();
                break;
            }
            if let Some((ftol, ftol_iter)) = self.config.ftol {
                if (previous - best).abs() < ftol * (1.0 + previous.abs()) {
                    ftol_count += 1;
                } else {
                    ftol_count = 0;
                }
                if ftol_count >= ftol_iter {
                    message = "Relative cost change below ftol".to_string();
                    break;
                }
            }
        }
        self.status.update_message(&message);
        let (position, cost) = self.status.gbest.clone().destructure();
        log::info!(
            "{message}: best cost {cost:e} after {} iterations",
            self.status.iteration
        );
        Ok(OptimizationResult {
            cost,
            position,
            cost_history: self.status.cost_history.clone(),
            iterations: self.status.iteration,
            cost_evals: self.status.n_f_evals,
            n_nonfinite: self.status.n_nonfinite,
            message,
            bounds: self.config.bounds.clone(),
        })
    }
}

fn clamp_velocity(velocity: &mut DVector<Float>, v_max: &[Float]) {
    velocity
        .iter_mut()
        .zip(v_max)
        .for_each(|(v, m)| *v = v.clamp(-m, *m));
}

#[cfg(test)]
mod tests {
    use std::{
        cell::Cell,
        collections::HashMap,
        convert::Infallible,
        ops::ControlFlow,
        sync::Arc,
        time::Duration,
    };

    use approx::assert_relative_eq;
    use nalgebra::dvector;
    use parking_lot::RwLock;

    use super::*;
    use crate::{
        core::{Args, AtomicAbortSignal},
        error::ShapeError,
        test_functions::{Rastrigin, Sphere},
        DMatrix,
    };

    fn options() -> SwarmOptions {
        SwarmOptions::new(0.5, 0.3, 0.9)
    }

    struct Counted<F> {
        func: F,
        calls: Cell<usize>,
    }
    impl<F> Counted<F> {
        const fn new(func: F) -> Self {
            Self {
                func,
                calls: Cell::new(0),
            }
        }
    }
    impl<F: BatchCostFunction> BatchCostFunction for Counted<F> {
        fn evaluate_batch(
            &self,
            x: &DMatrix<Float>,
            args: &(),
        ) -> Result<DVector<Float>, Infallible> {
            self.calls.set(self.calls.get() + 1);
            self.func.evaluate_batch(x, args)
        }
    }

    struct DropsOne;
    impl BatchCostFunction for DropsOne {
        fn evaluate_batch(
            &self,
            x: &DMatrix<Float>,
            _args: &(),
        ) -> Result<DVector<Float>, Infallible> {
            Ok(DVector::zeros(x.nrows() - 1))
        }
    }

    /// Sphere, but NaN in the right half-plane.
    struct NanRight;
    impl BatchCostFunction for NanRight {
        fn evaluate_batch(
            &self,
            x: &DMatrix<Float>,
            _args: &(),
        ) -> Result<DVector<Float>, Infallible> {
            Ok(DVector::from_iterator(
                x.nrows(),
                x.row_iter().map(|row| {
                    if row[0] > 0.5 {
                        Float::NAN
                    } else {
                        row.iter().map(|v| v * v).sum()
                    }
                }),
            ))
        }
    }

    struct RecordsArgs {
        seen: RwLock<Vec<Args>>,
    }
    impl BatchCostFunction<Args> for RecordsArgs {
        fn evaluate_batch(
            &self,
            x: &DMatrix<Float>,
            args: &Args,
        ) -> Result<DVector<Float>, Infallible> {
            self.seen.write().push(args.clone());
            let center = args.get_or("center", 0.0);
            let scale = args.positional(0).unwrap_or(1.0);
            Ok(DVector::from_iterator(
                x.nrows(),
                x.row_iter()
                    .map(|row| scale * row.iter().map(|v| (v - center).powi(2)).sum::<Float>()),
            ))
        }
    }

    struct BoundsChecker {
        bounds: Bounds,
        violations: usize,
        iterations: usize,
    }
    impl SwarmObserver for BoundsChecker {
        fn callback(&mut self, _iteration: usize, status: &SwarmStatus) -> ControlFlow<()> {
            self.iterations += 1;
            self.violations += status
                .swarm
                .particles
                .iter()
                .filter(|p| !self.bounds.contains(&p.position.x) || !self.bounds.contains(&p.best.x))
                .count();
            ControlFlow::Continue(())
        }
    }

    struct StopAt(usize);
    impl SwarmObserver for StopAt {
        fn callback(&mut self, iteration: usize, _status: &SwarmStatus) -> ControlFlow<()> {
            if iteration + 1 >= self.0 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }
    }

    struct AbortAt {
        iteration: usize,
        signal: Arc<AtomicAbortSignal>,
    }
    impl SwarmObserver for AbortAt {
        fn callback(&mut self, iteration: usize, _status: &SwarmStatus) -> ControlFlow<()> {
            if iteration + 1 == self.iteration {
                self.signal.abort();
            }
            ControlFlow::Continue(())
        }
    }

    struct PersonalBestMonitor {
        previous: Option<Vec<Float>>,
        regressions: usize,
        shared_best_mismatches: usize,
    }
    impl SwarmObserver for PersonalBestMonitor {
        fn callback(&mut self, _iteration: usize, status: &SwarmStatus) -> ControlFlow<()> {
            let bests: Vec<Float> = status
                .swarm
                .particles
                .iter()
                .map(|p| p.best.cost())
                .collect();
            if let Some(previous) = &self.previous {
                self.regressions += bests
                    .iter()
                    .zip(previous)
                    .filter(|(now, before)| now > before)
                    .count();
            }
            self.previous = Some(bests);
            let (cost, x) = status.swarm.best_for(0);
            self.shared_best_mismatches += (1..status.swarm.n_particles())
                .filter(|&i| {
                    let (cost_i, x_i) = status.swarm.best_for(i);
                    cost_i.to_bits() != cost.to_bits() || x_i != x
                })
                .count();
            ControlFlow::Continue(())
        }
    }

    #[test]
    fn test_sphere_converges() {
        let mut pso = PSO::new(10, 2, options()).with_seed(0);
        let result = pso.optimize(&Sphere, 1000, &()).unwrap();
        assert!(result.cost < 1e-10);
        assert_eq!(result.cost_history.len(), 1000);
        assert_eq!(result.iterations, 1000);
        assert_eq!(result.cost_evals, 10_000);
        assert_eq!(result.message, "Maximum number of iterations reached (1000)");
        assert_relative_eq!(
            result.cost,
            result.position.iter().map(|v| v * v).sum::<Float>(),
            epsilon = Float::EPSILON
        );
    }

    #[test]
    fn test_bounded_rastrigin() {
        let results: Vec<OptimizationResult> = (0..8)
            .map(|seed| {
                PSO::new(10, 2, options())
                    .with_seed(seed)
                    .with_bounds([(-5.12, 5.12); 2])
                    .optimize(&Rastrigin, 1000, &())
                    .unwrap()
            })
            .collect();
        for result in &results {
            assert!(result.position.iter().all(|v| (-5.12..=5.12).contains(v)));
        }
        let best = results
            .iter()
            .min_by(|a, b| a.cost.total_cmp(&b.cost))
            .unwrap();
        assert!(best.cost < 1e-6);
        assert_relative_eq!(best.position, dvector![0.0, 0.0], epsilon = 1e-3);
    }

    #[test]
    fn test_bounds_hold_every_iteration() {
        let bounds = Bounds::from_lower_upper(&[-5.12, -5.12], &[5.12, 5.12]).unwrap();
        let checker = Arc::new(RwLock::new(BoundsChecker {
            bounds: bounds.clone(),
            violations: 0,
            iterations: 0,
        }));
        // large velocities push particles into the walls
        let mut pso = PSO::new(10, 2, SwarmOptions::new(2.0, 2.0, 1.0))
            .with_seed(3)
            .with_bounds(bounds)
            .with_velocity_initializer(SwarmVelocityInitializer::Scaled(1.0))
            .with_observer(checker.clone());
        pso.optimize(&Rastrigin, 200, &()).unwrap();
        assert_eq!(checker.read().iterations, 200);
        assert_eq!(checker.read().violations, 0);
    }

    #[test]
    fn test_wrong_length_is_a_shape_error() {
        let mut pso = PSO::new(10, 2, options()).with_seed(0);
        let err = pso.optimize(&DropsOne, 100, &()).unwrap_err();
        assert!(err.is_shape_error());
        assert_eq!(err.iteration(), Some(0));
        match err {
            SwarmError::Shape(ShapeError { expected, got, .. }) => {
                assert_eq!((expected, got), (10, 9));
            }
            other => panic!("expected a shape error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_options_fail_before_evaluation() {
        let map: HashMap<String, Float> =
            HashMap::from([("c2".to_string(), 0.3), ("w".to_string(), 0.9)]);
        assert_eq!(
            SwarmOptions::try_from(&map),
            Err(ConfigurationError::MissingOption("c1"))
        );
        let counted = Counted::new(Sphere);
        let mut pso = PSO::new(10, 2, SwarmOptions::new(-0.5, 0.3, 0.9));
        let err = pso.optimize(&counted, 100, &()).unwrap_err();
        assert!(err.is_configuration_error());
        assert_eq!(err.iteration(), None);
        assert_eq!(counted.calls.get(), 0);
    }

    fn configuration_error(mut pso: PSO) -> ConfigurationError {
        let counted = Counted::new(Sphere);
        let err = match pso.optimize(&counted, 10, &()) {
            Err(SwarmError::Configuration(err)) => err,
            other => panic!("expected a configuration error, got {other:?}"),
        };
        assert_eq!(counted.calls.get(), 0);
        err
    }

    #[test]
    fn test_configuration_errors() {
        assert!(matches!(
            configuration_error(PSO::new(0, 2, options())),
            ConfigurationError::NoParticles { n_particles: 0 }
        ));
        assert!(matches!(
            configuration_error(PSO::new(10, 0, options())),
            ConfigurationError::NoDimensions { dimension: 0 }
        ));
        assert_eq!(
            configuration_error(PSO::new(10, 2, options()).with_topology(SwarmTopology::Ring)),
            ConfigurationError::MissingOption("k")
        );
        assert!(configuration_error(
            PSO::new(10, 2, options().with_neighbors(10, 2)).with_topology(SwarmTopology::Ring)
        )
        .is_options_error());
        assert!(configuration_error(
            PSO::new(10, 2, options().with_neighbors(3, 3)).with_topology(SwarmTopology::Ring)
        )
        .is_options_error());
        assert!(matches!(
            configuration_error(PSO::new(10, 2, options()).with_bounds([(-1.0, 1.0)])),
            ConfigurationError::DimensionMismatch { what: "bounds", .. }
        ));
        assert!(configuration_error(
            PSO::new(10, 2, options()).with_bounds([(-1.0, 1.0), (1.0, -1.0)])
        )
        .is_bounds_error());
        assert!(matches!(
            configuration_error(PSO::new(10, 2, options()).with_velocity_clamp([1.0, 0.0])),
            ConfigurationError::InvalidVelocityClamp { index: 1, .. }
        ));
        assert!(matches!(
            configuration_error(PSO::new(3, 2, options()).with_position_initializer(
                SwarmPositionInitializer::Custom(vec![dvector![0.0, 0.0]])
            )),
            ConfigurationError::ParticleCountMismatch {
                expected: 3,
                got: 1
            }
        ));
        assert!(
            configuration_error(PSO::new(10, 2, options()).with_ftol(-1.0, 5)).is_options_error()
        );
    }

    #[test]
    fn test_same_seed_same_history() {
        let run = |topology, options| {
            PSO::new(12, 3, options)
                .with_seed(42)
                .with_topology(topology)
                .with_velocity_initializer(SwarmVelocityInitializer::Scaled(0.5))
                .optimize(&Rastrigin, 200, &())
                .unwrap()
        };
        for (topology, opts) in [
            (SwarmTopology::Global, options()),
            (SwarmTopology::Ring, options().with_neighbors(2, 2)),
        ] {
            let a = run(topology, opts);
            let b = run(topology, opts);
            let bits = |h: &[Float]| h.iter().map(|c| c.to_bits()).collect::<Vec<_>>();
            assert_eq!(bits(&a.cost_history), bits(&b.cost_history));
            assert_eq!(a.position, b.position);
        }
        let c = PSO::new(12, 3, options())
            .with_seed(43)
            .optimize(&Rastrigin, 200, &())
            .unwrap();
        let a = run(SwarmTopology::Global, options());
        assert_ne!(a.cost_history, c.cost_history);
    }

    #[test]
    fn test_final_cost_is_min_of_history() {
        for (topology, opts) in [
            (SwarmTopology::Global, options()),
            (SwarmTopology::Ring, options().with_neighbors(3, 1)),
        ] {
            let mut pso = PSO::new(15, 4, opts)
                .with_seed(7)
                .with_topology(topology)
                .with_bounds([(-5.12, 5.12); 4]);
            let result = pso.optimize(&Rastrigin, 300, &()).unwrap();
            let min = result
                .cost_history
                .iter()
                .copied()
                .fold(Float::INFINITY, Float::min);
            assert_eq!(result.cost, min);
            assert!(result.cost_history.windows(2).all(|w| w[1] <= w[0]));
            assert_eq!(pso.status().best_cost(), result.cost);
        }
    }

    #[test]
    fn test_personal_bests_monotone_and_global_best_shared() {
        let monitor = Arc::new(RwLock::new(PersonalBestMonitor {
            previous: None,
            regressions: 0,
            shared_best_mismatches: 0,
        }));
        let mut pso = PSO::new(10, 3, options())
            .with_seed(11)
            .with_velocity_initializer(SwarmVelocityInitializer::Scaled(0.2))
            .with_observer(monitor.clone());
        pso.optimize(&Rastrigin, 100, &()).unwrap();
        assert!(monitor.read().previous.is_some());
        assert_eq!(monitor.read().regressions, 0);
        assert_eq!(monitor.read().shared_best_mismatches, 0);
    }

    #[test]
    fn test_full_ring_matches_global() {
        let run = |topology, options| {
            PSO::new(8, 2, options)
                .with_seed(5)
                .with_topology(topology)
                .optimize(&Sphere, 300, &())
                .unwrap()
        };
        let global = run(SwarmTopology::Global, options());
        for p in [1, 2] {
            let ring = run(SwarmTopology::Ring, options().with_neighbors(7, p));
            assert_eq!(ring.cost_history, global.cost_history);
            assert_eq!(ring.position, global.position);
        }
    }

    #[test]
    fn test_ring_converges() {
        let mut pso = PSO::new(20, 2, options().with_neighbors(2, 2))
            .with_seed(1)
            .with_topology(SwarmTopology::Ring);
        let result = pso.optimize(&Sphere, 1000, &()).unwrap();
        assert!(result.cost < 1e-6);
    }

    #[test]
    fn test_nonfinite_costs_are_skipped() {
        let mut pso = PSO::new(10, 2, options())
            .with_seed(2)
            .with_bounds([(-2.0, 2.0); 2]);
        let result = pso.optimize(&NanRight, 200, &()).unwrap();
        assert!(result.n_nonfinite > 0);
        assert!(result.cost.is_finite());
        assert!(result.position[0] <= 0.5);
        assert!(result.cost_history.iter().all(|c| !c.is_nan()));
    }

    #[test]
    fn test_all_nan_reports_infinite_cost() {
        struct AllNan;
        impl BatchCostFunction for AllNan {
            fn evaluate_batch(
                &self,
                x: &DMatrix<Float>,
                _args: &(),
            ) -> Result<DVector<Float>, Infallible> {
                Ok(DVector::from_element(x.nrows(), Float::NAN))
            }
        }
        let mut pso = PSO::new(4, 2, options()).with_seed(0);
        let result = pso.optimize(&AllNan, 5, &()).unwrap();
        assert_eq!(result.cost, Float::INFINITY);
        assert_eq!(result.n_nonfinite, 20);
        assert_eq!(result.cost_history, vec![Float::INFINITY; 5]);
        assert_eq!(result.position.len(), 2);
    }

    #[test]
    fn test_zero_iterations() {
        let counted = Counted::new(Sphere);
        let mut pso = PSO::new(4, 2, options()).with_seed(0);
        let result = pso.optimize(&counted, 0, &()).unwrap();
        assert!(result.cost_history.is_empty());
        assert_eq!(result.cost, Float::INFINITY);
        assert_eq!(counted.calls.get(), 0);
    }

    #[test]
    fn test_observer_can_stop_the_run() {
        let mut pso = PSO::new(10, 2, options())
            .with_seed(0)
            .with_observer(Arc::new(RwLock::new(StopAt(25))));
        let result = pso.optimize(&Sphere, 1000, &()).unwrap();
        assert_eq!(result.iterations, 25);
        assert_eq!(result.cost_history.len(), 25);
        assert_eq!(result.message, "Observer requested termination");
        assert_eq!(pso.status().message, "Observer requested termination");
    }

    #[test]
    fn test_abort_signal_returns_best_so_far() {
        let signal = Arc::new(AtomicAbortSignal::new());
        // an abort left over from a previous run is cleared
        signal.abort();
        let counted = Counted::new(Sphere);
        let mut pso = PSO::new(10, 2, options())
            .with_seed(0)
            .with_abort_signal(signal.clone())
            .with_observer(Arc::new(RwLock::new(AbortAt {
                iteration: 10,
                signal: signal.clone(),
            })));
        let result = pso.optimize(&counted, 1000, &()).unwrap();
        assert_eq!(result.message, "Abort signal received");
        assert_eq!(result.iterations, 10);
        assert_eq!(counted.calls.get(), 10);
        assert_eq!(result.cost, result.cost_history[9]);
        assert!(signal.is_aborted());
    }

    #[test]
    fn test_time_limit() {
        let mut pso = PSO::new(10, 2, options())
            .with_seed(0)
            .with_max_duration(Duration::ZERO);
        let result = pso.optimize(&Sphere, 1000, &()).unwrap();
        assert_eq!(result.message, "Time limit reached");
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_ftol_stops_early() {
        let mut pso = PSO::new(10, 2, options()).with_seed(0).with_ftol(1e-3, 10);
        let result = pso.optimize(&Sphere, 100_000, &()).unwrap();
        assert_eq!(result.message, "Relative cost change below ftol");
        assert!(result.iterations < 100_000);
        let n = result.cost_history.len();
        let tail = &result.cost_history[n - 11..];
        assert!(tail
            .windows(2)
            .all(|w| (w[0] - w[1]).abs() < 1e-3 * (1.0 + w[0].abs())));
    }

    #[test]
    fn test_args_are_forwarded_unchanged() {
        let func = RecordsArgs {
            seen: RwLock::new(Vec::new()),
        };
        let args = Args::new()
            .with_positional(2.0)
            .with_named("center", 1.5);
        let mut pso = PSO::new(10, 2, options()).with_seed(0);
        let result = pso.optimize(&func, 500, &args).unwrap();
        let seen = func.seen.read();
        assert_eq!(seen.len(), 500);
        assert!(seen.iter().all(|a| a == &args));
        assert_relative_eq!(result.position, dvector![1.5, 1.5], epsilon = 1e-4);
    }

    #[test]
    fn test_velocity_clamp() {
        struct SpeedMonitor {
            max_speed: Float,
        }
        impl SwarmObserver for SpeedMonitor {
            fn callback(&mut self, _iteration: usize, status: &SwarmStatus) -> ControlFlow<()> {
                for particle in &status.swarm.particles {
                    self.max_speed = particle.velocity.amax().max(self.max_speed);
                }
                ControlFlow::Continue(())
            }
        }
        let monitor = Arc::new(RwLock::new(SpeedMonitor { max_speed: 0.0 }));
        let mut pso = PSO::new(10, 2, SwarmOptions::new(2.0, 2.0, 1.0))
            .with_seed(0)
            .with_velocity_clamp([0.1, 0.2])
            .with_velocity_initializer(SwarmVelocityInitializer::RandomInLimits(vec![
                (-5.0, 5.0),
                (-5.0, 5.0),
            ]))
            .with_observer(monitor.clone());
        pso.optimize(&Sphere, 50, &()).unwrap();
        assert!(monitor.read().max_speed <= 0.2);
        assert!(monitor.read().max_speed > 0.0);
    }

    #[test]
    fn test_config_round_trip() {
        let pso = PSO::new(10, 2, options().with_neighbors(2, 1))
            .with_seed(9)
            .with_topology(SwarmTopology::Ring)
            .with_bounds([(-5.12, 5.12); 2])
            .with_ftol(1e-8, 20);
        let json = serde_json::to_string(pso.config()).unwrap();
        let config: PSOConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(&config, pso.config());

        let minimal: PSOConfig = serde_json::from_str(
            r#"{"n_particles": 10, "dimension": 2, "options": {"c1": 0.5, "c2": 0.3, "w": 0.9}}"#,
        )
        .unwrap();
        assert_eq!(minimal, PSOConfig::new(10, 2, options()));
        let a = PSO::from_config(config.clone())
            .optimize(&Sphere, 50, &())
            .unwrap();
        let b = PSO::from_config(config).optimize(&Sphere, 50, &()).unwrap();
        assert_eq!(a.cost_history, b.cost_history);
    }

    #[test]
    fn test_reruns_continue_the_stream() {
        let mut pso = PSO::new(10, 2, options()).with_seed(0);
        let first = pso.optimize(&Sphere, 20, &()).unwrap();
        let second = pso.optimize(&Sphere, 20, &()).unwrap();
        assert_eq!(second.cost_history.len(), 20);
        assert_ne!(first.cost_history, second.cost_history);
    }
}
