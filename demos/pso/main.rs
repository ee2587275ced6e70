use std::convert::Infallible;
use std::error::Error;

use murmuration::core::CtrlCAbortSignal;
use murmuration::observers::{LoggingObserver, TrackingSwarmObserver};
use murmuration::prelude::*;
use murmuration::PI;
use parking_lot::RwLock;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn Error>> {
    // Implement the Rastrigin function, one particle per row
    struct Problem;
    impl BatchCostFunction for Problem {
        fn evaluate_batch(
            &self,
            x: &DMatrix<Float>,
            _args: &(),
        ) -> Result<DVector<Float>, Infallible> {
            Ok(DVector::from_iterator(
                x.nrows(),
                x.row_iter().map(|row| {
                    20.0 + (row[0].powi(2) - 10.0 * Float::cos(2.0 * PI * row[0]))
                        + (row[1].powi(2) - 10.0 * Float::cos(2.0 * PI * row[1]))
                }),
            ))
        }
    }

    // Create a tracker to record swarm history
    let tracker = TrackingSwarmObserver::build();

    // Create a particle swarm optimizer with a ring topology
    let mut pso = PSO::new(50, 2, SwarmOptions::new(0.5, 0.3, 0.9).with_neighbors(4, 2))
        .with_seed(0)
        .with_topology(SwarmTopology::Ring)
        .with_bounds([(-5.12, 5.12); 2])
        .with_velocity_initializer(SwarmVelocityInitializer::Scaled(0.1))
        .with_observer(tracker.clone())
        .with_observer(Arc::new(RwLock::new(LoggingObserver::new(50))))
        .with_abort_signal(CtrlCAbortSignal::new());

    // Run the particle swarm optimizer
    let result = pso.optimize(&Problem, 200, &())?;

    println!("{result}");
    println!(
        "recorded {} swarm snapshots",
        tracker.read().history.len()
    );
    Ok(())
}
