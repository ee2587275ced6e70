use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{DVector, Float};

use super::{Bound, Bounds};

/// The outcome of a single [`PSO::optimize`](crate::swarms::PSO::optimize) run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OptimizationResult {
    /// The lowest cost observed during the run (`+inf` if no finite cost was ever seen).
    pub cost: Float,
    /// The position at which [`OptimizationResult::cost`] was observed.
    pub position: DVector<Float>,
    /// The best cost known at the end of each iteration, in iteration order.
    pub cost_history: Vec<Float>,
    /// The number of iterations actually run.
    pub iterations: usize,
    /// The number of single-point cost evaluations (particles times batch calls).
    pub cost_evals: usize,
    /// The number of NaN or infinite costs returned by the cost function.
    pub n_nonfinite: usize,
    /// Why the run ended.
    pub message: String,
    /// The bounds of the search space. This is `None` if no bounds were set.
    pub bounds: Option<Bounds>,
}

impl OptimizationResult {
    /// Convert the result into its `(cost, position)` pair.
    pub fn destructure(self) -> (Float, DVector<Float>) {
        (self.cost, self.position)
    }
}

impl Display for OptimizationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "╒═══════════════════════════════════════════════════════════════╕")?;
        writeln!(f, "│{:^63}│", "SWARM RESULTS")?;
        writeln!(f, "╞═══════════════════════════════════════════════════════════════╡")?;
        writeln!(
            f,
            "│ f(x): {:<+16.8E} iterations: {:>8}   #f(x): {:>9} │",
            self.cost, self.iterations, self.cost_evals
        )?;
        writeln!(f, "│ Message: {:<52} │", self.message)?;
        writeln!(f, "├───────┬──────────────────┬──────────────┬──────────────┬───────┤")?;
        writeln!(f, "│ Par # │            Value │       -Bound │       +Bound │ Limit │")?;
        writeln!(f, "├───────┼──────────────────┼──────────────┼──────────────┼───────┤")?;
        let bounds = self
            .bounds
            .clone()
            .map(Bounds::into_inner)
            .unwrap_or_else(|| vec![Bound::NoBound; self.position.len()]);
        for (i, (x, b)) in self.position.iter().zip(bounds).enumerate() {
            writeln!(
                f,
                "│ {:>5} │ {:>+16.8E} │ {:>+12.3E} │ {:>+12.3E} │ {:^5} │",
                i,
                x,
                b.lower(),
                b.upper(),
                if b.at_bound(*x) { "yes" } else { "" }
            )?;
        }
        write!(f, "└───────┴──────────────────┴──────────────┴──────────────┴───────┘")
    }
}
