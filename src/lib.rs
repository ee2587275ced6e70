//! `murmuration` minimizes a cost function with a swarm of particles. The user implements the
//! [`BatchCostFunction`](traits::BatchCostFunction) trait on some struct which takes a matrix of
//! positions (one row per particle) and returns one cost per row
//! ($`f(\mathbb{R}^{n \times d}) \to \mathbb{R}^n`$). The whole swarm is evaluated in a single
//! call every iteration, so vectorizing that call is the main performance lever.
//!
//! <div class="warning">
//!
//! This crate is still in an early development phase, and the API is not stable.
//!
//! </div>
//!
//! # Table of Contents
//! - [Key Features](#key-features)
//! - [Quick Start](#quick-start)
//! - [Topologies](#topologies)
//! - [Bounds](#bounds)
//!
//! # Key Features
//! * Global-best and ring (local-best) swarm topologies.
//! * Hard-clip box constraints and optional per-dimension velocity clamping.
//! * Reproducible runs: all randomness is drawn from one seeded stream.
//! * Observers for progress reporting, abort signals for cooperative cancellation, and an
//!   optional relative-tolerance early stop.
//!
//! # Quick Start
//!
//! ```rust
//! use murmuration::prelude::*;
//!
//! struct Sphere;
//! impl BatchCostFunction for Sphere {
//!     fn evaluate_batch(&self, x: &DMatrix<Float>, _args: &()) -> Result<DVector<Float>, Infallible> {
//!         Ok(DVector::from_iterator(
//!             x.nrows(),
//!             x.row_iter().map(|row| row.iter().map(|v| v * v).sum()),
//!         ))
//!     }
//! }
//!
//! fn main() -> Result<(), SwarmError> {
//!     let mut pso = PSO::new(10, 2, SwarmOptions::new(0.5, 0.3, 0.9)).with_seed(0);
//!     let result = pso.optimize(&Sphere, 1000, &())?;
//!     assert!(result.cost < 1e-10);
//!     Ok(())
//! }
//! ```
//!
//! # Topologies
//! With [`SwarmTopology::Global`](swarms::SwarmTopology::Global) every particle is pulled toward
//! the best position found by the whole swarm. With
//! [`SwarmTopology::Ring`](swarms::SwarmTopology::Ring) each particle only sees itself and its `k`
//! nearest neighbors on a ring of particle indices, measured with a Minkowski distance of order
//! `p`. Both `k` and `p` are read from the [`SwarmOptions`](swarms::SwarmOptions).
//!
//! # Bounds
//! Bounds are enforced by clipping: after every move, each coordinate that left its
//! `[lower, upper]` interval is set to the nearest edge. Initial positions are drawn inside the
//! bounds.
#![warn(
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::doc_markdown,
    clippy::doc_link_with_quotes,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::perf,
    clippy::style,
    missing_docs
)]

/// Module containing plain data types: bounds, points, fixed arguments, abort signals, and
/// run results.
pub mod core;
/// Module containing the error types returned by this crate.
pub mod error;
/// Module containing [`SwarmObserver`](traits::SwarmObserver) implementations.
pub mod observers;
/// Module containing the particle swarm optimizer.
pub mod swarms;
/// Module containing the traits at the seams of the optimizer.
pub mod traits;

#[cfg(test)]
pub(crate) mod test_functions;

pub use nalgebra::{DMatrix, DVector};

/// The floating-point type used throughout the crate (`f64`, or `f32` with the `f32` feature).
#[cfg(not(feature = "f32"))]
pub type Float = f64;
/// The floating-point type used throughout the crate (`f64`, or `f32` with the `f32` feature).
#[cfg(feature = "f32")]
pub type Float = f32;

/// The mathematical constant $`\pi`$ at the precision of [`Float`].
#[cfg(not(feature = "f32"))]
pub const PI: Float = std::f64::consts::PI;
/// The mathematical constant $`\pi`$ at the precision of [`Float`].
#[cfg(feature = "f32")]
pub const PI: Float = std::f32::consts::PI;

/// Prelude module containing everything someone should need to use this crate for non-development
/// purposes
pub mod prelude {
    pub use crate::{
        core::{Args, Bound, Bounds, OptimizationResult},
        error::{ConfigurationError, ShapeError, SwarmError},
        swarms::{
            PSOConfig, SwarmOptions, SwarmPositionInitializer, SwarmTopology, SwarmVelocityInitializer,
            PSO,
        },
        traits::{AbortSignal, BatchCostFunction, SwarmObserver},
        DMatrix, DVector, Float,
    };
    pub use std::convert::Infallible;
}
