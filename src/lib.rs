//! Batch pairwise GCD over large sets of RSA moduli.
//!
//! Implements Bernstein's batch-GCD algorithm: a product tree of all inputs
//! (Part A), a remainder tree bringing Z mod N_i² down to every leaf
//! (Part B), and a final per-leaf division and gcd (Part C). Any two moduli
//! that share a prime are both fully factored by the result.
//!
//! Naive pairwise GCD is O(n²) bignum operations and hopeless at fleet
//! scale; the trees bring this down to quasi-linear. The other half of the
//! engineering is memory: tree levels are materialized on disk under a
//! working directory and streamed level by level, so the resident set stays
//! at a handful of bignums per worker regardless of input size.

pub mod arith;
pub mod classify;
pub mod engine;
pub mod error;
pub mod finalize;
pub mod input;
pub mod product;
pub mod remainder;
pub mod report;
pub mod store;

pub use arith::Base;
pub use engine::{run, EngineConfig, PhaseTimings, RunOutcome};
pub use error::{EngineError, Phase};
