//! Part C: per-leaf division and gcd.
//!
//! For each leaf i the descent left R_i = Z mod N_i². Dividing by N_i is
//! exact (N_i divides Z, hence R_i), and gcd(R_i / N_i, N_i) equals
//! gcd(Π_{j≠i} N_j, N_i), nontrivial exactly when N_i shares a prime with
//! some other input. A non-exact division here means the engine itself is
//! broken and the run aborts.
//!
//! The in-memory inputs were consumed building the tree, so the leaf level
//! is reloaded from the store; it is the one product-tree level the descent
//! does not release.

use num_bigint::BigUint;
use num_integer::Integer;
use rayon::prelude::*;

use crate::arith;
use crate::error::{EngineError, Phase};
use crate::store::{LevelStore, Tree};

/// Compute G_i = gcd(R_i / N_i, N_i) for every leaf. Returns the gcd vector
/// and the reloaded moduli, both in input order.
pub fn finalize(
    store: &LevelStore,
    pool: &rayon::ThreadPool,
    remainders: Vec<BigUint>,
) -> Result<(Vec<BigUint>, Vec<BigUint>), EngineError> {
    let pairs = pool.install(|| {
        remainders
            .into_par_iter()
            .enumerate()
            .map(|(slot, r)| {
                let modulus = store.get(Phase::C, Tree::Product, 0, slot)?;
                let quotient = arith::exact_div(&r, &modulus)
                    .map_err(|_| EngineError::InvariantViolation { slot })?;
                Ok((quotient.gcd(&modulus), modulus))
            })
            .collect::<Result<Vec<_>, EngineError>>()
    })?;
    Ok(pairs.into_iter().unzip())
}
