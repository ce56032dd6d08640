//! Part A: product-tree construction.
//!
//! Level 0 holds the input moduli; level k slot i is the product of slots 2i
//! and 2i+1 of the level below, with an odd tail promoted unchanged. The
//! root of the final level is Z, the product of every input. Every level is
//! written to the store: interior levels feed the remainder descent, and
//! level 0 is reloaded by the finalizer after the in-memory inputs are gone.
//!
//! Scheduling is level-synchronous. Within a level the slots are
//! independent and fan out across the worker pool; at most one pair of
//! children per worker is resident at a time.

use num_bigint::BigUint;
use rayon::prelude::*;

use crate::error::{EngineError, Phase};
use crate::store::{LevelStore, Tree};

/// Slot counts of every level, derived from the leaf count alone. The last
/// entry is always 1 (the root level); `level_sizes(n).len() - 1` is the
/// tree height h.
pub fn level_sizes(n: usize) -> Vec<usize> {
    assert!(n > 0, "level_sizes requires at least one leaf");
    let mut sizes = vec![n];
    let mut len = n;
    while len > 1 {
        len = len.div_ceil(2);
        sizes.push(len);
    }
    sizes
}

/// Build the product tree of `leaves` in the store. Returns the tree height
/// h; the full product Z ends up at (level h, slot 0).
pub fn build(
    store: &LevelStore,
    pool: &rayon::ThreadPool,
    leaves: &[BigUint],
) -> Result<usize, EngineError> {
    let n = leaves.len();
    let sizes = level_sizes(n);
    let h = sizes.len() - 1;

    pool.install(|| {
        leaves
            .par_iter()
            .enumerate()
            .try_for_each(|(slot, value)| store.put(Phase::A, Tree::Product, 0, slot, value))
    })?;
    log::debug!("product tree: level 0 persisted ({} leaves)", n);

    for k in 1..=h {
        let child_len = sizes[k - 1];
        let len = sizes[k];
        pool.install(|| {
            (0..len).into_par_iter().try_for_each(|slot| {
                let left = store.get(Phase::A, Tree::Product, k - 1, 2 * slot)?;
                let value = if 2 * slot + 1 < child_len {
                    let right = store.get(Phase::A, Tree::Product, k - 1, 2 * slot + 1)?;
                    left * right
                } else {
                    // Odd tail: carry the exact value up, no multiply by 1
                    left
                };
                store.put(Phase::A, Tree::Product, k, slot, &value)
            })
        })?;
        log::debug!("product tree: level {} written ({} nodes)", k, len);
    }

    Ok(h)
}
