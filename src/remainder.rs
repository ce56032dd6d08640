//! Part B: remainder-tree descent.
//!
//! Seeds the root with Z = level_h[0] and walks the tree downward: the
//! remainder at child slot i of level k−1 is the parent remainder reduced
//! modulo the square of the child's product-tree value. Squaring the child
//! at every edge is what keeps enough information for the final leaf
//! division: each child² divides its parent², so R ≡ Z (mod node²) holds
//! all the way down, and the leaves end up holding Z mod N_i².
//!
//! A remainder level lives in memory unless its estimated size exceeds the
//! configured spill threshold, in which case it is materialized in the
//! store instead; results are identical either way. Product-tree levels are
//! released as soon as their last reader has passed, except level 0, which
//! the finalizer still needs.

use num_bigint::BigUint;
use rayon::prelude::*;

use crate::arith;
use crate::error::{EngineError, Phase};
use crate::product::level_sizes;
use crate::store::{LevelStore, Tree};

/// Where a finished remainder level currently lives.
enum RemLevel {
    Memory(Vec<BigUint>),
    Spilled,
}

/// Descend the remainder tree and return the n leaf remainders in input
/// order. `h` and `n` must match the product tree already in the store.
pub fn descend(
    store: &LevelStore,
    pool: &rayon::ThreadPool,
    h: usize,
    n: usize,
    spill_threshold: u64,
) -> Result<Vec<BigUint>, EngineError> {
    let sizes = level_sizes(n);
    debug_assert_eq!(sizes.len() - 1, h, "height must match the stored tree");

    let root = store.get(Phase::B, Tree::Product, h, 0)?;
    // Every remainder level is bounded by twice the root's size: the node
    // bitlengths of a level sum to ~bits(Z), and each remainder is smaller
    // than the corresponding node squared.
    let level_estimate = (root.bits().div_ceil(8)) * 2;
    if h > 0 {
        store.remove(Phase::B, Tree::Product, h, 0)?;
    }
    let mut parent = RemLevel::Memory(vec![root]);

    for k in (1..=h).rev() {
        let child_len = sizes[k - 1];
        let parent_len = sizes[k];
        let spill = level_estimate > spill_threshold;

        let child = if spill {
            pool.install(|| {
                (0..child_len).into_par_iter().try_for_each(|slot| {
                    let r = reduce_slot(store, &parent, k, slot)?;
                    store.put(Phase::B, Tree::Remainder, k - 1, slot, &r)
                })
            })?;
            RemLevel::Spilled
        } else {
            let values = pool.install(|| {
                (0..child_len)
                    .into_par_iter()
                    .map(|slot| reduce_slot(store, &parent, k, slot))
                    .collect::<Result<Vec<_>, _>>()
            })?;
            RemLevel::Memory(values)
        };
        log::debug!(
            "remainder tree: level {} computed ({} slots{})",
            k - 1,
            child_len,
            if spill { ", spilled" } else { "" }
        );

        // The parent remainders and the consumed product level are done
        if let RemLevel::Spilled = parent {
            store.remove_level(Phase::B, Tree::Remainder, k, parent_len)?;
        }
        if k - 1 > 0 {
            store.remove_level(Phase::B, Tree::Product, k - 1, child_len)?;
        }
        parent = child;
    }

    match parent {
        RemLevel::Memory(values) => Ok(values),
        RemLevel::Spilled => {
            let values = pool.install(|| {
                (0..n)
                    .into_par_iter()
                    .map(|slot| store.get(Phase::B, Tree::Remainder, 0, slot))
                    .collect::<Result<Vec<_>, _>>()
            })?;
            store.remove_level(Phase::B, Tree::Remainder, 0, n)?;
            Ok(values)
        }
    }
}

/// One slot of a child level: parent remainder mod (child node)².
fn reduce_slot(
    store: &LevelStore,
    parent: &RemLevel,
    k: usize,
    slot: usize,
) -> Result<BigUint, EngineError> {
    let node = store.get(Phase::B, Tree::Product, k - 1, slot)?;
    let square = &node * &node;
    match parent {
        RemLevel::Memory(values) => arith::reduce(&values[slot / 2], &square),
        RemLevel::Spilled => {
            let parent_value = store.get(Phase::B, Tree::Remainder, k, slot / 2)?;
            arith::reduce(&parent_value, &square)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product;
    use num_traits::One;
    use tempfile::TempDir;

    fn pool() -> rayon::ThreadPool {
        rayon::ThreadPoolBuilder::new()
            .num_threads(2)
            .build()
            .expect("build pool")
    }

    fn moduli(values: &[u32]) -> Vec<BigUint> {
        values.iter().map(|&v| BigUint::from(v)).collect()
    }

    /// R_{0,i} must equal Z mod N_i² for every leaf.
    fn check_leaves(values: &[u32], spill_threshold: u64) {
        let dir = TempDir::new().unwrap();
        let store = LevelStore::open(dir.path()).unwrap();
        let pool = pool();
        let leaves = moduli(values);

        let z = leaves.iter().fold(BigUint::one(), |acc, m| acc * m);
        let h = product::build(&store, &pool, &leaves).unwrap();
        let remainders = descend(&store, &pool, h, leaves.len(), spill_threshold).unwrap();

        assert_eq!(remainders.len(), leaves.len());
        for (i, (r, m)) in remainders.iter().zip(&leaves).enumerate() {
            let expected = &z % (m * m);
            assert_eq!(r, &expected, "leaf {} should hold Z mod N_i^2", i);
        }
    }

    #[test]
    fn test_leaf_remainders_even_count() {
        check_leaves(&[15, 35, 22, 9], u64::MAX);
    }

    #[test]
    fn test_leaf_remainders_odd_count() {
        check_leaves(&[15, 22, 35], u64::MAX);
    }

    #[test]
    fn test_spilled_descent_matches_in_memory() {
        // Threshold 0 forces every remainder level through the store
        check_leaves(&[15, 35, 22, 9, 49, 121, 13, 77, 6], 0);
    }

    #[test]
    fn test_single_input_returns_z() {
        let dir = TempDir::new().unwrap();
        let store = LevelStore::open(dir.path()).unwrap();
        let pool = pool();
        let leaves = moduli(&[35]);

        let h = product::build(&store, &pool, &leaves).unwrap();
        let remainders = descend(&store, &pool, h, 1, u64::MAX).unwrap();
        assert_eq!(remainders, vec![BigUint::from(35u32)]);
    }

    #[test]
    fn test_consumed_levels_are_released() {
        let dir = TempDir::new().unwrap();
        let store = LevelStore::open(dir.path()).unwrap();
        let pool = pool();
        let leaves = moduli(&[3, 5, 7, 11, 13]);

        let h = product::build(&store, &pool, &leaves).unwrap();
        descend(&store, &pool, h, leaves.len(), 0).unwrap();

        // Interior product levels and all remainder entries are gone...
        for k in 1..=h {
            for slot in 0..level_sizes(leaves.len())[k] {
                assert!(!store.contains(Tree::Product, k, slot));
                assert!(!store.contains(Tree::Remainder, k, slot));
            }
        }
        // ...but the leaf level survives for the finalizer
        for slot in 0..leaves.len() {
            assert!(store.contains(Tree::Product, 0, slot));
        }
    }
}
