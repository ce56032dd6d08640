//! Run orchestration: configuration, the worker pool, and the A→B→C
//! pipeline with per-phase timing.
//!
//! The engine owns a dedicated rayon pool of exactly the configured number
//! of worker threads; every per-slot task of every level runs on it. Levels
//! are separated by barriers, so an error in any slot drains the level and
//! surfaces as the single run-level failure.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use num_bigint::BigUint;
use num_traits::One;

use crate::error::EngineError;
use crate::store::LevelStore;
use crate::{finalize, product, remainder};

/// Operator-facing knobs for a run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Worker thread count. CPU-bound multiplies overlap store I/O, so
    /// 1–2× the physical core count is a reasonable setting.
    pub workers: usize,
    /// Directory for on-disk tree levels. Created if absent; assumed empty.
    pub workdir: PathBuf,
    /// Remainder levels estimated larger than this many bytes are spilled
    /// to the store instead of held in memory.
    pub spill_threshold: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            workers: available_workers(),
            workdir: PathBuf::from("batchgcd-work"),
            spill_threshold: 1 << 30,
        }
    }
}

fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Wall-clock time spent in each phase.
#[derive(Debug, Clone, Copy)]
pub struct PhaseTimings {
    pub product: Duration,
    pub remainder: Duration,
    pub gcd: Duration,
}

impl PhaseTimings {
    pub fn total(&self) -> Duration {
        self.product + self.remainder + self.gcd
    }
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunOutcome {
    /// G_i = gcd(Π_{j≠i} N_j, N_i), in input order.
    pub gcds: Vec<BigUint>,
    /// The moduli as reloaded from the store in Part C, in input order.
    /// The input vector itself is consumed while building the tree.
    pub moduli: Vec<BigUint>,
    pub timings: PhaseTimings,
}

/// Run the full batch-GCD pipeline over `moduli`.
///
/// Fails before any work starts if the input is empty or contains a value
/// of 0 or 1. On any fatal error the working directory is left intact for
/// inspection.
pub fn run(moduli: Vec<BigUint>, config: &EngineConfig) -> Result<RunOutcome, EngineError> {
    validate_input(&moduli)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()?;
    let store = LevelStore::open(&config.workdir)?;
    log::info!(
        "batch gcd over {} moduli, {} workers, workdir {}",
        moduli.len(),
        config.workers,
        store.root().display()
    );

    let n = moduli.len();

    let start = Instant::now();
    let h = product::build(&store, &pool, &moduli)?;
    let product_time = start.elapsed();
    log::info!(
        "part A done: tree height {} in {:.3}s",
        h,
        product_time.as_secs_f64()
    );
    // The leaves are on disk now; Part C reloads them from there
    drop(moduli);

    let start = Instant::now();
    let remainders = remainder::descend(&store, &pool, h, n, config.spill_threshold)?;
    let remainder_time = start.elapsed();
    log::info!("part B done in {:.3}s", remainder_time.as_secs_f64());

    let start = Instant::now();
    let (gcds, moduli) = finalize::finalize(&store, &pool, remainders)?;
    let gcd_time = start.elapsed();
    log::info!("part C done in {:.3}s", gcd_time.as_secs_f64());

    Ok(RunOutcome {
        gcds,
        moduli,
        timings: PhaseTimings {
            product: product_time,
            remainder: remainder_time,
            gcd: gcd_time,
        },
    })
}

fn validate_input(moduli: &[BigUint]) -> Result<(), EngineError> {
    if moduli.is_empty() {
        return Err(EngineError::EmptyInput);
    }
    for (index, value) in moduli.iter().enumerate() {
        if *value <= BigUint::one() {
            return Err(EngineError::ModulusTooSmall {
                index,
                value: value.clone(),
            });
        }
    }
    Ok(())
}
