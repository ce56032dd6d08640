//! Error types for the batch-GCD engine.
//!
//! A run either completes or fails with a single `EngineError`; there are no
//! partial results. Storage and invariant errors carry the phase and the
//! (level, slot) coordinates of the failing task so that the on-disk state
//! left behind in the working directory can be inspected.

use std::fmt;
use std::io;
use std::path::PathBuf;

use num_bigint::BigUint;

/// The three phases of a batch-GCD run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Part A: product-tree construction.
    A,
    /// Part B: remainder-tree descent.
    B,
    /// Part C: per-leaf division and gcd.
    C,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::A => write!(f, "A"),
            Phase::B => write!(f, "B"),
            Phase::C => write!(f, "C"),
        }
    }
}

/// Store operations, named in storage errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Read,
    Write,
    Remove,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreOp::Read => write!(f, "read"),
            StoreOp::Write => write!(f, "write"),
            StoreOp::Remove => write!(f, "remove"),
        }
    }
}

/// Errors surfaced by the engine and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no moduli to process")]
    EmptyInput,

    #[error("modulus #{index} is {value}; every modulus must be greater than 1")]
    ModulusTooSmall { index: usize, value: BigUint },

    #[error("phase {phase}: store {op} failed at level {level}, slot {slot}: {source}")]
    Store {
        phase: Phase,
        op: StoreOp,
        level: usize,
        slot: usize,
        #[source]
        source: io::Error,
    },

    #[error("phase {phase}: no store entry at level {level}, slot {slot}; the level barrier guarantees it exists, so this is a scheduler bug")]
    MissingEntry {
        phase: Phase,
        level: usize,
        slot: usize,
    },

    #[error("reduction modulus is zero")]
    ZeroModulus,

    #[error("division by zero")]
    DivisionByZero,

    #[error("exact division has a nonzero remainder")]
    InexactDivision,

    #[error("phase C: leaf remainder at slot {slot} is not divisible by its modulus; this is an engine bug, not a data finding")]
    InvariantViolation { slot: usize },

    #[error("{} line {line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to encode run report: {0}")]
    ReportEncode(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::A.to_string(), "A");
        assert_eq!(Phase::B.to_string(), "B");
        assert_eq!(Phase::C.to_string(), "C");
    }

    #[test]
    fn test_error_messages_name_phase_and_slot() {
        let err = EngineError::MissingEntry {
            phase: Phase::B,
            level: 3,
            slot: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("phase B"), "message should name the phase: {}", msg);
        assert!(msg.contains("level 3"), "message should name the level: {}", msg);
        assert!(msg.contains("slot 7"), "message should name the slot: {}", msg);
    }

    #[test]
    fn test_invariant_violation_is_flagged_as_bug() {
        let err = EngineError::InvariantViolation { slot: 5 };
        assert!(err.to_string().contains("engine bug"));
    }
}
