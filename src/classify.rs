//! Interpretation of the gcd vector and report files.
//!
//! The engine guarantees G_i = gcd(Π_{j≠i} N_j, N_i). This module sorts
//! each key into one of four buckets:
//!
//! - G_i = 1: the modulus shares no factor with any other input.
//! - 1 < G_i < N_i: compromised; G_i and N_i/G_i are its prime factors.
//! - G_i = N_i: the modulus divides the product of the others, almost
//!   always because it appears more than once in the input.
//! - G_i = 0, or G_i does not divide N_i: sanity-check failure. A correct
//!   engine never produces this; it is counted and logged, never reported
//!   as a finding.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::EngineError;

/// A modulus whose factors were recovered.
#[derive(Debug, Clone)]
pub struct CompromisedKey {
    pub id: String,
    pub p: BigUint,
    pub q: BigUint,
}

/// Classification of a full gcd vector.
#[derive(Debug, Default)]
pub struct Classified {
    pub total: usize,
    pub compromised: Vec<CompromisedKey>,
    pub duplicates: Vec<String>,
    pub false_positives: usize,
}

/// Bucket every key by its gcd. The three slices are parallel and ordered
/// by input index.
pub fn classify(gcds: &[BigUint], moduli: &[BigUint], ids: &[String]) -> Classified {
    assert_eq!(gcds.len(), moduli.len(), "gcd and modulus counts must match");
    assert_eq!(ids.len(), moduli.len(), "ID and modulus counts must match");

    let mut result = Classified {
        total: moduli.len(),
        ..Classified::default()
    };

    for i in 0..gcds.len() {
        let g = &gcds[i];
        let n = &moduli[i];
        if g.is_one() {
            continue;
        }
        if g.is_zero() || !(n % g).is_zero() {
            result.false_positives += 1;
            log::error!(
                "sanity check failed for {}: gcd {} does not divide the modulus",
                ids[i],
                g
            );
        } else if g == n {
            result.duplicates.push(ids[i].clone());
        } else {
            result.compromised.push(CompromisedKey {
                id: ids[i].clone(),
                p: g.clone(),
                q: n / g,
            });
        }
    }

    result
}

/// Write `compromised.csv` (`ID,p,q` per line) and `duplicates.csv` (one ID
/// per line) under `dir`. Both files are written even when empty.
pub fn write_reports(classified: &Classified, dir: &Path) -> Result<(), EngineError> {
    let mut compromised = BufWriter::new(File::create(dir.join("compromised.csv"))?);
    for key in &classified.compromised {
        writeln!(compromised, "{},{},{}", key.id, key.p, key.q)?;
    }
    compromised.flush()?;

    let mut duplicates = BufWriter::new(File::create(dir.join("duplicates.csv"))?);
    for id in &classified.duplicates {
        writeln!(duplicates, "{}", id)?;
    }
    duplicates.flush()?;

    Ok(())
}
