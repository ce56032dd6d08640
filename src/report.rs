//! Serializable run summary.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::classify::Classified;
use crate::engine::PhaseTimings;
use crate::error::EngineError;

/// Counts and timings of a completed run, persisted as JSON next to the
/// CSV reports.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub moduli: usize,
    pub compromised: usize,
    pub duplicates: usize,
    pub false_positives: usize,
    pub product_secs: f64,
    pub remainder_secs: f64,
    pub gcd_secs: f64,
    pub total_secs: f64,
}

impl RunReport {
    pub fn new(classified: &Classified, timings: &PhaseTimings) -> Self {
        RunReport {
            moduli: classified.total,
            compromised: classified.compromised.len(),
            duplicates: classified.duplicates.len(),
            false_positives: classified.false_positives,
            product_secs: timings.product.as_secs_f64(),
            remainder_secs: timings.remainder.as_secs_f64(),
            gcd_secs: timings.gcd.as_secs_f64(),
            total_secs: timings.total().as_secs_f64(),
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<(), EngineError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
