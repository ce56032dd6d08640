//! CSV moduli loader.
//!
//! One key per line, `<ID>,<modulus>`, modulus in base 16 unless the caller
//! selects base 10. IDs are opaque to the engine and only resurface in the
//! classification reports.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use num_bigint::BigUint;

use crate::arith::{self, Base};
use crate::error::EngineError;

/// Read all moduli and their IDs from `path`. The two vectors are parallel
/// and preserve file order. Blank lines are skipped; anything else
/// malformed fails the load with its line number.
pub fn read_moduli_csv(
    path: &Path,
    base: Base,
) -> Result<(Vec<BigUint>, Vec<String>), EngineError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut moduli = Vec::new();
    let mut ids = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let (id, digits) = trimmed.split_once(',').ok_or_else(|| EngineError::Parse {
            path: path.to_path_buf(),
            line: idx + 1,
            reason: "expected <ID>,<modulus>".to_string(),
        })?;
        let value = arith::parse_modulus(digits, base).ok_or_else(|| EngineError::Parse {
            path: path.to_path_buf(),
            line: idx + 1,
            reason: format!("invalid base-{} modulus '{}'", base.radix(), digits.trim()),
        })?;
        ids.push(id.trim().to_string());
        moduli.push(value);
    }

    log::info!("loaded {} moduli from {}", moduli.len(), path.display());
    Ok((moduli, ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write csv");
        file
    }

    #[test]
    fn test_reads_hex_moduli() {
        let file = write_csv("key-1,0f\nkey-2,ff\n");
        let (moduli, ids) = read_moduli_csv(file.path(), Base::Hex).expect("read");
        assert_eq!(moduli, vec![BigUint::from(15u32), BigUint::from(255u32)]);
        assert_eq!(ids, vec!["key-1", "key-2"]);
    }

    #[test]
    fn test_reads_base10_moduli() {
        let file = write_csv("a,15\nb,35\n");
        let (moduli, _) = read_moduli_csv(file.path(), Base::Dec).expect("read");
        assert_eq!(moduli, vec![BigUint::from(15u32), BigUint::from(35u32)]);
    }

    #[test]
    fn test_skips_blank_lines() {
        let file = write_csv("a,15\n\n\nb,23\n");
        let (moduli, ids) = read_moduli_csv(file.path(), Base::Dec).expect("read");
        assert_eq!(moduli.len(), 2);
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_comma_reports_line_number() {
        let file = write_csv("a,15\nbroken-line\n");
        let err = read_moduli_csv(file.path(), Base::Dec).unwrap_err();
        match err {
            EngineError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_digits_reports_line_number() {
        let file = write_csv("a,15\nb,not-a-number\n");
        let err = read_moduli_csv(file.path(), Base::Dec).unwrap_err();
        match err {
            EngineError::Parse { line, reason, .. } => {
                assert_eq!(line, 2);
                assert!(reason.contains("base-10"), "reason: {}", reason);
            }
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_id_may_contain_no_comma_but_modulus_split_is_first() {
        // split_once takes the first comma, so the rest of the line is the
        // modulus field
        let file = write_csv("id,15\n");
        let (moduli, ids) = read_moduli_csv(file.path(), Base::Dec).expect("read");
        assert_eq!(ids, vec!["id"]);
        assert_eq!(moduli, vec![BigUint::from(15u32)]);
    }
}
