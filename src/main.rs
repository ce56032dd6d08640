//! batch-gcd CLI: find shared factors across a fleet of RSA moduli.
//!
//! Usage:
//!   batch-gcd <moduli.csv> [options]
//!
//! Input: one key per line, `<ID>,<modulus in base 16>`.
//!
//! Options:
//!   --base10                  Parse moduli as base 10 instead of base 16
//!   --threads=N               Worker thread count (default: all cores)
//!   --workdir=PATH            Directory for on-disk tree levels
//!   --spill-threshold=BYTES   Spill remainder levels larger than this
//!
//! Outputs compromised.csv, duplicates.csv and summary.json in the current
//! directory.

use std::path::PathBuf;
use std::process;

use batch_gcd::classify;
use batch_gcd::engine::{self, EngineConfig};
use batch_gcd::input;
use batch_gcd::report::RunReport;
use batch_gcd::Base;
use batch_gcd::EngineError;

struct CliConfig {
    csv_path: PathBuf,
    base: Base,
    engine: EngineConfig,
}

fn parse_args(args: &[String]) -> Result<CliConfig, String> {
    let mut csv_path: Option<PathBuf> = None;
    let mut base = Base::Hex;
    let mut engine = EngineConfig::default();

    for arg in &args[1..] {
        if arg == "--base10" {
            base = Base::Dec;
        } else if let Some(v) = arg.strip_prefix("--threads=") {
            let workers: usize = v
                .parse()
                .map_err(|_| format!("invalid --threads value '{}'", v))?;
            if workers == 0 {
                return Err("--threads must be at least 1".to_string());
            }
            engine.workers = workers;
        } else if let Some(v) = arg.strip_prefix("--workdir=") {
            engine.workdir = PathBuf::from(v);
        } else if let Some(v) = arg.strip_prefix("--spill-threshold=") {
            engine.spill_threshold = v
                .parse()
                .map_err(|_| format!("invalid --spill-threshold value '{}'", v))?;
        } else if arg.starts_with("--") {
            return Err(format!("unknown option '{}'", arg));
        } else if csv_path.is_none() {
            csv_path = Some(PathBuf::from(arg));
        } else {
            return Err(format!("unexpected argument '{}'", arg));
        }
    }

    let csv_path = csv_path.ok_or_else(|| "please specify the target csv file".to_string())?;
    Ok(CliConfig {
        csv_path,
        base,
        engine,
    })
}

fn print_usage() {
    eprintln!("Usage: batch-gcd <moduli.csv> [--base10] [--threads=N] [--workdir=PATH] [--spill-threshold=BYTES]");
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("error: {}", msg);
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = run_cli(&cli) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run_cli(cli: &CliConfig) -> Result<(), EngineError> {
    println!("========================================");
    println!("  batch-gcd: pairwise GCDs of moduli");
    println!("========================================");
    println!();

    let (moduli, ids) = input::read_moduli_csv(&cli.csv_path, cli.base)?;
    println!(
        "Loaded {} moduli from {}",
        moduli.len(),
        cli.csv_path.display()
    );
    println!(
        "Workers: {}, workdir: {}",
        cli.engine.workers,
        cli.engine.workdir.display()
    );
    println!();

    let outcome = engine::run(moduli, &cli.engine)?;

    println!("Part A (product tree):    {:.3}s", outcome.timings.product.as_secs_f64());
    println!("Part B (remainder tree):  {:.3}s", outcome.timings.remainder.as_secs_f64());
    println!("Part C (division + gcd):  {:.3}s", outcome.timings.gcd.as_secs_f64());
    let total = outcome.timings.total().as_secs();
    println!(
        "Total:                    {}h {}m {}s",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    );
    println!();

    let classified = classify::classify(&outcome.gcds, &outcome.moduli, &ids);

    println!("--- Results ---");
    println!("Moduli processed:    {}", classified.total);
    println!("Compromised:         {}", classified.compromised.len());
    println!("Duplicates:          {}", classified.duplicates.len());
    println!("False positives:     {}", classified.false_positives);
    println!();

    let out_dir = PathBuf::from(".");
    classify::write_reports(&classified, &out_dir)?;
    let report = RunReport::new(&classified, &outcome.timings);
    report.write_json(&out_dir.join("summary.json"))?;
    println!("Reports written to compromised.csv, duplicates.csv and summary.json");

    if !classified.duplicates.is_empty() {
        println!();
        println!("Note: duplicates can mask shared factors. Filter duplicate");
        println!("moduli out of the input file and run again; if they persist,");
        println!("the duplicated integers genuinely share factors.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("batch-gcd")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_args_defaults() {
        let cli = parse_args(&args(&["moduli.csv"])).expect("parse");
        assert_eq!(cli.csv_path, PathBuf::from("moduli.csv"));
        assert_eq!(cli.base, Base::Hex);
    }

    #[test]
    fn test_parse_args_flags() {
        let cli = parse_args(&args(&[
            "keys.csv",
            "--base10",
            "--threads=8",
            "--workdir=/tmp/scan",
            "--spill-threshold=1048576",
        ]))
        .expect("parse");
        assert_eq!(cli.base, Base::Dec);
        assert_eq!(cli.engine.workers, 8);
        assert_eq!(cli.engine.workdir, PathBuf::from("/tmp/scan"));
        assert_eq!(cli.engine.spill_threshold, 1_048_576);
    }

    #[test]
    fn test_parse_args_rejects_bad_input() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["a.csv", "--threads=0"])).is_err());
        assert!(parse_args(&args(&["a.csv", "--threads=lots"])).is_err());
        assert!(parse_args(&args(&["a.csv", "--bogus"])).is_err());
        assert!(parse_args(&args(&["a.csv", "b.csv"])).is_err());
    }
}
