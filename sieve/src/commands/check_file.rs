// sieve/src/commands/check_file.rs
//
// USE CASE: Physical checks on one file or every file under a directory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use comfy_table::{Table, presets::UTF8_FULL};
use sieve_core::domain::file_check::FileCheckResult;
use sieve_core::infrastructure::FileValidator;
use sieve_core::infrastructure::config::load_validation_config;
use sieve_core::infrastructure::file_validation::collect_files;

pub fn execute(config: PathBuf, path: PathBuf, check: bool) -> anyhow::Result<()> {
    let config = load_validation_config(&config)
        .with_context(|| format!("Failed to load validation config from {:?}", config))?;

    if config.file_checks.is_empty() {
        println!("⚠️  No file_validation checks configured.");
        return Ok(());
    }

    let files = if path.is_dir() {
        collect_files(&path)
    } else {
        vec![path]
    };
    println!("📁 Checking {} file(s)...", files.len());

    let mut failures = 0;
    for file in &files {
        let results = FileValidator::new(file)
            .validate(&config.file_checks)
            .with_context(|| format!("Could not check {}", file.display()))?;
        failures += results.iter().filter(|r| !r.passed).count();
        print_results(file, &results);
    }

    if failures == 0 {
        println!("   ✅ All file checks passed.");
    } else {
        eprintln!("\n⚠️  {} file check(s) failed.", failures);
        if check {
            eprintln!("💥 --check mode: Failing due to file check failures.");
            std::process::exit(1);
        }
    }
    Ok(())
}

pub fn print_results(file: &Path, results: &[FileCheckResult]) {
    println!("\n📄 {}", file.display());
    println!("{}", file_checks_table(results));
}

pub fn file_checks_table(results: &[FileCheckResult]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Check", "Status", "Details"]);
    for r in results {
        let status = if r.passed { "✅ PASS" } else { "❌ FAIL" };
        table.add_row(vec![r.check_name.as_str(), status, r.details.as_str()]);
    }
    table
}
