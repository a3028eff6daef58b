// sieve/src/commands/run.rs
//
// USE CASE: Validate one data file and dispatch its rows.

use std::sync::Arc;

use anyhow::Context;
use comfy_table::{Table, presets::UTF8_FULL};
use sieve_core::application::{RunOutcome, RunReport, ValidationProcessor, build_sinks};
use sieve_core::domain::DomainError;
use sieve_core::infrastructure::adapters::CsvOptions;
use sieve_core::infrastructure::adapters::tabular::write_dataset_file;
use sieve_core::infrastructure::config::load_validation_config;
use sieve_core::infrastructure::engine::{NativeEngine, RecordedResultsEngine};
use sieve_core::ports::ExpectationEngine;
use tracing::debug;

use crate::cli::RunArgs;
use crate::commands::check_file::file_checks_table;

pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    let start = std::time::Instant::now();
    debug!(process_id = %args.process_id, data = %args.data.display(), "Run requested");

    // A. Load the Config (Infra)
    println!("⚙️  Loading validation config...");
    let mut config = load_validation_config(&args.config).with_context(|| {
        format!("Failed to load validation config from {:?}", args.config)
    })?;
    // Les flags CLI passent après YAML et environnement
    if let Some(path) = args.invalid_file {
        config.quarantine.local_path = Some(path);
    }
    if let Some(dir) = args.report_dir {
        config.quarantine.report_dir = Some(dir);
    }
    println!(
        "   {} file check(s), {} expectation(s)",
        config.file_checks.len(),
        config.expectations.len()
    );

    if args.no_header && args.columns.is_none() {
        anyhow::bail!("❌ --no-header needs --columns to name the fields");
    }

    // B. Pick the engine
    let engine: Arc<dyn ExpectationEngine> = match &args.results {
        Some(path) => {
            let recorded = RecordedResultsEngine::from_path(path)
                .with_context(|| format!("Failed to read engine results from {:?}", path))?;
            println!(
                "   Engine: recorded results ({}, {} result(s))",
                path.display(),
                recorded.results().len()
            );
            Arc::new(recorded)
        }
        None => {
            println!("   Engine: native");
            Arc::new(NativeEngine::new())
        }
    };

    // Une sink mal configurée est signalée dans le rapport, pas ici
    let sinks = build_sinks(&config.quarantine, &args.process_id);
    let processor = ValidationProcessor::new(engine, &args.process_id).with_sinks(sinks);

    let csv = CsvOptions {
        has_header: !args.no_header,
        columns: args.columns,
        ..CsvOptions::default()
    };

    // C. Run (Application Layer)
    println!("🚦 Validating {}...", args.data.display());
    let outcome = processor
        .run(&config, &args.data, &csv)
        .await
        .with_context(|| format!("Validation of {:?} failed", args.data))?;

    match outcome {
        RunOutcome::Completed { report, valid_rows } => {
            print_report(&report);

            if let Some(out) = &args.output {
                write_dataset_file(out, &valid_rows)
                    .with_context(|| format!("Failed to write valid rows to {:?}", out))?;
                println!("📄 Valid rows written to {}", out.display());
            }

            println!("\n✨ Done in {:.2?}", start.elapsed());
        }
        RunOutcome::Aborted(reason) => {
            let violation = miette::Report::new(DomainError::from(reason));
            eprintln!("\n💥 RUN ABORTED");
            eprintln!("{:?}", violation);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    if !report.file_checks.is_empty() {
        println!("\n📁 File checks");
        println!("{}", file_checks_table(&report.file_checks));
        let failed = report.failed_file_checks().count();
        if failed > 0 {
            println!("   ⚠️  {failed} file check(s) failed");
        }
    }

    if !report.expectations.is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["Expectation", "Column", "Status", "Unexpected", "Action"]);
        for e in &report.expectations {
            table.add_row(vec![
                e.expectation_id.clone(),
                e.column.clone(),
                if e.success { "✅ PASS" } else { "❌ FAIL" }.to_string(),
                e.unexpected_count.to_string(),
                e.action.map(|a| a.to_string()).unwrap_or_else(|| "-".into()),
            ]);
        }
        println!("\n🧪 Expectations");
        println!("{table}");
        println!(
            "   {} of {} expectation(s) failed",
            report.failed_expectations().count(),
            report.expectations.len()
        );
    }

    println!("\n📊 Rows: {}", report.total_rows);
    println!("   ✅ Valid rows: {}", report.valid_rows);
    println!("   ❌ Invalid rows: {}", report.invalid_rows);

    for sink in report.sinks.iter().filter(|s| s.success) {
        if let Some(location) = &sink.location {
            println!("   💾 [{}] {}", sink.sink, location);
        }
    }
    for sink in report.failed_sinks() {
        let err = sink.error.as_deref().unwrap_or("unknown error");
        eprintln!("   ⚠️  [{}] quarantine not written: {}", sink.sink, err);
    }
}
